//! ViennaRNA command-line adapter.
//!
//! Runs `RNAinverse` and `RNAfold --noPS` as child processes. Nothing is
//! cached; every call spawns a process.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use crate::basify;
use crate::FoldingOracle;
use crate::OracleError;

#[derive(Debug, Clone)]
pub struct ViennaOracle {
    pub rnafold: PathBuf,
    pub rnainverse: PathBuf,
    /// Folding temperature in Celsius, passed as `-T`.
    pub temperature: f64,
}

impl Default for ViennaOracle {
    fn default() -> Self {
        Self {
            rnafold: PathBuf::from("RNAfold"),
            rnainverse: PathBuf::from("RNAinverse"),
            temperature: 37.0,
        }
    }
}

fn run(program: &Path, args: &[String], input: &str) -> Result<String, OracleError> {
    let name = program.display().to_string();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| OracleError::Spawn { program: name.clone(), source })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())
            .map_err(|source| OracleError::Spawn { program: name.clone(), source })?;
    }

    let output = child.wait_with_output()
        .map_err(|source| OracleError::Spawn { program: name.clone(), source })?;
    if !output.status.success() {
        return Err(OracleError::ExitStatus {
            program: name,
            status: output.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// First token of the first non-empty line is the designed sequence.
pub fn parse_rnainverse_output(stdout: &str, expected_len: usize) -> Result<String, OracleError> {
    let bad = || OracleError::Output {
        program: "RNAinverse".to_string(),
        output: stdout.to_string(),
    };
    let token = stdout.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(|l| l.split_whitespace().next())
        .ok_or_else(bad)?;
    let sequence = token.to_ascii_uppercase();
    if sequence.len() != expected_len || basify(&sequence).is_err() {
        return Err(bad());
    }
    Ok(sequence)
}

/// Second line reads `<structure> (<energy>)`.
///
/// ```text
/// GGGGAAAACCCC
/// ((((....)))) ( -5.60)
/// ```
pub fn parse_rnafold_output(stdout: &str) -> Result<(String, f64), OracleError> {
    let bad = || OracleError::Output {
        program: "RNAfold".to_string(),
        output: stdout.to_string(),
    };
    let line = stdout.lines().nth(1).map(str::trim).ok_or_else(bad)?;
    let (structure, rest) = line.split_once(' ').ok_or_else(bad)?;
    let energy = rest.trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .parse::<f64>()
        .map_err(|_| bad())?;
    Ok((structure.to_string(), energy))
}

impl FoldingOracle for ViennaOracle {
    fn inverse_fold(&self, seed: &str, target: &str) -> Result<String, OracleError> {
        if seed.len() != target.len() {
            return Err(OracleError::LengthMismatch {
                sequence: seed.len(),
                structure: target.len(),
            });
        }
        let args = vec!["-T".to_string(), self.temperature.to_string()];
        let stdout = run(&self.rnainverse, &args, &format!("{target}\n{seed}\n@\n"))?;
        parse_rnainverse_output(&stdout, target.len())
    }

    fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError> {
        let args = vec![
            "--noPS".to_string(),
            "-T".to_string(),
            self.temperature.to_string(),
        ];
        let stdout = run(&self.rnafold, &args, &format!("{sequence}\n"))?;
        parse_rnafold_output(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rnafold_output() {
        let out = "GGGGAAAACCCC\n((((....)))) ( -5.60)\n";
        let (ss, mfe) = parse_rnafold_output(out).unwrap();
        assert_eq!(ss, "((((....))))");
        assert_eq!(mfe, -5.6);

        let out = "GAAAC\n..... (  0.00)\n";
        assert_eq!(parse_rnafold_output(out).unwrap(), (".....".to_string(), 0.0));

        assert!(parse_rnafold_output("GGGG\n").is_err());
        assert!(parse_rnafold_output("GGGG\n.... (abc)\n").is_err());
    }

    #[test]
    fn test_parse_rnainverse_output() {
        let out = "\nGGGGAAAACCCC   0\n";
        assert_eq!(parse_rnainverse_output(out, 12).unwrap(), "GGGGAAAACCCC");
        assert_eq!(parse_rnainverse_output("ggggaaaacccc 0", 12).unwrap(), "GGGGAAAACCCC");
        assert!(parse_rnainverse_output("GGGG 0", 12).is_err());
        assert!(parse_rnainverse_output("", 12).is_err());
    }

    #[test]
    fn test_missing_binary() {
        let oracle = ViennaOracle {
            rnafold: PathBuf::from("/nonexistent/RNAfold"),
            ..ViennaOracle::default()
        };
        assert!(matches!(oracle.fold("GGGGAAAACCCC"), Err(OracleError::Spawn { .. })));
    }
}
