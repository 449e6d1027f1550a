//! Writing candidates to disk.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::Candidate;

/// File stem of the candidate at 1-based `rank`.
pub fn candidate_name(scaffold: &str, rank: usize) -> String {
    format!("{scaffold}_cand{rank}")
}

/// Human-readable record of one candidate.
pub fn candidate_record(name: &str, candidate: &Candidate) -> String {
    format!(
        "Name: {name}\nSequence: {}\nTarget_SS: {}\nPredicted_SS: {}\nMFE: {}\nBP_distance: {}\n",
        candidate.sequence,
        candidate.target_structure,
        candidate.predicted_structure,
        candidate.mfe,
        candidate.bp_distance,
    )
}

/// Write one `<scaffold>_cand<rank>.txt` per candidate into `out_dir`.
pub fn save_candidates(
    out_dir: &Path,
    scaffold: &str,
    candidates: &[Candidate],
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(candidates.len());
    for (i, c) in candidates.iter().enumerate() {
        let name = candidate_name(scaffold, i + 1);
        let path = out_dir.join(format!("{name}.txt"));
        fs::write(&path, candidate_record(&name, c))?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Input block for RNAComposer 3D modelling: `>name`, sequence, structure.
pub fn rnacomposer_input(name: &str, sequence: &str, structure: &str) -> String {
    format!(">{name}\n{sequence}\n{structure}\n")
}

/// Write the RNAComposer blocks of all candidates into one file.
pub fn save_rnacomposer_inputs(
    path: &Path,
    scaffold: &str,
    candidates: &[Candidate],
) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text: String = candidates.iter()
        .enumerate()
        .map(|(i, c)| rnacomposer_input(&candidate_name(scaffold, i + 1), &c.sequence, &c.predicted_structure))
        .collect();
    fs::write(path, text)
}
