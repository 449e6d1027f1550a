use std::fmt;
use serde::Deserialize;
use serde::Serialize;

use crate::DesignError;
use crate::OracleError;

/// RNA nucleotides. The declaration order `A, U, G, C` is the order in which
/// uniform draws index into the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Base { A, U, G, C }

pub const NUCS: [Base; 4] = [Base::A, Base::U, Base::G, Base::C];

impl Base {
    /// Watson-Crick complement.
    pub fn complement(self) -> Base {
        match self {
            Base::A => Base::U,
            Base::U => Base::A,
            Base::G => Base::C,
            Base::C => Base::G,
        }
    }

    /// Canonical and wobble pairs.
    pub fn can_pair(self, other: Base) -> bool {
        matches!((self, other),
            (Base::A, Base::U) | (Base::U, Base::A) |
            (Base::G, Base::C) | (Base::C, Base::G) |
            (Base::G, Base::U) | (Base::U, Base::G))
    }
}

impl TryFrom<char> for Base {
    type Error = OracleError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c.to_ascii_uppercase() {
            'A' => Base::A,
            'C' => Base::C,
            'G' => Base::G,
            'U' | 'T' => Base::U,
            _ => return Err(OracleError::InvalidNucleotide(c)),
        })
    }
}

impl From<Base> for char {
    fn from(b: Base) -> Self {
        match b {
            Base::A => 'A',
            Base::U => 'U',
            Base::G => 'G',
            Base::C => 'C',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

pub fn basify(seq: &str) -> Result<Vec<Base>, OracleError> {
    seq.chars().map(Base::try_from).collect()
}

pub fn stringify(seq: &[Base]) -> String {
    seq.iter().map(|&b| char::from(b)).collect()
}

/// User-supplied sequence text in canonical form: FASTA header lines and
/// whitespace are dropped, the rest must be A, C, G, U (or T) in any case.
pub fn normalize_sequence(text: &str) -> Result<String, DesignError> {
    let raw: String = text.lines()
        .filter(|line| !line.trim_start().starts_with('>'))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();
    if raw.is_empty() {
        return Err(DesignError::InvalidSequence("empty sequence".to_string()));
    }
    let bases = basify(&raw)
        .map_err(|e| DesignError::InvalidSequence(format!("{e}, only A, U, G, C allowed")))?;
    Ok(stringify(&bases))
}

/// Fraction of G and C in a sequence (0.0 for the empty sequence).
pub fn gc_content(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.chars()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'G' | 'C'))
        .count();
    gc as f64 / seq.chars().count() as f64
}
