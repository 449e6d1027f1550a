//! Base pairs as packed integer keys, and structure comparison.
//!
//! The base-pair distance of two structures is the size of the symmetric
//! difference of their pair sets. A `Pair` packs its two `NAIDX` positions
//! into one `P1KEY`, so a `PairSet` is a plain `IntSet<P1KEY>`.
//!

use std::fmt;
use nohash_hasher::IntSet;

use crate::PairTable;
use crate::StructureError;
use crate::NAIDX;
use crate::P1KEY;

/// A base pair (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(i < j);
        Pair { i, j }
    }

    pub fn i(&self) -> NAIDX {
        self.i
    }

    pub fn j(&self) -> NAIDX {
        self.j
    }

    pub fn key(&self) -> P1KEY {
        ((self.i as P1KEY) << NAIDX::BITS) | (self.j as P1KEY)
    }

    pub fn from_key(key: P1KEY) -> Self {
        Pair::new((key >> NAIDX::BITS) as NAIDX, key as NAIDX)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.i, self.j)
    }
}

/// The pairs of one structure of a given length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    length: usize,
    pairs: IntSet<P1KEY>,
}

impl PairSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs sorted by their 5' position.
    pub fn to_vec(&self) -> Vec<Pair> {
        let mut pairs: Vec<Pair> = self.pairs.iter().map(|&k| Pair::from_key(k)).collect();
        pairs.sort_unstable_by_key(|p| p.key());
        pairs
    }

    /// Number of pairs present in exactly one of the two sets.
    pub fn distance(&self, other: &PairSet) -> Result<usize, StructureError> {
        if self.length != other.length {
            return Err(StructureError::LengthMismatch(self.length, other.length));
        }
        Ok(self.pairs.symmetric_difference(&other.pairs).count())
    }
}

impl From<&PairTable> for PairSet {
    fn from(pt: &PairTable) -> Self {
        let pairs = pt.iter()
            .enumerate()
            .filter_map(|(i, &j)| j.filter(|&j| i < j as usize).map(|j| Pair::new(i as NAIDX, j).key()))
            .collect();
        PairSet { length: pt.len(), pairs }
    }
}

impl fmt::Display for PairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, pair) in self.to_vec().into_iter().enumerate() {
            if k > 0 {
                write!(f, ",")?;
            }
            write!(f, "{pair}")?;
        }
        Ok(())
    }
}

/// Base-pair distance between two dot-bracket strings of equal length.
pub fn bp_distance(a: &str, b: &str) -> Result<usize, StructureError> {
    let pa = PairSet::from(&PairTable::try_from(a)?);
    let pb = PairSet::from(&PairTable::try_from(b)?);
    pa.distance(&pb)
}
