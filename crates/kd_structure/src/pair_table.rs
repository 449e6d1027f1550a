//! Pair tables: `pt[i] = Some(j)` if `i` pairs with `j`.
//!
//! Construction fails fast on unbalanced brackets, so every `PairTable`
//! describes a valid, pseudoknot-free secondary structure.

use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::DotBracket;
use crate::DotBracketVec;
use crate::StructureError;
use crate::NAIDX;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairTable(pub Vec<Option<NAIDX>>);

impl Deref for PairTable {
    type Target = [Option<NAIDX>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl PairTable {
    /// Number of base pairs in the structure.
    pub fn pair_count(&self) -> usize {
        self.iter()
            .enumerate()
            .filter(|(i, j)| j.is_some_and(|j| *i < j as usize))
            .count()
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    fn try_from(dbv: &DotBracketVec) -> Result<Self, Self::Error> {
        if dbv.len() >= NAIDX::MAX as usize {
            return Err(StructureError::TooLong(dbv.len()));
        }
        let mut stack: Vec<usize> = Vec::new();
        let mut table = vec![None; dbv.len()];
        for (j, &db) in dbv.iter().enumerate() {
            match db {
                DotBracket::Open => stack.push(j),
                DotBracket::Close => {
                    let i = stack.pop().ok_or(StructureError::UnmatchedClose(j))?;
                    table[i] = Some(j as NAIDX);
                    table[j] = Some(i as NAIDX);
                }
                DotBracket::Unpaired => (),
            }
        }
        if let Some(&i) = stack.last() {
            return Err(StructureError::UnmatchedOpen(i));
        }
        Ok(PairTable(table))
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PairTable::try_from(&DotBracketVec::try_from(s)?)
    }
}

impl From<&PairTable> for DotBracketVec {
    fn from(pt: &PairTable) -> Self {
        DotBracketVec(pt.iter()
            .enumerate()
            .map(|(i, &j)| match j {
                None => DotBracket::Unpaired,
                Some(j) if i < j as usize => DotBracket::Open,
                Some(_) => DotBracket::Close,
            })
            .collect())
    }
}

impl fmt::Display for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DotBracketVec::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_table_from_str() {
        let pt = PairTable::try_from("((..)).").unwrap();
        assert_eq!(pt.len(), 7);
        assert_eq!(pt[0], Some(5));
        assert_eq!(pt[1], Some(4));
        assert_eq!(pt[4], Some(1));
        assert_eq!(pt[5], Some(0));
        assert_eq!(pt[6], None);
        assert_eq!(pt.pair_count(), 2);
        assert_eq!(format!("{}", pt), "((..)).");
    }

    #[test]
    fn test_unmatched_brackets() {
        assert_eq!(PairTable::try_from("((..)"), Err(StructureError::UnmatchedOpen(0)));
        assert_eq!(PairTable::try_from("(..))"), Err(StructureError::UnmatchedClose(4)));
        assert_eq!(PairTable::try_from(")("), Err(StructureError::UnmatchedClose(0)));
    }

    #[test]
    fn test_empty_structure() {
        let pt = PairTable::try_from("").unwrap();
        assert!(pt.is_empty());
        assert_eq!(pt.pair_count(), 0);
    }
}
