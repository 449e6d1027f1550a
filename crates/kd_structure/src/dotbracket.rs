//! Dot-bracket symbols and symbol vectors.
//!
//! A `DotBracketVec` only guarantees that every symbol is one of `(`, `)` or
//! `.`. Bracket balance is checked when converting into a `PairTable`.

use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired,
    Open,
    Close,
}

impl TryFrom<char> for DotBracket {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' => Ok(DotBracket::Unpaired),
            '(' => Ok(DotBracket::Open),
            ')' => Ok(DotBracket::Close),
            _ => Err(c),
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Unpaired => '.',
            DotBracket::Open => '(',
            DotBracket::Close => ')',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl Deref for DotBracketVec {
    type Target = [DotBracket];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DotBracketVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.chars()
            .enumerate()
            .map(|(position, c)| DotBracket::try_from(c)
                .map_err(|symbol| StructureError::InvalidSymbol { symbol, position }))
            .collect::<Result<Vec<_>, _>>()
            .map(DotBracketVec)
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &db in self.iter() {
            write!(f, "{}", char::from(db))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_display() {
        let dbv = DotBracketVec::try_from("((..))..").unwrap();
        assert_eq!(dbv.len(), 8);
        assert_eq!(dbv[0], DotBracket::Open);
        assert_eq!(dbv[2], DotBracket::Unpaired);
        assert_eq!(dbv[5], DotBracket::Close);
        assert_eq!(format!("{}", dbv), "((..))..");
    }

    #[test]
    fn test_invalid_symbol() {
        let err = DotBracketVec::try_from("((.x))").unwrap_err();
        assert_eq!(err, StructureError::InvalidSymbol { symbol: 'x', position: 3 });
    }

    #[test]
    fn test_unbalanced_is_still_a_symbol_vector() {
        // Balance is not a concern of the symbol layer.
        assert!(DotBracketVec::try_from("((..)").is_ok());
        assert!(DotBracketVec::try_from(")..(").is_ok());
    }
}
