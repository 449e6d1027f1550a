use thiserror::Error;

/// Errors raised while reading dot-bracket structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// A character outside of `(`, `)` and `.`.
    #[error("invalid dot-bracket symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// An opening bracket that is never closed.
    #[error("unmatched '(' at position {0}")]
    UnmatchedOpen(usize),

    /// A closing bracket without a preceding opening bracket.
    #[error("unmatched ')' at position {0}")]
    UnmatchedClose(usize),

    /// Structure does not fit into `NAIDX` indexing.
    #[error("structure of length {0} is too long")]
    TooLong(usize),

    /// Two structures that should be compared have different lengths.
    #[error("length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),
}
