use std::path::PathBuf;
use thiserror::Error;

use kd_structure::StructureError;

/// Errors raised by a folding oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle could not be started (e.g. binary not found).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The oracle ran but reported failure.
    #[error("{program} exited with status {status}")]
    ExitStatus { program: String, status: String },

    /// The oracle produced output we cannot interpret.
    #[error("unexpected output from {program}: {output}")]
    Output { program: String, output: String },

    /// Input sequence contains something other than A, C, G, U (or T).
    #[error("invalid nucleotide '{0}'")]
    InvalidNucleotide(char),

    /// Sequence and structure lengths differ.
    #[error("sequence of length {sequence} does not match structure of length {structure}")]
    LengthMismatch { sequence: usize, structure: usize },

    /// A structure passed to or returned by the oracle is malformed.
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Errors raised while compiling motif constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// Two motifs constrain the same position (strict mode only).
    #[error("position {position} constrained by '{first}' and '{second}'")]
    Conflict {
        position: usize,
        first: String,
        second: String,
    },

    /// A loop extends beyond the structure.
    #[error("loop ({start},{end}) exceeds structure of length {length}")]
    LoopOutOfRange { start: usize, end: usize, length: usize },

    /// A kissing partner refers to a loop that does not exist.
    #[error("loop {loop_idx} pairs with unknown loop {partner}")]
    UnknownPartner { loop_idx: usize, partner: usize },
}

/// Top-level error of the design pipeline.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("unknown scaffold '{0}'")]
    UnknownScaffold(String),

    #[error("malformed target structure: {0}")]
    MalformedStructure(#[from] StructureError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
