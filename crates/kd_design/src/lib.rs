//! The kd_design crate.
//!
//! Designs RNA sequences for a target dot-bracket structure while embedding
//! motifs at its hairpin loops:
//!  - GNRA / UUCG tetraloops,
//!  - kissing-loop pairs (reverse-complementary loop sequences).
//!
//! Folding and inverse folding are delegated to a `FoldingOracle`.
//!

mod error;
mod nucleotide;
mod scaffold;
mod config;
mod motif;
mod constraints;
mod builder;
mod oracle;
mod search;
mod candidate;
mod pipeline;

/// Writing candidates and RNAComposer inputs.
pub mod persist;

pub use error::*;
pub use nucleotide::*;
pub use scaffold::*;
pub use config::*;
pub use motif::*;
pub use constraints::*;
pub use builder::*;
pub use oracle::*;
pub use search::*;
pub use candidate::*;
pub use pipeline::*;
