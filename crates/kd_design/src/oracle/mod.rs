//! The folding oracle boundary.
//!
//! The design pipeline never folds anything itself. It asks a
//! `FoldingOracle` to inverse-fold seed sequences and to fold the result.

mod nussinov;
mod vienna;

pub use nussinov::*;
pub use vienna::*;

use kd_structure::bp_distance;

use crate::OracleError;

pub trait FoldingOracle {
    /// Design a sequence for `target`, starting from `seed`.
    fn inverse_fold(&self, seed: &str, target: &str) -> Result<String, OracleError>;

    /// Predicted structure and its free energy.
    fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError>;

    /// Base-pair distance between two structures of equal length.
    fn bp_distance(&self, a: &str, b: &str) -> Result<usize, OracleError> {
        Ok(bp_distance(a, b)?)
    }
}

impl<T: FoldingOracle + ?Sized> FoldingOracle for &T {
    fn inverse_fold(&self, seed: &str, target: &str) -> Result<String, OracleError> {
        (**self).inverse_fold(seed, target)
    }

    fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError> {
        (**self).fold(sequence)
    }

    fn bp_distance(&self, a: &str, b: &str) -> Result<usize, OracleError> {
        (**self).bp_distance(a, b)
    }
}

impl<T: FoldingOracle + ?Sized> FoldingOracle for Box<T> {
    fn inverse_fold(&self, seed: &str, target: &str) -> Result<String, OracleError> {
        (**self).inverse_fold(seed, target)
    }

    fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError> {
        (**self).fold(sequence)
    }

    fn bp_distance(&self, a: &str, b: &str) -> Result<usize, OracleError> {
        (**self).bp_distance(a, b)
    }
}
