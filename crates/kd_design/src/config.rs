use std::fs;
use std::path::Path;
use serde::Deserialize;
use serde::Serialize;

use crate::ConflictPolicy;
use crate::DesignError;

/// What happens to a trial whose oracle call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleFailurePolicy {
    /// Log the failure and continue with the next trial.
    #[default]
    Skip,
    /// Abort the whole design run.
    Abort,
}

/// Parameters of one design run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignConfig {
    pub n_candidates: usize,
    pub seed: u64,
    /// Inverse-fold attempts within one trial.
    pub tries_per_trial: usize,
    /// Trials per requested candidate.
    pub oversample: usize,
    pub conflict_policy: ConflictPolicy,
    pub failure_policy: OracleFailurePolicy,
    /// Keep only candidates with `mfe <= mfe_threshold`.
    pub mfe_threshold: Option<f64>,
    /// Keep only candidates at or below this MFE percentile (0..=100).
    pub mfe_percentile: Option<f64>,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            n_candidates: 5,
            seed: 42,
            tries_per_trial: 5,
            oversample: 3,
            conflict_policy: ConflictPolicy::Overwrite,
            failure_policy: OracleFailurePolicy::Skip,
            mfe_threshold: None,
            mfe_percentile: None,
        }
    }
}

impl DesignConfig {
    /// Number of independent trials for the requested candidate count.
    pub fn n_trials(&self) -> usize {
        self.n_candidates.saturating_mul(self.oversample).max(self.n_candidates)
    }

    pub fn validate(&self) -> Result<(), DesignError> {
        if let Some(p) = self.mfe_percentile {
            if !(0.0..=100.0).contains(&p) {
                return Err(DesignError::Config(format!("mfe_percentile {p} not in [0, 100]")));
            }
        }
        if self.mfe_threshold.is_some_and(f64::is_nan) {
            return Err(DesignError::Config("mfe_threshold is NaN".to_string()));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DesignError> {
        let text = fs::read_to_string(path).map_err(|source| DesignError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text).map_err(|source| DesignError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}
