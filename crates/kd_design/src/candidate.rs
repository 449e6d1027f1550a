//! Designed candidates, ranking and MFE filtering.

use std::cmp::Ordering;
use serde::Serialize;

use crate::gc_content;
use crate::Annotation;
use crate::MotifAssignment;
use crate::SearchHit;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub sequence: String,
    pub predicted_structure: String,
    pub target_structure: String,
    pub mfe: f64,
    pub bp_distance: usize,
    pub motifs: MotifAssignment,
    pub annotation: Annotation,
}

impl Candidate {
    pub fn from_hit(
        hit: SearchHit,
        target: &str,
        motifs: &MotifAssignment,
        annotation: &Annotation,
    ) -> Self {
        Candidate {
            sequence: hit.sequence,
            predicted_structure: hit.predicted_structure,
            target_structure: target.to_string(),
            mfe: hit.mfe,
            bp_distance: hit.bp_distance,
            motifs: motifs.clone(),
            annotation: annotation.clone(),
        }
    }

    pub fn gc_content(&self) -> f64 {
        gc_content(&self.sequence)
    }

    /// Ranking order: base-pair distance first, then MFE (lower is better).
    pub fn rank_cmp(&self, other: &Candidate) -> Ordering {
        self.bp_distance.cmp(&other.bp_distance)
            .then_with(|| self.mfe.total_cmp(&other.mfe))
    }
}

/// Stable sort, best candidate first.
pub fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(Candidate::rank_cmp);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MfeStatistics {
    pub count: usize,
    pub min_mfe: f64,
    pub max_mfe: f64,
    pub mean_mfe: f64,
}

pub fn mfe_statistics(candidates: &[Candidate]) -> Option<MfeStatistics> {
    if candidates.is_empty() {
        return None;
    }
    let (min, max, sum) = candidates.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), c| (min.min(c.mfe), max.max(c.mfe), sum + c.mfe),
    );
    Some(MfeStatistics {
        count: candidates.len(),
        min_mfe: min,
        max_mfe: max,
        mean_mfe: sum / candidates.len() as f64,
    })
}

/// `p`-th percentile (0..=100) with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Drop candidates above `threshold`, then those above the `percentile`-th
/// MFE percentile of what is left.
pub fn filter_by_mfe(
    candidates: Vec<Candidate>,
    threshold: Option<f64>,
    percentile_cutoff: Option<f64>,
) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = match threshold {
        Some(t) => candidates.into_iter().filter(|c| c.mfe <= t).collect(),
        None => candidates,
    };
    if let Some(p) = percentile_cutoff {
        let mfes: Vec<f64> = kept.iter().map(|c| c.mfe).collect();
        if let Some(cutoff) = percentile(&mfes, p) {
            kept.retain(|c| c.mfe <= cutoff);
        }
    }
    kept
}
