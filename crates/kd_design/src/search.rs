//! Bounded inverse-folding search with early exit.

use rand::Rng;

use crate::build_initial_sequence;
use crate::stringify;
use crate::ConstraintTable;
use crate::FoldingOracle;
use crate::OracleError;

/// Best result of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub sequence: String,
    pub predicted_structure: String,
    pub mfe: f64,
    pub bp_distance: usize,
}

/// Try up to `max_tries` constrained seeds and keep the designed sequence
/// whose predicted structure is closest to `target`.
///
/// Ties keep the first hit. The search stops at the first exact match.
/// Oracle failures are returned as-is and end the search.
pub fn inverse_fold_search<O, R>(
    target: &str,
    table: &ConstraintTable,
    max_tries: usize,
    oracle: &O,
    rng: &mut R,
) -> Result<Option<SearchHit>, OracleError>
where
    O: FoldingOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut best: Option<SearchHit> = None;
    for attempt in 0..max_tries {
        let seed = stringify(&build_initial_sequence(target.len(), table, rng));
        let designed = oracle.inverse_fold(&seed, target)?;
        let (predicted, mfe) = oracle.fold(&designed)?;
        let dist = oracle.bp_distance(target, &predicted)?;
        log::trace!("try {}: {} {} d={} ({:.2})", attempt, designed, predicted, dist, mfe);

        if best.as_ref().is_none_or(|b| dist < b.bp_distance) {
            best = Some(SearchHit {
                sequence: designed,
                predicted_structure: predicted,
                mfe,
                bp_distance: dist,
            });
        }
        if dist == 0 {
            break;
        }
    }
    Ok(best)
}
