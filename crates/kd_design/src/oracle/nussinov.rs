//! Nussinov-style base-pair maximization, used as a self-contained oracle.
//!
//! Pairs are weighted GC 3, AU 2, GU 1 and must enclose at least
//! `min_hairpin` unpaired positions. The reported "free energy" is the
//! negated optimal score; it is a ranking signal, not a thermodynamic value.

use ndarray::Array2;

use kd_structure::PairSet;
use kd_structure::PairTable;
use kd_structure::NAIDX;

use crate::basify;
use crate::stringify;
use crate::Base;
use crate::FoldingOracle;
use crate::OracleError;

/// Weight of a base pair, zero if the bases cannot pair.
pub fn pair_weight(a: Base, b: Base) -> usize {
    match (a, b) {
        (Base::G, Base::C) | (Base::C, Base::G) => 3,
        (Base::A, Base::U) | (Base::U, Base::A) => 2,
        (Base::G, Base::U) | (Base::U, Base::G) => 1,
        _ => 0,
    }
}

/// Nussinov dynamic programming over a pair score matrix.
pub struct NussinovDP {
    pair_scores: Array2<usize>,
    dp_table: Array2<usize>,
}

impl From<Array2<usize>> for NussinovDP {
    fn from(pair_scores: Array2<usize>) -> Self {
        let dp_table = nussinov(&pair_scores);
        Self {
            pair_scores,
            dp_table,
        }
    }
}

impl NussinovDP {
    pub fn new(sequence: &[Base], min_hairpin: usize) -> Self {
        NussinovDP::from(build_pair_scores(sequence, min_hairpin))
    }

    pub fn len(&self) -> usize {
        self.dp_table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Optimal total pair weight.
    pub fn score(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.dp_table[(0, self.len() - 1)]
    }

    /// One optimal structure.
    pub fn mfe_pair_table(&self) -> PairTable {
        let n = self.len();
        let mut pt = PairTable(vec![None; n]);
        if n > 0 {
            traceback(0, n - 1, &self.dp_table, &self.pair_scores, &mut pt);
        }
        pt
    }

    pub fn pair_scores(&self) -> &Array2<usize> {
        &self.pair_scores
    }
}

fn nussinov(p: &Array2<usize>) -> Array2<usize> {
    let (n, m) = p.dim();
    assert!(n == m);
    let mut dp = Array2::from_elem((n, n), 0);
    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            let mut max_val = dp[(i + 1, j)].max(dp[(i, j - 1)]);
            if p[(i, j)] > 0 {
                max_val = max_val.max(dp[(i + 1, j - 1)] + p[(i, j)]);
            }
            for k in i + 1..j {
                max_val = max_val.max(dp[(i, k)] + dp[(k + 1, j)]);
            }
            dp[(i, j)] = max_val;
        }
    }
    dp
}

/// Returns a pairwise score matrix for a sequence.
fn build_pair_scores(sequence: &[Base], min_hairpin: usize) -> Array2<usize> {
    let n = sequence.len();
    let mut p = Array2::from_elem((n, n), 0);
    for ((i, j), value) in p.indexed_iter_mut() {
        if j > i + min_hairpin {
            *value = pair_weight(sequence[i], sequence[j]);
        }
    }
    p
}

fn traceback(
    i: usize,
    j: usize,
    dp: &Array2<usize>,
    p: &Array2<usize>,
    pt: &mut PairTable,
) {
    if i >= j {
        return;
    }
    let dp_ij = dp[(i, j)];

    if dp_ij == dp[(i + 1, j)] {
        traceback(i + 1, j, dp, p, pt);
    } else if dp_ij == dp[(i, j - 1)] {
        traceback(i, j - 1, dp, p, pt);
    } else if p[(i, j)] > 0 && dp_ij == dp[(i + 1, j - 1)] + p[(i, j)] {
        pt[i] = Some(j as NAIDX);
        pt[j] = Some(i as NAIDX);
        traceback(i + 1, j - 1, dp, p, pt);
    } else {
        for k in i + 1..j {
            if dp_ij == dp[(i, k)] + dp[(k + 1, j)] {
                traceback(i, k, dp, p, pt);
                traceback(k + 1, j, dp, p, pt);
                break;
            }
        }
    }
}

/// Offline oracle built on `NussinovDP`.
#[derive(Debug, Clone, Copy)]
pub struct NussinovOracle {
    /// Minimum number of unpaired bases enclosed by a pair.
    pub min_hairpin: usize,
    /// Upper bound on repair rounds during inverse folding.
    pub max_rounds: usize,
}

impl Default for NussinovOracle {
    fn default() -> Self {
        Self {
            min_hairpin: 3,
            max_rounds: 10,
        }
    }
}

impl NussinovOracle {
    fn fold_bases(&self, seq: &[Base]) -> (PairTable, usize) {
        let dp = NussinovDP::new(seq, self.min_hairpin);
        (dp.mfe_pair_table(), dp.score())
    }
}

impl FoldingOracle for NussinovOracle {
    /// Deterministic repair walk: make every target pair compatible, then
    /// repeatedly fold and fix positions whose pairing disagrees with the
    /// target (GC-clamp missing pairs, detune spurious ones). Returns the best
    /// sequence seen.
    fn inverse_fold(&self, seed: &str, target: &str) -> Result<String, OracleError> {
        let pt = PairTable::try_from(target)?;
        let mut seq = basify(seed)?;
        if seq.len() != pt.len() {
            return Err(OracleError::LengthMismatch {
                sequence: seq.len(),
                structure: pt.len(),
            });
        }
        for i in 0..pt.len() {
            if let Some(j) = pt[i].map(|j| j as usize) {
                if i < j && !seq[i].can_pair(seq[j]) {
                    seq[j] = seq[i].complement();
                }
            }
        }

        let target_set = PairSet::from(&pt);
        let mut best: Option<(usize, Vec<Base>)> = None;
        for round in 0..=self.max_rounds {
            let (predicted, _) = self.fold_bases(&seq);
            let predicted_set = PairSet::from(&predicted);
            let dist = predicted_set.distance(&target_set)?;
            log::trace!("repair round {}: d={} pairs {}", round, dist, predicted_set);
            if best.as_ref().is_none_or(|(d, _)| dist < *d) {
                best = Some((dist, seq.clone()));
            }
            if dist == 0 {
                break;
            }
            for k in 0..pt.len() {
                if predicted[k] == pt[k] {
                    continue;
                }
                match (pt[k], predicted[k]) {
                    (Some(p), _) => {
                        let p = p as usize;
                        let (lo, hi) = (k.min(p), k.max(p));
                        seq[lo] = Base::G;
                        seq[hi] = Base::C;
                    }
                    (None, Some(q)) => {
                        let partner = seq[q as usize];
                        if let Some(&b) = [Base::A, Base::U, Base::G, Base::C]
                            .iter()
                            .find(|b| !b.can_pair(partner))
                        {
                            seq[k] = b;
                        }
                    }
                    (None, None) => (),
                }
            }
        }
        Ok(best.map(|(_, s)| stringify(&s)).unwrap_or_default())
    }

    fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError> {
        let seq = basify(sequence)?;
        let (pt, score) = self.fold_bases(&seq);
        Ok((pt.to_string(), -(score as f64)))
    }
}
