//! Motif assignment policy.
//!
//! Decides, per scaffold topology, which hairpin loops become kissing-loop
//! partners. Every loop that is not claimed by a kissing pair receives an
//! independent stabilizing tetraloop.

use std::fmt;
use std::ops::Index;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use kd_structure::HairpinLoop;

use crate::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetraloopKind {
    #[serde(rename = "GNRA")]
    Gnra,
    #[serde(rename = "UUCG")]
    Uucg,
}

impl TetraloopKind {
    pub fn label(&self) -> &'static str {
        match self {
            TetraloopKind::Gnra => "GNRA",
            TetraloopKind::Uucg => "UUCG",
        }
    }
}

impl fmt::Display for TetraloopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Motif {
    #[default]
    Unassigned,
    Tetraloop { kind: TetraloopKind },
    KissingPair { partner: usize },
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Motif::Unassigned => write!(f, "-"),
            Motif::Tetraloop { kind } => write!(f, "{}", kind),
            Motif::KissingPair { partner } => write!(f, "kissing with loop {}", partner),
        }
    }
}

/// Motif per loop index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifAssignment(Vec<Motif>);

impl Index<usize> for MotifAssignment {
    type Output = Motif;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}

impl From<Vec<Motif>> for MotifAssignment {
    fn from(motifs: Vec<Motif>) -> Self {
        MotifAssignment(motifs)
    }
}

impl MotifAssignment {
    /// All loops unassigned.
    pub fn new(n_loops: usize) -> Self {
        MotifAssignment(vec![Motif::Unassigned; n_loops])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Motif> + '_ {
        self.0.iter()
    }

    pub fn set(&mut self, idx: usize, motif: Motif) {
        self.0[idx] = motif;
    }

    /// Assign loops `a` and `b` as kissing partners of each other.
    pub fn set_kissing(&mut self, a: usize, b: usize) {
        debug_assert!(a != b);
        self.0[a] = Motif::KissingPair { partner: b };
        self.0[b] = Motif::KissingPair { partner: a };
    }

    /// Unordered kissing pairs `(i, j)` with `i < j`, ordered by `i`.
    pub fn kissing_pairs(&self) -> Vec<(usize, usize)> {
        self.0.iter()
            .enumerate()
            .filter_map(|(i, m)| match *m {
                Motif::KissingPair { partner } if i < partner => Some((i, partner)),
                _ => None,
            })
            .collect()
    }

    /// Every kissing partner points back and every loop is assigned.
    pub fn is_complete(&self) -> bool {
        self.0.iter().enumerate().all(|(i, m)| match *m {
            Motif::Unassigned => false,
            Motif::Tetraloop { .. } => true,
            Motif::KissingPair { partner } => partner != i
                && self.0.get(partner) == Some(&Motif::KissingPair { partner: i }),
        })
    }
}

/// The three perfect matchings over four loops.
pub const FOUR_LOOP_MATCHINGS: [[(usize, usize); 2]; 3] = [
    [(0, 1), (2, 3)],
    [(0, 2), (1, 3)],
    [(0, 3), (1, 2)],
];

/// Assign a motif to every loop according to the scaffold topology.
///
/// Randomized decisions draw exactly once each from `rng`: one draw for the
/// four-loop matching (if applicable), then one draw per fallback tetraloop in
/// loop order.
pub fn assign_motifs<R: Rng + ?Sized>(
    topology: Topology,
    loops: &[HairpinLoop],
    rng: &mut R,
) -> MotifAssignment {
    let n_loops = loops.len();
    let mut config = MotifAssignment::new(n_loops);

    match topology {
        Topology::RandomPairing if n_loops == 4 => {
            let pattern = FOUR_LOOP_MATCHINGS[rng.random_range(0..FOUR_LOOP_MATCHINGS.len())];
            for (a, b) in pattern {
                config.set_kissing(a, b);
            }
        }
        Topology::OppositePairing if n_loops >= 4 => {
            config.set_kissing(0, 2);
            config.set_kissing(1, 3);
        }
        Topology::HalfPairing if n_loops >= 6 => {
            let half = n_loops / 2;
            for top in 0..half {
                config.set_kissing(top, top + half);
            }
        }
        _ => {
            log::debug!("No kissing rule for {:?} with {} loops.", topology, n_loops);
        }
    }

    for idx in 0..n_loops {
        if config[idx] == Motif::Unassigned {
            let kind = if rng.random_range(0..2) == 0 {
                TetraloopKind::Gnra
            } else {
                TetraloopKind::Uucg
            };
            config.set(idx, Motif::Tetraloop { kind });
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dummy_loops(n: usize) -> Vec<HairpinLoop> {
        (0..n).map(|k| HairpinLoop::new(10 * k + 4, 10 * k + 7)).collect()
    }

    fn pairs_of(config: &MotifAssignment) -> Vec<(usize, usize)> {
        config.kissing_pairs()
    }

    #[test]
    fn test_random_pairing_is_a_perfect_matching() {
        let loops = dummy_loops(4);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = assign_motifs(Topology::RandomPairing, &loops, &mut rng);
            assert!(config.is_complete());
            let pairs = pairs_of(&config);
            assert!(FOUR_LOOP_MATCHINGS.iter().any(|m| m.to_vec() == pairs));
            for (a, b) in pairs {
                assert_eq!(config[a], Motif::KissingPair { partner: b });
                assert_eq!(config[b], Motif::KissingPair { partner: a });
            }
        }
    }

    #[test]
    fn test_random_pairing_covers_all_matchings() {
        let loops = dummy_loops(4);
        let mut seen = [false; 3];
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairs = pairs_of(&assign_motifs(Topology::RandomPairing, &loops, &mut rng));
            let k = FOUR_LOOP_MATCHINGS.iter().position(|m| m.to_vec() == pairs).unwrap();
            seen[k] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_random_pairing_mismatch_falls_back() {
        let loops = dummy_loops(5);
        let mut rng = StdRng::seed_from_u64(1);
        let config = assign_motifs(Topology::RandomPairing, &loops, &mut rng);
        assert!(config.is_complete());
        assert!(config.iter().all(|m| matches!(m, Motif::Tetraloop { .. })));
    }

    #[test]
    fn test_opposite_pairing() {
        let loops = dummy_loops(4);
        let mut rng = StdRng::seed_from_u64(7);
        let config = assign_motifs(Topology::OppositePairing, &loops, &mut rng);
        assert_eq!(pairs_of(&config), vec![(0, 2), (1, 3)]);

        let loops = dummy_loops(5);
        let config = assign_motifs(Topology::OppositePairing, &loops, &mut rng);
        assert_eq!(pairs_of(&config), vec![(0, 2), (1, 3)]);
        assert!(matches!(config[4], Motif::Tetraloop { .. }));

        let loops = dummy_loops(3);
        let config = assign_motifs(Topology::OppositePairing, &loops, &mut rng);
        assert!(pairs_of(&config).is_empty());
        assert!(config.is_complete());
    }

    #[test]
    fn test_half_pairing() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = assign_motifs(Topology::HalfPairing, &dummy_loops(6), &mut rng);
        assert_eq!(pairs_of(&config), vec![(0, 3), (1, 4), (2, 5)]);

        let config = assign_motifs(Topology::HalfPairing, &dummy_loops(7), &mut rng);
        assert_eq!(pairs_of(&config), vec![(0, 3), (1, 4), (2, 5)]);
        assert!(matches!(config[6], Motif::Tetraloop { .. }));

        let config = assign_motifs(Topology::HalfPairing, &dummy_loops(5), &mut rng);
        assert!(pairs_of(&config).is_empty());
    }

    #[test]
    fn test_tetraloops_only_and_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = assign_motifs(Topology::Tetraloops, &dummy_loops(4), &mut rng);
        assert!(config.iter().all(|m| matches!(m, Motif::Tetraloop { .. })));

        let config = assign_motifs(Topology::Tetraloops, &[], &mut rng);
        assert!(config.is_empty());
        assert!(config.is_complete());
    }

    #[test]
    fn test_seed_reproducibility() {
        let loops = dummy_loops(4);
        for topology in [Topology::RandomPairing, Topology::Tetraloops] {
            let a = assign_motifs(topology, &loops, &mut StdRng::seed_from_u64(42));
            let b = assign_motifs(topology, &loops, &mut StdRng::seed_from_u64(42));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_fixed_branches_draw_nothing() {
        let loops = dummy_loops(4);
        let mut rng = StdRng::seed_from_u64(11);
        let _ = assign_motifs(Topology::OppositePairing, &loops, &mut rng);
        let after: u64 = rng.random();
        let expected: u64 = StdRng::seed_from_u64(11).random();
        assert_eq!(after, expected);
    }
}
