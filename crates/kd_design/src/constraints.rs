//! Motif assignment -> per-position base constraints.
//!
//! Tetraloops are written first, kissing pairs second. Each unordered
//! kissing pair is processed exactly once.

use std::fmt;
use std::ops::Index;
use ahash::AHashSet;
use nohash_hasher::IntMap;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use kd_structure::HairpinLoop;

use crate::Base;
use crate::ConstraintError;
use crate::Motif;
use crate::MotifAssignment;
use crate::TetraloopKind;
use crate::NUCS;

/// What to do when two motifs constrain the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Later writes replace earlier ones.
    #[default]
    Overwrite,
    /// Fail with `ConstraintError::Conflict`.
    Reject,
}

/// Allowed bases per constrained position. Unlisted positions are free.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintTable {
    length: usize,
    allowed: IntMap<usize, Vec<Base>>,
}

impl ConstraintTable {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            allowed: IntMap::default(),
        }
    }

    /// Length of the sequence the table applies to.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of constrained positions.
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&[Base]> {
        self.allowed.get(&pos).map(|v| v.as_slice())
    }

    pub fn is_constrained(&self, pos: usize) -> bool {
        self.allowed.contains_key(&pos)
    }

    /// Replace the allowed set at `pos`; returns true if `pos` was already set.
    pub fn insert(&mut self, pos: usize, bases: &[Base]) -> bool {
        debug_assert!(pos < self.length);
        debug_assert!(!bases.is_empty());
        self.allowed.insert(pos, bases.to_vec()).is_some()
    }

    /// All constraints sorted by position (for deterministic inspection).
    pub fn to_vec(&self) -> Vec<(usize, Vec<Base>)> {
        let mut v: Vec<_> = self.allowed.iter().map(|(&p, b)| (p, b.clone())).collect();
        v.sort_unstable_by_key(|(p, _)| *p);
        v
    }
}

impl fmt::Display for ConstraintTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in 0..self.length {
            match self.get(pos) {
                None => write!(f, "N")?,
                Some([b]) => write!(f, "{}", b)?,
                Some([Base::A, Base::G]) | Some([Base::G, Base::A]) => write!(f, "R")?,
                Some(_) => write!(f, "n")?,
            }
        }
        Ok(())
    }
}

/// Motif label per position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation(Vec<Option<String>>);

impl Annotation {
    pub fn new(length: usize) -> Self {
        Annotation(vec![None; length])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.0.iter().map(|l| l.as_deref())
    }

    /// Maximal runs of equal labels as `(start, end, label)`, `end` inclusive.
    pub fn segments(&self) -> Vec<(usize, usize, &str)> {
        let mut runs: Vec<(usize, usize, &str)> = Vec::new();
        for (pos, label) in self.iter().enumerate() {
            let Some(label) = label else { continue };
            match runs.last_mut() {
                Some((_, end, last)) if *end + 1 == pos && *last == label => *end = pos,
                _ => runs.push((pos, pos, label)),
            }
        }
        runs
    }

    fn set(&mut self, pos: usize, label: &str) {
        self.0[pos] = Some(label.to_string());
    }
}

impl Index<usize> for Annotation {
    type Output = Option<String>;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}

/// Bases of the kissing partner loop: the complement of `seq1`, reversed.
pub fn kissing_partner_bases(seq1: &[Base]) -> Vec<Base> {
    seq1.iter().rev().map(|b| b.complement()).collect()
}

struct Writer {
    table: ConstraintTable,
    annotation: Annotation,
    policy: ConflictPolicy,
}

impl Writer {
    fn write(&mut self, pos: usize, bases: &[Base], label: &str) -> Result<(), ConstraintError> {
        if self.policy == ConflictPolicy::Reject && self.table.is_constrained(pos) {
            return Err(ConstraintError::Conflict {
                position: pos,
                first: self.annotation[pos].clone().unwrap_or_default(),
                second: label.to_string(),
            });
        }
        if self.table.insert(pos, bases) {
            log::trace!("Constraint at {} overwritten by {}.", pos, label);
        }
        self.annotation.set(pos, label);
        Ok(())
    }
}

fn tetraloop_pattern(kind: TetraloopKind) -> [&'static [Base]; 4] {
    match kind {
        TetraloopKind::Gnra => [&[Base::G], &NUCS, &[Base::A, Base::G], &[Base::A]],
        TetraloopKind::Uucg => [&[Base::U], &[Base::U], &[Base::C], &[Base::G]],
    }
}

/// Compile a motif assignment into a constraint table and an annotation.
///
/// Tetraloops on loops shorter than four positions are skipped. Each kissing
/// pair draws `L = min(len_i, len_j)` bases from `rng` for loop `i`; loop `j`
/// receives their reverse complement.
pub fn compile<R: Rng + ?Sized>(
    length: usize,
    loops: &[HairpinLoop],
    motifs: &MotifAssignment,
    policy: ConflictPolicy,
    rng: &mut R,
) -> Result<(ConstraintTable, Annotation), ConstraintError> {
    debug_assert_eq!(loops.len(), motifs.len());
    for hl in loops {
        if hl.end() >= length {
            return Err(ConstraintError::LoopOutOfRange {
                start: hl.start(),
                end: hl.end(),
                length,
            });
        }
    }

    let mut w = Writer {
        table: ConstraintTable::new(length),
        annotation: Annotation::new(length),
        policy,
    };

    for (idx, hl) in loops.iter().enumerate() {
        let Motif::Tetraloop { kind } = motifs[idx] else {
            continue;
        };
        if hl.len() < 4 {
            log::debug!("Loop {} too short for {}, skipped.", idx, kind);
            continue;
        }
        for (k, bases) in tetraloop_pattern(kind).into_iter().enumerate() {
            w.write(hl.start() + k, bases, kind.label())?;
        }
    }

    let mut done_pairs: AHashSet<(usize, usize)> = AHashSet::default();
    for (idx, hl) in loops.iter().enumerate() {
        let Motif::KissingPair { partner } = motifs[idx] else {
            continue;
        };
        let Some(other) = loops.get(partner) else {
            return Err(ConstraintError::UnknownPartner { loop_idx: idx, partner });
        };
        if !done_pairs.insert((idx.min(partner), idx.max(partner))) {
            continue;
        }

        let l = hl.len().min(other.len());
        let seq1: Vec<Base> = (0..l)
            .map(|_| NUCS[rng.random_range(0..NUCS.len())])
            .collect();
        let seq2 = kissing_partner_bases(&seq1);

        let label1 = format!("KL_{}_{}", idx, partner);
        let label2 = format!("KL_{}_{}", partner, idx);
        for k in 0..l {
            w.write(hl.start() + k, &[seq1[k]], &label1)?;
            w.write(other.start() + k, &[seq2[k]], &label2)?;
        }
    }

    Ok((w.table, w.annotation))
}
