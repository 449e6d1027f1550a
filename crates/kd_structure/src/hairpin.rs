//! Hairpin loop detection.
//!
//! A hairpin loop is a maximal run of unpaired positions that is immediately
//! preceded by `(` and immediately followed by `)`. Other unpaired runs
//! (bulges, junctions, dangling ends) are not reported.

use std::fmt;
use std::ops::RangeInclusive;

use crate::DotBracket;
use crate::DotBracketVec;
use crate::PairTable;
use crate::StructureError;

/// Closed interval `[start, end]` of a hairpin loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HairpinLoop {
    start: usize,
    end: usize,
}

impl HairpinLoop {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        HairpinLoop { start, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of unpaired positions in the loop.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Never true, loops contain at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl From<(usize, usize)> for HairpinLoop {
    fn from((start, end): (usize, usize)) -> Self {
        HairpinLoop::new(start, end)
    }
}

impl fmt::Display for HairpinLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.start, self.end)
    }
}

/// Scan a symbol vector left to right and report all hairpin loops.
///
/// The scan does not look at bracket balance: a stray `)` or a dangling `(`
/// only matters if it borders an unpaired run. Use [`hairpin_loops`] to
/// reject unbalanced structures first.
pub fn find_hairpin_loops(dbv: &DotBracketVec) -> Vec<HairpinLoop> {
    let n = dbv.len();
    let mut loops = Vec::new();
    let mut i = 0;
    while i < n {
        if dbv[i] != DotBracket::Unpaired {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < n && dbv[j] == DotBracket::Unpaired {
            j += 1;
        }
        // [i, j) is a maximal unpaired run.
        if i > 0 && j < n && dbv[i - 1] == DotBracket::Open && dbv[j] == DotBracket::Close {
            loops.push(HairpinLoop::new(i, j - 1));
        }
        i = j;
    }
    loops
}

/// Validate a dot-bracket string and return its hairpin loops.
pub fn hairpin_loops(structure: &str) -> Result<Vec<HairpinLoop>, StructureError> {
    let dbv = DotBracketVec::try_from(structure)?;
    PairTable::try_from(&dbv)?;
    Ok(find_hairpin_loops(&dbv))
}
