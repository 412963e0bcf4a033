//! Monotonic union of per-run execution maps.
//!
//! Folding is a pure set union: a line seen executable stays
//! executable, a line covered once stays covered. There is no
//! weighting and no "most recent wins", which makes the fold
//! commutative, associative and idempotent over any number of runs.

use crate::snapshot::ExecutionMap;
use std::collections::BTreeSet;

/// Union coverage for one source file across any number of runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCoverage {
    executable: BTreeSet<u32>,
    covered: BTreeSet<u32>,
}

impl MergedCoverage {
    /// Empty coverage (the fold identity)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one run's execution map into the union.
    ///
    /// Every line in the map joins the executable set; lines with a
    /// positive count also join the covered set. The map can be
    /// discarded after folding.
    pub fn fold(&mut self, map: &ExecutionMap) {
        for (&line, &count) in map {
            self.executable.insert(line);
            if count > 0 {
                self.covered.insert(line);
            }
        }
    }

    /// Fold an arbitrary sequence of execution maps
    #[must_use]
    pub fn from_maps<'a, I>(maps: I) -> Self
    where
        I: IntoIterator<Item = &'a ExecutionMap>,
    {
        let mut merged = Self::new();
        for map in maps {
            merged.fold(map);
        }
        merged
    }

    /// Lines seen executable in any run, ascending
    #[must_use]
    pub fn executable_lines(&self) -> &BTreeSet<u32> {
        &self.executable
    }

    /// Lines executed at least once in any run, ascending
    #[must_use]
    pub fn covered_lines(&self) -> &BTreeSet<u32> {
        &self.covered
    }

    /// Whether the line was ever seen executable
    #[must_use]
    pub fn is_executable(&self, line: u32) -> bool {
        self.executable.contains(&line)
    }

    /// Whether the line was ever executed
    #[must_use]
    pub fn is_covered(&self, line: u32) -> bool {
        self.covered.contains(&line)
    }

    /// Number of executable lines
    #[must_use]
    pub fn executable_count(&self) -> usize {
        self.executable.len()
    }

    /// Number of covered lines
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.covered.len()
    }

    /// Whether no run contributed any executable line
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executable.is_empty()
    }
}
