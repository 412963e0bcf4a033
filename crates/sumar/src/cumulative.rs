//! Cumulative report reconstruction.
//!
//! Rewrites a full line-by-line report using one run as the structural
//! template and the merged union as the coverage decision per line. The
//! template is the first snapshot observed for a source key; any two
//! snapshots of the same source must share line structure for the merge
//! to be meaningful, so "first seen" is an explicit tie-break rather
//! than a quality judgement.
//!
//! Rendered layout matches the snapshot grammar, with `+` marking lines
//! covered by any run:
//!
//! ```text
//!         +:    2:int main(void) {
//!     #####:    3:  return 1;
//!         -:    4:}
//! ```

use crate::merge::MergedCoverage;
use crate::result::SumarResult;
use crate::snapshot::RawSnapshot;
use std::path::Path;

/// Recomputed per-line classification in a cumulative report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CumulativeMarker {
    /// Never seen executable in any run
    NonExecutable,
    /// Executed by at least one run
    Covered,
    /// Executable in some run but never executed
    NeverCovered,
}

/// One line of a cumulative report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeLine {
    /// Recomputed marker
    pub marker: CumulativeMarker,
    /// Line number from the template
    pub line_number: u32,
    /// Verbatim tail from the template
    pub raw_tail: String,
}

/// Union-of-all-runs view of one source file, in template line order
#[derive(Debug, Clone)]
pub struct CumulativeReport {
    lines: Vec<CumulativeLine>,
}

impl CumulativeReport {
    /// Rebuild the template's lines with markers recomputed from the
    /// merged coverage.
    ///
    /// Output line count always equals the template line count; order
    /// and `raw_tail` come from the template untouched.
    #[must_use]
    pub fn reconstruct(template: &RawSnapshot, merged: &MergedCoverage) -> Self {
        let lines = template
            .lines()
            .iter()
            .map(|record| {
                let marker = if !merged.is_executable(record.line_number) {
                    CumulativeMarker::NonExecutable
                } else if merged.is_covered(record.line_number) {
                    CumulativeMarker::Covered
                } else {
                    CumulativeMarker::NeverCovered
                };
                CumulativeLine {
                    marker,
                    line_number: record.line_number,
                    raw_tail: record.raw_tail.clone(),
                }
            })
            .collect();
        Self { lines }
    }

    /// Lines in template order
    #[must_use]
    pub fn lines(&self) -> &[CumulativeLine] {
        &self.lines
    }

    /// Output line count (equals the template line count)
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the report holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render in the snapshot grammar
    #[must_use]
    pub fn render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for line in &self.lines {
            let prefix = match line.marker {
                CumulativeMarker::NonExecutable => "        -",
                CumulativeMarker::Covered => "        +",
                CumulativeMarker::NeverCovered => "    #####",
            };
            let _ = writeln!(out, "{prefix}: {:>4}:{}", line.line_number, line.raw_tail);
        }
        out
    }

    /// Write the rendered report to a file
    pub fn save(&self, path: &Path) -> SumarResult<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}
