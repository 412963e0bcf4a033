//! Per-run coverage snapshot parsing.
//!
//! A snapshot is one gcov-style text report produced by running an
//! instrumented binary against a single test input. Each physical line
//! carries a count field, a source line number and the original source
//! text:
//!
//! ```text
//!         -:    0:Source:../src/cat.c
//!         1:   12:int main(void)
//!     #####:   14:  return usage();
//! ```
//!
//! Parsing degrades per line: anything that does not match the grammar
//! is kept as an opaque passthrough record so the total record count
//! and relative order are never affected.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Derived view of a snapshot: executable line number -> execution count.
///
/// Non-executable lines are absent; a never-executed line maps to 0.
pub type ExecutionMap = BTreeMap<u32, u64>;

/// Per-line classification as recorded by the instrumentation format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageMarker {
    /// Line is not executable (`-` in the count field)
    NonExecutable,
    /// Line is executable but was never executed (`#####`)
    Uncovered,
    /// Line was executed the given number of times
    Count(u64),
}

/// One parsed report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Coverage marker from the count field
    pub marker: CoverageMarker,
    /// Source line number; 0 for metadata rows and passthrough records
    pub line_number: u32,
    /// Everything after the `line_number:` prefix, preserved verbatim.
    /// For passthrough records this is the entire original line.
    pub raw_tail: String,
}

impl LineRecord {
    /// Passthrough record for a physical line that did not match the grammar
    fn passthrough(line: &str) -> Self {
        Self {
            marker: CoverageMarker::NonExecutable,
            line_number: 0,
            raw_tail: line.to_string(),
        }
    }
}

/// One per-run coverage report, immutable once parsed
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    source: Option<String>,
    lines: Vec<LineRecord>,
}

fn record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([-0-9#]+)\s*:\s*(\d+):(.*)$").expect("valid line regex"))
}

impl RawSnapshot {
    /// Parse the raw text of one snapshot.
    ///
    /// Never fails: malformed lines become passthrough records with the
    /// sentinel line number 0.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let re = record_re();
        let mut source = None;
        let mut lines = Vec::new();

        for raw in content.lines() {
            let Some(caps) = re.captures(raw) else {
                lines.push(LineRecord::passthrough(raw));
                continue;
            };
            let count_field = &caps[1];
            let Ok(line_number) = caps[2].parse::<u32>() else {
                lines.push(LineRecord::passthrough(raw));
                continue;
            };
            let raw_tail = caps[3].to_string();

            if source.is_none() && line_number == 0 {
                if let Some(path) = raw_tail.strip_prefix("Source:") {
                    source = Some(path.trim().to_string());
                }
            }

            lines.push(LineRecord {
                marker: parse_marker(count_field),
                line_number,
                raw_tail,
            });
        }

        Self { source, lines }
    }

    /// Source path embedded in the snapshot's `Source:` metadata row
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Parsed records in snapshot order
    #[must_use]
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// Total record count (parsed plus passthrough)
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the snapshot holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Derive the execution-count map for executable lines.
    ///
    /// `Uncovered` maps to 0, `Count(n)` to n; non-executable lines and
    /// metadata/passthrough rows (line 0) are absent.
    #[must_use]
    pub fn execution_map(&self) -> ExecutionMap {
        let mut map = ExecutionMap::new();
        for record in &self.lines {
            if record.line_number == 0 {
                continue;
            }
            match record.marker {
                CoverageMarker::NonExecutable => {}
                CoverageMarker::Uncovered => {
                    map.insert(record.line_number, 0);
                }
                CoverageMarker::Count(n) => {
                    map.insert(record.line_number, n);
                }
            }
        }
        map
    }
}

fn parse_marker(count_field: &str) -> CoverageMarker {
    if count_field == "-" {
        return CoverageMarker::NonExecutable;
    }
    if count_field.bytes().all(|b| b == b'#') {
        return CoverageMarker::Uncovered;
    }
    // Mixed fields that survive the character class but are not a
    // plain integer are treated as executed-zero-times, matching gcov's
    // own "unexpected marker" handling.
    count_field
        .parse::<u64>()
        .map_or(CoverageMarker::Uncovered, CoverageMarker::Count)
}
