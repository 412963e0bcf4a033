//! gcovr JSON tracefile exporter (format_version 0.14).
//!
//! Emits the versioned, nested record gcovr's `--add-tracefile`
//! consumes: a schema-version tag and one file entry with a `lines`
//! array in ascending line-number order.
//!
//! Line coverage is the supported precision: `function_name` is the
//! empty-string placeholder, `branches` and `functions` stay empty.
//! That granularity is intentionally unpopulated, not lost — the
//! snapshot grammar carries no function or branch records.

use crate::result::SumarResult;
use crate::snapshot::ExecutionMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version tag emitted in every tracefile
pub const FORMAT_VERSION: &str = "0.14";

/// Top-level gcovr tracefile record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GcovrTracefile {
    /// Schema version (`gcovr/format_version`)
    #[serde(rename = "gcovr/format_version")]
    pub format_version: String,
    /// One entry per source file
    pub files: Vec<GcovrFile>,
}

/// Per-file entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GcovrFile {
    /// Workspace-relative source path
    pub file: String,
    /// Executable-line records, ascending by line number
    pub lines: Vec<GcovrLine>,
    /// Always empty: function granularity is not populated
    pub functions: Vec<serde_json::Value>,
}

/// Per-line entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GcovrLine {
    /// Source line number
    pub line_number: u32,
    /// Always the empty string: function attribution is not populated
    pub function_name: String,
    /// Execution count across the run
    pub count: u64,
    /// Always empty: branch granularity is not populated
    pub branches: Vec<serde_json::Value>,
}

impl GcovrFile {
    /// Recompute the execution map this entry encodes
    #[must_use]
    pub fn execution_map(&self) -> ExecutionMap {
        self.lines
            .iter()
            .map(|line| (line.line_number, line.count))
            .collect()
    }
}

/// gcovr tracefile generator for one snapshot's execution map
#[derive(Debug)]
pub struct GcovrExporter<'a> {
    source: &'a str,
    map: &'a ExecutionMap,
}

impl<'a> GcovrExporter<'a> {
    /// Create an exporter for one source file and its execution map
    #[must_use]
    pub fn new(source: &'a str, map: &'a ExecutionMap) -> Self {
        Self { source, map }
    }

    /// Build the structured tracefile record
    #[must_use]
    pub fn tracefile(&self) -> GcovrTracefile {
        let lines = self
            .map
            .iter()
            .map(|(&line_number, &count)| GcovrLine {
                line_number,
                function_name: String::new(),
                count,
                branches: Vec::new(),
            })
            .collect();
        GcovrTracefile {
            format_version: FORMAT_VERSION.to_string(),
            files: vec![GcovrFile {
                file: self.source.to_string(),
                lines,
                functions: Vec::new(),
            }],
        }
    }

    /// Generate the tracefile as a JSON string
    pub fn generate(&self) -> SumarResult<String> {
        Ok(serde_json::to_string(&self.tracefile())?)
    }

    /// Save the tracefile
    pub fn save(&self, path: &Path) -> SumarResult<()> {
        std::fs::write(path, self.generate()?)?;
        Ok(())
    }
}

/// Parse gcovr JSON tracefile content
pub fn parse_tracefile(content: &str) -> SumarResult<GcovrTracefile> {
    Ok(serde_json::from_str(content)?)
}
