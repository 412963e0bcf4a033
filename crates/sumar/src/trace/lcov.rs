//! lcov `.info` tracefile exporter.
//!
//! ## Format
//!
//! ```text
//! SF:<source file>
//! DA:<line>,<execution count>
//! end_of_record
//! ```
//!
//! One record block per snapshot, `DA` lines in ascending line-number
//! order. Downstream consumers (`lcov -a`) parse this positionally, so
//! field order, the comma delimiter and the literal `end_of_record`
//! token are fixed.

use crate::result::SumarResult;
use crate::snapshot::ExecutionMap;
use std::path::Path;

/// lcov tracefile generator for one snapshot's execution map
#[derive(Debug)]
pub struct LcovExporter<'a> {
    source: &'a str,
    map: &'a ExecutionMap,
}

impl<'a> LcovExporter<'a> {
    /// Create an exporter for one source file and its execution map
    #[must_use]
    pub fn new(source: &'a str, map: &'a ExecutionMap) -> Self {
        Self { source, map }
    }

    /// Generate the tracefile content as a string
    #[must_use]
    pub fn generate(&self) -> String {
        use std::fmt::Write;

        let mut output = String::new();
        let _ = writeln!(output, "SF:{}", self.source);
        for (line, count) in self.map {
            let _ = writeln!(output, "DA:{line},{count}");
        }
        output.push_str("end_of_record\n");
        output
    }

    /// Save the tracefile
    pub fn save(&self, path: &Path) -> SumarResult<()> {
        std::fs::write(path, self.generate())?;
        Ok(())
    }
}

/// Parse lcov `.info` content back into per-source execution maps.
///
/// Returns one `(source, map)` pair per `SF:`..`end_of_record` block,
/// in file order. Unknown directives are ignored.
#[must_use]
pub fn parse_info(content: &str) -> Vec<(String, ExecutionMap)> {
    let mut records = Vec::new();
    let mut current: Option<(String, ExecutionMap)> = None;

    for line in content.lines() {
        if let Some(source) = line.strip_prefix("SF:") {
            current = Some((source.to_string(), ExecutionMap::new()));
        } else if let Some(data) = line.strip_prefix("DA:") {
            let Some((line_number, count)) = data.split_once(',') else {
                continue;
            };
            if let (Ok(line_number), Ok(count)) =
                (line_number.parse::<u32>(), count.parse::<u64>())
            {
                if let Some((_, map)) = current.as_mut() {
                    map.insert(line_number, count);
                }
            }
        } else if line == "end_of_record" {
            if let Some(record) = current.take() {
                records.push(record);
            }
        }
    }

    records
}
