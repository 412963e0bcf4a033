//! Sumar: coverage snapshot aggregation.
//!
//! Merges an unbounded number of per-run gcov text coverage snapshots
//! (one report per test-input execution) into a consolidated,
//! per-source-file view of which lines have ever been executed, and
//! re-exports that view as lcov `.info` and gcovr JSON tracefiles for
//! downstream tooling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SUMAR AGGREGATION PIPELINE                                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  snapshots → Parser + Resolver → per-source Merger           │
//! │                   ↓                      ↓                   │
//! │        lcov/gcovr Exporters     Cumulative Reconstructor     │
//! │                   ↓                      ↓                   │
//! │         external lcov/gcovr      cumulative.gcov.txt         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The merge is a pure, monotonic set union: commutative, associative
//! and idempotent over any number of runs. Aggregation is a batch,
//! single-threaded pass; running the instrumented binary and producing
//! the raw snapshots is an external concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod cumulative;
pub mod merge;
pub mod result;
pub mod snapshot;
pub mod source;
pub mod tools;
pub mod trace;

pub use aggregate::{
    discover_coverage_dirs, AggregateConfig, AggregateOutcome, Aggregator, StageOutcome,
    CUMULATIVE_FILE, SNAPSHOT_SUFFIX, SUMMARY_FILE,
};
pub use cumulative::{CumulativeLine, CumulativeMarker, CumulativeReport};
pub use merge::MergedCoverage;
pub use result::{SumarError, SumarResult};
pub use snapshot::{CoverageMarker, ExecutionMap, LineRecord, RawSnapshot};
pub use source::{SourceKey, SourceResolver};
pub use tools::{GcovrTool, LcovTool, ToolStatus};
pub use trace::{GcovrExporter, GcovrFile, GcovrLine, GcovrTracefile, LcovExporter};
