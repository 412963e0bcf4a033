//! Tracefile exporters.
//!
//! Two independent, stateless projections of one snapshot's execution
//! map into the interchange formats downstream coverage tooling
//! consumes: the lcov `.info` line grammar and the gcovr JSON
//! tracefile. Both are byte-exact and round-trip-stable: re-parsing an
//! emitted artifact reproduces the execution map that produced it.

pub mod gcovr;
pub mod lcov;

pub use gcovr::{GcovrExporter, GcovrFile, GcovrLine, GcovrTracefile};
pub use lcov::LcovExporter;
