//! Sumador: command-line front end for the Sumar coverage aggregator.
//!
//! Wires argument parsing, tracing setup and terminal output around the
//! [`sumar`] library. The binary entry point lives in `main.rs`; this
//! crate exposes the pieces so the smoke tests can exercise them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use commands::{AggregateArgs, Cli, Commands, ExportArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
