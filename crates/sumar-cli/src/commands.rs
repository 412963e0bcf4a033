//! CLI command definitions using clap

use crate::config::ColorChoice;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sumador: merge gcov coverage snapshots and export lcov/gcovr tracefiles
#[derive(Parser, Debug)]
#[command(name = "sumador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate coverage snapshots across run directories
    Aggregate(AggregateArgs),

    /// Export one snapshot as lcov and gcovr tracefiles
    Export(ExportArgs),
}

/// Arguments for the aggregate command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct AggregateArgs {
    /// Directories containing .gcov.txt snapshots
    /// (default: auto-discover under --result-dir)
    pub results_dirs: Vec<PathBuf>,

    /// Parent directory to search for coverage run directories
    #[arg(long, default_value = ".")]
    pub result_dir: PathBuf,

    /// Suffix run-directory names must carry for auto-discovery
    #[arg(long, default_value = "_coverage")]
    pub dir_suffix: String,

    /// Where to write tracefiles and merged output
    #[arg(short, long, default_value = "merged-coverage")]
    pub output_dir: PathBuf,

    /// Workspace root for source-path normalization and gcovr --root
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,

    /// Object directory the instrumented build ran in
    #[arg(long)]
    pub object_dir: Option<PathBuf>,

    /// Skip lcov merge/summary (only use gcovr)
    #[arg(long)]
    pub no_lcov: bool,

    /// Skip gcovr merge/summary (only use lcov)
    #[arg(long)]
    pub no_gcovr: bool,

    /// Only aggregate sources with this extension
    #[arg(long, default_value = ".c")]
    pub extension: String,

    /// Aggregate every source regardless of extension
    #[arg(long)]
    pub all_sources: bool,
}

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Snapshot file to convert
    pub snapshot: PathBuf,

    /// Where to write the .info and .json tracefiles
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Workspace root for source-path normalization
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,

    /// Object directory the instrumented build ran in
    #[arg(long)]
    pub object_dir: Option<PathBuf>,
}

/// Color argument for clap
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Force colors on
    Always,
    /// Force colors off
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
