//! Sumador binary entry point

use clap::Parser;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use sumador::commands::{AggregateArgs, Cli, Commands, ExportArgs};
use sumador::config::{CliConfig, Verbosity};
use sumador::error::{CliError, CliResult};
use sumador::output;
use sumar::{
    discover_coverage_dirs, AggregateConfig, Aggregator, GcovrExporter, LcovExporter, RawSnapshot,
    SourceResolver,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };
    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.clone().into())
}

fn init_tracing(verbosity: Verbosity) {
    let default_directive = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
        Verbosity::Debug => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli, config: &CliConfig) -> CliResult<()> {
    match cli.command {
        Commands::Aggregate(args) => run_aggregate(&args, config),
        Commands::Export(args) => run_export(&args, config),
    }
}

fn run_aggregate(args: &AggregateArgs, config: &CliConfig) -> CliResult<()> {
    let results_dirs = if args.results_dirs.is_empty() {
        discover_coverage_dirs(&args.result_dir, &args.dir_suffix)
    } else {
        args.results_dirs.clone()
    };
    if results_dirs.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no '*{}' directories found under {}",
            args.dir_suffix,
            args.result_dir.display()
        )));
    }

    let extension = if args.all_sources {
        None
    } else {
        Some(args.extension.clone())
    };
    let mut agg_config = AggregateConfig::new(results_dirs, &args.output_dir)
        .with_lcov(!args.no_lcov)
        .with_gcovr(!args.no_gcovr)
        .with_source_extension(extension);
    if let Some(root) = &args.workspace_root {
        agg_config = agg_config.with_workspace_root(root);
    }
    if let Some(dir) = &args.object_dir {
        agg_config = agg_config.with_object_dir(dir);
    }

    let outcome = Aggregator::new(agg_config).run()?;

    output::print_summary(config, &outcome.summary);
    output::print_summary(config, &output::render_outcome(&outcome));

    if outcome.success() {
        Ok(())
    } else {
        Err(CliError::aggregation(
            "one or more merge stages failed; see output above",
        ))
    }
}

fn run_export(args: &ExportArgs, config: &CliConfig) -> CliResult<()> {
    let content = fs::read_to_string(&args.snapshot)?;
    let snapshot = RawSnapshot::parse(&content);

    let mut resolver = SourceResolver::new();
    if let Some(root) = &args.workspace_root {
        resolver = resolver.with_workspace_root(root);
    }
    if let Some(dir) = &args.object_dir {
        resolver = resolver.with_object_dir(dir);
    }
    let source = resolver.resolve(snapshot.source_path());
    let map = snapshot.execution_map();

    fs::create_dir_all(&args.output_dir)?;
    let stem = snapshot_stem(&args.snapshot);
    let info_path = args.output_dir.join(format!("{stem}.info"));
    let json_path = args.output_dir.join(format!("{stem}.json"));

    LcovExporter::new(source.as_str(), &map).save(&info_path)?;
    GcovrExporter::new(source.as_str(), &map).save(&json_path)?;

    output::print_summary(
        config,
        &format!(
            "Exported {} lines for {} to {} and {}\n",
            map.len(),
            source.as_str(),
            info_path.display(),
            json_path.display()
        ),
    );
    Ok(())
}

/// File stem with the full `.gcov.txt` suffix removed, not just `.txt`
fn snapshot_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map_or_else(|| "snapshot".to_string(), |n| n.to_string_lossy().into_owned());
    name.strip_suffix(sumar::SNAPSHOT_SUFFIX)
        .map_or(name.clone(), ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_snapshot_stem_strips_full_suffix() {
        assert_eq!(snapshot_stem(&PathBuf::from("dir/t0042.gcov.txt")), "t0042");
    }

    #[test]
    fn test_snapshot_stem_keeps_other_names() {
        assert_eq!(snapshot_stem(&PathBuf::from("trace.info")), "trace.info");
    }

    #[test]
    fn test_build_config_quiet_wins() {
        let cli = Cli::try_parse_from(["sumador", "-q", "-vv", "aggregate"]).unwrap();
        let config = build_config(&cli);
        assert!(config.verbosity.is_quiet());
    }

    #[test]
    fn test_build_config_verbose_levels() {
        let cli = Cli::try_parse_from(["sumador", "-v", "aggregate"]).unwrap();
        assert_eq!(build_config(&cli).verbosity, Verbosity::Verbose);
        let cli = Cli::try_parse_from(["sumador", "-vvv", "aggregate"]).unwrap();
        assert_eq!(build_config(&cli).verbosity, Verbosity::Debug);
    }
}
