//! Outcome rendering for the terminal

use crate::config::CliConfig;
use sumar::{AggregateOutcome, StageOutcome};

/// Render an aggregation outcome as human-readable status lines
#[must_use]
pub fn render_outcome(outcome: &AggregateOutcome) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Snapshots: {} ({} skipped), sources: {}",
        outcome.snapshots, outcome.skipped_files, outcome.sources
    );
    if outcome.structural_mismatches > 0 {
        let _ = writeln!(
            out,
            "Warning: {} snapshot(s) disagreed with their template's line count",
            outcome.structural_mismatches
        );
    }
    if outcome.failed_reports > 0 {
        let _ = writeln!(
            out,
            "Warning: {} cumulative report(s) could not be written",
            outcome.failed_reports
        );
    }
    let _ = writeln!(out, "lcov stage: {}", stage_label(&outcome.lcov));
    let _ = writeln!(out, "gcovr stage: {}", stage_label(&outcome.gcovr));
    if let Some(pct) = outcome.line_coverage_pct {
        let _ = writeln!(out, "Line coverage: {pct:.1}%");
    }
    let _ = writeln!(
        out,
        "Merged summary saved to: {}",
        outcome.summary_path.display()
    );
    out
}

fn stage_label(stage: &StageOutcome) -> String {
    match stage {
        StageOutcome::NotRequested => "not requested".to_string(),
        StageOutcome::Skipped => "skipped (tool not installed)".to_string(),
        StageOutcome::Succeeded => "ok".to_string(),
        StageOutcome::Failed(message) => format!("failed ({message})"),
    }
}

/// Print the textual summary unless quiet
pub fn print_summary(config: &CliConfig, summary: &str) {
    if !config.verbosity.is_quiet() {
        print!("{summary}");
    }
}
