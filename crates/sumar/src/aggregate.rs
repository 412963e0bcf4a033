//! Aggregation orchestrator.
//!
//! Walks a set of run directories, routes every snapshot into a
//! per-source accumulator, writes cumulative reports and per-snapshot
//! tracefiles, then drives the external merge/summary tools over the
//! exported set. One aggregation pass owns all accumulators; nothing
//! is persisted between passes.

use crate::cumulative::CumulativeReport;
use crate::merge::MergedCoverage;
use crate::result::{SumarError, SumarResult};
use crate::snapshot::RawSnapshot;
use crate::source::{SourceKey, SourceResolver};
use crate::tools::{GcovrTool, LcovTool};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File suffix of raw snapshot files
pub const SNAPSHOT_SUFFIX: &str = ".gcov.txt";

/// Name of the per-source and global cumulative report files
pub const CUMULATIVE_FILE: &str = "cumulative.gcov.txt";

/// Name of the persisted textual summary
pub const SUMMARY_FILE: &str = "merged_summary.txt";

/// Configuration for one aggregation pass
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Run directories holding raw snapshot files
    pub results_dirs: Vec<PathBuf>,
    /// Where tracefiles, cumulative reports and the summary are written
    pub output_dir: PathBuf,
    /// Workspace root for source-path normalization and gcovr `--root`
    pub workspace_root: Option<PathBuf>,
    /// Object directory the instrumented build ran in
    pub object_dir: Option<PathBuf>,
    /// Run the lcov merge/summary stage
    pub use_lcov: bool,
    /// Run the gcovr merge/report stage
    pub use_gcovr: bool,
    /// Only aggregate sources with this extension (None = all sources)
    pub source_extension: Option<String>,
}

impl AggregateConfig {
    /// Configuration with defaults: both tool stages on, `.c` sources only
    #[must_use]
    pub fn new(results_dirs: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dirs,
            output_dir: output_dir.into(),
            workspace_root: None,
            object_dir: None,
            use_lcov: true,
            use_gcovr: true,
            source_extension: Some(".c".to_string()),
        }
    }

    /// Set the workspace root
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Set the object directory
    #[must_use]
    pub fn with_object_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.object_dir = Some(dir.into());
        self
    }

    /// Enable or disable the lcov stage
    #[must_use]
    pub const fn with_lcov(mut self, enabled: bool) -> Self {
        self.use_lcov = enabled;
        self
    }

    /// Enable or disable the gcovr stage
    #[must_use]
    pub const fn with_gcovr(mut self, enabled: bool) -> Self {
        self.use_gcovr = enabled;
        self
    }

    /// Set or clear the source-extension filter
    #[must_use]
    pub fn with_source_extension(mut self, extension: Option<String>) -> Self {
        self.source_extension = extension;
        self
    }
}

/// Result of one optional export stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stage disabled by configuration
    NotRequested,
    /// Stage skipped because the external tool is not installed
    Skipped,
    /// Stage ran and succeeded
    Succeeded,
    /// Stage ran and failed (tool diagnostic attached)
    Failed(String),
}

impl StageOutcome {
    /// Whether this stage counts against overall success.
    /// Unavailable-but-optional stages do not.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What one aggregation pass produced
#[derive(Debug)]
pub struct AggregateOutcome {
    /// Snapshots parsed and routed
    pub snapshots: usize,
    /// Snapshot files skipped (unreadable)
    pub skipped_files: usize,
    /// Distinct source files aggregated
    pub sources: usize,
    /// Snapshots whose line count disagreed with their key's template
    pub structural_mismatches: usize,
    /// Per-source cumulative reports that could not be written
    pub failed_reports: usize,
    /// lcov merge/summary stage result
    pub lcov: StageOutcome,
    /// gcovr merge/report stage result
    pub gcovr: StageOutcome,
    /// Line-coverage percentage extracted from the lcov summary
    pub line_coverage_pct: Option<f64>,
    /// Textual summary (also persisted next to the output artifacts)
    pub summary: String,
    /// Path the summary was written to
    pub summary_path: PathBuf,
}

impl AggregateOutcome {
    /// Overall success: every requested-and-available stage succeeded
    #[must_use]
    pub fn success(&self) -> bool {
        !self.lcov.is_failure() && !self.gcovr.is_failure()
    }
}

/// Per-source accumulator: one merged union plus the template snapshot
#[derive(Debug)]
struct SourceAccumulator {
    merged: MergedCoverage,
    template: RawSnapshot,
    runs: usize,
    mismatches: usize,
}

impl SourceAccumulator {
    fn new(first: RawSnapshot) -> Self {
        let mut merged = MergedCoverage::new();
        merged.fold(&first.execution_map());
        Self {
            merged,
            template: first,
            runs: 1,
            mismatches: 0,
        }
    }

    /// Fold one more snapshot; the execution map is discarded after.
    fn fold(&mut self, key: &SourceKey, snapshot: &RawSnapshot) {
        if snapshot.len() != self.template.len() {
            warn!(
                source = %key,
                template_lines = self.template.len(),
                snapshot_lines = snapshot.len(),
                "structural mismatch between snapshots of the same source"
            );
            self.mismatches += 1;
        }
        self.merged.fold(&snapshot.execution_map());
        self.runs += 1;
    }
}

/// Discover run directories under a parent whose names end with the
/// given suffix (e.g. `_coverage`), sorted for determinism.
pub fn discover_coverage_dirs(parent: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(suffix))
        })
        .collect();
    dirs.sort();
    dirs
}

/// Drives one aggregation pass
#[derive(Debug)]
pub struct Aggregator {
    config: AggregateConfig,
    resolver: SourceResolver,
    lcov: LcovTool,
    gcovr: GcovrTool,
}

impl Aggregator {
    /// Build an aggregator, probing external tools once
    #[must_use]
    pub fn new(config: AggregateConfig) -> Self {
        Self::with_tools(config, LcovTool::detect(), GcovrTool::detect())
    }

    /// Build an aggregator with pre-probed tool wrappers
    #[must_use]
    pub fn with_tools(config: AggregateConfig, lcov: LcovTool, gcovr: GcovrTool) -> Self {
        let mut resolver = SourceResolver::new();
        if let Some(dir) = &config.object_dir {
            resolver = resolver.with_object_dir(dir);
        }
        if let Some(root) = &config.workspace_root {
            resolver = resolver.with_workspace_root(root);
        }
        Self {
            config,
            resolver,
            lcov,
            gcovr,
        }
    }

    /// Run the full aggregation pass.
    ///
    /// Fatal only when no snapshot at all is found; everything else
    /// degrades per item or per stage.
    pub fn run(&self) -> SumarResult<AggregateOutcome> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut groups: BTreeMap<SourceKey, SourceAccumulator> = BTreeMap::new();
        let mut info_paths = Vec::new();
        let mut json_paths = Vec::new();
        let mut snapshots = 0usize;
        let mut skipped_files = 0usize;

        for (dir_index, results_dir) in self.config.results_dirs.iter().enumerate() {
            if !results_dir.is_dir() {
                warn!(dir = %results_dir.display(), "results directory missing, skipping");
                continue;
            }
            // Prefix a per-directory index so multiple run dirs with the
            // same basename do not overwrite each other's artifacts.
            let base = artifact_base(dir_index, results_dir);

            let mut snapshot_index = 0usize;
            for path in snapshot_files(results_dir)? {
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "unreadable snapshot, skipping");
                        skipped_files += 1;
                        continue;
                    }
                };

                let snapshot = RawSnapshot::parse(&content);
                let key = self.resolver.resolve(snapshot.source_path());
                if let Some(extension) = &self.config.source_extension {
                    if !key.has_extension(extension) {
                        debug!(source = %key, "filtered by source extension");
                        continue;
                    }
                }

                let map = snapshot.execution_map();
                let stem = format!("{base}_{snapshot_index:05}");
                let info_path = self.config.output_dir.join(format!("{stem}.info"));
                crate::trace::LcovExporter::new(key.as_str(), &map).save(&info_path)?;
                info_paths.push(info_path);
                let json_path = self.config.output_dir.join(format!("{stem}.json"));
                crate::trace::GcovrExporter::new(key.as_str(), &map).save(&json_path)?;
                json_paths.push(json_path);

                match groups.get_mut(&key) {
                    Some(accumulator) => accumulator.fold(&key, &snapshot),
                    None => {
                        groups.insert(key, SourceAccumulator::new(snapshot));
                    }
                }
                snapshots += 1;
                snapshot_index += 1;
            }
        }

        if snapshots == 0 {
            return Err(SumarError::NoSnapshots {
                roots: self.config.results_dirs.clone(),
            });
        }

        let mut summary = String::new();
        let _ = writeln!(
            summary,
            "Aggregated {snapshots} snapshot(s) across {} source file(s)",
            groups.len()
        );

        let failed_reports = self.write_cumulative_reports(&groups, &mut summary)?;

        let (lcov_outcome, line_coverage_pct) =
            self.run_lcov_stage(&info_paths, &mut summary);
        let gcovr_outcome = self.run_gcovr_stage(&json_paths, &mut summary);

        if let Some(pct) = line_coverage_pct {
            let _ = writeln!(summary, "Line coverage: {pct:.1}%");
        }

        let summary_path = self.config.output_dir.join(SUMMARY_FILE);
        std::fs::write(&summary_path, &summary)?;

        let structural_mismatches = groups.values().map(|acc| acc.mismatches).sum();
        Ok(AggregateOutcome {
            snapshots,
            skipped_files,
            sources: groups.len(),
            structural_mismatches,
            failed_reports,
            lcov: lcov_outcome,
            gcovr: gcovr_outcome,
            line_coverage_pct,
            summary,
            summary_path,
        })
    }

    /// Per-source cumulative reports plus the global report (per-source
    /// sections concatenated in key order; unrelated files' line
    /// numbers are never merged together).
    ///
    /// A failure to write one key's report is logged and counted;
    /// remaining keys and the global report are still produced. Returns
    /// the number of failed per-source reports.
    fn write_cumulative_reports(
        &self,
        groups: &BTreeMap<SourceKey, SourceAccumulator>,
        summary: &mut String,
    ) -> SumarResult<usize> {
        let mut global = String::new();
        let mut failed = 0usize;
        // Distinct keys can collapse to the same sanitized directory
        // name (src/cat.c vs src_cat.c); suffix the later ones so
        // neither report overwrites the other.
        let mut used_dirs: BTreeMap<String, usize> = BTreeMap::new();
        for (key, accumulator) in groups {
            let report = CumulativeReport::reconstruct(&accumulator.template, &accumulator.merged);
            let dir_label = match used_dirs.entry(key.dir_name()) {
                std::collections::btree_map::Entry::Vacant(entry) => {
                    let label = entry.key().clone();
                    entry.insert(1);
                    label
                }
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    *entry.get_mut() += 1;
                    format!("{}_{}", entry.key(), entry.get())
                }
            };
            let source_dir = self.config.output_dir.join(&dir_label);
            let written = std::fs::create_dir_all(&source_dir)
                .and_then(|()| std::fs::write(source_dir.join(CUMULATIVE_FILE), report.render()));
            match written {
                Ok(()) => {
                    let _ = writeln!(
                        summary,
                        "  {dir_label}/{CUMULATIVE_FILE} ({} runs)",
                        accumulator.runs
                    );
                }
                Err(e) => {
                    warn!(source = %key, error = %e, "failed to write cumulative report");
                    failed += 1;
                }
            }
            global.push_str(&report.render());
        }
        std::fs::write(self.config.output_dir.join(CUMULATIVE_FILE), global)?;
        Ok(failed)
    }

    fn run_lcov_stage(
        &self,
        info_paths: &[PathBuf],
        summary: &mut String,
    ) -> (StageOutcome, Option<f64>) {
        if !self.config.use_lcov || info_paths.is_empty() {
            return (StageOutcome::NotRequested, None);
        }
        if !self.lcov.status().is_available() {
            let _ = writeln!(summary, "lcov not installed, skipping lcov merge/summary");
            return (StageOutcome::Skipped, None);
        }

        let merged_path = self.config.output_dir.join("merged.info");
        let stage = self
            .lcov
            .merge(info_paths, &merged_path)
            .and_then(|()| self.lcov.summary(&merged_path));
        match stage {
            Ok(text) => {
                let pct = LcovTool::line_coverage_pct(&text);
                let _ = writeln!(summary, "--- lcov merged summary ---");
                summary.push_str(&text);
                (StageOutcome::Succeeded, pct)
            }
            Err(SumarError::ToolMissing { .. }) => {
                let _ = writeln!(summary, "lcov not installed, skipping lcov merge/summary");
                (StageOutcome::Skipped, None)
            }
            Err(e) => {
                warn!(error = %e, "lcov stage failed");
                (StageOutcome::Failed(e.to_string()), None)
            }
        }
    }

    fn run_gcovr_stage(&self, json_paths: &[PathBuf], summary: &mut String) -> StageOutcome {
        if !self.config.use_gcovr || json_paths.is_empty() {
            return StageOutcome::NotRequested;
        }
        if !self.gcovr.status().is_available() {
            let _ = writeln!(summary, "gcovr not installed, skipping gcovr summary");
            return StageOutcome::Skipped;
        }

        match self
            .gcovr
            .merged_report(json_paths, self.config.workspace_root.as_deref())
        {
            Ok(report) => {
                let _ = writeln!(summary, "--- gcovr merged summary ---");
                summary.push_str(&GcovrTool::strip_missing_column(&report));
                summary.push('\n');
                StageOutcome::Succeeded
            }
            Err(SumarError::ToolMissing { .. }) => {
                let _ = writeln!(summary, "gcovr not installed, skipping gcovr summary");
                StageOutcome::Skipped
            }
            Err(e) => {
                warn!(error = %e, "gcovr stage failed");
                StageOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Deterministic artifact name base for one run directory
fn artifact_base(dir_index: usize, dir: &Path) -> String {
    let name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("run");
    format!("{dir_index:04}_{}", name.replace('-', "_"))
}

/// Snapshot files in one run directory, sorted for determinism
fn snapshot_files(dir: &Path) -> SumarResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(SNAPSHOT_SUFFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tools::ToolStatus;
    use std::fs;

    fn snapshot_content(source: &str, counts: &[(u32, &str, &str)]) -> String {
        let mut out = format!("        -:    0:Source:{source}\n");
        for (line, count, text) in counts {
            out.push_str(&format!("{count:>9}: {line:>4}:{text}\n"));
        }
        out
    }

    fn offline_config(results_dirs: Vec<PathBuf>, output_dir: &Path) -> AggregateConfig {
        AggregateConfig::new(results_dirs, output_dir)
            .with_lcov(false)
            .with_gcovr(false)
    }

    fn write_snapshot(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let run_dir = tmp.path().join("empty_run");
        fs::create_dir_all(&run_dir).unwrap();
        let config = offline_config(vec![run_dir], &tmp.path().join("out"));
        let err = Aggregator::new(config).run().unwrap_err();
        assert!(matches!(err, SumarError::NoSnapshots { .. }));
        // fatal path produces no output artifacts
        assert!(!tmp.path().join("out").join(CUMULATIVE_FILE).exists());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("run_a");
        write_snapshot(
            &present,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        let config = offline_config(
            vec![tmp.path().join("absent"), present],
            &tmp.path().join("out"),
        );
        let outcome = Aggregator::new(config).run().unwrap();
        assert_eq!(outcome.snapshots, 1);
        assert!(outcome.success());
    }

    #[test]
    fn test_grouping_across_run_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run1 = tmp.path().join("run1");
        let run2 = tmp.path().join("run2");
        let run3 = tmp.path().join("run3");
        write_snapshot(
            &run1,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();"), (2, "#####", "y();")]),
        );
        write_snapshot(
            &run2,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "#####", "x();"), (2, "4", "y();")]),
        );
        write_snapshot(
            &run3,
            "t0.gcov.txt",
            &snapshot_content("b.c", &[(1, "2", "z();")]),
        );

        let config = offline_config(vec![run1, run2, run3], &out);
        let outcome = Aggregator::new(config).run().unwrap();

        assert_eq!(outcome.snapshots, 3);
        assert_eq!(outcome.sources, 2);
        assert_eq!(outcome.structural_mismatches, 0);

        // exactly two per-source cumulative reports plus the global one
        assert!(out.join("a.c").join(CUMULATIVE_FILE).exists());
        assert!(out.join("b.c").join(CUMULATIVE_FILE).exists());
        let global = fs::read_to_string(out.join(CUMULATIVE_FILE)).unwrap();
        assert!(global.contains("Source:a.c"));
        assert!(global.contains("Source:b.c"));

        // union across runs of a.c: both lines covered
        let a = fs::read_to_string(out.join("a.c").join(CUMULATIVE_FILE)).unwrap();
        assert!(a.contains("        +:    1:x();"));
        assert!(a.contains("        +:    2:y();"));
    }

    #[test]
    fn test_per_snapshot_tracefiles_have_deterministic_names() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("cat-coverage");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        write_snapshot(
            &run,
            "t1.gcov.txt",
            &snapshot_content("a.c", &[(1, "#####", "x();")]),
        );

        let config = offline_config(vec![run], &out);
        Aggregator::new(config).run().unwrap();

        assert!(out.join("0000_cat_coverage_00000.info").exists());
        assert!(out.join("0000_cat_coverage_00000.json").exists());
        assert!(out.join("0000_cat_coverage_00001.info").exists());
        assert!(out.join("0000_cat_coverage_00001.json").exists());
    }

    #[test]
    fn test_extension_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "c.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        write_snapshot(
            &run,
            "h.gcov.txt",
            &snapshot_content("a.h", &[(1, "1", "inline();")]),
        );

        let config = offline_config(vec![run.clone()], &out);
        let outcome = Aggregator::new(config).run().unwrap();
        assert_eq!(outcome.snapshots, 1);

        let all = offline_config(vec![run], &tmp.path().join("out2"))
            .with_source_extension(None);
        let outcome = Aggregator::new(all).run().unwrap();
        assert_eq!(outcome.snapshots, 2);
    }

    #[test]
    fn test_structural_mismatch_is_surfaced_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();"), (2, "1", "y();")]),
        );
        write_snapshot(
            &run,
            "t1.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );

        let config = offline_config(vec![run], &out);
        let outcome = Aggregator::new(config).run().unwrap();
        assert_eq!(outcome.structural_mismatches, 1);
        assert!(outcome.success());

        // first snapshot stays the template: line count preserved
        let report = fs::read_to_string(out.join("a.c").join(CUMULATIVE_FILE)).unwrap();
        assert_eq!(report.lines().count(), 3);
    }

    #[test]
    fn test_missing_tools_degrade_to_partial_success() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );

        let config = AggregateConfig::new(vec![run], &out);
        let aggregator = Aggregator::with_tools(
            config,
            LcovTool::with_status(ToolStatus::Missing),
            GcovrTool::with_status(ToolStatus::Missing),
        );
        let outcome = aggregator.run().unwrap();

        assert_eq!(outcome.lcov, StageOutcome::Skipped);
        assert_eq!(outcome.gcovr, StageOutcome::Skipped);
        assert!(outcome.success());
        assert!(outcome.summary.contains("lcov not installed"));
        // per-snapshot exports and cumulative reports still produced
        assert!(out.join("a.c").join(CUMULATIVE_FILE).exists());
        assert!(out.join(CUMULATIVE_FILE).exists());
        assert!(outcome.summary_path.exists());
    }

    #[test]
    fn test_non_file_entries_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        // a directory whose name matches the suffix is not a snapshot
        fs::create_dir_all(run.join("nested.gcov.txt")).unwrap();
        let config = offline_config(vec![run], &out);
        let outcome = Aggregator::new(config).run().unwrap();
        assert_eq!(outcome.skipped_files, 0);
        assert_eq!(outcome.snapshots, 1);
    }

    #[test]
    fn test_unwritable_source_dir_does_not_abort_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        write_snapshot(
            &run,
            "t1.gcov.txt",
            &snapshot_content("b.c", &[(1, "2", "y();")]),
        );
        // a file where a.c's report directory should go
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("a.c"), "in the way").unwrap();

        let config = offline_config(vec![run], &out);
        let outcome = Aggregator::new(config).run().unwrap();

        assert_eq!(outcome.failed_reports, 1);
        assert!(outcome.success());
        // the other key's report and the global report still land
        assert!(out.join("b.c").join(CUMULATIVE_FILE).exists());
        let global = fs::read_to_string(out.join(CUMULATIVE_FILE)).unwrap();
        assert!(global.contains("Source:a.c"));
        assert!(global.contains("Source:b.c"));
    }

    #[test]
    fn test_colliding_dir_names_do_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        // distinct sources whose sanitized directory names collide
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("src/cat.c", &[(1, "1", "x();")]),
        );
        write_snapshot(
            &run,
            "t1.gcov.txt",
            &snapshot_content("src_cat.c", &[(1, "#####", "y();")]),
        );

        let config = offline_config(vec![run], &out);
        let outcome = Aggregator::new(config).run().unwrap();
        assert_eq!(outcome.sources, 2);
        assert_eq!(outcome.failed_reports, 0);

        let first = fs::read_to_string(out.join("src_cat.c").join(CUMULATIVE_FILE)).unwrap();
        let second = fs::read_to_string(out.join("src_cat.c_2").join(CUMULATIVE_FILE)).unwrap();
        assert!(first.contains("Source:src/cat.c"));
        assert!(second.contains("Source:src_cat.c"));
    }

    #[test]
    fn test_discover_coverage_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("cat_coverage")).unwrap();
        fs::create_dir_all(tmp.path().join("tac_coverage")).unwrap();
        fs::create_dir_all(tmp.path().join("notes")).unwrap();
        fs::write(tmp.path().join("loose_coverage"), "file, not dir").unwrap();

        let dirs = discover_coverage_dirs(tmp.path(), "_coverage");
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["cat_coverage", "tac_coverage"]);
    }

    #[test]
    fn test_summary_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let run = tmp.path().join("run");
        write_snapshot(
            &run,
            "t0.gcov.txt",
            &snapshot_content("a.c", &[(1, "1", "x();")]),
        );
        let config = offline_config(vec![run], &out);
        let outcome = Aggregator::new(config).run().unwrap();
        let persisted = fs::read_to_string(&outcome.summary_path).unwrap();
        assert_eq!(persisted, outcome.summary);
        assert!(persisted.contains("1 snapshot(s)"));
    }
}
