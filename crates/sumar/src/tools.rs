//! External collaborator tools (`lcov`, `gcovr`).
//!
//! Availability is probed once per aggregation pass, producing a typed
//! [`ToolStatus`] that downstream stages branch on explicitly — a
//! missing binary is a skipped stage, never a failed one. Invocations
//! are synchronous and wrapped with an explicit deadline.

use crate::result::{SumarError, SumarResult};
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MERGE_TIMEOUT: Duration = Duration::from_secs(60);
const SUMMARY_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether an external tool binary can be invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Binary found and runnable
    Available,
    /// Binary not installed
    Missing,
}

impl ToolStatus {
    /// Probe a tool by spawning `<program> --version` with a short
    /// deadline; a wedged binary must not stall the whole pass.
    #[must_use]
    pub fn probe(program: &str) -> Self {
        match run_with_timeout(program, &["--version".to_string()], PROBE_TIMEOUT) {
            Ok(_) => Self::Available,
            Err(SumarError::ToolMissing { .. }) => Self::Missing,
            // A binary that cannot even answer --version in time would
            // hang the real invocation too; treat it as absent.
            Err(SumarError::ToolTimeout { .. }) => Self::Missing,
            // Spawn failed for some other reason; let the real
            // invocation surface the diagnostic.
            Err(_) => Self::Available,
        }
    }

    /// Whether the tool can be invoked
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Captured output of a finished tool invocation
#[derive(Debug)]
struct ToolOutput {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run a tool synchronously, killing it at the deadline.
fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> SumarResult<ToolOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SumarError::ToolMissing {
                    tool: program.to_string(),
                }
            } else {
                SumarError::Io(e)
            }
        })?;

    // Drain both pipes off-thread while polling for exit. A tool whose
    // output exceeds the OS pipe buffer would otherwise block writing,
    // never exit, and be misreported as a timeout.
    let stdout_reader = child.stdout.take().map(spawn_pipe_reader);
    let stderr_reader = child.stderr.take().map(spawn_pipe_reader);

    let started = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Killing the child closes its pipe ends, so the
                    // readers finish promptly.
                    let _ = join_pipe_reader(stdout_reader);
                    let _ = join_pipe_reader(stderr_reader);
                    return Err(SumarError::ToolTimeout {
                        tool: program.to_string(),
                        ms: timeout.as_millis() as u64,
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    Ok(ToolOutput {
        exit_code: status.code(),
        stdout: join_pipe_reader(stdout_reader),
        stderr: join_pipe_reader(stderr_reader),
    })
}

fn spawn_pipe_reader<R>(mut pipe: R) -> std::thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut buffer = String::new();
        let _ = pipe.read_to_string(&mut buffer);
        buffer
    })
}

fn join_pipe_reader(reader: Option<std::thread::JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Wrapper around the `lcov` tracefile merge/summary tool
#[derive(Debug, Clone, Copy)]
pub struct LcovTool {
    status: ToolStatus,
}

impl LcovTool {
    /// Probe for `lcov` once
    #[must_use]
    pub fn detect() -> Self {
        Self {
            status: ToolStatus::probe("lcov"),
        }
    }

    /// Wrapper with a forced status (used by tests)
    #[must_use]
    pub fn with_status(status: ToolStatus) -> Self {
        Self { status }
    }

    /// Probed availability
    #[must_use]
    pub fn status(&self) -> ToolStatus {
        self.status
    }

    /// Merge `.info` tracefiles: `lcov -a f1 -a f2 ... -o merged`
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> SumarResult<()> {
        let mut args = Vec::new();
        for input in inputs {
            args.push("-a".to_string());
            args.push(input.display().to_string());
        }
        args.push("-o".to_string());
        args.push(output.display().to_string());

        let result = run_with_timeout("lcov", &args, MERGE_TIMEOUT)?;
        if result.success() {
            Ok(())
        } else {
            Err(SumarError::tool_failed("lcov merge", result.stderr.trim()))
        }
    }

    /// Textual summary of a merged tracefile: `lcov --summary merged`
    pub fn summary(&self, merged: &Path) -> SumarResult<String> {
        let args = vec!["--summary".to_string(), merged.display().to_string()];
        let result = run_with_timeout("lcov", &args, SUMMARY_TIMEOUT)?;
        if result.success() {
            Ok(result.stdout)
        } else {
            Err(SumarError::tool_failed("lcov summary", result.stderr.trim()))
        }
    }

    /// Extract the line-coverage percentage from an `lcov --summary`
    /// report (`lines......: 57.1% ...`).
    #[must_use]
    pub fn line_coverage_pct(summary: &str) -> Option<f64> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"lines\s*\.+:\s*([\d.]+)%").expect("valid summary regex")
        });
        re.captures(summary)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    }
}

/// Wrapper around the `gcovr` tracefile merge/report tool
#[derive(Debug, Clone, Copy)]
pub struct GcovrTool {
    status: ToolStatus,
}

impl GcovrTool {
    /// Probe for `gcovr` once
    #[must_use]
    pub fn detect() -> Self {
        Self {
            status: ToolStatus::probe("gcovr"),
        }
    }

    /// Wrapper with a forced status (used by tests)
    #[must_use]
    pub fn with_status(status: ToolStatus) -> Self {
        Self { status }
    }

    /// Probed availability
    #[must_use]
    pub fn status(&self) -> ToolStatus {
        self.status
    }

    /// Merge JSON tracefiles and produce the text report:
    /// `gcovr --add-tracefile f1 ... [--root dir] --txt -`
    pub fn merged_report(
        &self,
        tracefiles: &[PathBuf],
        root: Option<&Path>,
    ) -> SumarResult<String> {
        let mut args = Vec::new();
        for tracefile in tracefiles {
            args.push("--add-tracefile".to_string());
            args.push(tracefile.display().to_string());
        }
        if let Some(root) = root {
            args.push("--root".to_string());
            args.push(root.display().to_string());
        }
        args.push("--txt".to_string());
        args.push("-".to_string());

        let result = run_with_timeout("gcovr", &args, MERGE_TIMEOUT)?;
        if result.success() {
            Ok(result.stdout)
        } else {
            Err(SumarError::tool_failed("gcovr", result.stderr.trim()))
        }
    }

    /// Drop the trailing `Missing` column from a gcovr text report
    /// (header and data/TOTAL lines).
    #[must_use]
    pub fn strip_missing_column(report: &str) -> String {
        static HEADER_RE: OnceLock<Regex> = OnceLock::new();
        static DATA_RE: OnceLock<Regex> = OnceLock::new();
        let header_re =
            HEADER_RE.get_or_init(|| Regex::new(r"\s+Missing\s*$").expect("valid header regex"));
        let data_re = DATA_RE
            .get_or_init(|| Regex::new(r"(\s+\d+%)\s+[\d,\s\-]+$").expect("valid data regex"));

        let mut out = Vec::new();
        for line in report.lines() {
            if line.trim_start().starts_with("File") && line.contains("Missing") {
                out.push(header_re.replace(line, "").trim_end().to_string());
            } else if data_re.is_match(line) {
                out.push(data_re.replace(line, "$1").trim_end().to_string());
            } else {
                out.push(line.to_string());
            }
        }
        out.join("\n")
    }
}
