//! Result and error types for Sumar.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Sumar operations
pub type SumarResult<T> = Result<T, SumarError>;

/// Errors that can occur while aggregating coverage
#[derive(Debug, Error)]
pub enum SumarError {
    /// No coverage snapshots were found under any of the input roots
    #[error("no coverage snapshots found under {}", format_roots(.roots))]
    NoSnapshots {
        /// Input roots that were searched
        roots: Vec<PathBuf>,
    },

    /// External tool binary is not installed
    #[error("{tool} is not installed")]
    ToolMissing {
        /// Tool name (e.g. "lcov")
        tool: String,
    },

    /// External tool exited with a failure status
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Diagnostic text from the tool (stderr)
        message: String,
    },

    /// External tool did not finish before the deadline
    #[error("{tool} timed out after {ms}ms")]
    ToolTimeout {
        /// Tool name
        tool: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Tracefile serialization error
    #[error("tracefile serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SumarError {
    /// Create a tool failure error
    #[must_use]
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

fn format_roots(roots: &[PathBuf]) -> String {
    let joined: Vec<String> = roots.iter().map(|p| p.display().to_string()).collect();
    joined.join(", ")
}
