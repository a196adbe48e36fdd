//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::Tool;

/// Errors that can occur while decoding or encoding a file.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The executable could not be found.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: Tool, path: PathBuf },

    /// The process exited unsuccessfully.
    #[error(
        "{tool} failed with exit code {code:?}: {}",
        stderr.as_deref().unwrap_or("no diagnostic output")
    )]
    ProcessFailed {
        tool: Tool,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The process ran past the configured timeout and was killed.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: Tool, timeout_secs: u64 },

    /// The temporary intermediate file could not be created.
    #[error("Failed to create temporary file in {dir}")]
    TempFile {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder exited successfully without producing output.
    #[error("Encoder did not create {path}")]
    OutputMissing { path: PathBuf },

    /// I/O error while supervising a process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    /// Creates a process failure from captured stderr.
    pub fn process_failed(tool: Tool, code: Option<i32>, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        Self::ProcessFailed {
            tool,
            code,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
        }
    }

    /// Diagnostic output captured from the failing process, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ProcessFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// The tool this error is attributed to.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            Self::ToolNotFound { tool, .. }
            | Self::ProcessFailed { tool, .. }
            | Self::Timeout { tool, .. } => Some(*tool),
            Self::OutputMissing { .. } => Some(Tool::Lame),
            _ => None,
        }
    }
}
