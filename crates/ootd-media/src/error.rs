//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use ootd_models::ScriptError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while assembling a clip.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The script descriptor did not parse or failed validation.
    #[error("Invalid script descriptor: {0}")]
    ScriptFormat(#[from] ScriptError),

    #[error("Target duration must be a positive number of seconds, got {0}")]
    InvalidDuration(u32),

    #[error("Target duration {requested}s exceeds the maximum of {max}s")]
    TargetTooLong { requested: u32, max: u32 },

    /// The media tool could not be launched at all.
    #[error("Failed to launch {}: {source}", .binary.display())]
    ToolInvocation {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The media tool ran and exited with a nonzero status.
    #[error("FFmpeg exited with {}: {}", describe_exit(.exit_code), .stderr.trim())]
    Render {
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("FFprobe command failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl MediaError {
    /// Create a tool invocation error.
    pub fn tool_invocation(binary: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ToolInvocation {
            binary: binary.into(),
            source,
        }
    }

    /// Create a render failure error.
    pub fn render_failed(stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Render {
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Short machine-readable tag, used for metrics labels and API error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::ScriptFormat(_) => "script_format",
            MediaError::InvalidDuration(_) | MediaError::TargetTooLong { .. } => "invalid_duration",
            MediaError::ToolInvocation { .. } => "tool_unavailable",
            MediaError::Render { .. } => "render_failed",
            MediaError::Timeout(_) => "render_timeout",
            MediaError::ProbeFailed { .. } => "probe_failed",
            MediaError::Io(_) => "io",
            MediaError::JsonParse(_) => "json",
        }
    }

    /// True for failures caused by the caller's input rather than the tool.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MediaError::ScriptFormat(_)
                | MediaError::InvalidDuration(_)
                | MediaError::TargetTooLong { .. }
        )
    }
}
