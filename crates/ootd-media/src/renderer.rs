//! Execution of a [`RenderSpec`] by the external media tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::RenderSpec;
use crate::error::{MediaError, MediaResult};

/// Default binary name, resolved on `PATH` at spawn time.
pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

/// Captured result of a successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub output: PathBuf,
    /// Diagnostic output (warnings only on success)
    pub stderr: String,
    pub elapsed: Duration,
}

/// Seam between clip assembly and process execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Run one render to completion.
    async fn render(&self, spec: &RenderSpec) -> MediaResult<RenderOutput>;
}

/// Renderer that spawns FFmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for FfmpegRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_BINARY)
    }
}

impl FfmpegRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Kill the process if it runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Spawn or wait failures both mean the tool could not be driven.
    fn invocation_error(&self, source: std::io::Error) -> MediaError {
        MediaError::tool_invocation(&self.binary, source)
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(&self, spec: &RenderSpec) -> MediaResult<RenderOutput> {
        let args = spec.build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let started = Instant::now();

        let mut command = Command::new(&self.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| self.invocation_error(e))?;

        // Dropping the output future on timeout kills the child
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result.map_err(|e| self.invocation_error(e))?,
                Err(_) => {
                    let secs = limit.as_secs();
                    warn!(
                        output = %spec.output().display(),
                        "FFmpeg timed out after {} seconds, killing process",
                        secs
                    );
                    metrics::counter!(crate::metrics::RENDERS_TOTAL, "outcome" => "timeout")
                        .increment(1);
                    return Err(MediaError::Timeout(secs));
                }
            },
            None => child
                .wait_with_output()
                .await
                .map_err(|e| self.invocation_error(e))?,
        };

        let elapsed = started.elapsed();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        metrics::histogram!(crate::metrics::RENDER_DURATION_SECONDS)
            .record(elapsed.as_secs_f64());

        if !output.status.success() {
            let exit_code = output.status.code();
            warn!(
                output = %spec.output().display(),
                exit_code = ?exit_code,
                "FFmpeg render failed"
            );
            metrics::counter!(crate::metrics::RENDERS_TOTAL, "outcome" => "failed").increment(1);
            return Err(MediaError::render_failed(stderr, exit_code));
        }

        metrics::counter!(crate::metrics::RENDERS_TOTAL, "outcome" => "success").increment(1);
        info!(
            output = %spec.output().display(),
            elapsed_ms = elapsed.as_millis() as u64,
            "FFmpeg render completed"
        );

        Ok(RenderOutput {
            output: spec.output().to_path_buf(),
            stderr,
            elapsed,
        })
    }
}
