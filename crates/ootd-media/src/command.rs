//! FFmpeg command description.
//!
//! A [`RenderSpec`] is the complete, in-memory description of one FFmpeg
//! invocation. It is built per call, handed to a [`crate::Renderer`], and
//! dropped afterwards.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

/// One `-i` input with its input-side options.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub path: PathBuf,
    /// Options placed before `-i` (e.g. `-stream_loop -1`)
    pub args: Vec<String>,
}

/// Builder for an FFmpeg render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    inputs: Vec<RenderInput>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    duration_secs: Option<u32>,
    output_args: Vec<String>,
    output: PathBuf,
    overwrite: bool,
    log_level: String,
}

impl RenderSpec {
    /// Create a spec reading `input` and writing `output`.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![RenderInput {
                path: input.as_ref().to_path_buf(),
                args: Vec::new(),
            }],
            filter_complex: None,
            maps: Vec::new(),
            duration_secs: None,
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a secondary input with its own input options.
    pub fn extra_input<I, S>(mut self, path: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(RenderInput {
            path: path.as_ref().to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Set the filter graph.
    pub fn filter_complex(mut self, filter: impl Into<String>) -> Self {
        self.filter_complex = Some(filter.into());
        self
    }

    /// Route a stream or filter label to the output.
    pub fn map(mut self, label: impl Into<String>) -> Self {
        self.maps.push(label.into());
        self
    }

    /// Clamp the output to an exact duration.
    pub fn duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Add a single output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Drop audio from the output.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Allow or refuse overwriting an existing output file.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn inputs(&self) -> &[RenderInput] {
        &self.inputs
    }

    /// Primary input (the source clip).
    pub fn input(&self) -> &Path {
        &self.inputs[0].path
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn filter_graph(&self) -> Option<&str> {
        self.filter_complex.as_deref()
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string()];

        if self.overwrite {
            args.push("-y".to_string());
        } else {
            args.push("-n".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let Some(filter) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(filter.clone());
        }

        for label in &self.maps {
            args.push("-map".to_string());
            args.push(label.clone());
        }

        if let Some(secs) = self.duration_secs {
            args.push("-t".to_string());
            args.push(secs.to_string());
        }

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Resolve a configured binary (bare name looked up on `PATH`, or an explicit path).
pub fn resolve_binary(binary: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary).map_err(|e| {
        MediaError::tool_invocation(
            binary,
            std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_order() {
        let spec = RenderSpec::new("in.mp4", "out.mp4")
            .extra_input("bgm.mp3", ["-stream_loop", "-1"])
            .filter_complex("[0:v]null[vout]")
            .map("[vout]")
            .map("1:a")
            .duration(24)
            .output_args(["-c:v", "libx264"]);

        let args = spec.build_args();
        assert_eq!(
            args,
            vec![
                "-hide_banner", "-y", "-v", "error",
                "-i", "in.mp4",
                "-stream_loop", "-1", "-i", "bgm.mp3",
                "-filter_complex", "[0:v]null[vout]",
                "-map", "[vout]", "-map", "1:a",
                "-t", "24",
                "-c:v", "libx264",
                "out.mp4",
            ]
        );
    }

    #[test]
    fn test_no_overwrite() {
        let args = RenderSpec::new("in.mp4", "out.mp4").overwrite(false).build_args();
        assert!(args.contains(&"-n".to_string()));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_accessors() {
        let spec = RenderSpec::new("/media/src.mp4", "/media/out.mp4").duration(24);
        assert_eq!(spec.input(), Path::new("/media/src.mp4"));
        assert_eq!(spec.output(), Path::new("/media/out.mp4"));
        assert_eq!(spec.duration_secs(), Some(24));
        assert!(spec.filter_graph().is_none());
    }

    #[test]
    fn test_resolve_missing_binary() {
        let err = resolve_binary("/definitely/not/here/ffmpeg").unwrap_err();
        assert!(matches!(err, MediaError::ToolInvocation { .. }));
    }
}
