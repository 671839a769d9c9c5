#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper that assembles short-form outfit videos.
//!
//! This crate provides:
//! - The clip assembler (loop, branding overlay, scene captions, audio)
//! - Type-safe FFmpeg command building with escaped filter text
//! - A `Renderer` seam over process execution, with timeout support
//! - FFprobe duration probing

pub mod assembler;
pub mod command;
pub mod error;
pub mod filters;
pub mod metrics;
pub mod overlay;
pub mod probe;
pub mod renderer;

pub use assembler::{
    loop_factor, AssemblyConfig, AudioMode, ClipAssembler, DEFAULT_BGM_VOLUME,
    DEFAULT_MAX_TARGET_DURATION_SECS, DEFAULT_SOURCE_DURATION_SECS, DEFAULT_TARGET_DURATION_SECS,
};
pub use command::{resolve_binary, RenderInput, RenderSpec};
pub use error::{MediaError, MediaResult};
pub use overlay::{layout_captions, OverlayStyle, TimedCaption, DEFAULT_BRANDING_TEXT};
pub use probe::{
    probe_duration, probe_media, FfprobeProbe, MediaInfo, MediaProbe, DEFAULT_FFPROBE_BINARY,
};
pub use renderer::{FfmpegRenderer, RenderOutput, Renderer, DEFAULT_FFMPEG_BINARY};
