//! Metric names recorded by the media layer.
//!
//! The recorder is installed by the binary; without one these are no-ops.

/// Renders by outcome (`success`, `failed`, `timeout`).
pub const RENDERS_TOTAL: &str = "ootd_renders_total";

/// Wall-clock render time.
pub const RENDER_DURATION_SECONDS: &str = "ootd_render_duration_seconds";
