//! FFmpeg filter definitions for clip assembly.
//!
//! Every filter returned here is a fragment of a single `-filter_complex`
//! graph. User-supplied strings go through [`escape_text`] before they are
//! spliced in.

/// Largest frame window the `loop` filter accepts.
pub const LOOP_MAX_FRAMES: u32 = 32767;

/// Largest sample window the `aloop` filter accepts.
pub const ALOOP_MAX_SAMPLES: u32 = i32::MAX as u32;

/// Escape a value for the filter option level (`key=value:key=value`).
pub fn escape_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a value for the filter graph level (`a,b;c[label]`).
pub fn escape_graph_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape arbitrary text so it survives both parsing levels intact.
pub fn escape_text(value: &str) -> String {
    escape_graph_value(&escape_option_value(value))
}

/// Format seconds for filter expressions without trailing zeros.
pub fn format_secs(secs: f64) -> String {
    // normalizes -0.0
    let secs = if secs == 0.0 { 0.0 } else { secs };
    let formatted = format!("{secs:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Repeat the video stream `loop_factor` times and rebuild timestamps.
pub fn filter_video_loop(loop_factor: u32) -> String {
    format!(
        "loop=loop={}:size={}:start=0,setpts=N/FRAME_RATE/TB",
        loop_factor.saturating_sub(1),
        LOOP_MAX_FRAMES
    )
}

/// Repeat the audio stream `loop_factor` times and rebuild timestamps.
pub fn filter_audio_loop(loop_factor: u32) -> String {
    format!(
        "aloop=loop={}:size={},asetpts=N/SR/TB",
        loop_factor.saturating_sub(1),
        ALOOP_MAX_SAMPLES
    )
}

/// Mix a background track under the primary audio, keeping the primary's length.
pub fn filter_amix(primary: &str, background: &str, output: &str) -> String {
    format!("[{primary}][{background}]amix=inputs=2:duration=first:dropout_transition=0[{output}]")
}

/// Scale a stream's volume.
pub fn filter_volume(volume: f32) -> String {
    format!("volume={:.2}", volume.max(0.0))
}

/// Time window expression for `enable=`.
pub fn enable_between(start: f64, end: f64) -> String {
    format!("enable='between(t,{},{})'", format_secs(start), format_secs(end))
}
