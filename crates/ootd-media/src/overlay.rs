//! Burned-in text overlays.
//!
//! Every assembled clip carries the branding caption in the lower-left
//! corner. Scene captions from the script can be layered on top of it, each
//! enabled only during its own window of the assembled timeline.
//!
//! - `OverlayStyle`: builder for the branding caption
//! - `TimedCaption`: one scene caption with a resolved display window
//! - `layout_captions`: resolve script timing against the target duration

use std::path::{Path, PathBuf};

use ootd_models::ScriptDescriptor;

use crate::filters::{enable_between, escape_text};

// =============================================================================
// Constants
// =============================================================================

/// Branding caption burned into every clip.
pub const DEFAULT_BRANDING_TEXT: &str = "오늘 무엇을 입을까?";

pub const DEFAULT_FONT_SIZE: u32 = 30;
pub const DEFAULT_FONT_COLOR: &str = "white";
pub const DEFAULT_SHADOW_COLOR: &str = "black";

/// Scene captions are centered horizontally at three quarters of the height.
const CAPTION_X: &str = "(w-text_w)/2";
const CAPTION_Y: &str = "h*3/4";
const CAPTION_FONT_SIZE: u32 = 42;

// =============================================================================
// Configuration (Builder Pattern)
// =============================================================================

/// Styling for the branding caption.
///
/// ```ignore
/// let style = OverlayStyle::default()
///     .with_text("OOTD")
///     .with_font_file("/usr/share/fonts/NanumGothic.ttf");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub text: String,
    pub font_size: u32,
    pub font_color: String,
    /// Horizontal position expression
    pub x: String,
    /// Vertical position expression (`H` is the frame height)
    pub y: String,
    pub shadow_color: String,
    pub shadow_x: i32,
    pub shadow_y: i32,
    /// Font with Hangul coverage; FFmpeg's default font is used when unset
    pub font_file: Option<PathBuf>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text: DEFAULT_BRANDING_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_string(),
            x: "100".to_string(),
            y: "H-50".to_string(),
            shadow_color: DEFAULT_SHADOW_COLOR.to_string(),
            shadow_x: 2,
            shadow_y: 2,
            font_file: None,
        }
    }
}

impl OverlayStyle {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size.max(1);
        self
    }

    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Self {
        self.font_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// `drawtext` filter for the branding caption.
    pub fn drawtext(&self) -> String {
        self.drawtext_with(&self.text, &self.x, &self.y, self.font_size, None)
    }

    /// `drawtext` filter for a scene caption shown in `[start, end]`.
    pub fn caption_drawtext(&self, caption: &TimedCaption) -> String {
        self.drawtext_with(
            &caption.text,
            CAPTION_X,
            CAPTION_Y,
            CAPTION_FONT_SIZE.max(self.font_size),
            Some((caption.start, caption.end)),
        )
    }

    fn drawtext_with(
        &self,
        text: &str,
        x: &str,
        y: &str,
        font_size: u32,
        window: Option<(f64, f64)>,
    ) -> String {
        let mut filter = String::from("drawtext=");

        if let Some(font) = &self.font_file {
            filter.push_str(&format!(
                "fontfile={}:",
                escape_text(&font.to_string_lossy())
            ));
        }

        filter.push_str(&format!(
            "text={}:expansion=none:fontsize={}:fontcolor={}:x={}:y={}:shadowcolor={}:shadowx={}:shadowy={}",
            escape_text(text),
            font_size,
            self.font_color,
            x,
            y,
            self.shadow_color,
            self.shadow_x,
            self.shadow_y
        ));

        if let Some((start, end)) = window {
            filter.push(':');
            filter.push_str(&enable_between(start, end));
        }

        filter
    }
}

// =============================================================================
// Scene captions
// =============================================================================

/// A scene caption with its resolved display window, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCaption {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Resolve scene timing against the assembled timeline.
///
/// Captioned scenes without timing get equal consecutive slots across the
/// target. A scene with a start but no end keeps its slot length. Windows are
/// clamped to `[0, target]`; a window that collapses after clamping is dropped.
pub fn layout_captions(script: &ScriptDescriptor, target_secs: u32) -> Vec<TimedCaption> {
    let target = f64::from(target_secs);
    let scenes: Vec<_> = script.captioned_scenes().map(|(_, scene)| scene).collect();
    if scenes.is_empty() || target <= 0.0 {
        return Vec::new();
    }

    let slot = target / scenes.len() as f64;

    scenes
        .iter()
        .enumerate()
        .filter_map(|(position, scene)| {
            let start = scene.start_time.unwrap_or(position as f64 * slot);
            let end = scene.end_time.unwrap_or(start + slot);

            let start = start.clamp(0.0, target);
            let end = end.clamp(0.0, target);
            if end <= start {
                return None;
            }

            Some(TimedCaption {
                text: scene.caption.trim().to_string(),
                start,
                end,
            })
        })
        .collect()
}
