//! Script descriptors for short-form video assembly.
//!
//! The workflow engine produces a script (title plus ordered scenes) alongside
//! the generated source clip. The assembler only reads it: the branding
//! overlay is always applied, scene captions are an optional extra stage.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::timestamp::{check_offset, parse_timestamp};

/// Errors raised while parsing or validating a script descriptor.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script is not valid JSON for a script descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("script title is empty")]
    EmptyTitle,

    #[error("scene {index}: end_time ({end}s) must be after start_time ({start}s)")]
    InvertedTiming { index: usize, start: f64, end: f64 },

    #[error("scene {index}: end_time given without start_time")]
    MissingStart { index: usize },
}

/// Structured description of one generated video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptDescriptor {
    /// Title of the piece (e.g. the trend being featured)
    pub title: String,

    /// Ordered narrative beats
    #[serde(alias = "scenes")]
    pub scene_details: Vec<SceneDetail>,
}

/// A single scene entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SceneDetail {
    /// Caption shown while the scene plays
    #[serde(default, alias = "subtitle", alias = "text")]
    pub caption: String,

    /// Offset on the assembled timeline where the caption appears (seconds or clock string)
    #[schemars(with = "Option<f64>")]
    #[serde(
        default,
        alias = "start",
        deserialize_with = "deserialize_offset",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<f64>,

    /// Offset where the caption disappears (seconds or clock string)
    #[schemars(with = "Option<f64>")]
    #[serde(
        default,
        alias = "end",
        deserialize_with = "deserialize_offset",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffset {
    Seconds(f64),
    Clock(String),
}

fn deserialize_offset<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawOffset>::deserialize(deserializer)?;
    raw.map(|offset| match offset {
        RawOffset::Seconds(secs) => check_offset(secs),
        RawOffset::Clock(text) => parse_timestamp(&text),
    })
    .transpose()
    .map_err(serde::de::Error::custom)
}

impl ScriptDescriptor {
    /// Parse and validate a serialized script.
    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        let script: ScriptDescriptor = serde_json::from_str(raw)?;
        script.validate()?;
        Ok(script)
    }

    /// Validate an already-deserialized script (e.g. one embedded in a request body).
    pub fn from_value(value: serde_json::Value) -> Result<Self, ScriptError> {
        let script: ScriptDescriptor = serde_json::from_value(value)?;
        script.validate()?;
        Ok(script)
    }

    /// Check the fields serde cannot express.
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.title.trim().is_empty() {
            return Err(ScriptError::EmptyTitle);
        }

        for (index, scene) in self.scene_details.iter().enumerate() {
            match (scene.start_time, scene.end_time) {
                (Some(start), Some(end)) if end <= start => {
                    return Err(ScriptError::InvertedTiming { index, start, end });
                }
                (None, Some(_)) => return Err(ScriptError::MissingStart { index }),
                _ => {}
            }
        }

        Ok(())
    }

    /// Scenes that carry something to display.
    pub fn captioned_scenes(&self) -> impl Iterator<Item = (usize, &SceneDetail)> {
        self.scene_details
            .iter()
            .enumerate()
            .filter(|(_, scene)| !scene.caption.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_script() {
        let script =
            ScriptDescriptor::from_json(r#"{"title": "버블 헴 드레스", "scene_details": []}"#)
                .unwrap();
        assert_eq!(script.title, "버블 헴 드레스");
        assert!(script.scene_details.is_empty());
    }

    #[test]
    fn test_parse_mixed_offsets() {
        let raw = r##"{
            "title": "Trend report",
            "scene_details": [
                {"caption": "Volume", "start_time": 0, "end_time": "00:04"},
                {"subtitle": "Sculptural", "start": "4.5", "end": 9},
                {"text": "Untimed"}
            ],
            "hashtags": ["#BubbleHem"]
        }"##;
        let script = ScriptDescriptor::from_json(raw).unwrap();
        assert_eq!(script.scene_details.len(), 3);
        assert_eq!(script.scene_details[0].end_time, Some(4.0));
        assert_eq!(script.scene_details[1].caption, "Sculptural");
        assert_eq!(script.scene_details[1].start_time, Some(4.5));
        assert_eq!(script.scene_details[2].start_time, None);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            ScriptDescriptor::from_json(r#"{"title": "no scenes"}"#),
            Err(ScriptError::Parse(_))
        ));
        assert!(matches!(
            ScriptDescriptor::from_json(r#"{"scene_details": []}"#),
            Err(ScriptError::Parse(_))
        ));
        assert!(matches!(
            ScriptDescriptor::from_json("not json"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_timing() {
        let inverted = r#"{"title": "t", "scene_details": [{"caption": "a", "start_time": 5, "end_time": 2}]}"#;
        assert!(matches!(
            ScriptDescriptor::from_json(inverted),
            Err(ScriptError::InvertedTiming { index: 0, .. })
        ));

        let negative = r#"{"title": "t", "scene_details": [{"caption": "a", "start_time": -1}]}"#;
        assert!(matches!(
            ScriptDescriptor::from_json(negative),
            Err(ScriptError::Parse(_))
        ));

        let end_only = r#"{"title": "t", "scene_details": [{"caption": "a", "end_time": 3}]}"#;
        assert!(matches!(
            ScriptDescriptor::from_json(end_only),
            Err(ScriptError::MissingStart { index: 0 })
        ));
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(matches!(
            ScriptDescriptor::from_json(r#"{"title": "  ", "scene_details": []}"#),
            Err(ScriptError::EmptyTitle)
        ));
    }

    #[test]
    fn test_captioned_scenes_skips_blank() {
        let script = ScriptDescriptor {
            title: "t".into(),
            scene_details: vec![
                SceneDetail { caption: "one".into(), ..Default::default() },
                SceneDetail::default(),
                SceneDetail { caption: "three".into(), ..Default::default() },
            ],
        };
        let indices: Vec<usize> = script.captioned_scenes().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
