//! Content and image generation requests.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Final artifact the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Four-panel image set
    #[serde(alias = "4컷", alias = "4cut")]
    FourCut,
    /// Short-form vertical video
    #[serde(alias = "30초", alias = "short")]
    ShortVideo,
    /// Plain MP4 export
    #[serde(alias = "MP4")]
    Mp4,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::FourCut => "four_cut",
            OutputType::ShortVideo => "short_video",
            OutputType::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request from the front end to start the content pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerationRequest {
    /// Trend to build content around
    #[validate(length(min = 1, max = 64))]
    pub trend_id: String,

    /// Extra styling direction from the user (e.g. "make it chic")
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub user_prompt: String,

    /// Requested artifact
    pub output_type: OutputType,

    /// Identity-provider UID of the requesting user
    #[validate(length(min = 1, max = 128))]
    pub user_uid: String,
}

/// Request for a direct image generation call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ImageGenerationRequest {
    /// Instruction text for the model
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,

    /// Base64-encoded reference image
    #[validate(length(min = 1))]
    pub image_base64: String,

    /// MIME type of the reference image
    #[validate(custom(function = "validate_image_mime"))]
    pub mime_type: String,
}

fn validate_image_mime(mime: &str) -> Result<(), ValidationError> {
    const ALLOWED: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/heic", "image/heif"];
    if ALLOWED.contains(&mime.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_mime_type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_type_labels() {
        let parsed: OutputType = serde_json::from_str(r#""4컷""#).unwrap();
        assert_eq!(parsed, OutputType::FourCut);
        let parsed: OutputType = serde_json::from_str(r#""30초""#).unwrap();
        assert_eq!(parsed, OutputType::ShortVideo);
        let parsed: OutputType = serde_json::from_str(r#""MP4""#).unwrap();
        assert_eq!(parsed, OutputType::Mp4);
        assert_eq!(serde_json::to_string(&OutputType::Mp4).unwrap(), r#""mp4""#);
    }

    #[test]
    fn test_generation_request_validation() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"trend_id": "1", "user_prompt": "시크하게", "output_type": "mp4", "user_uid": "uid-1"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let empty = GenerationRequest {
            trend_id: String::new(),
            ..request
        };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("trend_id"));
    }

    #[test]
    fn test_image_request_mime() {
        let mut request = ImageGenerationRequest {
            prompt: "Put the outfit on a runway".to_string(),
            image_base64: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        };
        assert!(request.validate().is_ok());

        request.mime_type = "application/pdf".to_string();
        assert!(request.validate().is_err());
    }
}
