//! Direct image generation.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use ootd_models::ImageGenerationRequest;

use crate::error::{ApiError, ApiResult};
use crate::services::InlineImage;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    pub images: Vec<InlineImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub count: usize,
}

/// Strip a `data:<mime>;base64,` prefix if the client sent a data URL.
fn strip_data_url(encoded: &str) -> &str {
    let trimmed = encoded.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(";base64,") {
            return payload;
        }
    }
    trimmed
}

/// Send a reference image and instruction to the image model.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<ImageGenerationRequest>,
) -> ApiResult<Json<GenerateImageResponse>> {
    request.validate()?;

    let image_base64 = strip_data_url(&request.image_base64);
    let decoded_len = STANDARD
        .decode(image_base64)
        .map_err(|e| ApiError::bad_request(format!("image_base64 is not valid base64: {}", e)))?
        .len();
    if decoded_len == 0 {
        return Err(ApiError::bad_request("image_base64 decodes to an empty image"));
    }

    info!(
        model = %state.gemini.model(),
        mime_type = %request.mime_type,
        image_bytes = decoded_len,
        "Generating image"
    );

    let generated = state
        .gemini
        .generate_image(&request.prompt, image_base64, &request.mime_type)
        .await?;

    Ok(Json(GenerateImageResponse {
        count: generated.images.len(),
        images: generated.images,
        text: generated.text,
    }))
}
