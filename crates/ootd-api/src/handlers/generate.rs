//! Content generation trigger.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use validator::Validate;

use ootd_models::GenerationRequest;

use crate::error::{ApiError, ApiResult};
use crate::services::WorkflowPayload;
use crate::state::AppState;

/// Response once the workflow engine accepted the request.
#[derive(Debug, Serialize)]
pub struct GenerateContentResponse {
    pub message: String,
    pub status: String,
    /// Whatever the workflow engine answered
    pub workflow_response: Value,
}

/// Look up the trend, fill the prompt template and hand everything to the workflow engine.
pub async fn generate_content(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> ApiResult<Json<GenerateContentResponse>> {
    request.validate()?;

    let trend = state
        .trends
        .find_trend(&request.trend_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Trend {} not found", request.trend_id)))?;

    let template = state.prompt.as_ref().ok_or_else(|| {
        ApiError::internal(format!(
            "Prompt configuration {} is not loaded",
            state.config.prompt_config_path.display()
        ))
    })?;

    let vars = HashMap::from([
        ("trend_id", trend.trend_id.clone()),
        ("outfit_name", trend.outfit_name.clone()),
        ("keywords", trend.keywords.clone()),
        ("image_url", trend.image_url.clone()),
        ("user_prompt", request.user_prompt.clone()),
        ("output_type", request.output_type.to_string()),
    ]);

    let payload = WorkflowPayload {
        trend_id: request.trend_id,
        user_uid: request.user_uid,
        user_prompt: request.user_prompt,
        output_type: request.output_type,
        scraped_data: trend.scraped_data(),
        gemini_prompt_json: template.render(&vars),
    };

    info!(
        trend_id = %payload.trend_id,
        output_type = %payload.output_type,
        "Forwarding content generation request"
    );

    let workflow_response = state.workflow.trigger(&payload).await?;

    Ok(Json(GenerateContentResponse {
        message: "콘텐츠 생성 요청이 자동화 파이프라인으로 전달되었습니다.".to_string(),
        status: "Processing".to_string(),
        workflow_response,
    }))
}
