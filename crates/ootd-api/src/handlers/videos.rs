//! Clip assembly handler.

use std::path::Path;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use ootd_media::{MediaError, MediaResult};
use ootd_models::ScriptDescriptor;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::RequestId;
use crate::security::resolve_media_path;
use crate::state::AppState;

/// Assembly request. Paths are relative to the media root.
#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    /// Generated source clip
    pub source: String,
    /// Where the final clip is written
    pub output: String,
    /// Script descriptor, either as a JSON string or an inline object
    pub script: Value,
    #[serde(default)]
    pub target_duration_secs: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AssembleResponse {
    pub output: String,
    /// Probed duration of the written clip, when ffprobe is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub target_duration_secs: u32,
}

fn parse_script(script: Value) -> ApiResult<ScriptDescriptor> {
    match script {
        Value::String(text) => recorded(ScriptDescriptor::from_json(&text).map_err(MediaError::from)),
        Value::Object(_) => recorded(ScriptDescriptor::from_value(script).map_err(MediaError::from)),
        _ => Err(ApiError::bad_request("script must be a JSON string or object")),
    }
}

/// Count rejected assemblies under the same outcome labels as failed renders.
fn recorded<T>(result: MediaResult<T>) -> ApiResult<T> {
    result.map_err(|e| {
        metrics::record_assembly(e.kind());
        ApiError::from(e)
    })
}

/// Loop the source clip to the target duration and burn in the overlays.
pub async fn assemble_video(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(request): Json<AssembleRequest>,
) -> ApiResult<Json<AssembleResponse>> {
    let media = &state.config.media;
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();

    let source = resolve_media_path(&media.root, &request.source)
        .map_err(|e| ApiError::bad_request(format!("source: {}", e)))?;
    let output = resolve_media_path(&media.root, &request.output)
        .map_err(|e| ApiError::bad_request(format!("output: {}", e)))?;
    let target_secs = request
        .target_duration_secs
        .unwrap_or(media.target_duration_secs);

    // Nothing touches the filesystem until the request is known to be renderable
    let script = parse_script(request.script)?;
    recorded(state.assembler.check_target(target_secs))?;

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ApiError::internal(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    info!(
        request_id = %request_id,
        source = %request.source,
        output = %request.output,
        target_secs,
        "Clip assembly requested"
    );

    let written = recorded(
        state
            .assembler
            .assemble_script(&source, &output, &script, target_secs)
            .await,
    )?;
    metrics::record_assembly("success");

    let duration_secs = probe_written(&media.ffprobe, &written).await;

    Ok(Json(AssembleResponse {
        output: request.output.trim().to_string(),
        duration_secs,
        target_duration_secs: target_secs,
    }))
}

async fn probe_written(ffprobe: &Path, output: &Path) -> Option<f64> {
    match ootd_media::probe_duration(ffprobe, output).await {
        Ok(duration) => Some(duration),
        Err(e) => {
            warn!(output = %output.display(), "Could not probe assembled clip: {}", e);
            None
        }
    }
}
