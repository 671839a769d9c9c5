//! JSON Schema for workflow authors.

use axum::Json;
use schemars::schema::RootSchema;
use schemars::schema_for;

use ootd_models::ScriptDescriptor;

/// Schema of the script descriptor accepted by `/api/videos/assemble`.
pub async fn script_schema() -> Json<RootSchema> {
    Json(schema_for!(ScriptDescriptor))
}
