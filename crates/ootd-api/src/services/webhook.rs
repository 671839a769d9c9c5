//! Workflow engine trigger.
//!
//! The content pipeline itself runs in the workflow engine; this client only
//! hands it a payload and reports what it answered.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use ootd_models::{OutputType, ScrapedData};

use super::ServiceError;
use crate::metrics;

const SERVICE: &str = "workflow webhook";

/// Payload posted to the workflow webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowPayload {
    pub trend_id: String,
    pub user_uid: String,
    pub user_prompt: String,
    pub output_type: OutputType,
    pub scraped_data: ScrapedData,
    pub gemini_prompt_json: Value,
}

/// HTTP client for the workflow webhook.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
    url: Url,
}

impl WorkflowClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::request(SERVICE, e))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the payload; any 2xx answer counts as accepted.
    ///
    /// A JSON body is returned as-is, anything else is wrapped as `{"raw": text}`.
    pub async fn trigger(&self, payload: &WorkflowPayload) -> Result<Value, ServiceError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                metrics::record_webhook_trigger("error");
                ServiceError::request(SERVICE, e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics::record_webhook_trigger("error");
            ServiceError::request(SERVICE, e)
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), trend_id = %payload.trend_id, "Workflow webhook rejected request");
            metrics::record_webhook_trigger("rejected");
            return Err(ServiceError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        metrics::record_webhook_trigger("accepted");
        info!(
            trend_id = %payload.trend_id,
            user_uid = %payload.user_uid,
            output_type = %payload.output_type,
            "Workflow triggered"
        );

        Ok(parse_body(&body))
    }
}

fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({ "raw": body }))
}
