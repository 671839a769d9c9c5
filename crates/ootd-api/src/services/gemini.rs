//! Gemini client for direct image generation.
//!
//! Sends one prompt plus one reference image and collects the inline image
//! parts of the answer. A response without inline data is a valid outcome
//! meaning "nothing generated".

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use super::ServiceError;
use crate::config::{GeminiConfig, Secret};
use crate::metrics;

const SERVICE: &str = "Gemini API";

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Secret,
    model: String,
    base_url: Url,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<&'static str>,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    #[serde(alias = "mimeType")]
    mime_type: String,
    data: String,
}

/// One generated image, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Everything the model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedImages {
    pub images: Vec<InlineImage>,
    /// Accompanying text parts, joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::request(SERVICE, e))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }

    /// Generate images from a prompt and a base64 reference image.
    pub async fn generate_image(
        &self,
        prompt: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<GeneratedImages, ServiceError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type,
                            data: image_base64,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        };

        info!(model = %self.model, "Calling Gemini image generation");

        // Key goes in a header so it never lands in URLs or access logs
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::record_image_generation("error");
                ServiceError::request(SERVICE, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini API returned an error");
            metrics::record_image_generation("rejected");
            return Err(ServiceError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            metrics::record_image_generation("error");
            ServiceError::InvalidResponse {
                service: SERVICE,
                message: e.to_string(),
            }
        })?;

        let generated = collect_parts(gemini_response);
        metrics::record_image_generation(if generated.images.is_empty() {
            "empty"
        } else {
            "generated"
        });
        info!(images = generated.images.len(), "Gemini image generation completed");

        Ok(generated)
    }
}

fn collect_parts(response: GeminiResponse) -> GeneratedImages {
    let mut images = Vec::new();
    let mut texts = Vec::new();

    for part in response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
    {
        if let Some(inline) = part.inline_data {
            images.push(InlineImage {
                mime_type: inline.mime_type,
                data: inline.data,
            });
        }
        if let Some(text) = part.text.filter(|t| !t.trim().is_empty()) {
            texts.push(text);
        }
    }

    GeneratedImages {
        images,
        text: (!texts.is_empty()).then(|| texts.join("\n")),
    }
}
