//! Outbound collaborators: trend lookup, prompt template, workflow webhook, image generation.

pub mod gemini;
pub mod prompt;
pub mod trends;
pub mod webhook;

use std::path::PathBuf;

use thiserror::Error;

pub use gemini::{GeminiClient, GeneratedImages, InlineImage};
pub use prompt::PromptTemplate;
pub use trends::{InMemoryTrendStore, TrendStore};
pub use webhook::{WorkflowClient, WorkflowPayload};

/// Failures talking to an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be parsed: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("Failed to load {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },
}

impl ServiceError {
    pub fn request(service: &'static str, source: reqwest::Error) -> Self {
        Self::Request { service, source }
    }

    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
