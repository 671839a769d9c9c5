//! Shared data models for the OOTD content backend.
//!
//! This crate provides Serde-serializable types for:
//! - Script descriptors that drive short-form video assembly
//! - Trend records looked up by the content-generation endpoint
//! - Content and image generation requests
//! - Encoding configuration for rendered clips

pub mod encoding;
pub mod generation;
pub mod script;
pub mod timestamp;
pub mod trend;

// Re-export common types
pub use encoding::EncodingConfig;
pub use generation::{GenerationRequest, ImageGenerationRequest, OutputType};
pub use script::{SceneDetail, ScriptDescriptor, ScriptError};
pub use timestamp::{parse_timestamp, TimestampError};
pub use trend::{ScrapedData, Trend};
