//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use ootd_media::{ClipAssembler, FfmpegRenderer, FfprobeProbe};

use crate::config::ApiConfig;
use crate::services::{GeminiClient, InMemoryTrendStore, PromptTemplate, TrendStore, WorkflowClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub trends: Arc<dyn TrendStore>,
    /// `None` when the template file could not be loaded at startup
    pub prompt: Option<Arc<PromptTemplate>>,
    pub workflow: Arc<WorkflowClient>,
    pub gemini: Arc<GeminiClient>,
    pub assembler: ClipAssembler,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let trends: Arc<dyn TrendStore> = match &config.trends_path {
            Some(path) => Arc::new(InMemoryTrendStore::from_file(path)?),
            None => {
                info!("TRENDS_PATH not set, serving built-in seed trends");
                Arc::new(InMemoryTrendStore::seeded())
            }
        };

        // A missing template only fails content generation, not the whole server
        let prompt = match PromptTemplate::load(&config.prompt_config_path) {
            Ok(template) => {
                info!(path = %config.prompt_config_path.display(), "Loaded prompt template");
                Some(Arc::new(template))
            }
            Err(e) => {
                warn!("Prompt template unavailable: {}", e);
                None
            }
        };

        let workflow = WorkflowClient::new(config.webhook.url.clone(), config.webhook.timeout)?;
        let gemini = GeminiClient::new(&config.gemini)?;

        let renderer = FfmpegRenderer::new(&config.media.ffmpeg)
            .with_timeout(config.media.render_timeout_secs);
        let assembler = ClipAssembler::with_ffmpeg(renderer, config.media.assembly_config())
            .with_probe(Arc::new(FfprobeProbe::new(&config.media.ffprobe)));

        Ok(Self {
            config,
            trends,
            prompt,
            workflow: Arc::new(workflow),
            gemini: Arc::new(gemini),
            assembler,
        })
    }

    /// Replace the trend store.
    pub fn with_trends(mut self, trends: Arc<dyn TrendStore>) -> Self {
        self.trends = trends;
        self
    }

    /// Replace the clip assembler.
    pub fn with_assembler(mut self, assembler: ClipAssembler) -> Self {
        self.assembler = assembler;
        self
    }
}
