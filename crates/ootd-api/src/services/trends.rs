//! Trend lookup.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use ootd_models::Trend;

use super::ServiceError;

/// Persistence boundary for trend records.
#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Look up a trend by its external id.
    async fn find_trend(&self, trend_id: &str) -> Result<Option<Trend>, ServiceError>;
}

/// Trend store held in memory, loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrendStore {
    trends: HashMap<String, Trend>,
}

impl InMemoryTrendStore {
    pub fn new(trends: impl IntoIterator<Item = Trend>) -> Self {
        Self {
            trends: trends
                .into_iter()
                .map(|t| (t.trend_id.clone(), t))
                .collect(),
        }
    }

    /// Store with the built-in seed trends.
    pub fn seeded() -> Self {
        Self::new([
            Trend::new(
                "1",
                "버블 헴 드레스",
                "#Volume #BubbleHem #Sculptural",
                "http://example.com/bubble-dress.jpg",
            ),
            Trend::new(
                "2",
                "오버사이즈 블레이저",
                "#Oversized #Tailoring #Androgynous",
                "http://example.com/oversized-blazer.jpg",
            ),
        ])
    }

    /// Load a JSON array of trend records.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ServiceError::load(path, e))?;
        let trends: Vec<Trend> =
            serde_json::from_str(&raw).map_err(|e| ServiceError::load(path, e))?;
        info!(path = %path.display(), count = trends.len(), "Loaded trend records");
        Ok(Self::new(trends))
    }

    pub fn len(&self) -> usize {
        self.trends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }
}

#[async_trait]
impl TrendStore for InMemoryTrendStore {
    async fn find_trend(&self, trend_id: &str) -> Result<Option<Trend>, ServiceError> {
        Ok(self.trends.get(trend_id.trim()).cloned())
    }
}
