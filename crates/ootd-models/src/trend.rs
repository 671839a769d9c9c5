//! Trend records served by the persistence collaborator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A fashion trend tracked by the daily trend update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Trend {
    /// External identifier used by the front end
    pub trend_id: String,
    /// Display name of the outfit
    pub outfit_name: String,
    /// Space-separated hashtags
    #[serde(default)]
    pub keywords: String,
    /// Reference image for the outfit
    #[serde(default, alias = "image_url_source")]
    pub image_url: String,
}

/// The subset of a trend forwarded to the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedData {
    pub outfit_name: String,
    pub keywords: String,
    pub image_url: String,
}

impl Trend {
    pub fn new(
        trend_id: impl Into<String>,
        outfit_name: impl Into<String>,
        keywords: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            trend_id: trend_id.into(),
            outfit_name: outfit_name.into(),
            keywords: keywords.into(),
            image_url: image_url.into(),
        }
    }

    /// Snapshot sent downstream as `scraped_data`.
    pub fn scraped_data(&self) -> ScrapedData {
        ScrapedData {
            outfit_name: self.outfit_name.clone(),
            keywords: self.keywords.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_column_alias() {
        let trend: Trend = serde_json::from_str(
            r#"{"trend_id": "1", "outfit_name": "버블 헴 드레스", "image_url_source": "http://example.com/a.jpg"}"#,
        )
        .unwrap();
        assert_eq!(trend.image_url, "http://example.com/a.jpg");
        assert_eq!(trend.keywords, "");
    }

    #[test]
    fn test_scraped_data_drops_id() {
        let trend = Trend::new("2", "오버사이즈 블레이저", "#Oversized", "http://example.com/b.jpg");
        let value = serde_json::to_value(trend.scraped_data()).unwrap();
        assert!(value.get("trend_id").is_none());
        assert_eq!(value["outfit_name"], "오버사이즈 블레이저");
    }
}
