//! API configuration.
//!
//! Every environment read happens here, once, at startup. Required values
//! are validated eagerly so a misconfigured deployment fails before binding.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use ootd_media::{
    AssemblyConfig, AudioMode, OverlayStyle, DEFAULT_BGM_VOLUME, DEFAULT_FFMPEG_BINARY,
    DEFAULT_FFPROBE_BINARY, DEFAULT_MAX_TARGET_DURATION_SECS, DEFAULT_SOURCE_DURATION_SECS,
    DEFAULT_TARGET_DURATION_SECS,
};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration errors, reported before the server starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// A credential that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Workflow engine webhook.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Url,
    pub timeout: Duration,
}

/// Generative image API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

/// Clip assembly settings.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory every assembly path is resolved against
    pub root: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub render_timeout_secs: u64,
    pub target_duration_secs: u32,
    /// Longest target a request may ask for
    pub max_target_duration_secs: u32,
    pub source_duration_secs: u32,
    pub branding_text: Option<String>,
    pub font_file: Option<PathBuf>,
    pub scene_captions: bool,
    pub bgm_path: Option<PathBuf>,
    pub bgm_volume: f32,
    pub silent_audio: bool,
}

impl MediaConfig {
    /// Assembly constants derived from the configuration.
    pub fn assembly_config(&self) -> AssemblyConfig {
        let mut style = OverlayStyle::default();
        if let Some(text) = &self.branding_text {
            style = style.with_text(text);
        }
        if let Some(font) = &self.font_file {
            style = style.with_font_file(font);
        }

        let audio = if self.silent_audio {
            AudioMode::Silent
        } else if let Some(track) = &self.bgm_path {
            AudioMode::Mixed {
                track: track.clone(),
                volume: self.bgm_volume,
            }
        } else {
            AudioMode::Source
        };

        AssemblyConfig {
            source_duration_secs: self.source_duration_secs,
            max_target_secs: self.max_target_duration_secs,
            style,
            scene_captions: self.scene_captions,
            audio,
            ..Default::default()
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Rate limit burst
    pub rate_limit_burst: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    pub metrics_enabled: bool,
    /// Prompt template forwarded with every generation request
    pub prompt_config_path: PathBuf,
    /// Trend records; built-in seed trends when unset
    pub trends_path: Option<PathBuf>,
    pub webhook: WebhookConfig,
    pub gemini: GeminiConfig,
    pub media: MediaConfig,
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let webhook_url = env.required("WEBHOOK_URL")?;
        let webhook_url = Url::parse(&webhook_url).map_err(|e| ConfigError::Invalid {
            key: "WEBHOOK_URL",
            message: e.to_string(),
        })?;

        let gemini_base_url = env.string("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
        let gemini_base_url = Url::parse(&gemini_base_url).map_err(|e| ConfigError::Invalid {
            key: "GEMINI_BASE_URL",
            message: e.to_string(),
        })?;

        let config = Self {
            host: env.string("API_HOST", "0.0.0.0"),
            port: env.parse("API_PORT", 8000)?,
            cors_origins: env
                .optional("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["http://localhost:5501".to_string()]),
            rate_limit_rps: env.parse("RATE_LIMIT_RPS", 10)?,
            rate_limit_burst: env.parse("RATE_LIMIT_BURST", 20)?,
            max_body_size: env.parse("MAX_BODY_SIZE", 20 * 1024 * 1024)?, // 20MB, inline images
            environment: env.string("ENVIRONMENT", "development"),
            metrics_enabled: env.flag("METRICS_ENABLED", true),
            prompt_config_path: env.string("PROMPT_CONFIG_PATH", "gemini_prompt_config.json").into(),
            trends_path: env.optional("TRENDS_PATH").map(PathBuf::from),
            webhook: WebhookConfig {
                url: webhook_url,
                timeout: Duration::from_secs(env.parse("WEBHOOK_TIMEOUT_SECS", 30)?),
            },
            gemini: GeminiConfig {
                api_key: Secret::new(env.required("GEMINI_API_KEY")?),
                model: env.string("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                base_url: gemini_base_url,
                timeout: Duration::from_secs(env.parse("GEMINI_TIMEOUT_SECS", 120)?),
            },
            media: MediaConfig {
                root: env.string("MEDIA_ROOT", "./media").into(),
                ffmpeg: env.string("FFMPEG_PATH", DEFAULT_FFMPEG_BINARY).into(),
                ffprobe: env.string("FFPROBE_PATH", DEFAULT_FFPROBE_BINARY).into(),
                render_timeout_secs: env.parse("RENDER_TIMEOUT_SECS", 300)?,
                target_duration_secs: env
                    .parse("TARGET_DURATION_SECS", DEFAULT_TARGET_DURATION_SECS)?,
                max_target_duration_secs: env
                    .parse("MAX_TARGET_DURATION_SECS", DEFAULT_MAX_TARGET_DURATION_SECS)?,
                source_duration_secs: env
                    .parse("SOURCE_DURATION_SECS", DEFAULT_SOURCE_DURATION_SECS)?,
                branding_text: env.optional("BRANDING_TEXT"),
                font_file: env.optional("FONT_FILE").map(PathBuf::from),
                scene_captions: env.flag("SCENE_CAPTIONS", false),
                bgm_path: env.optional("BGM_PATH").map(PathBuf::from),
                bgm_volume: env.parse("BGM_VOLUME", DEFAULT_BGM_VOLUME)?,
                silent_audio: env.flag("SILENT_AUDIO", false),
            },
        };

        for (key, secs) in [
            ("TARGET_DURATION_SECS", config.media.target_duration_secs),
            ("SOURCE_DURATION_SECS", config.media.source_duration_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    message: "must be a positive number of seconds".to_string(),
                });
            }
        }

        if config.media.target_duration_secs > config.media.max_target_duration_secs {
            return Err(ConfigError::Invalid {
                key: "TARGET_DURATION_SECS",
                message: format!(
                    "must not exceed MAX_TARGET_DURATION_SECS ({})",
                    config.media.max_target_duration_secs
                ),
            });
        }

        Ok(config)
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Typed accessors over a key lookup.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                message: format!("'{raw}': {e}"),
            }),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.optional(key)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("WEBHOOK_URL", "http://n8n:5678/webhook/user-request"),
        ("GEMINI_API_KEY", "test-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5501"]);
        assert_eq!(config.prompt_config_path, PathBuf::from("gemini_prompt_config.json"));
        assert_eq!(config.media.target_duration_secs, 24);
        assert_eq!(config.media.source_duration_secs, 8);
        assert_eq!(config.media.max_target_duration_secs, 180);
        assert_eq!(config.media.assembly_config().max_target_secs, 180);
        assert_eq!(config.media.render_timeout_secs, 300);
        assert!(!config.media.scene_captions);
        assert!(!config.is_production());
        assert_eq!(config.media.assembly_config().audio, AudioMode::Source);
    }

    #[test]
    fn test_required_keys() {
        let err = ApiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("WEBHOOK_URL"));

        let err = ApiConfig::from_lookup(lookup(&[("WEBHOOK_URL", "http://n8n/hook")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));

        let err = ApiConfig::from_lookup(lookup(&[
            ("WEBHOOK_URL", "not a url"),
            ("GEMINI_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WEBHOOK_URL", .. }));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TARGET_DURATION_SECS", "soon"));
        let err = ApiConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TARGET_DURATION_SECS", .. }));
    }

    #[test]
    fn test_default_target_within_cap() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MAX_TARGET_DURATION_SECS", "20"));
        let err = ApiConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TARGET_DURATION_SECS", .. }));

        pairs.push(("TARGET_DURATION_SECS", "16"));
        let config = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.media.assembly_config().max_target_secs, 20);
    }

    #[test]
    fn test_audio_mode_selection() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BGM_PATH", "/assets/bgm.mp3"));
        pairs.push(("BGM_VOLUME", "0.5"));
        let config = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.media.assembly_config().audio,
            AudioMode::Mixed {
                track: PathBuf::from("/assets/bgm.mp3"),
                volume: 0.5
            }
        );

        pairs.push(("SILENT_AUDIO", "true"));
        let config = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.media.assembly_config().audio, AudioMode::Silent);
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = ApiConfig::from_lookup(lookup(REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("test-key"));
        assert_eq!(config.gemini.api_key.expose(), "test-key");
        assert_eq!(config.gemini.api_key.to_string(), "***");
    }
}
