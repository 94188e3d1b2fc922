use serde::Deserialize;
use std::time::Duration;

use crate::services::{EngineSettings, HybridWeights, TrendSettings};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Redis URL for the profile store; profiles stay in memory when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// PostgreSQL URL for the catalog feed
    #[serde(default)]
    pub database_url: Option<String>,

    /// HTTP catalog feed returning a JSON array of events. Preferred over Postgres.
    #[serde(default)]
    pub catalog_feed_url: Option<String>,

    /// Seconds between background catalog refreshes
    #[serde(default = "default_catalog_refresh_secs")]
    pub catalog_refresh_secs: u64,

    /// Number of recommendations returned when the caller gives no limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for caller-supplied limits
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Engagement records kept per user
    #[serde(default = "default_max_engagement_log")]
    pub max_engagement_log: usize,

    #[serde(default = "default_trend_lookback_hours")]
    pub trend_lookback_hours: u64,

    #[serde(default = "default_trend_half_life_hours")]
    pub trend_half_life_hours: f64,

    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,

    /// Per-scorer timeout in milliseconds; 0 disables it
    #[serde(default = "default_scorer_timeout_ms")]
    pub scorer_timeout_ms: u64,

    /// Merge multiplier for collaborative results
    #[serde(default = "default_collaborative_weight")]
    pub collaborative_weight: f64,

    #[serde(default = "default_content_weight")]
    pub content_weight: f64,

    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_refresh_secs() -> u64 {
    300
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    100
}

fn default_max_candidates() -> usize {
    5000
}

fn default_max_engagement_log() -> usize {
    1000
}

fn default_trend_lookback_hours() -> u64 {
    72
}

fn default_trend_half_life_hours() -> f64 {
    24.0
}

fn default_trend_threshold() -> f64 {
    3.0
}

fn default_scorer_timeout_ms() -> u64 {
    250
}

fn default_collaborative_weight() -> f64 {
    HybridWeights::default().collaborative
}

fn default_content_weight() -> f64 {
    HybridWeights::default().content
}

fn default_popularity_weight() -> f64 {
    HybridWeights::default().popularity
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            redis_url: None,
            database_url: None,
            catalog_feed_url: None,
            catalog_refresh_secs: default_catalog_refresh_secs(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_candidates: default_max_candidates(),
            max_engagement_log: default_max_engagement_log(),
            trend_lookback_hours: default_trend_lookback_hours(),
            trend_half_life_hours: default_trend_half_life_hours(),
            trend_threshold: default_trend_threshold(),
            scorer_timeout_ms: default_scorer_timeout_ms(),
            collaborative_weight: default_collaborative_weight(),
            content_weight: default_content_weight(),
            popularity_weight: default_popularity_weight(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine tuning derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_candidates: self.max_candidates.max(1),
            max_engagement_log: self.max_engagement_log.max(1),
            scorer_timeout: (self.scorer_timeout_ms > 0)
                .then(|| Duration::from_millis(self.scorer_timeout_ms)),
            trend: TrendSettings {
                lookback: chrono::Duration::hours(self.trend_lookback_hours as i64),
                half_life_hours: self.trend_half_life_hours,
                threshold: self.trend_threshold,
            },
            weights: HybridWeights {
                collaborative: self.collaborative_weight,
                content: self.content_weight,
                popularity: self.popularity_weight,
            },
        }
    }
}
