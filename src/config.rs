//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::logic::external_intel::FeedSources;
use crate::logic::features::FEATURE_VERSION;
use crate::logic::threat::DEFAULT_INFERENCE_TIMEOUT;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model manifest loaded at startup
    pub model_path: Option<PathBuf>,

    /// Feature schema version models must declare
    pub model_schema_version: u8,

    /// Optional JSON rule table replacing the built-in heuristics
    pub heuristic_rules_path: Option<PathBuf>,

    /// Local blocklist files
    pub threat_feed_paths: Vec<PathBuf>,

    /// Remote blocklist URLs
    pub threat_feed_urls: Vec<String>,

    /// Feed refresh period, zero disables the background task
    pub feed_refresh: Duration,

    /// Upper bound for one model call
    pub inference_timeout: Duration,

    /// Bearer token for admin routes, admin API is closed when unset
    pub admin_token: Option<String>,

    /// Environment (development, production)
    pub environment: String,

    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: None,
            model_schema_version: FEATURE_VERSION,
            heuristic_rules_path: None,
            threat_feed_paths: Vec::new(),
            threat_feed_urls: Vec::new(),
            feed_refresh: Duration::from_secs(3600),
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
            admin_token: None,
            environment: "development".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: non_empty("MODEL_PATH").map(PathBuf::from),

            model_schema_version: env::var("MODEL_SCHEMA_VERSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.model_schema_version),

            heuristic_rules_path: non_empty("HEURISTIC_RULES_PATH").map(PathBuf::from),

            threat_feed_paths: list("THREAT_FEED_PATHS").into_iter().map(PathBuf::from).collect(),

            threat_feed_urls: list("THREAT_FEED_URLS"),

            feed_refresh: env::var("FEED_REFRESH_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.feed_refresh),

            inference_timeout: env::var("INFERENCE_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.inference_timeout),

            admin_token: non_empty("ADMIN_TOKEN"),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            json_logs: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    pub fn feed_sources(&self) -> FeedSources {
        FeedSources {
            files: self.threat_feed_paths.clone(),
            urls: self.threat_feed_urls.clone(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn list(key: &str) -> Vec<String> {
    non_empty(key)
        .map(|v| parse_list(&v))
        .unwrap_or_default()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
