//! External Intelligence Types

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read feed {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch feed {url}: {message}")]
    Http { url: String, message: String },

    #[error("sync already in progress")]
    SyncInProgress,
}

/// Outcome of one sync pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub feeds_synced: usize,
    pub total_indicators: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedStats {
    pub total_domains: usize,
    pub total_urls: usize,
    pub last_sync: Option<i64>,
    pub sources: usize,
}
