//! Threat Feed Module
//!
//! Known-bad URLs and domains from threat intelligence feeds. The
//! classification engine only asks one question of it: is this URL (or its
//! host) already known? A phishing verdict for an unknown URL is reported as
//! zero-day.
//!
//! Feeds are plain text, one indicator per line, `#` comments, as published
//! by URLhaus / OpenPhish style lists. Sources are local files and remote
//! URLs; fetching and parsing happen outside the lock, then the rebuilt
//! set is swapped in under a short write lock.
//!
//! Each sync replaces a source's indicators with what it serves now, so
//! de-listed entries disappear. A source that fails keeps its last good
//! indicators.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use super::types::{FeedError, FeedStats, SyncResult};

/// Reference set consulted for the zero-day determination
pub trait ThreatReference: Send + Sync {
    fn is_known_threat(&self, url: &str, host: &str) -> bool;
}

// ============================================================================
// THREAT FEED (data)
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct ThreatFeed {
    malicious_domains: HashSet<String>,
    malicious_urls: HashSet<String>,
    last_sync: Option<i64>,
}

impl ThreatFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse feed content. Lines with a scheme are URLs (their host is
    /// recorded too), anything else containing a dot is a domain.
    pub fn parse_feed(&mut self, content: &str) -> usize {
        let mut count = 0;

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            let entry = line.split_whitespace().next().unwrap_or(line).to_lowercase();

            if entry.starts_with("http://") || entry.starts_with("https://") {
                if let Some(domain) = extract_domain(&entry) {
                    self.malicious_domains.insert(domain);
                }
                self.malicious_urls.insert(normalize_url(&entry));
                count += 1;
            } else if entry.contains('.') {
                self.malicious_domains.insert(entry.trim_end_matches('.').to_string());
                count += 1;
            }
        }

        count
    }

    /// Absorb another feed's indicators
    pub fn merge(&mut self, other: ThreatFeed) {
        self.malicious_domains.extend(other.malicious_domains);
        self.malicious_urls.extend(other.malicious_urls);
    }

    /// Check if domain (or any parent domain) is listed
    pub fn is_malicious_domain(&self, domain: &str) -> bool {
        let domain_lower = domain.to_lowercase();
        let domain_lower = domain_lower.trim_end_matches('.');

        if domain_lower.is_empty() {
            return false;
        }

        if self.malicious_domains.contains(domain_lower) {
            return true;
        }

        let parts: Vec<&str> = domain_lower.split('.').collect();
        for i in 1..parts.len().saturating_sub(1) {
            let parent = parts[i..].join(".");
            if self.malicious_domains.contains(&parent) {
                return true;
            }
        }

        false
    }

    pub fn is_malicious_url(&self, url: &str) -> bool {
        self.malicious_urls.contains(&normalize_url(&url.trim().to_lowercase()))
    }

}

impl ThreatReference for ThreatFeed {
    fn is_known_threat(&self, url: &str, host: &str) -> bool {
        self.is_malicious_url(url) || self.is_malicious_domain(host)
    }
}

// ============================================================================
// THREAT INTEL SERVICE (sources + shared feed)
// ============================================================================

/// Where indicators come from
#[derive(Debug, Clone, Default)]
pub struct FeedSources {
    pub files: Vec<PathBuf>,
    pub urls: Vec<String>,
}

impl FeedSources {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.urls.is_empty()
    }

    fn len(&self) -> usize {
        self.files.len() + self.urls.len()
    }
}

pub struct ThreatIntel {
    feed: RwLock<ThreatFeed>,
    /// Last good parse of each source, keyed by path or URL
    by_source: Mutex<HashMap<String, ThreatFeed>>,
    sources: FeedSources,
    client: reqwest::Client,
    syncing: AtomicBool,
}

impl ThreatIntel {
    pub fn new(sources: FeedSources) -> Self {
        Self {
            feed: RwLock::new(ThreatFeed::new()),
            by_source: Mutex::new(HashMap::new()),
            sources,
            client: reqwest::Client::new(),
            syncing: AtomicBool::new(false),
        }
    }

    /// No sources; every phishing verdict counts as zero-day
    pub fn empty() -> Self {
        Self::new(FeedSources::default())
    }

    /// Build from an in-memory feed
    pub fn with_feed(feed: ThreatFeed) -> Self {
        let intel = Self::empty();
        *intel.feed.write() = feed;
        intel
    }

    /// Pull every source once and swap in the rebuilt set
    pub async fn sync_all(&self) -> Result<SyncResult, FeedError> {
        let _guard = SyncGuard::acquire(&self.syncing).ok_or(FeedError::SyncInProgress)?;

        let mut fetched: Vec<(String, ThreatFeed)> = Vec::new();
        let mut result = SyncResult::default();

        for path in &self.sources.files {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => {
                    let mut feed = ThreatFeed::new();
                    let count = feed.parse_feed(&content);
                    result.feeds_synced += 1;
                    result.total_indicators += count;
                    tracing::info!("Loaded {} indicators from {}", count, path.display());
                    fetched.push((path.display().to_string(), feed));
                }
                Err(source) => {
                    let err = FeedError::Io { path: path.display().to_string(), source };
                    tracing::warn!("{}", err);
                    result.errors.push(err.to_string());
                }
            }
        }

        for url in &self.sources.urls {
            match self.fetch(url).await {
                Ok(content) => {
                    let mut feed = ThreatFeed::new();
                    let count = feed.parse_feed(&content);
                    result.feeds_synced += 1;
                    result.total_indicators += count;
                    tracing::info!("Synced {} indicators from {}", count, url);
                    fetched.push((url.clone(), feed));
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    result.errors.push(err.to_string());
                }
            }
        }

        let mut combined = ThreatFeed::new();
        {
            let mut by_source = self.by_source.lock();
            by_source.extend(fetched);
            for feed in by_source.values() {
                combined.merge(feed.clone());
            }
        }
        combined.last_sync = Some(Utc::now().timestamp());

        *self.feed.write() = combined;

        result.success = result.errors.is_empty() || result.feeds_synced > 0;

        Ok(result)
    }

    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let http_err = |message: String| FeedError::Http { url: url.to_string(), message };

        let response = self.client
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| http_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| http_err(e.to_string()))?;

        response.text().await.map_err(|e| http_err(e.to_string()))
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn stats(&self) -> FeedStats {
        let feed = self.feed.read();
        FeedStats {
            total_domains: feed.malicious_domains.len(),
            total_urls: feed.malicious_urls.len(),
            last_sync: feed.last_sync,
            sources: self.sources.len(),
        }
    }
}

/// Clears the in-progress flag even if the sync future is dropped
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ThreatReference for ThreatIntel {
    fn is_known_threat(&self, url: &str, host: &str) -> bool {
        self.feed.read().is_known_threat(url, host)
    }
}

/// Re-sync on a fixed period. The first tick fires immediately.
pub fn spawn_refresh(intel: Arc<ThreatIntel>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match intel.sync_all().await {
                Ok(result) => tracing::debug!(
                    "Feed refresh: {} sources, {} indicators, {} errors",
                    result.feeds_synced, result.total_indicators, result.errors.len()
                ),
                Err(e) => tracing::warn!("Feed refresh skipped: {}", e),
            }
        }
    })
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Extract domain from URL
fn extract_domain(url: &str) -> Option<String> {
    let url = url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    let authority = url.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let domain = host.split(':').next()?; // Remove port

    if domain.is_empty() {
        None
    } else {
        Some(domain.to_lowercase())
    }
}

/// Trailing slash differences should not defeat a lookup
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# URLhaus style list
http://evil.example.net/login.php
https://Phish-Bank-Login.com/

// another comment
bad-domain.org
not_a_domain
";

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://evil.com/malware"), Some("evil.com".to_string()));
        assert_eq!(extract_domain("http://bad.site:8080/path"), Some("bad.site".to_string()));
        assert_eq!(extract_domain("http://user@host.io?x"), Some("host.io".to_string()));
        assert_eq!(extract_domain("ftp://x"), None);
    }

    #[test]
    fn test_parse_feed() {
        let mut feed = ThreatFeed::new();
        assert_eq!(feed.parse_feed(SAMPLE), 3);

        assert!(feed.is_malicious_url("http://evil.example.net/login.php"));
        assert!(feed.is_malicious_url("https://phish-bank-login.com"));
        assert!(feed.is_malicious_domain("phish-bank-login.com"));
        assert!(feed.is_malicious_domain("bad-domain.org"));
        assert!(!feed.is_malicious_domain("not_a_domain"));
    }

    #[test]
    fn test_domain_matching() {
        let mut feed = ThreatFeed::new();
        feed.malicious_domains.insert("evil.com".to_string());

        assert!(feed.is_malicious_domain("evil.com"));
        assert!(feed.is_malicious_domain("sub.evil.com"));
        assert!(feed.is_malicious_domain("EVIL.COM."));
        assert!(!feed.is_malicious_domain("notevil.com"));
        assert!(!feed.is_malicious_domain("com"));
        assert!(!feed.is_malicious_domain(""));
    }

    #[tokio::test]
    async fn test_sync_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("feed.txt");
        std::fs::write(&good, SAMPLE).unwrap();

        let intel = ThreatIntel::new(FeedSources {
            files: vec![good, dir.path().join("missing.txt")],
            urls: vec![],
        });

        let result = intel.sync_all().await.unwrap();
        assert!(result.success);
        assert_eq!(result.feeds_synced, 1);
        assert_eq!(result.total_indicators, 3);
        assert_eq!(result.errors.len(), 1);

        assert!(intel.is_known_threat("http://anything", "bad-domain.org"));
        let stats = intel.stats();
        assert_eq!(stats.sources, 2);
        assert!(stats.last_sync.is_some());
    }

    #[test]
    fn test_resync_drops_delisted_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.txt");
        std::fs::write(&path, "first.example\nhttp://kit.example/drop\n").unwrap();

        let intel = ThreatIntel::new(FeedSources { files: vec![path.clone()], urls: vec![] });
        tokio_test::block_on(intel.sync_all()).unwrap();
        assert!(intel.is_known_threat("", "first.example"));

        std::fs::write(&path, "second.example\n").unwrap();
        tokio_test::block_on(intel.sync_all()).unwrap();

        assert!(!intel.is_known_threat("", "first.example"));
        assert!(!intel.is_known_threat("http://kit.example/drop", ""));
        assert!(intel.is_known_threat("", "second.example"));
        assert_eq!(intel.stats().total_domains, 1);
        assert_eq!(intel.stats().total_urls, 0);
    }

    #[test]
    fn test_failed_source_keeps_last_good_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let stable = dir.path().join("stable.txt");
        let flaky = dir.path().join("flaky.txt");
        std::fs::write(&stable, "old-stable.example\n").unwrap();
        std::fs::write(&flaky, "flaky.example\n").unwrap();

        let intel = ThreatIntel::new(FeedSources {
            files: vec![stable.clone(), flaky.clone()],
            urls: vec![],
        });
        tokio_test::block_on(intel.sync_all()).unwrap();

        std::fs::write(&stable, "new-stable.example\n").unwrap();
        std::fs::remove_file(&flaky).unwrap();
        let result = tokio_test::block_on(intel.sync_all()).unwrap();

        assert_eq!(result.feeds_synced, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(intel.is_known_threat("", "flaky.example"));
        assert!(intel.is_known_threat("", "new-stable.example"));
        assert!(!intel.is_known_threat("", "old-stable.example"));
    }
}
