//! External Intelligence Module - threat intelligence reference set
//!
//! # Components
//! - `threat_feed.rs`: known-bad URL/domain feeds (files and remote lists)
//! - `types.rs`: error, sync result and stats types

pub mod threat_feed;
pub mod types;

pub use threat_feed::{spawn_refresh, FeedSources, ThreatFeed, ThreatIntel, ThreatReference};
pub use types::{FeedError, FeedStats, SyncResult};
