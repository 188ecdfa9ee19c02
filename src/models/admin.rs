//! Admin request/response models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::external_intel::FeedStats;
use crate::logic::features::LayoutInfo;
use crate::logic::model::{ArtifactHandle, RegistryStatus};
use crate::logic::threat::EngineStatsSnapshot;

/// Load a manifest from disk and make it current
#[derive(Debug, Deserialize, Validate)]
pub struct LoadModelRequest {
    #[validate(length(min = 1))]
    pub path: String,
    #[serde(default)]
    pub schema_version: Option<u8>,
}

impl LoadModelRequest {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.path.trim())
    }
}

/// Switch the current model to an already loaded version
#[derive(Debug, Deserialize, Validate)]
pub struct ActivateModelRequest {
    #[validate(length(min = 1))]
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ModelSwapResponse {
    pub version: String,
    pub checksum: String,
    pub loaded_at: i64,
}

impl From<ArtifactHandle> for ModelSwapResponse {
    fn from(handle: ArtifactHandle) -> Self {
        Self {
            version: handle.version,
            checksum: handle.checksum,
            loaded_at: handle.loaded_at.timestamp(),
        }
    }
}

/// Full service status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub environment: String,
    pub engine: EngineStatsSnapshot,
    pub registry: RegistryStatus,
    pub feeds: FeedStats,
    pub layout: LayoutInfo,
    pub heuristic_rules: String,
}
