//! Model Registry
//!
//! Owns every loaded artifact and the pointer to the active one.
//!
//! Writers (`load`, `activate`, `unload`) are serialized by `writer`. All
//! file I/O and classifier construction happen before `state` is touched;
//! publication is a pointer swap under a briefly held write lock. Readers
//! clone an `Arc` under the read lock and never wait on I/O, so they see
//! either the old artifact or the new one, never a partial one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use super::artifact::{ArtifactHandle, ModelArtifact, ModelMetadata};
use super::error::{ModelLoadError, ModelNotFound};

#[derive(Default)]
struct RegistryState {
    artifacts: HashMap<String, Arc<ModelArtifact>>,
    current: Option<Arc<ModelArtifact>>,
    last_path: Option<PathBuf>,
    last_error: Option<String>,
    swap_count: u64,
}

/// Serializable registry summary
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub model_loaded: bool,
    pub current: Option<ModelMetadata>,
    pub loaded_versions: Vec<String>,
    pub last_error: Option<String>,
    pub swap_count: u64,
}

#[derive(Default)]
pub struct ModelRegistry {
    state: RwLock<RegistryState>,
    writer: Mutex<()>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest, validate it, and make it the current model
    pub fn load(&self, path: impl AsRef<Path>, schema_version: u8) -> Result<ArtifactHandle, ModelLoadError> {
        let path = path.as_ref();
        let _writer = self.writer.lock();

        tracing::info!("Loading model manifest from: {}", path.display());

        match ModelArtifact::load(path, schema_version) {
            Ok(artifact) => {
                let handle = self.publish(Arc::new(artifact));
                self.state.write().last_path = Some(path.to_path_buf());
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!("Model load failed ({}), keeping previous state", e);
                self.state.write().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-load the last successfully loaded manifest, or `fallback` when
    /// nothing has been loaded yet
    pub fn reload(&self, fallback: Option<&Path>, schema_version: u8) -> Result<ArtifactHandle, ModelLoadError> {
        let path = self.last_path()
            .or_else(|| fallback.map(Path::to_path_buf))
            .ok_or(ModelLoadError::NoSource)?;
        self.load(path, schema_version)
    }

    /// Publish an already-built artifact as current
    pub fn install(&self, artifact: ModelArtifact) -> ArtifactHandle {
        let _writer = self.writer.lock();
        self.publish(Arc::new(artifact))
    }

    fn publish(&self, artifact: Arc<ModelArtifact>) -> ArtifactHandle {
        let handle = artifact.handle();

        {
            let mut state = self.state.write();
            state.artifacts.insert(handle.version.clone(), Arc::clone(&artifact));
            state.current = Some(artifact);
            state.last_error = None;
            state.swap_count += 1;
        }

        tracing::info!("Model {} is now current ({})", handle.version, handle.checksum);
        handle
    }

    pub fn get(&self, version: &str) -> Result<Arc<ModelArtifact>, ModelNotFound> {
        self.state.read()
            .artifacts
            .get(version)
            .cloned()
            .ok_or_else(|| ModelNotFound(version.to_string()))
    }

    pub fn current(&self) -> Option<Arc<ModelArtifact>> {
        self.state.read().current.clone()
    }

    /// Hot-swap to a previously loaded version
    pub fn activate(&self, version: &str) -> Result<ArtifactHandle, ModelNotFound> {
        let _writer = self.writer.lock();
        let artifact = self.get(version)?;
        let handle = artifact.handle();

        {
            let mut state = self.state.write();
            state.current = Some(artifact);
            state.swap_count += 1;
        }

        tracing::info!("Activated model {}", version);
        Ok(handle)
    }

    /// Drop a version. In-flight holders keep their `Arc` until done.
    pub fn unload(&self, version: &str) -> Result<(), ModelNotFound> {
        let _writer = self.writer.lock();
        let mut state = self.state.write();

        state.artifacts
            .remove(version)
            .ok_or_else(|| ModelNotFound(version.to_string()))?;

        if state.current.as_ref().is_some_and(|c| c.version() == version) {
            state.current = None;
            tracing::warn!("Unloaded current model {}, classification is heuristic-only", version);
        } else {
            tracing::info!("Unloaded model {}", version);
        }

        Ok(())
    }

    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.state.read().artifacts.keys().cloned().collect();
        versions.sort();
        versions
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.state.read().last_path.clone()
    }

    pub fn status(&self) -> RegistryStatus {
        let state = self.state.read();
        let mut loaded_versions: Vec<String> = state.artifacts.keys().cloned().collect();
        loaded_versions.sort();

        RegistryStatus {
            model_loaded: state.current.is_some(),
            current: state.current.as_ref().map(|a| a.metadata().clone()),
            loaded_versions,
            last_error: state.last_error.clone(),
            swap_count: state.swap_count,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
