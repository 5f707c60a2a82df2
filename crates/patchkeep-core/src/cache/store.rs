//! Manifest persistence and invalidation.

use std::fs;
use std::path::{Path, PathBuf};

use super::manifest::{CacheManifest, MANIFEST_FILE};
use crate::error::{DeployError, Result};
use crate::fs::empty_dir;
use crate::types::FileMap;

/// Why a stored manifest can no longer be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationReason {
    /// Written by an older framework build.
    FrameworkUpgraded { stored: u64, current: u64 },
    /// Written against a different game build.
    GameChanged { stored: String, current: String },
}

/// Verdict on a stored manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    Keep,
    Discard(InvalidationReason),
}

/// Reads and writes `map.json` in the cache directory.
#[derive(Debug, Clone)]
pub struct CacheManifestStore {
    cache_dir: PathBuf,
}

impl CacheManifestStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join(MANIFEST_FILE)
    }

    /// Load the stored manifest.
    ///
    /// Returns `Ok(None)` when there is none. A manifest that exists but does
    /// not parse is reported as [`DeployError::Parse`] so the caller can
    /// decide to discard it.
    pub fn load(&self) -> Result<Option<CacheManifest>> {
        let path = self.manifest_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DeployError::io(&path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DeployError::Parse {
                path,
                reason: e.to_string(),
            })
    }

    /// Decide whether `manifest` can be diffed against.
    ///
    /// Reuse needs a framework version at least as new as the current one and
    /// the exact same game identity.
    pub fn validate(
        manifest: &CacheManifest,
        current_version: u64,
        current_identity: &str,
    ) -> CacheDecision {
        if manifest.framework_version < current_version {
            return CacheDecision::Discard(InvalidationReason::FrameworkUpgraded {
                stored: manifest.framework_version,
                current: current_version,
            });
        }
        if manifest.game_identity != current_identity {
            return CacheDecision::Discard(InvalidationReason::GameChanged {
                stored: manifest.game_identity.clone(),
                current: current_identity.to_string(),
            });
        }
        CacheDecision::Keep
    }

    /// Replace the stored manifest (write to a temp file, then rename).
    pub fn save(&self, files: &FileMap, framework_version: u64, game_identity: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| DeployError::io(&self.cache_dir, e))?;

        let manifest = CacheManifest::new(files.clone(), framework_version, game_identity);
        let bytes = serde_json::to_vec(&manifest).map_err(|e| DeployError::Serialization {
            reason: e.to_string(),
        })?;

        let path = self.manifest_path();
        let tmp_path = self
            .cache_dir
            .join(format!("{}.{}.tmp", MANIFEST_FILE, std::process::id()));
        fs::write(&tmp_path, bytes).map_err(|e| DeployError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| DeployError::io(&path, e))
    }

    /// Remove the manifest and every derived artifact next to it.
    pub fn discard(&self) -> Result<()> {
        empty_dir(&self.cache_dir)
    }
}
