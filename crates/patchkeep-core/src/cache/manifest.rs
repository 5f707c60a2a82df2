//! Cache manifest recording the previous run's inputs.

use serde::{Deserialize, Serialize};

use crate::types::FileMap;

/// Name of the manifest file within the cache directory.
pub const MANIFEST_FILE: &str = "map.json";

/// The file map a deploy was computed from, and what it was computed against.
///
/// Always written and read as a whole; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub files: FileMap,

    #[serde(rename = "frameworkVersion")]
    pub framework_version: u64,

    /// Strong digest of the installation's identity file.
    #[serde(rename = "game")]
    pub game_identity: String,
}

impl CacheManifest {
    pub fn new(files: FileMap, framework_version: u64, game_identity: impl Into<String>) -> Self {
        Self {
            files,
            framework_version,
            game_identity: game_identity.into(),
        }
    }
}
