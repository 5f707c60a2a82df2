//! Installation path resolution helpers.

use std::path::{Path, PathBuf};

use super::Settings;

/// Archive whose presence under `Retail/Runtime` marks a packaged-store install.
pub const PACKAGED_MARKER: &str = "chunk0.rpkg";
/// Executable hashed for identity on standard installs.
pub const GAME_EXECUTABLE: &str = "HITMAN3.exe";
/// Store config hashed for identity on packaged installs (the executable is unreadable there).
pub const GAME_CONFIG: &str = "MicrosoftGame.Config";
/// File that must be writable on packaged installs.
pub const THUMBS_FILE: &str = "thumbs.dat";

/// Every installation file the pipeline probes, derived once from [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub runtime: PathBuf,
    pub retail: PathBuf,
}

impl InstallPaths {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            runtime: settings.runtime_path.clone(),
            retail: settings.retail_path(),
        }
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    pub fn packaged_marker(&self) -> PathBuf {
        self.retail.join("Runtime").join(PACKAGED_MARKER)
    }

    pub fn game_executable(&self) -> PathBuf {
        self.runtime.join("..").join("Retail").join(GAME_EXECUTABLE)
    }

    pub fn game_config(&self) -> PathBuf {
        self.retail.join("..").join(GAME_CONFIG)
    }

    pub fn thumbs(&self) -> PathBuf {
        self.retail.join(THUMBS_FILE)
    }
}
