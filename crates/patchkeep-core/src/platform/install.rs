//! Installation layout probe and preflight checks.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::InstallPaths;
use crate::error::{DeployError, Result};

const REREAD_INSTRUCTIONS: &str = "please re-read the installation instructions!";

/// How the game was installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Storefront install with a readable executable.
    Standard,
    /// Packaged-store install; identified through its config file.
    Packaged,
}

/// A validated installation and the file that identifies it.
#[derive(Debug, Clone)]
pub struct Installation {
    paths: InstallPaths,
    layout: Layout,
    identity_file: PathBuf,
}

impl Installation {
    /// Probe the installation layout and check every required file.
    ///
    /// Runs before any phase has side effects; every failure is a
    /// configuration error with a remediation hint.
    pub fn probe(paths: &InstallPaths) -> Result<Self> {
        if !paths.runtime().exists() {
            return Err(DeployError::configuration(
                "The Runtime folder couldn't be located",
                REREAD_INSTRUCTIONS,
            ));
        }

        let layout = if paths.packaged_marker().exists() {
            Layout::Packaged
        } else {
            Layout::Standard
        };

        let identity_file = match layout {
            Layout::Standard => {
                let executable = paths.game_executable();
                if !executable.exists() {
                    return Err(DeployError::configuration(
                        "HITMAN3.exe couldn't be located",
                        REREAD_INSTRUCTIONS,
                    ));
                }
                executable
            }
            Layout::Packaged => {
                let config = paths.game_config();
                if !config.exists() {
                    return Err(DeployError::configuration(
                        "The game config couldn't be located",
                        REREAD_INSTRUCTIONS,
                    ));
                }
                check_read_write(&paths.thumbs())?;
                config
            }
        };

        debug!(?layout, identity_file = %identity_file.display(), "Probed installation");

        Ok(Self {
            paths: paths.clone(),
            layout,
            identity_file,
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    /// File whose strong digest identifies both platform and game version.
    pub fn identity_file(&self) -> &Path {
        &self.identity_file
    }
}

fn check_read_write(path: &Path) -> Result<()> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map(|_| ())
        .map_err(|_| {
            DeployError::configuration(
                "thumbs.dat couldn't be accessed",
                "try running the mod manager as administrator!",
            )
        })
}
