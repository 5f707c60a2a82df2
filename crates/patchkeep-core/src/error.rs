//! Error types for the deploy pipeline.
//!
//! Everything that can stop a run ends up as a [`DeployError`]. Per-entry
//! cleanup failures inside slot reclamation never reach this type; they are
//! counted in the reclaim report instead.

use std::path::{Path, PathBuf};

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Fatal conditions that halt a deploy run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The installation or one of its required files is missing.
    #[error("{message}")]
    Configuration {
        message: String,
        hint: Option<String>,
    },

    /// A hash or file-system operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A settings or manifest file could not be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A value could not be serialized for writing.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// The installation digest is not in the known table and the policy denies it.
    #[error("unknown game version (digest {digest})")]
    UnknownPlatform { digest: String },

    /// The discovery collaborator failed.
    #[error("discovery failed: {reason}")]
    Discovery { reason: String },

    /// The deploy collaborator failed.
    #[error("deploy failed: {reason}")]
    Deploy { reason: String },
}

impl DeployError {
    pub fn configuration(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Remediation text shown to the operator below the error message.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Configuration { hint, .. } => hint.as_deref(),
            Self::UnknownPlatform { .. } => Some(
                "If the game has recently updated, the framework will need to be patched by its developers.",
            ),
            Self::Parse { .. } => Some("Fix or delete the file and run again."),
            _ => None,
        }
    }

    /// Whether the failure was detected before any phase had side effects.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::UnknownPlatform { .. })
    }
}
