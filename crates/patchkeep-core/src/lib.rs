//! Patchkeep Core Library
//!
//! Incremental deploy pipeline for content patches: platform fingerprinting,
//! patch slot reclamation, cache manifest validation, and file map diffing,
//! driven in a fixed phase order by [`orchestration::DeploymentSequencer`].

pub mod cache;
pub mod config;
pub mod context;
pub mod deploy;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod fs;
pub mod instrument;
pub mod orchestration;
pub mod platform;
pub mod slots;
pub mod types;

pub use error::{DeployError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{FRAMEWORK_VERSION, Settings, UnknownPlatformPolicy};
    pub use crate::context::AppContext;

    // Pipeline
    pub use crate::orchestration::{DeployReport, DeploymentSequencer, Phase};

    // Collaborators
    pub use crate::deploy::{DeployOutcome, Deployer};
    pub use crate::discovery::Discovery;
    pub use crate::instrument::{Instrumentation, NoopInstrumentation, Span};

    // Data
    pub use crate::diff::{ChangeKind, DiffResult};
    pub use crate::platform::PlatformIdentity;
    pub use crate::types::{FileMap, FileRecord, Fingerprint};

    pub use crate::error::DeployError;
}
