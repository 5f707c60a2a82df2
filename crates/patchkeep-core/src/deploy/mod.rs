//! Deploy boundary: consumes a [`DiffResult`] and writes patch archives.
//!
//! The real deploy logic lives outside this crate. [`PlanDeployer`] is the
//! stand-in the CLI ships with; it records what would be deployed.

pub mod export;
pub mod plan;

use serde::{Deserialize, Serialize};

use crate::diff::DiffResult;
use crate::instrument::{Instrumentation, Span};

pub use export::{LAST_DEPLOY_FILE, export_last_deploy};
pub use plan::{PLAN_FILE, PlanDeployer};

/// What the deployer hands back for the optional state export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    #[serde(default)]
    pub last_server_side_states: serde_json::Value,
}

/// Applies a diff to the installation.
///
/// Called even when `diff` is empty so the implementation can finish its own
/// bookkeeping.
pub trait Deployer: Send + Sync {
    fn deploy(
        &self,
        span: &dyn Span,
        scope: &dyn Instrumentation,
        diff: &DiffResult,
    ) -> anyhow::Result<DeployOutcome>;
}
