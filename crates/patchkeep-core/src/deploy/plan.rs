//! Deployer that writes the diff out as a plan file.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use super::{DeployOutcome, Deployer};
use crate::diff::{ChangeKind, DiffResult};
use crate::instrument::{Instrumentation, Span};

pub const PLAN_FILE: &str = "plan.json";

#[derive(Debug, Clone)]
pub struct PlanDeployer {
    staging_dir: PathBuf,
}

impl PlanDeployer {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn plan_path(&self) -> PathBuf {
        self.staging_dir.join(PLAN_FILE)
    }
}

impl Deployer for PlanDeployer {
    fn deploy(
        &self,
        span: &dyn Span,
        scope: &dyn Instrumentation,
        diff: &DiffResult,
    ) -> anyhow::Result<DeployOutcome> {
        let child = span.start_child("write-plan");
        scope.configure_scope(child.as_ref());

        std::fs::create_dir_all(&self.staging_dir).with_context(|| {
            format!("Failed to create staging directory: {}", self.staging_dir.display())
        })?;
        let bytes = serde_json::to_vec_pretty(diff).context("Failed to serialize deploy plan")?;
        let path = self.plan_path();
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write deploy plan: {}", path.display()))?;

        info!(
            added = diff.count(ChangeKind::Added),
            changed = diff.count(ChangeKind::Changed),
            removed = diff.count(ChangeKind::Removed),
            plan = %path.display(),
            "Wrote deploy plan"
        );

        child.finish();
        scope.configure_scope(span);
        Ok(DeployOutcome::default())
    }
}
