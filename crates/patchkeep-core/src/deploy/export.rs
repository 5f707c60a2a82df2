//! `lastDeploy.json` export for external tooling.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DeployOutcome;
use crate::config::Settings;
use crate::error::{DeployError, Result};

pub const LAST_DEPLOY_FILE: &str = "lastDeploy.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LastDeploy<'a> {
    #[serde(flatten)]
    settings: &'a Settings,
    last_server_side_states: &'a serde_json::Value,
    deployed_at: DateTime<Utc>,
}

/// Write the settings and the deployer's server-side state into `dir`.
pub fn export_last_deploy(
    dir: &Path,
    settings: &Settings,
    outcome: &DeployOutcome,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DeployError::io(dir, e))?;

    let record = LastDeploy {
        settings,
        last_server_side_states: &outcome.last_server_side_states,
        deployed_at: Utc::now(),
    };
    let bytes = serde_json::to_vec(&record).map_err(|e| DeployError::Serialization {
        reason: e.to_string(),
    })?;

    let path = dir.join(LAST_DEPLOY_FILE);
    std::fs::write(&path, bytes).map_err(|e| DeployError::io(&path, e))?;
    Ok(path)
}
