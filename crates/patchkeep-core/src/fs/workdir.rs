//! Work directory helpers.

use std::fs;
use std::path::Path;

use crate::error::{DeployError, Result};

/// Ensure `dir` exists and contains nothing.
///
/// The directory itself is kept so handles and permissions on it survive.
pub fn empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(|e| DeployError::io(dir, e));
    }

    let entries = fs::read_dir(dir).map_err(|e| DeployError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DeployError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| DeployError::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| DeployError::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| DeployError::io(&path, e))?;
        }
    }
    Ok(())
}
