//! Best-effort removal of patch archives owned by this tool.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::name::{SlotAction, SlotName, parse_slot_name};
use crate::error::{DeployError, Result};

/// Outcome of one reclaim pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Entry names that were deleted, sorted.
    pub removed: Vec<String>,
    /// Entries left in place because another owner governs them.
    pub kept: usize,
    /// Entries whose names did not fit either archive grammar.
    pub unparseable: usize,
    /// Entries that should have been deleted but could not be.
    pub failed: Vec<String>,
}

impl ReclaimReport {
    /// Number of entries that were skipped for a reason worth looking into.
    pub fn diagnostics(&self) -> usize {
        self.unparseable + self.failed.len()
    }
}

/// Clears this tool's slots out of the runtime directory before a deploy.
#[derive(Debug, Clone)]
pub struct PatchSlotReclaimer {
    runtime_dir: PathBuf,
}

impl PatchSlotReclaimer {
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
        }
    }

    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Delete every entry in an owned slot.
    ///
    /// Failing to list the directory is fatal. Anything that goes wrong with
    /// a single entry is counted in the report and skipped; a partly cleaned
    /// directory is still safe to deploy into.
    pub fn reclaim(&self) -> Result<ReclaimReport> {
        let entries =
            fs::read_dir(&self.runtime_dir).map_err(|e| DeployError::io(&self.runtime_dir, e))?;

        let mut report = ReclaimReport::default();
        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => names.push(entry.file_name()),
                Err(err) => {
                    warn!(error = %err, "Could not read runtime directory entry");
                    report.failed.push(String::from("<unreadable entry>"));
                }
            }
        }
        names.sort();

        for name in names {
            let Some(name) = name.to_str() else {
                report.unparseable += 1;
                continue;
            };

            let slot = parse_slot_name(name);
            if slot == SlotName::Unparseable {
                report.unparseable += 1;
                continue;
            }

            match slot.action() {
                SlotAction::Keep => report.kept += 1,
                SlotAction::Delete => {
                    let path = self.runtime_dir.join(name);
                    match fs::remove_file(&path) {
                        Ok(()) => {
                            debug!(file = name, "Removed patch file");
                            report.removed.push(name.to_string());
                        }
                        Err(err) => {
                            warn!(file = name, error = %err, "Could not remove patch file");
                            report.failed.push(name.to_string());
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
