//! Source discovery boundary.
//!
//! The sequencer only needs a [`FileMap`] from discovery. How mods are found
//! and what counts as a source file is up to the implementation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::fs::ContentHasher;
use crate::types::{FileMap, FileRecord};

/// Produces the current file map. Must have no side effects the core can see.
pub trait Discovery: Send + Sync {
    fn discover(&self) -> anyhow::Result<FileMap>;
}

/// Fingerprints every regular file under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryDiscovery {
    root: PathBuf,
}

impl DirectoryDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Discovery for DirectoryDiscovery {
    fn discover(&self) -> anyhow::Result<FileMap> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.with_context(|| {
                format!("Failed to read directory entry in {}", self.root.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .context("Failed to compute relative path")?
                .to_str()
                .with_context(|| format!("Non-UTF8 path: {}", entry.path().display()))?
                .replace('\\', "/");
            files.push((relative, entry.into_path()));
        }

        // Worker order is irrelevant: FileMap is sorted by path.
        let records = files
            .par_iter()
            .map(|(relative, full_path)| {
                ContentHasher::fingerprint_file(full_path)
                    .map(|fingerprint| FileRecord::new(relative.clone(), fingerprint))
                    .with_context(|| format!("Failed to hash {}", full_path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(records.into_iter().collect())
    }
}
