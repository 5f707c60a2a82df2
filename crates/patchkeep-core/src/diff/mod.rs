//! Change detection between the previous and the current file map.
//!
//! Every path that needs the deploy collaborator's attention lands in
//! `invalid_data`. Removed sources land there too, tagged with their own
//! [`ChangeKind`] so the deployer can retract their output instead of
//! regenerating it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::FileMap;

/// Why a path is in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present now, absent before.
    Added,
    /// Present in both with different fingerprints.
    Changed,
    /// Present before, absent now.
    Removed,
}

/// Paths that require redeployment, with the reason for each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub invalid_data: BTreeSet<String>,
    pub reasons: BTreeMap<String, ChangeKind>,
}

impl DiffResult {
    /// An empty result still goes to the deployer; it means "nothing to do".
    pub fn is_empty(&self) -> bool {
        self.invalid_data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.invalid_data.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.invalid_data.contains(path)
    }

    pub fn reason(&self, path: &str) -> Option<ChangeKind> {
        self.reasons.get(path).copied()
    }

    /// Paths with the given reason, in path order.
    pub fn with_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &str> {
        self.reasons
            .iter()
            .filter(move |(_, k)| **k == kind)
            .map(|(path, _)| path.as_str())
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.with_kind(kind).count()
    }

    fn record(&mut self, path: &str, kind: ChangeKind) {
        self.invalid_data.insert(path.to_string());
        self.reasons.insert(path.to_string(), kind);
    }
}

/// Compare two file maps. Pure and order-independent.
pub fn diff(previous: &FileMap, current: &FileMap) -> DiffResult {
    let mut result = DiffResult::default();

    for (path, fingerprint) in current.iter() {
        match previous.get(path) {
            Some(old) if old == fingerprint => {}
            Some(_) => result.record(path, ChangeKind::Changed),
            None => result.record(path, ChangeKind::Added),
        }
    }

    for path in previous.paths().filter(|path| !current.contains(path)) {
        result.record(path, ChangeKind::Removed);
    }

    result
}
