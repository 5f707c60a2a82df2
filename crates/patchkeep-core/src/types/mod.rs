//! Shared core types used across the cache, diff, and discovery layers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hex-encoded content digest used as a proxy for file identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Forward-slash path relative to the discovery root.
    pub path: String,
    pub fingerprint: Fingerprint,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, fingerprint: impl Into<Fingerprint>) -> Self {
        Self {
            path: path.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// Relative path → fingerprint for one discovery pass.
///
/// Backed by a `BTreeMap` so iteration and serialization are sorted by path
/// regardless of the order in which records were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap(BTreeMap<String, Fingerprint>);

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any previous fingerprint for the same path.
    pub fn insert(&mut self, record: FileRecord) -> Option<Fingerprint> {
        self.0.insert(record.path, record.fingerprint)
    }

    pub fn get(&self, path: &str) -> Option<&Fingerprint> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.0.iter().map(|(path, fp)| (path.as_str(), fp))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<FileRecord> for FileMap {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}
