//! Persisted cache state between runs.
//!
//! The cache directory holds `map.json` (the [`CacheManifest`]) and anything
//! else later phases derive from it. It is owned entirely by this tool and
//! is wiped as a whole when the manifest stops being trustworthy.

pub mod manifest;
pub mod store;

pub use manifest::{CacheManifest, MANIFEST_FILE};
pub use store::{CacheDecision, CacheManifestStore, InvalidationReason};
