//! Run configuration.
//!
//! Settings are read once at startup from `patchkeep.toml`, resolved against
//! the config file's directory, and then only ever passed by reference.

pub mod parser;
pub mod paths;
pub mod schema;

pub use parser::{load_settings, parse_settings_str};
pub use paths::InstallPaths;
pub use schema::{Settings, UnknownPlatformPolicy};

/// Version of the cache format and deploy semantics shipped in this build.
///
/// Bumping it invalidates every manifest written by an older build.
pub const FRAMEWORK_VERSION: u64 = 3;

/// Default config file name looked up in the working directory.
pub const SETTINGS_FILE: &str = "patchkeep.toml";
