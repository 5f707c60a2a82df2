//! Configuration schema for patchkeep.toml

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

use super::FRAMEWORK_VERSION;

/// What to do when the installation digest is not in the known table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPlatformPolicy {
    /// Log a warning and keep going with an unresolved identity.
    #[default]
    Allow,
    /// Fail the run before any slot is touched.
    Deny,
}

/// Root configuration structure for patchkeep.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The game's `Runtime` directory holding the archive chunks.
    pub runtime_path: PathBuf,

    /// The game's `Retail` directory (defaults to `runtime_path/..`).
    #[serde(default)]
    pub retail_path: Option<PathBuf>,

    /// Root scanned for source mod files.
    #[serde(default = "default_mods_path")]
    pub mods_path: PathBuf,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Route spans and failures to the reporting sink.
    #[serde(default)]
    pub report_errors: bool,

    /// Identifier attached to reported spans.
    #[serde(default)]
    pub error_reporting_id: Option<String>,

    /// Write `lastDeploy.json` after a successful run.
    #[serde(default)]
    pub output_state_on_deploy: bool,

    /// Where `lastDeploy.json` goes (defaults to the local data directory).
    #[serde(default)]
    pub state_export_dir: Option<PathBuf>,

    #[serde(default)]
    pub unknown_platform: UnknownPlatformPolicy,

    #[serde(skip, default = "default_framework_version")]
    framework_version: u64,
}

fn default_mods_path() -> PathBuf {
    PathBuf::from("Mods")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("staging")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_framework_version() -> u64 {
    FRAMEWORK_VERSION
}

impl Settings {
    /// Settings with defaults for everything but the runtime path.
    pub fn new(runtime_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime_path: runtime_path.into(),
            retail_path: None,
            mods_path: default_mods_path(),
            cache_dir: default_cache_dir(),
            staging_dir: default_staging_dir(),
            temp_dir: default_temp_dir(),
            report_errors: false,
            error_reporting_id: None,
            output_state_on_deploy: false,
            state_export_dir: None,
            unknown_platform: UnknownPlatformPolicy::default(),
            framework_version: FRAMEWORK_VERSION,
        }
    }

    /// Re-root every work directory under `base`.
    pub fn with_work_root(mut self, base: &Path) -> Self {
        self.mods_path = base.join("Mods");
        self.cache_dir = base.join("cache");
        self.staging_dir = base.join("staging");
        self.temp_dir = base.join("temp");
        self
    }

    pub fn with_retail_path(mut self, retail_path: impl Into<PathBuf>) -> Self {
        self.retail_path = Some(retail_path.into());
        self
    }

    pub fn with_unknown_platform(mut self, policy: UnknownPlatformPolicy) -> Self {
        self.unknown_platform = policy;
        self
    }

    pub fn with_state_export(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_state_on_deploy = true;
        self.state_export_dir = Some(dir.into());
        self
    }

    /// Override the build's framework version (tests only need this).
    pub fn with_framework_version(mut self, version: u64) -> Self {
        self.framework_version = version;
        self
    }

    pub fn framework_version(&self) -> u64 {
        self.framework_version
    }

    pub fn retail_path(&self) -> PathBuf {
        self.retail_path
            .clone()
            .unwrap_or_else(|| self.runtime_path.join(".."))
    }

    pub fn state_export_dir(&self) -> Option<PathBuf> {
        self.state_export_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("patchkeep")))
    }

    /// Make every relative path absolute against `base`.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.runtime_path);
        if let Some(retail) = self.retail_path.as_mut() {
            resolve(retail);
        }
        resolve(&mut self.mods_path);
        resolve(&mut self.cache_dir);
        resolve(&mut self.staging_dir);
        resolve(&mut self.temp_dir);
        if let Some(export) = self.state_export_dir.as_mut() {
            resolve(export);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.runtime_path.as_os_str().is_empty() {
            return Err(DeployError::configuration(
                "runtime_path is empty",
                "Set runtime_path in patchkeep.toml to the game's Runtime folder.",
            ));
        }

        // Work directories are emptied wholesale during a run.
        let work = [
            ("cache_dir", normalize(&self.cache_dir)),
            ("staging_dir", normalize(&self.staging_dir)),
            ("temp_dir", normalize(&self.temp_dir)),
        ];
        for (i, (name, dir)) in work.iter().enumerate() {
            if let Some((other, _)) = work[i + 1..].iter().find(|(_, o)| overlaps(dir, o)) {
                return Err(DeployError::configuration(
                    format!("{name} overlaps {other}"),
                    "Every work directory is emptied during a deploy; give each its own folder.",
                ));
            }
        }

        let protected = [
            ("mods_path", normalize(&self.mods_path)),
            ("runtime_path", normalize(&self.runtime_path)),
            ("retail_path", normalize(&self.retail_path())),
        ];
        for (name, dir) in &work {
            if let Some((other, _)) = protected.iter().find(|(_, p)| overlaps(dir, p)) {
                return Err(DeployError::configuration(
                    format!("{name} overlaps {other}"),
                    format!("{name} is emptied during a deploy; move it out of {other}."),
                ));
            }
        }
        Ok(())
    }
}

/// Lexically resolve `.` and `..` so paths can be compared by component.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether one path equals or contains the other.
fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retail_path_defaults_to_runtime_parent() {
        let settings = Settings::new("/games/H3/Runtime");
        assert_eq!(settings.retail_path(), PathBuf::from("/games/H3/Runtime/.."));

        let settings = settings.with_retail_path("/games/H3/Retail");
        assert_eq!(settings.retail_path(), PathBuf::from("/games/H3/Retail"));
    }

    #[test]
    fn test_resolve_relative_keeps_absolute_paths() {
        let settings = Settings::new("/games/H3/Runtime").resolve_relative_to(Path::new("/smf"));
        assert_eq!(settings.runtime_path, PathBuf::from("/games/H3/Runtime"));
        assert_eq!(settings.cache_dir, PathBuf::from("/smf/cache"));
        assert_eq!(settings.staging_dir, PathBuf::from("/smf/staging"));
        assert_eq!(settings.mods_path, PathBuf::from("/smf/Mods"));
    }

    #[test]
    fn test_validate_rejects_shared_cache_dir() {
        let mut settings = Settings::new("/games/H3/Runtime");
        settings.staging_dir = settings.cache_dir.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_work_dirs_inside_game_or_mods() {
        let base = Settings::new("/g/Runtime").resolve_relative_to(Path::new("/smf"));
        assert!(base.validate().is_ok());

        let mut settings = base.clone();
        settings.staging_dir = settings.mods_path.clone();
        assert!(settings.validate().is_err());

        let mut settings = base.clone();
        settings.cache_dir = PathBuf::from("/g/Runtime/cache");
        assert!(settings.validate().is_err());

        // The default retail path is the runtime's parent.
        let mut settings = base.clone();
        settings.temp_dir = PathBuf::from("/g/Runtime/../temp");
        assert!(settings.validate().is_err());

        let mut settings = base;
        settings.temp_dir = settings.staging_dir.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_normalize_resolves_parent_components() {
        assert_eq!(normalize(Path::new("/g/Runtime/../Retail")), PathBuf::from("/g/Retail"));
        assert_eq!(normalize(Path::new("./a/./b")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_framework_version_override() {
        let settings = Settings::new("/r").with_framework_version(99);
        assert_eq!(settings.framework_version(), 99);
        assert_eq!(Settings::new("/r").framework_version(), FRAMEWORK_VERSION);
    }
}
