//! Application context for unified dependency injection.

use std::sync::Arc;

use crate::cache::CacheManifestStore;
use crate::config::{InstallPaths, Settings};
use crate::deploy::PlanDeployer;
use crate::discovery::DirectoryDiscovery;
use crate::instrument::{Instrumentation, NoopInstrumentation, TracingInstrumentation};
use crate::platform::PlatformIdentityResolver;
use crate::slots::PatchSlotReclaimer;

/// Unified application context for dependency injection.
///
/// Built once from [`Settings`] at startup; every component gets its
/// configuration from here instead of reading global state.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
    paths: InstallPaths,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        let paths = InstallPaths::from_settings(&settings);
        Self { settings, paths }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn install_paths(&self) -> &InstallPaths {
        &self.paths
    }

    pub fn framework_version(&self) -> u64 {
        self.settings.framework_version()
    }

    pub fn platform_resolver(&self) -> PlatformIdentityResolver {
        PlatformIdentityResolver::new(self.settings.unknown_platform)
    }

    pub fn slot_reclaimer(&self) -> PatchSlotReclaimer {
        PatchSlotReclaimer::new(self.settings.runtime_path.clone())
    }

    pub fn cache_store(&self) -> CacheManifestStore {
        CacheManifestStore::new(self.settings.cache_dir.clone())
    }

    /// Default discovery over `mods_path`.
    pub fn directory_discovery(&self) -> DirectoryDiscovery {
        DirectoryDiscovery::new(self.settings.mods_path.clone())
    }

    /// Default deployer writing into `staging_dir`.
    pub fn plan_deployer(&self) -> PlanDeployer {
        PlanDeployer::new(self.settings.staging_dir.clone())
    }

    /// Reporting sink selected by `report_errors`.
    pub fn instrumentation(&self) -> Arc<dyn Instrumentation> {
        if self.settings.report_errors {
            Arc::new(TracingInstrumentation::new(
                self.settings.error_reporting_id.clone(),
            ))
        } else {
            Arc::new(NoopInstrumentation)
        }
    }
}
