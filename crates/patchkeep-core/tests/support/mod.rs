#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::bail;
use patchkeep_core::config::Settings;
use patchkeep_core::deploy::{DeployOutcome, Deployer};
use patchkeep_core::diff::DiffResult;
use patchkeep_core::discovery::Discovery;
use patchkeep_core::instrument::{Instrumentation, Span};
use patchkeep_core::types::{FileMap, FileRecord};
use tempfile::TempDir;

/// md5("hello world"); not a known game build.
pub const HELLO_WORLD_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

/// A standard-layout installation plus work directories in a temp dir.
///
/// ```text
/// <tmp>/Game/Runtime/
/// <tmp>/Game/Retail/HITMAN3.exe
/// <tmp>/work/{Mods,cache,staging,temp}
/// ```
pub struct Install {
    pub temp: TempDir,
    pub runtime: PathBuf,
    pub work: PathBuf,
}

impl Install {
    pub fn standard() -> Self {
        let temp = TempDir::new().unwrap();
        let runtime = temp.path().join("Game").join("Runtime");
        let retail = temp.path().join("Game").join("Retail");
        fs::create_dir_all(&runtime).unwrap();
        fs::create_dir_all(&retail).unwrap();
        fs::write(retail.join("HITMAN3.exe"), b"hello world").unwrap();
        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        Self {
            temp,
            runtime,
            work,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::new(&self.runtime).with_work_root(&self.work)
    }

    pub fn touch_runtime(&self, names: &[&str]) {
        for name in names {
            fs::write(self.runtime.join(name), b"archive").unwrap();
        }
    }

    pub fn runtime_entries(&self) -> Vec<String> {
        list(&self.runtime)
    }
}

pub fn list(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn file_map(entries: &[(&str, &str)]) -> FileMap {
    entries
        .iter()
        .map(|(path, fp)| FileRecord::new(*path, *fp))
        .collect()
}

/// Discovery that returns a fixed map, or fails.
pub struct StaticDiscovery {
    files: Option<FileMap>,
}

impl StaticDiscovery {
    pub fn new(files: FileMap) -> Self {
        Self { files: Some(files) }
    }

    pub fn failing() -> Self {
        Self { files: None }
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> anyhow::Result<FileMap> {
        match &self.files {
            Some(files) => Ok(files.clone()),
            None => bail!("mods folder is unreadable"),
        }
    }
}

/// Deployer that remembers every diff it was handed.
#[derive(Default)]
pub struct CapturingDeployer {
    pub calls: Mutex<Vec<DiffResult>>,
    pub fail: bool,
}

impl CapturingDeployer {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<DiffResult> {
        self.calls.lock().unwrap().clone()
    }
}

impl Deployer for CapturingDeployer {
    fn deploy(
        &self,
        span: &dyn Span,
        _scope: &dyn Instrumentation,
        diff: &DiffResult,
    ) -> anyhow::Result<DeployOutcome> {
        self.calls.lock().unwrap().push(diff.clone());
        if self.fail {
            bail!("packing failed in span {}", span.op());
        }
        Ok(DeployOutcome {
            last_server_side_states: serde_json::json!({ "unlockables": 3 }),
        })
    }
}
