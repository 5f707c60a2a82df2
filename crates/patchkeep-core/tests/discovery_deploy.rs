use std::fs;

use patchkeep_core::config::Settings;
use patchkeep_core::deploy::{DeployOutcome, Deployer, PlanDeployer, export_last_deploy};
use patchkeep_core::diff::{ChangeKind, DiffResult, diff};
use patchkeep_core::discovery::{DirectoryDiscovery, Discovery};
use patchkeep_core::fs::ContentHasher;
use patchkeep_core::instrument::{Instrumentation, RecordedEvent, RecordingInstrumentation};
use patchkeep_core::types::{FileMap, FileRecord};
use tempfile::TempDir;

#[test]
fn directory_discovery_maps_relative_paths_to_content_hashes() {
    let temp = TempDir::new().unwrap();
    let mods = temp.path().join("Mods");
    fs::create_dir_all(mods.join("outfits/blue")).unwrap();
    fs::write(mods.join("manifest.json"), b"{}").unwrap();
    fs::write(mods.join("outfits/blue/suit.json"), b"blue").unwrap();

    let files = DirectoryDiscovery::new(&mods).discover().unwrap();

    assert_eq!(
        files.paths().collect::<Vec<_>>(),
        vec!["manifest.json", "outfits/blue/suit.json"]
    );
    assert_eq!(
        files.get("outfits/blue/suit.json"),
        Some(&ContentHasher::fingerprint(b"blue"))
    );
}

#[test]
fn directory_discovery_fails_for_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = DirectoryDiscovery::new(temp.path().join("Mods"))
        .discover()
        .unwrap_err();
    assert!(format!("{err:#}").contains("Mods"));
}

#[test]
fn editing_a_source_flags_only_that_file() {
    let temp = TempDir::new().unwrap();
    let mods = temp.path().join("Mods");
    fs::create_dir_all(&mods).unwrap();
    fs::write(mods.join("a.json"), b"one").unwrap();
    fs::write(mods.join("b.json"), b"two").unwrap();
    let discovery = DirectoryDiscovery::new(&mods);

    let before = discovery.discover().unwrap();
    fs::write(mods.join("b.json"), b"three").unwrap();
    fs::remove_file(mods.join("a.json")).unwrap();
    let after = discovery.discover().unwrap();

    let result = diff(&before, &after);
    assert_eq!(result.reason("b.json"), Some(ChangeKind::Changed));
    assert_eq!(result.reason("a.json"), Some(ChangeKind::Removed));
    assert_eq!(result.len(), 2);
    assert!(diff(&after, &after).is_empty());
}

#[test]
fn plan_deployer_writes_the_diff_to_staging() {
    let temp = TempDir::new().unwrap();
    let deployer = PlanDeployer::new(temp.path().join("staging"));
    let recording = RecordingInstrumentation::new();
    let root = recording.start_transaction("deploy", "Deploy");
    let result = diff(&FileMap::new(), &two_files());

    let outcome = deployer
        .deploy(root.as_ref(), &recording, &result)
        .unwrap();

    assert_eq!(outcome, DeployOutcome::default());
    let written: DiffResult =
        serde_json::from_slice(&fs::read(deployer.plan_path()).unwrap()).unwrap();
    assert_eq!(written, result);
    assert!(recording.events().contains(&RecordedEvent::Started {
        op: "write-plan".to_string(),
        parent: Some("deploy".to_string()),
    }));
}

#[test]
fn last_deploy_export_includes_settings_and_states() {
    let temp = TempDir::new().unwrap();
    let settings = Settings::new("/games/H3/Runtime");
    let outcome = DeployOutcome {
        last_server_side_states: serde_json::json!({ "contracts": ["a"] }),
    };

    let path = export_last_deploy(temp.path(), &settings, &outcome).unwrap();

    let raw: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    assert_eq!(raw["runtime_path"], "/games/H3/Runtime");
    assert_eq!(raw["lastServerSideStates"]["contracts"][0], "a");
}

fn two_files() -> FileMap {
    let mut files = FileMap::new();
    files.insert(FileRecord::new("x.json", "aa"));
    files.insert(FileRecord::new("y.json", "bb"));
    files
}
