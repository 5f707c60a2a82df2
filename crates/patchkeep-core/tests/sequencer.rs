mod support;

use std::fs;

use patchkeep_core::DeployError;
use patchkeep_core::cache::{CacheManifestStore, InvalidationReason};
use patchkeep_core::config::UnknownPlatformPolicy;
use patchkeep_core::context::AppContext;
use patchkeep_core::deploy::LAST_DEPLOY_FILE;
use patchkeep_core::diff::ChangeKind;
use patchkeep_core::instrument::{NoopInstrumentation, RecordedEvent, RecordingInstrumentation};
use patchkeep_core::orchestration::{CacheStatus, DeploymentSequencer, Phase};
use support::{CapturingDeployer, HELLO_WORLD_MD5, Install, StaticDiscovery, file_map};

const ALL_PHASES: [Phase; 9] = [
    Phase::Init,
    Phase::PlatformDetect,
    Phase::ReclaimSlots,
    Phase::Discover,
    Phase::CacheValidate,
    Phase::Diff,
    Phase::Deploy,
    Phase::PersistCache,
    Phase::Done,
];

#[test]
fn first_run_deploys_everything_and_persists_manifest() {
    let install = Install::standard();
    install.touch_runtime(&["chunk0.rpkg", "chunk0patch200.rpkg", "chunk0patch5.rpkg"]);
    let ctx = AppContext::new(install.settings());
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "01"), ("b/c.png", "02")]));
    let deployer = CapturingDeployer::default();

    let mut sequencer = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation);
    let report = sequencer.run().unwrap();

    assert_eq!(sequencer.phase(), Phase::Done);
    assert_eq!(sequencer.history(), ALL_PHASES);
    assert_eq!(report.cache, CacheStatus::Missing);
    assert_eq!(report.files, 2);
    assert_eq!(report.diff.count(ChangeKind::Added), 2);
    assert_eq!(report.reclaim.removed, vec!["chunk0patch200.rpkg"]);
    assert_eq!(
        install.runtime_entries(),
        vec!["chunk0.rpkg", "chunk0patch5.rpkg"]
    );

    let calls = deployer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], report.diff);

    let manifest = ctx.cache_store().load().unwrap().unwrap();
    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.framework_version, ctx.framework_version());
    assert_eq!(manifest.game_identity, HELLO_WORLD_MD5);
}

#[test]
fn unchanged_rerun_still_calls_deployer_with_empty_diff() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "01")]));

    let first = CapturingDeployer::default();
    DeploymentSequencer::new(&ctx, &discovery, &first, &NoopInstrumentation)
        .run()
        .unwrap();

    let second = CapturingDeployer::default();
    let report = DeploymentSequencer::new(&ctx, &discovery, &second, &NoopInstrumentation)
        .run()
        .unwrap();

    assert_eq!(report.cache, CacheStatus::Reused);
    assert!(report.diff.is_empty());
    let calls = second.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_empty());
}

#[test]
fn rerun_only_flags_changed_and_removed_files() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    ctx.cache_store()
        .save(
            &file_map(&[("keep", "1"), ("edit", "2"), ("drop", "3")]),
            ctx.framework_version(),
            HELLO_WORLD_MD5,
        )
        .unwrap();
    let discovery = StaticDiscovery::new(file_map(&[("keep", "1"), ("edit", "9"), ("new", "4")]));
    let deployer = CapturingDeployer::default();

    let report = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    assert_eq!(report.cache, CacheStatus::Reused);
    assert!(!report.diff.contains("keep"));
    assert_eq!(report.diff.reason("edit"), Some(ChangeKind::Changed));
    assert_eq!(report.diff.reason("new"), Some(ChangeKind::Added));
    assert_eq!(report.diff.reason("drop"), Some(ChangeKind::Removed));

    let manifest = ctx.cache_store().load().unwrap().unwrap();
    assert!(!manifest.files.contains("drop"));
    assert!(manifest.files.contains("new"));
}

#[test]
fn framework_upgrade_discards_cache() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings().with_framework_version(3));
    let store = ctx.cache_store();
    store
        .save(&file_map(&[("a.json", "01")]), 2, HELLO_WORLD_MD5)
        .unwrap();
    fs::write(store.cache_dir().join("stale.bin"), b"x").unwrap();
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "01")]));
    let deployer = CapturingDeployer::default();

    let report = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    assert_eq!(
        report.cache,
        CacheStatus::Discarded(InvalidationReason::FrameworkUpgraded {
            stored: 2,
            current: 3
        })
    );
    assert_eq!(report.diff.reason("a.json"), Some(ChangeKind::Added));
    assert!(!store.cache_dir().join("stale.bin").exists());
    assert_eq!(store.load().unwrap().unwrap().framework_version, 3);
}

#[test]
fn game_update_discards_cache() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    ctx.cache_store()
        .save(&file_map(&[("a.json", "01")]), ctx.framework_version(), "older-build")
        .unwrap();
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "01")]));
    let deployer = CapturingDeployer::default();

    let report = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    assert!(matches!(
        report.cache,
        CacheStatus::Discarded(InvalidationReason::GameChanged { .. })
    ));
    assert_eq!(report.diff.len(), 1);
    assert_eq!(
        ctx.cache_store().load().unwrap().unwrap().game_identity,
        HELLO_WORLD_MD5
    );
}

#[test]
fn corrupt_manifest_is_discarded_and_run_continues() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    let store: CacheManifestStore = ctx.cache_store();
    fs::create_dir_all(store.cache_dir()).unwrap();
    fs::write(store.manifest_path(), b"[truncated").unwrap();
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "01")]));
    let deployer = CapturingDeployer::default();

    let report = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    assert_eq!(report.cache, CacheStatus::Corrupt);
    assert_eq!(report.diff.len(), 1);
    assert!(store.load().unwrap().is_some());
}

#[test]
fn deploy_failure_keeps_previous_manifest_and_reports_once() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    ctx.cache_store()
        .save(&file_map(&[("a.json", "01")]), ctx.framework_version(), HELLO_WORLD_MD5)
        .unwrap();
    let discovery = StaticDiscovery::new(file_map(&[("a.json", "02")]));
    let deployer = CapturingDeployer::failing();
    let recording = RecordingInstrumentation::new();

    let mut sequencer = DeploymentSequencer::new(&ctx, &discovery, &deployer, &recording);
    let err = sequencer.run().unwrap_err();

    assert!(matches!(err, DeployError::Deploy { .. }));
    assert!(err.to_string().contains("packing failed"));
    assert_eq!(sequencer.phase(), Phase::Failed);
    assert_eq!(
        sequencer.history().last().copied(),
        Some(Phase::Failed)
    );
    assert!(!sequencer.history().contains(&Phase::PersistCache));
    assert_eq!(recording.reports().len(), 1);

    let manifest = ctx.cache_store().load().unwrap().unwrap();
    assert_eq!(manifest.files, file_map(&[("a.json", "01")]));
}

#[test]
fn discovery_failure_stops_before_deploy() {
    let install = Install::standard();
    install.touch_runtime(&["chunk1patch201.rpkg"]);
    let ctx = AppContext::new(install.settings());
    let discovery = StaticDiscovery::failing();
    let deployer = CapturingDeployer::default();

    let mut sequencer = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation);
    let err = sequencer.run().unwrap_err();

    assert!(matches!(err, DeployError::Discovery { .. }));
    assert!(deployer.calls().is_empty());
    assert_eq!(
        sequencer.history(),
        [
            Phase::Init,
            Phase::PlatformDetect,
            Phase::ReclaimSlots,
            Phase::Discover,
            Phase::Failed,
        ]
    );
    assert!(install.runtime_entries().is_empty());
}

#[test]
fn denied_platform_leaves_runtime_untouched() {
    let install = Install::standard();
    install.touch_runtime(&["chunk0patch250.rpkg"]);
    let settings = install
        .settings()
        .with_unknown_platform(UnknownPlatformPolicy::Deny);
    let ctx = AppContext::new(settings);
    let discovery = StaticDiscovery::new(file_map(&[]));
    let deployer = CapturingDeployer::default();

    let mut sequencer = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation);
    let err = sequencer.run().unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(
        sequencer.history(),
        [Phase::Init, Phase::PlatformDetect, Phase::Failed]
    );
    assert_eq!(install.runtime_entries(), vec!["chunk0patch250.rpkg"]);
}

#[test]
fn spans_follow_phase_order() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    let discovery = StaticDiscovery::new(file_map(&[("a", "1")]));
    let deployer = CapturingDeployer::default();
    let recording = RecordingInstrumentation::new();

    DeploymentSequencer::new(&ctx, &discovery, &deployer, &recording)
        .run()
        .unwrap();

    assert_eq!(
        recording.started_ops(),
        vec![
            "deploy",
            "init",
            "platform-detect",
            "reclaim-slots",
            "discover",
            "cache-validate",
            "diff",
            "deploy",
            "persist-cache",
        ]
    );
    // Root span closes last.
    assert_eq!(recording.finished_ops().last().map(String::as_str), Some("deploy"));
    assert_eq!(recording.finished_ops().len(), 9);
    assert!(recording.events().contains(&RecordedEvent::Tag {
        key: "game_hash".to_string(),
        value: HELLO_WORLD_MD5.to_string(),
    }));
    assert!(recording.reports().is_empty());
}

#[test]
fn work_directories_are_emptied_before_discovery() {
    let install = Install::standard();
    let settings = install.settings();
    fs::create_dir_all(&settings.staging_dir).unwrap();
    fs::write(settings.staging_dir.join("leftover.rpkg"), b"x").unwrap();
    let ctx = AppContext::new(settings);
    let discovery = StaticDiscovery::new(file_map(&[]));
    let deployer = CapturingDeployer::default();

    DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    assert!(support::list(&ctx.settings().staging_dir).is_empty());
    assert!(ctx.settings().temp_dir.exists());
}

#[test]
fn state_export_writes_last_deploy() {
    let install = Install::standard();
    let export_dir = install.temp.path().join("export");
    let ctx = AppContext::new(install.settings().with_state_export(&export_dir));
    let discovery = StaticDiscovery::new(file_map(&[("a", "1")]));
    let deployer = CapturingDeployer::default();

    let report = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation)
        .run()
        .unwrap();

    let path = export_dir.join(LAST_DEPLOY_FILE);
    assert_eq!(report.exported_to.as_deref(), Some(path.as_path()));
    let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["lastServerSideStates"]["unlockables"], 3);
    assert!(raw["deployedAt"].is_string());
}

#[test]
fn sequencer_runs_only_once() {
    let install = Install::standard();
    let ctx = AppContext::new(install.settings());
    let discovery = StaticDiscovery::new(file_map(&[]));
    let deployer = CapturingDeployer::default();

    let mut sequencer = DeploymentSequencer::new(&ctx, &discovery, &deployer, &NoopInstrumentation);
    sequencer.run().unwrap();
    assert!(sequencer.run().is_err());
    assert_eq!(deployer.calls().len(), 1);
}
