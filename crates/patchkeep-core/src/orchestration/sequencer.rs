//! Phase-ordered deploy pipeline.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::elapsed::format_elapsed;
use crate::cache::{CacheDecision, CacheManifestStore, InvalidationReason};
use crate::context::AppContext;
use crate::deploy::{DeployOutcome, Deployer, export_last_deploy};
use crate::diff::{self, DiffResult};
use crate::discovery::Discovery;
use crate::error::{DeployError, Result};
use crate::fs::empty_dir;
use crate::instrument::{Instrumentation, Span};
use crate::platform::{Installation, ResolvedPlatform};
use crate::slots::ReclaimReport;
use crate::types::FileMap;

/// Pipeline states, in the only order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    PlatformDetect,
    ReclaimSlots,
    Discover,
    CacheValidate,
    Diff,
    Deploy,
    PersistCache,
    Done,
    Failed,
}

impl Phase {
    /// Span operation name for the phase.
    pub fn op(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::PlatformDetect => "platform-detect",
            Phase::ReclaimSlots => "reclaim-slots",
            Phase::Discover => "discover",
            Phase::CacheValidate => "cache-validate",
            Phase::Diff => "diff",
            Phase::Deploy => "deploy",
            Phase::PersistCache => "persist-cache",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

/// What happened to the previous run's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// No manifest on disk.
    Missing,
    /// Manifest reused as the diff baseline.
    Reused,
    /// Manifest and cache directory wiped.
    Discarded(InvalidationReason),
    /// Manifest unreadable as JSON; cache directory wiped.
    Corrupt,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub platform: ResolvedPlatform,
    pub reclaim: ReclaimReport,
    pub cache: CacheStatus,
    pub files: usize,
    pub diff: DiffResult,
    pub outcome: DeployOutcome,
    pub exported_to: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Validate the installation and resolve its platform.
///
/// This is the INIT + PLATFORM_DETECT prefix of a run without any of the
/// side-effecting phases.
pub fn detect_platform(ctx: &AppContext) -> Result<(Installation, ResolvedPlatform)> {
    let installation = Installation::probe(ctx.install_paths())?;
    let platform = ctx.platform_resolver().resolve(&installation)?;
    Ok((installation, platform))
}

/// Drives one deploy run through every phase, stopping at the first failure.
pub struct DeploymentSequencer<'a> {
    ctx: &'a AppContext,
    discovery: &'a dyn Discovery,
    deployer: &'a dyn Deployer,
    instrumentation: &'a dyn Instrumentation,
    phase: Phase,
    history: Vec<Phase>,
}

impl<'a> DeploymentSequencer<'a> {
    pub fn new(
        ctx: &'a AppContext,
        discovery: &'a dyn Discovery,
        deployer: &'a dyn Deployer,
        instrumentation: &'a dyn Instrumentation,
    ) -> Self {
        Self {
            ctx,
            discovery,
            deployer,
            instrumentation,
            phase: Phase::Init,
            history: Vec::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Run the pipeline once.
    ///
    /// On failure the error is forwarded to the instrumentation sink exactly
    /// once and returned; nothing is retried or rolled back.
    pub fn run(&mut self) -> Result<DeployReport> {
        if self.phase.is_terminal() {
            return Err(DeployError::configuration(
                "This sequencer has already run",
                "Create a new sequencer for every run.",
            ));
        }

        let started = Instant::now();
        let root = self.instrumentation.start_transaction("deploy", "Deploy");
        self.instrumentation.configure_scope(root.as_ref());

        let result = self.run_phases(root.as_ref(), started);

        match &result {
            Ok(report) => {
                self.enter(Phase::Done);
                info!("Done in {}", format_elapsed(report.elapsed));
            }
            Err(err) => {
                let failed_in = self.phase;
                self.enter(Phase::Failed);
                debug!(phase = failed_in.op(), "Run failed");
                self.instrumentation.report(err);
            }
        }

        root.finish();
        result
    }

    fn run_phases(&mut self, root: &dyn Span, started: Instant) -> Result<DeployReport> {
        let ctx = self.ctx;
        let discovery = self.discovery;
        let deployer = self.deployer;
        let instrumentation = self.instrumentation;
        let settings = ctx.settings();
        let store = ctx.cache_store();

        let installation = self.step(root, Phase::Init, |_| {
            Installation::probe(ctx.install_paths())
        })?;

        let platform = self.step(root, Phase::PlatformDetect, |_| {
            let platform = ctx.platform_resolver().resolve(&installation)?;
            instrumentation.set_tag("game_hash", &platform.digest);
            info!(platform = %platform.identity, "Detected platform");
            Ok(platform)
        })?;

        let reclaim = self.step(root, Phase::ReclaimSlots, |_| {
            let report = ctx.slot_reclaimer().reclaim()?;
            debug!(
                removed = report.removed.len(),
                kept = report.kept,
                diagnostics = report.diagnostics(),
                "Removed existing patch files"
            );
            empty_dir(&settings.staging_dir)?;
            empty_dir(&settings.temp_dir)?;
            Ok(report)
        })?;

        let current = self.step(root, Phase::Discover, |_| {
            let files = discovery
                .discover()
                .map_err(|e| DeployError::Discovery {
                    reason: format!("{e:#}"),
                })?;
            debug!(files = files.len(), "Discovered source files");
            Ok(files)
        })?;

        let (previous, cache) = self.step(root, Phase::CacheValidate, |_| {
            validate_cache(&store, ctx.framework_version(), &platform.digest)
        })?;

        let diff = self.step(root, Phase::Diff, |_| {
            let diff = diff::diff(&previous, &current);
            debug!(invalid = diff.len(), "Computed difference");
            Ok(diff)
        })?;

        let outcome = self.step(root, Phase::Deploy, |span| {
            instrumentation.configure_scope(span);
            let outcome = deployer
                .deploy(span, instrumentation, &diff)
                .map_err(|e| DeployError::Deploy {
                    reason: format!("{e:#}"),
                });
            instrumentation.configure_scope(root);
            outcome
        })?;

        let exported_to = self.step(root, Phase::PersistCache, |_| {
            store.save(&current, ctx.framework_version(), &platform.digest)?;
            if !settings.output_state_on_deploy {
                return Ok(None);
            }
            match settings.state_export_dir() {
                Some(dir) => export_last_deploy(&dir, settings, &outcome).map(Some),
                None => {
                    warn!("No local data directory available; skipping lastDeploy.json");
                    Ok(None)
                }
            }
        })?;

        Ok(DeployReport {
            platform,
            reclaim,
            cache,
            files: current.len(),
            diff,
            outcome,
            exported_to,
            elapsed: started.elapsed(),
        })
    }

    /// Run one phase inside its own child span.
    fn step<T>(
        &mut self,
        root: &dyn Span,
        phase: Phase,
        body: impl FnOnce(&dyn Span) -> Result<T>,
    ) -> Result<T> {
        self.enter(phase);
        debug!(phase = phase.op(), "Entering phase");
        let span = root.start_child(phase.op());
        let result = body(span.as_ref());
        span.finish();
        result
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.history.push(phase);
    }
}

/// Load the stored manifest and decide whether it can serve as the baseline.
fn validate_cache(
    store: &CacheManifestStore,
    framework_version: u64,
    game_identity: &str,
) -> Result<(FileMap, CacheStatus)> {
    match store.load() {
        Ok(None) => Ok((FileMap::new(), CacheStatus::Missing)),
        Ok(Some(manifest)) => {
            match CacheManifestStore::validate(&manifest, framework_version, game_identity) {
                CacheDecision::Keep => Ok((manifest.files, CacheStatus::Reused)),
                CacheDecision::Discard(reason) => {
                    info!(?reason, "Emptying cache");
                    store.discard()?;
                    Ok((FileMap::new(), CacheStatus::Discarded(reason)))
                }
            }
        }
        Err(DeployError::Parse { path, reason }) => {
            warn!(path = %path.display(), %reason, "Cache manifest is corrupt; emptying cache");
            store.discard()?;
            Ok((FileMap::new(), CacheStatus::Corrupt))
        }
        Err(err) => Err(err),
    }
}
