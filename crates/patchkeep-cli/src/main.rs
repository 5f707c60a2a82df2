//! Patchkeep - incremental patch deployer
//!
//! Usage:
//!   patchkeep                 # Deploy (default)
//!   patchkeep deploy          # Same, explicitly
//!   patchkeep platform        # Check the installation and print its platform

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patchkeep_core::config::{SETTINGS_FILE, load_settings};
use patchkeep_core::context::AppContext;
use patchkeep_core::diff::ChangeKind;
use patchkeep_core::instrument::Instrumentation;
use patchkeep_core::orchestration::{DeployReport, DeploymentSequencer, detect_platform};
use patchkeep_core::{DeployError, Result};

/// Exit code used after an operator interrupt.
const SIGNAL_EXIT: i32 = 130;

#[derive(Parser)]
#[command(name = "patchkeep")]
#[command(about = "Incremental content patch deployer", long_about = None)]
struct Cli {
    /// Path to patchkeep.toml
    #[arg(long, short, default_value = SETTINGS_FILE)]
    config: PathBuf,

    /// Log every phase and show error details
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Reclaim patch slots, diff sources against the cache, and deploy
    Deploy,

    /// Check the installation and print the detected platform
    Platform,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match load_settings(&cli.config) {
        Ok(settings) => settings,
        Err(err) => return report_failure(&err, cli.verbose, true),
    };
    let report_errors = settings.report_errors;
    let ctx = Arc::new(AppContext::new(settings));
    let instrumentation = ctx.instrumentation();

    let exit = match cli.command.unwrap_or(Commands::Deploy) {
        Commands::Platform => run_platform(&ctx, cli.verbose, report_errors),
        Commands::Deploy => {
            run_deploy(ctx.clone(), instrumentation.clone(), cli.verbose, report_errors).await
        }
    };

    instrumentation.flush();
    exit
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "patchkeep=debug,patchkeep_core=debug,info"
    } else {
        "patchkeep=info,patchkeep_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run_platform(ctx: &AppContext, verbose: bool, report_errors: bool) -> ExitCode {
    match detect_platform(ctx) {
        Ok((installation, platform)) => {
            println!("Platform: {}", platform.identity);
            println!("Digest:   {}", platform.digest);
            println!("Layout:   {:?}", installation.layout());
            println!("Identity: {}", installation.identity_file().display());
            ExitCode::SUCCESS
        }
        Err(err) => report_failure(&err, verbose, report_errors),
    }
}

async fn run_deploy(
    ctx: Arc<AppContext>,
    instrumentation: Arc<dyn Instrumentation>,
    verbose: bool,
    report_errors: bool,
) -> ExitCode {
    let task = tokio::task::spawn_blocking({
        let instrumentation = instrumentation.clone();
        move || deploy_blocking(&ctx, instrumentation.as_ref())
    });

    tokio::select! {
        joined = task => finish_run(joined, verbose, report_errors),
        signal = shutdown_signal() => {
            error!("Received {signal} signal");
            instrumentation.flush();
            std::process::exit(SIGNAL_EXIT);
        }
    }
}

/// Map the outcome of the blocking run to an exit code.
fn finish_run(
    joined: std::result::Result<Result<DeployReport>, JoinError>,
    verbose: bool,
    report_errors: bool,
) -> ExitCode {
    match joined {
        Ok(Ok(report)) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Ok(Err(err)) => report_failure(&err, verbose, report_errors),
        Err(join_err) => {
            // A panic escaped the pipeline. Nothing more is attempted.
            error!("Uncaught exception! {join_err}");
            ExitCode::FAILURE
        }
    }
}

fn deploy_blocking(ctx: &AppContext, instrumentation: &dyn Instrumentation) -> Result<DeployReport> {
    let discovery = ctx.directory_discovery();
    let deployer = ctx.plan_deployer();
    let mut sequencer = DeploymentSequencer::new(ctx, &discovery, &deployer, instrumentation);
    sequencer.run()
}

fn print_summary(report: &DeployReport) {
    info!(
        platform = %report.platform.identity,
        files = report.files,
        reclaimed = report.reclaim.removed.len(),
        added = report.diff.count(ChangeKind::Added),
        changed = report.diff.count(ChangeKind::Changed),
        removed = report.diff.count(ChangeKind::Removed),
        "Deploy finished"
    );
    debug!(cache = ?report.cache, "Cache state");
    if report.reclaim.diagnostics() > 0 {
        debug!(
            unparseable = report.reclaim.unparseable,
            failed = ?report.reclaim.failed,
            "Some runtime entries were skipped"
        );
    }
    if let Some(path) = &report.exported_to {
        info!(path = %path.display(), "Exported last deploy state");
    }
}

/// The single place a fatal error is shown to the operator.
fn report_failure(err: &DeployError, verbose: bool, report_errors: bool) -> ExitCode {
    match err.hint() {
        Some(hint) => error!("{err}; {hint}"),
        None => error!("{err}"),
    }
    if verbose {
        debug!(error = ?err, "Failure details");
    }
    if !report_errors && !err.is_configuration() {
        warn!(
            "Error reporting is disabled; if you experience this issue again, please enable it so that the problem can be debugged."
        );
    }
    ExitCode::FAILURE
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                Ok(()) = tokio::signal::ctrl_c() => "SIGINT",
                Some(()) = terminate.recv() => "SIGTERM",
                else => std::future::pending::<&'static str>().await,
            }
        }
        Err(_) => {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
