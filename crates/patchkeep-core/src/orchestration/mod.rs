//! Deploy orchestration: the phase sequencer and its reporting helpers.

pub mod elapsed;
pub mod sequencer;

pub use elapsed::{UNDER_A_SECOND, format_elapsed};
pub use sequencer::{CacheStatus, DeployReport, DeploymentSequencer, Phase, detect_platform};
