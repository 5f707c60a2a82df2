//! Instrumentation capability used by the sequencer.
//!
//! Spans are observational only. Nothing in the pipeline reads back from
//! them, so [`NoopInstrumentation`] is always a valid choice.

pub mod noop;
pub mod recording;
pub mod tracing_sink;

use crate::error::DeployError;

pub use noop::{NoopInstrumentation, NoopSpan};
pub use recording::{RecordedEvent, RecordingInstrumentation};
pub use tracing_sink::TracingInstrumentation;

/// A unit of timed work in the span tree.
pub trait Span: Send {
    /// Operation name this span was started with.
    fn op(&self) -> &str;

    fn start_child(&self, op: &str) -> Box<dyn Span>;

    fn finish(self: Box<Self>);
}

/// Sink for the span tree, tags, and fatal error reports.
pub trait Instrumentation: Send + Sync {
    /// Start a root span.
    fn start_transaction(&self, op: &str, name: &str) -> Box<dyn Span>;

    /// Attach a key/value pair to everything reported from now on.
    fn set_tag(&self, key: &str, value: &str);

    /// Make `span` the parent for events recorded by collaborators.
    fn configure_scope(&self, span: &dyn Span);

    /// Forward a fatal error to the sink.
    fn report(&self, error: &DeployError);

    /// Flush buffered data before the process exits.
    fn flush(&self) {}
}
