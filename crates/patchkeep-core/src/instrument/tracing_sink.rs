//! Instrumentation backed by `tracing` spans.
//!
//! Every span in the tree becomes a `tracing` span with the parent link
//! preserved, and its duration is emitted as a debug event on finish.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, error, info_span};

use super::{Instrumentation, Span};
use crate::error::DeployError;

const REPORT_TARGET: &str = "patchkeep::report";

#[derive(Debug, Default)]
pub struct TracingInstrumentation {
    user: Option<String>,
    tags: Mutex<BTreeMap<String, String>>,
    active: Mutex<Option<String>>,
}

impl TracingInstrumentation {
    pub fn new(user: Option<String>) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        self.tags.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

struct TracingSpan {
    op: String,
    span: tracing::Span,
    started: Instant,
}

impl Span for TracingSpan {
    fn op(&self) -> &str {
        &self.op
    }

    fn start_child(&self, op: &str) -> Box<dyn Span> {
        Box::new(TracingSpan {
            op: op.to_string(),
            span: info_span!(parent: &self.span, "span", op = %op),
            started: Instant::now(),
        })
    }

    fn finish(self: Box<Self>) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.span
            .in_scope(|| debug!(target: REPORT_TARGET, op = %self.op, elapsed_ms, "span finished"));
    }
}

impl Instrumentation for TracingInstrumentation {
    fn start_transaction(&self, op: &str, name: &str) -> Box<dyn Span> {
        let user = self.user.as_deref().unwrap_or("");
        Box::new(TracingSpan {
            op: op.to_string(),
            span: info_span!("transaction", op = %op, name = %name, user = %user),
            started: Instant::now(),
        })
    }

    fn set_tag(&self, key: &str, value: &str) {
        debug!(target: REPORT_TARGET, key, value, "tag");
        if let Ok(mut tags) = self.tags.lock() {
            tags.insert(key.to_string(), value.to_string());
        }
    }

    fn configure_scope(&self, span: &dyn Span) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(span.op().to_string());
        }
    }

    fn report(&self, error: &DeployError) {
        let active = self.active.lock().ok().and_then(|a| a.clone());
        let tags = self.tags();
        error!(
            target: REPORT_TARGET,
            user = ?self.user,
            active_span = ?active,
            ?tags,
            error = %error,
            "reported failure"
        );
    }
}
