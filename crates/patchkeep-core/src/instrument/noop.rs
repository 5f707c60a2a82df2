//! Instrumentation that records nothing.

use super::{Instrumentation, Span};
use crate::error::DeployError;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstrumentation;

#[derive(Debug, Clone, Default)]
pub struct NoopSpan {
    op: String,
}

impl NoopSpan {
    pub fn new(op: &str) -> Self {
        Self { op: op.to_string() }
    }
}

impl Span for NoopSpan {
    fn op(&self) -> &str {
        &self.op
    }

    fn start_child(&self, op: &str) -> Box<dyn Span> {
        Box::new(NoopSpan::new(op))
    }

    fn finish(self: Box<Self>) {}
}

impl Instrumentation for NoopInstrumentation {
    fn start_transaction(&self, op: &str, _name: &str) -> Box<dyn Span> {
        Box::new(NoopSpan::new(op))
    }

    fn set_tag(&self, _key: &str, _value: &str) {}

    fn configure_scope(&self, _span: &dyn Span) {}

    fn report(&self, _error: &DeployError) {}
}
