//! In-memory instrumentation for asserting on the span tree in tests.

use std::sync::{Arc, Mutex};

use super::{Instrumentation, Span};
use crate::error::DeployError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Started { op: String, parent: Option<String> },
    Finished { op: String },
    Tag { key: String, value: String },
    Scope { op: String },
    Reported { message: String },
}

/// Records every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingInstrumentation {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingInstrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Ops of every started span, in start order.
    pub fn started_ops(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Started { op, .. } => Some(op),
                _ => None,
            })
            .collect()
    }

    pub fn finished_ops(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Finished { op } => Some(op),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Reported { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

struct RecordingSpan {
    op: String,
    sink: RecordingInstrumentation,
}

impl Span for RecordingSpan {
    fn op(&self) -> &str {
        &self.op
    }

    fn start_child(&self, op: &str) -> Box<dyn Span> {
        self.sink.push(RecordedEvent::Started {
            op: op.to_string(),
            parent: Some(self.op.clone()),
        });
        Box::new(RecordingSpan {
            op: op.to_string(),
            sink: self.sink.clone(),
        })
    }

    fn finish(self: Box<Self>) {
        let RecordingSpan { op, sink } = *self;
        sink.push(RecordedEvent::Finished { op });
    }
}

impl Instrumentation for RecordingInstrumentation {
    fn start_transaction(&self, op: &str, _name: &str) -> Box<dyn Span> {
        self.push(RecordedEvent::Started {
            op: op.to_string(),
            parent: None,
        });
        Box::new(RecordingSpan {
            op: op.to_string(),
            sink: self.clone(),
        })
    }

    fn set_tag(&self, key: &str, value: &str) {
        self.push(RecordedEvent::Tag {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn configure_scope(&self, span: &dyn Span) {
        self.push(RecordedEvent::Scope {
            op: span.op().to_string(),
        });
    }

    fn report(&self, error: &DeployError) {
        self.push(RecordedEvent::Reported {
            message: error.to_string(),
        });
    }
}
