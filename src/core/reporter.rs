//! Message sink for fatal configuration errors and per-step diagnostics.
//!
//! The engine only knows the [`Reporter`] capability. Drivers that want the
//! messages (a GUI panel, a testbench) plug in their own implementation or
//! drain a [`RecordingReporter`].

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
    Diagnostic,
}

/// Sink for engine messages
pub trait Reporter: Send {
    fn report(&self, severity: Severity, message: &str);
}

/// Default sink: forwards everything to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Fatal => error!("🛑 [CatSwarm] {}", message),
            Severity::Warning => warn!("⚠️  [CatSwarm] {}", message),
            Severity::Diagnostic => debug!("[CatSwarm] {}", message),
        }
    }
}

/// Buffers messages so the owner can read them between steps.
///
/// Clones share the same buffer, so keep one handle and give the other to
/// the engine.
#[derive(Clone, Debug, Default)]
pub struct RecordingReporter {
    messages: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered message, leaving the buffer empty.
    pub fn drain(&self) -> Vec<(Severity, String)> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, severity: Severity, message: &str) {
        self.messages.lock().push((severity, message.to_string()));
    }
}
