//! Diagnostics sinks for build failures

use tracing::error;

/// Receives fatal build diagnostics
pub trait DiagnosticsSink {
    fn fatal(&self, message: &str);
}

/// Forwards fatal diagnostics to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn fatal(&self, message: &str) {
        error!("{}", message);
    }
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for &T {
    fn fatal(&self, message: &str) {
        (**self).fatal(message)
    }
}

/// Collects messages in memory for assertions
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    messages: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl RecordingDiagnostics {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

#[cfg(test)]
impl DiagnosticsSink for RecordingDiagnostics {
    fn fatal(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
