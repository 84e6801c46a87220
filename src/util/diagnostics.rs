use std::sync::Mutex;

use tracing::{info, warn};

/// Caller-owned sink for resolution diagnostics. Warnings report degraded behavior
///  (e.g. unreachable metadata), advisories report discouraged but working usage.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, message: &str);
    fn advise(&self, message: &str);
}

/// Default sink that forwards to the `tracing` machinery.
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn advise(&self, message: &str) {
        info!("{}", message);
    }
}

/// Sink that records messages instead of logging them - for testing purposes
pub struct RecordingDiagnostics {
    warnings: Mutex<Vec<String>>,
    advisories: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> RecordingDiagnostics {
        RecordingDiagnostics {
            warnings: Default::default(),
            advisories: Default::default(),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn advisories(&self) -> Vec<String> {
        self.advisories.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn advise(&self, message: &str) {
        self.advisories.lock().unwrap().push(message.to_string());
    }
}
