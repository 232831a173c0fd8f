use crate::core::profit::{FailureKind, ProfitError};
use std::sync::Mutex;
use tracing::warn;

/// Observer for classified calculation failures.
pub trait Diagnostics: Send + Sync {
    fn report(&self, scheme_code: &str, error: &ProfitError);
}

/// Emits every failure as a `warn` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, scheme_code: &str, error: &ProfitError) {
        warn!(
            scheme_code,
            kind = ?error.kind(),
            error = %error,
            "Failed to calculate profit"
        );
    }
}

/// Keeps the kind of every reported failure, in order. Meant for tests.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    kinds: Mutex<Vec<FailureKind>>,
}

impl RecordingDiagnostics {
    pub fn kinds(&self) -> Vec<FailureKind> {
        self.kinds
            .lock()
            .map(|kinds| kinds.clone())
            .unwrap_or_default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, _scheme_code: &str, error: &ProfitError) {
        if let Ok(mut kinds) = self.kinds.lock() {
            kinds.push(error.kind());
        }
    }
}
