//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod log;
pub mod nav;
pub mod profit;

// Re-export main types for cleaner imports
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use nav::{NavError, NavProvider};
pub use profit::{DEFAULT_CAPITAL, FailureKind, Leg, ProfitCalculator, ProfitError};
