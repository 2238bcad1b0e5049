//! Error and warning types for window selection.
//!
//! Only two things can make a selection call fail: a malformed configuration
//! and traces that cannot be compared sample by sample. Everything else
//! (missing metadata, candidates falling off the trace edge, nothing passing
//! the acceptance gate) degrades the result instead of failing it.

use thiserror::Error;

/// Main error type for window selection.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Observed and synthetic traces cannot be compared sample by sample.
    #[error(
        "Trace shape mismatch: observed has {observed_len} samples at dt={observed_delta}, \
         synthetic has {synthetic_len} samples at dt={synthetic_delta}"
    )]
    ShapeMismatch {
        observed_len: usize,
        synthetic_len: usize,
        observed_delta: f64,
        synthetic_delta: f64,
    },

    /// A single trace is unusable (empty, non-finite samples, bad sampling interval).
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while exporting or importing windows.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for window selection.
pub type Result<T> = std::result::Result<T, SelectionError>;

impl SelectionError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SelectionError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Short category label for the error.
    pub fn title(&self) -> &'static str {
        match self {
            SelectionError::InvalidConfig { .. } => "Configuration Error",
            SelectionError::ShapeMismatch { .. } => "Shape Mismatch",
            SelectionError::InvalidTrace(_) => "Invalid Trace",
            SelectionError::Json(_) => "JSON Error",
            SelectionError::Io(_) => "I/O Error",
        }
    }

    /// True for errors raised before any trace is looked at.
    pub fn is_config_error(&self) -> bool {
        matches!(self, SelectionError::InvalidConfig { .. })
    }
}

/// Non-fatal diagnostics surfaced by a selection run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionWarning {
    /// Event and/or station coordinates could not be resolved.
    #[error(
        "Event and/or station information is not available (event missing: {event_missing}, \
         station missing: {station_missing}). No rejection based on traveltime possible and \
         no phase arrivals will be attached to windows."
    )]
    MetadataUnavailable {
        event_missing: bool,
        station_missing: bool,
    },
}
