//! Seismic Window Selection Library
//!
//! Picks the time windows in which an observed seismogram and its synthetic
//! counterpart show the same wave groups, for use as measurement windows in
//! waveform tomography.
//!
//! # Design Philosophy
//!
//! - **Shape first, fit second**: candidates come from the STA/LTA curve of
//!   the synthetic envelope and are pruned on shape alone before any
//!   observed data is compared.
//! - **Degrade, don't fail**: missing event or station metadata disables
//!   travel-time rejection and phase labels, with one warning per run.
//! - **Read-only inputs**: traces and configuration are borrowed, never
//!   modified.
//!
//! # Example
//!
//! ```ignore
//! use seiswin::{select_windows, Config, EventSource, Trace};
//!
//! let config = Config::builder(50.0, 150.0)
//!     .stalta_waterlevel(0.08)
//!     .tshift_acceptance_level(15.0)
//!     .dlna_acceptance_level(1.0)
//!     .cc_acceptance_level(0.7)
//!     .build()?;
//!
//! let selection = select_windows(&observed, &synthetic, &config, EventSource::FromTraceHeader, None)?;
//! for warning in &selection.warnings {
//!     eprintln!("{warning}");
//! }
//! for window in &selection.windows {
//!     println!("{}..{}: cc={:.2}", window.left, window.right, window.max_cc_value);
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod export;
pub mod metadata;
pub mod phases;
mod rejection;
pub mod scheduling;
pub mod selector;
pub mod similarity;
pub mod stalta;
pub mod types;

#[cfg(test)]
mod stress_tests;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, DefaultWeight, PickerSource, ResolutionStrategy, WindowWeight};
pub use error::{Result, SelectionError, SelectionWarning};
pub use export::WindowExport;
pub use phases::TravelTimeLookup;
pub use selector::{select_windows, Selection, WindowSelector};
pub use types::{
    Catalog, CatalogEvent, Event, EventSource, Origin, PhaseArrival, SacHeader, Station, Trace,
    TravelTime, Window,
};
