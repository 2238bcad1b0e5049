//! Selection configuration.
//!
//! All thresholds of the pipeline live in one flat [`Config`]. Values are
//! validated when the configuration is built (or deserialized), so a bad
//! coefficient fails before any trace is touched.
//!
//! Coefficient roles:
//! - `c_0`: internal minima water level, as a fraction of `stalta_waterlevel`
//! - `c_1`: minimum window length, in units of `min_period`
//! - `c_2`: minimum prominence of the central STA/LTA peak
//! - `c_3a`, `c_3b`: phase separation height factor and decay time
//! - `c_4a`, `c_4b`: curtailment decay lengths before/after the internal peaks

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};
use crate::types::Window;

/// Strategy scoring a window for overlap resolution.
///
/// Any `Fn(&Window) -> f64 + Send + Sync` closure is a strategy.
pub trait WindowWeight: Send + Sync {
    fn weight(&self, window: &Window) -> f64;
}

impl<F> WindowWeight for F
where
    F: Fn(&Window) -> f64 + Send + Sync,
{
    fn weight(&self, window: &Window) -> f64 {
        self(window)
    }
}

/// Window length in units of the minimum period, times `max_cc_value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWeight;

impl WindowWeight for DefaultWeight {
    fn weight(&self, window: &Window) -> f64 {
        window.len() as f64 * window.dt / window.min_period * window.max_cc_value
    }
}

/// Trace whose envelope feeds the STA/LTA picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerSource {
    /// Noise-free synthetic (FLEXWIN behavior).
    #[default]
    Synthetic,
    Observed,
}

/// How overlapping accepted windows are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Maximum total weight over mutually non-overlapping windows.
    #[default]
    IntervalScheduling,
    /// Keep the heavier window of every overlapping pair, heaviest first.
    Greedy,
}

/// Window selection parameters.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default = "Config::unset")]
pub struct Config {
    /// Shortest period of the pass band, seconds.
    pub min_period: f64,
    /// Longest period of the pass band, seconds.
    pub max_period: f64,
    /// STA/LTA threshold a peak must exceed to seed candidates. Range: (0, 1).
    pub stalta_waterlevel: f64,
    /// Largest accepted |cross-correlation lag|, seconds.
    pub tshift_acceptance_level: f64,
    /// Largest accepted |dlnA|.
    pub dlna_acceptance_level: f64,
    /// Smallest accepted cross-correlation coefficient.
    pub cc_acceptance_level: f64,
    /// Slowest expected surface wave, km/s. Bounds the end of the signal.
    pub min_surface_wave_velocity: f64,
    /// Seconds of signal allowed before the first arrival. `None` means `min_period`.
    pub max_time_before_first_arrival: Option<f64>,
    /// Longest window in units of `max_period`. `None` disables the check.
    pub max_window_periods: Option<f64>,
    pub c_0: f64,
    pub c_1: f64,
    pub c_2: f64,
    pub c_3a: f64,
    pub c_3b: f64,
    pub c_4a: f64,
    pub c_4b: f64,
    pub picker_source: PickerSource,
    pub resolution_strategy: ResolutionStrategy,
    /// Custom overlap weighting. `None` uses [`DefaultWeight`].
    #[serde(skip)]
    pub window_weight_fct: Option<Arc<dyn WindowWeight>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("min_period", &self.min_period)
            .field("max_period", &self.max_period)
            .field("stalta_waterlevel", &self.stalta_waterlevel)
            .field("tshift_acceptance_level", &self.tshift_acceptance_level)
            .field("dlna_acceptance_level", &self.dlna_acceptance_level)
            .field("cc_acceptance_level", &self.cc_acceptance_level)
            .field("min_surface_wave_velocity", &self.min_surface_wave_velocity)
            .field("max_time_before_first_arrival", &self.max_time_before_first_arrival)
            .field("max_window_periods", &self.max_window_periods)
            .field("c_0", &self.c_0)
            .field("c_1", &self.c_1)
            .field("c_2", &self.c_2)
            .field("c_3a", &self.c_3a)
            .field("c_3b", &self.c_3b)
            .field("c_4a", &self.c_4a)
            .field("c_4b", &self.c_4b)
            .field("picker_source", &self.picker_source)
            .field("resolution_strategy", &self.resolution_strategy)
            .field(
                "window_weight_fct",
                &if self.window_weight_fct.is_some() { "custom" } else { "default" },
            )
            .finish()
    }
}

impl Config {
    /// Validated configuration with default thresholds for the given band.
    pub fn new(min_period: f64, max_period: f64) -> Result<Self> {
        ConfigBuilder::new(min_period, max_period).build()
    }

    /// Start a builder for the given band.
    pub fn builder(min_period: f64, max_period: f64) -> ConfigBuilder {
        ConfigBuilder::new(min_period, max_period)
    }

    /// Deserialize from JSON and validate. Missing fields take their defaults;
    /// the two periods are required.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn unset() -> Self {
        Self::with_periods(f64::NAN, f64::NAN)
    }

    fn with_periods(min_period: f64, max_period: f64) -> Self {
        Self {
            min_period,
            max_period,
            stalta_waterlevel: 0.07,
            tshift_acceptance_level: 10.0,
            dlna_acceptance_level: 1.3,
            cc_acceptance_level: 0.7,
            min_surface_wave_velocity: 3.0,
            max_time_before_first_arrival: None,
            max_window_periods: None,
            c_0: 1.0,
            c_1: 1.5,
            c_2: 0.0,
            c_3a: 4.0,
            c_3b: 2.5,
            c_4a: 2.0,
            c_4b: 6.0,
            picker_source: PickerSource::default(),
            resolution_strategy: ResolutionStrategy::default(),
            window_weight_fct: None,
        }
    }

    /// Weighting strategy in effect.
    pub fn weight_strategy(&self) -> &dyn WindowWeight {
        match &self.window_weight_fct {
            Some(custom) => custom.as_ref(),
            None => &DefaultWeight,
        }
    }

    /// Seconds of signal allowed before the first arrival.
    pub fn time_before_first_arrival(&self) -> f64 {
        self.max_time_before_first_arrival.unwrap_or(self.min_period)
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        positive("min_period", self.min_period)?;
        positive("max_period", self.max_period)?;
        if self.min_period >= self.max_period {
            return Err(SelectionError::config(
                "max_period",
                format!(
                    "must be greater than min_period ({} >= {})",
                    self.min_period, self.max_period
                ),
            ));
        }

        finite("stalta_waterlevel", self.stalta_waterlevel)?;
        if self.stalta_waterlevel <= 0.0 || self.stalta_waterlevel >= 1.0 {
            return Err(SelectionError::config(
                "stalta_waterlevel",
                format!("must lie in (0, 1), got {}", self.stalta_waterlevel),
            ));
        }

        positive("tshift_acceptance_level", self.tshift_acceptance_level)?;
        positive("dlna_acceptance_level", self.dlna_acceptance_level)?;

        finite("cc_acceptance_level", self.cc_acceptance_level)?;
        if !(-1.0..=1.0).contains(&self.cc_acceptance_level) {
            return Err(SelectionError::config(
                "cc_acceptance_level",
                format!("must lie in [-1, 1], got {}", self.cc_acceptance_level),
            ));
        }

        positive("min_surface_wave_velocity", self.min_surface_wave_velocity)?;
        if let Some(value) = self.max_time_before_first_arrival {
            non_negative("max_time_before_first_arrival", value)?;
        }
        if let Some(value) = self.max_window_periods {
            positive("max_window_periods", value)?;
        }

        non_negative("c_0", self.c_0)?;
        non_negative("c_1", self.c_1)?;
        non_negative("c_2", self.c_2)?;
        non_negative("c_3a", self.c_3a)?;
        positive("c_3b", self.c_3b)?;
        non_negative("c_4a", self.c_4a)?;
        non_negative("c_4b", self.c_4b)?;
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SelectionError::config(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SelectionError::config(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SelectionError::config(field, format!("must not be negative, got {value}")))
    }
}

/// Chained construction of a validated [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(min_period: f64, max_period: f64) -> Self {
        Self {
            config: Config::with_periods(min_period, max_period),
        }
    }

    pub fn stalta_waterlevel(mut self, value: f64) -> Self {
        self.config.stalta_waterlevel = value;
        self
    }

    pub fn tshift_acceptance_level(mut self, value: f64) -> Self {
        self.config.tshift_acceptance_level = value;
        self
    }

    pub fn dlna_acceptance_level(mut self, value: f64) -> Self {
        self.config.dlna_acceptance_level = value;
        self
    }

    pub fn cc_acceptance_level(mut self, value: f64) -> Self {
        self.config.cc_acceptance_level = value;
        self
    }

    pub fn min_surface_wave_velocity(mut self, value: f64) -> Self {
        self.config.min_surface_wave_velocity = value;
        self
    }

    pub fn max_time_before_first_arrival(mut self, value: f64) -> Self {
        self.config.max_time_before_first_arrival = Some(value);
        self
    }

    pub fn max_window_periods(mut self, value: f64) -> Self {
        self.config.max_window_periods = Some(value);
        self
    }

    /// Set all seven shape coefficients at once, in `c_0, c_1, c_2, c_3a,
    /// c_3b, c_4a, c_4b` order.
    pub fn coefficients(mut self, c: [f64; 7]) -> Self {
        self.config.c_0 = c[0];
        self.config.c_1 = c[1];
        self.config.c_2 = c[2];
        self.config.c_3a = c[3];
        self.config.c_3b = c[4];
        self.config.c_4a = c[5];
        self.config.c_4b = c[6];
        self
    }

    pub fn c_0(mut self, value: f64) -> Self {
        self.config.c_0 = value;
        self
    }

    pub fn c_1(mut self, value: f64) -> Self {
        self.config.c_1 = value;
        self
    }

    pub fn c_2(mut self, value: f64) -> Self {
        self.config.c_2 = value;
        self
    }

    pub fn c_3a(mut self, value: f64) -> Self {
        self.config.c_3a = value;
        self
    }

    pub fn c_3b(mut self, value: f64) -> Self {
        self.config.c_3b = value;
        self
    }

    pub fn c_4a(mut self, value: f64) -> Self {
        self.config.c_4a = value;
        self
    }

    pub fn c_4b(mut self, value: f64) -> Self {
        self.config.c_4b = value;
        self
    }

    pub fn picker_source(mut self, source: PickerSource) -> Self {
        self.config.picker_source = source;
        self
    }

    pub fn resolution_strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.config.resolution_strategy = strategy;
        self
    }

    pub fn window_weight_fct(mut self, weight: impl WindowWeight + 'static) -> Self {
        self.config.window_weight_fct = Some(Arc::new(weight));
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
