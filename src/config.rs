//! # Analysis configuration
//!
//! This module defines the [`Configuration`] record shared by every analysis of one run,
//! together with its validating builder.
//!
//! ## Parameters
//!
//! - `time_interval` – duration between two consecutive slices (seconds or any unit).
//!   Must be strictly positive: every time axis, speed and fit depends on it.
//! - `n_time_points` – number of leading slices kept per track by the preprocessor.
//!   Tracks with fewer slices are excluded.
//! - `n_tracks` – expected number of tracks per sample. **Advisory only**: a mismatch
//!   raises a diagnostic, never an error.
//! - `n_plot_points` – number of lags computed by the autocorrelation analysis. It is
//!   only checked by that analysis, so the other analyses accept `0`.
//! - `speed_formula` – how instantaneous speed is derived from step lengths
//!   (see [`SpeedFormula`]).
//!
//! ## Example
//!
//! ```rust
//! use motility::config::{Configuration, SpeedFormula};
//!
//! let params = Configuration::builder()
//!     .time_interval(10.0)
//!     .n_time_points(30)
//!     .n_tracks(40)
//!     .n_plot_points(10)
//!     .speed_formula(SpeedFormula::StepInterval)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.n_time_points, 30);
//! ```
//!
//! A zero or negative `time_interval` is rejected by [`ConfigurationBuilder::build`]
//! before any sample is touched:
//!
//! ```rust
//! use motility::config::Configuration;
//!
//! assert!(Configuration::builder().time_interval(0.0).build().is_err());
//! ```
use std::cmp::Ordering::Greater;
use std::fmt;

use crate::motility_errors::MotilityError;

/// Formula used to turn a step length into an instantaneous speed.
///
/// Variants
/// -----------------
/// * `StepInterval` – `step_length / time_interval`, the speed over the step that
///   ended at this slice.
/// * `ElapsedTime` – `step_length / (slice_index × time_interval)`, dividing by the
///   absolute time since slice zero. This reproduces the formula of the legacy
///   tool; its values decay along the track and it is kept only to compare with
///   results produced by that tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedFormula {
    #[default]
    StepInterval,
    ElapsedTime,
}

impl fmt::Display for SpeedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedFormula::StepInterval => write!(f, "step / time_interval"),
            SpeedFormula::ElapsedTime => write!(f, "step / elapsed time"),
        }
    }
}

/// Scalar parameters controlling one analysis run.
///
/// Immutable once built; pass it by reference to every component of the run.
///
/// See also
/// ------------
/// * [`ConfigurationBuilder`] – Validating builder.
/// * [`crate::preprocess`] – Consumer of `n_time_points` and `n_tracks`.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub time_interval: f64,
    pub n_time_points: usize,
    pub n_tracks: usize,
    pub n_plot_points: usize,
    pub speed_formula: SpeedFormula,
}

impl Configuration {
    /// Create a new [`ConfigurationBuilder`] initialised with default values.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Check the parameters that only the autocorrelation analysis needs.
    ///
    /// Return
    /// ----------
    /// * `Err(MotilityError::InvalidConfiguration)` if `n_plot_points == 0`.
    pub fn require_plot_points(&self) -> Result<(), MotilityError> {
        if self.n_plot_points == 0 {
            return Err(MotilityError::InvalidConfiguration(
                "n_plot_points must be > 0 for the autocorrelation analysis".into(),
            ));
        }
        Ok(())
    }

    /// Time coordinate of a lag or slice position.
    #[inline]
    pub fn time_of(&self, steps: usize) -> f64 {
        steps as f64 * self.time_interval
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            time_interval: 1.0,
            n_time_points: 2,
            n_tracks: 0,
            n_plot_points: 1,
            speed_formula: SpeedFormula::default(),
        }
    }
}

/// Builder for [`Configuration`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    params: Configuration,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            params: Configuration::default(),
        }
    }

    pub fn time_interval(mut self, v: f64) -> Self {
        self.params.time_interval = v;
        self
    }
    pub fn n_time_points(mut self, v: usize) -> Self {
        self.params.n_time_points = v;
        self
    }
    pub fn n_tracks(mut self, v: usize) -> Self {
        self.params.n_tracks = v;
        self
    }
    pub fn n_plot_points(mut self, v: usize) -> Self {
        self.params.n_plot_points = v;
        self
    }
    pub fn speed_formula(mut self, v: SpeedFormula) -> Self {
        self.params.speed_formula = v;
        self
    }

    /// Return true iff x > 0.0, finite and comparable (i.e., not NaN).
    #[inline]
    fn gt0_finite(x: f64) -> bool {
        x.is_finite() && x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Finalize the builder and produce a [`Configuration`].
    ///
    /// Validation rules
    /// -----------------
    /// * `time_interval` must be finite and `> 0`.
    /// * `n_time_points >= 1`.
    ///
    /// `n_tracks` and `n_plot_points` are not checked here: the first is advisory and
    /// the second is required by the autocorrelation analysis only
    /// (see [`Configuration::require_plot_points`]).
    pub fn build(self) -> Result<Configuration, MotilityError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl Configuration {
    /// Apply the [`ConfigurationBuilder::build`] rules to an existing record.
    ///
    /// The fields are public, so batch entry points call this again before any
    /// per-sample work.
    pub fn validate(&self) -> Result<(), MotilityError> {
        if !ConfigurationBuilder::gt0_finite(self.time_interval) {
            return Err(MotilityError::InvalidConfiguration(format!(
                "time_interval must be a finite value > 0 (got {})",
                self.time_interval
            )));
        }
        if self.n_time_points == 0 {
            return Err(MotilityError::InvalidConfiguration(
                "n_time_points must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Analysis configuration")?;
            writeln!(f, "----------------------")?;
            writeln!(f, "time_interval : {}", self.time_interval)?;
            writeln!(f, "n_time_points : {}", self.n_time_points)?;
            writeln!(f, "n_tracks      : {}", self.n_tracks)?;
            writeln!(f, "n_plot_points : {}", self.n_plot_points)?;
            write!(f, "speed_formula : {}", self.speed_formula)
        } else {
            write!(
                f,
                "time_interval={}, n_time_points={}, n_tracks={}, n_plot_points={}, speed_formula={}",
                self.time_interval,
                self.n_time_points,
                self.n_tracks,
                self.n_plot_points,
                self.speed_formula
            )
        }
    }
}
