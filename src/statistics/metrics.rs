//! Per-cell scalar metrics: one [`CellMetricRecord`] per track.
//!
//! Each track's lifetime is collapsed into four scalars:
//!
//! * **Speed** – mean of the defined instantaneous speeds.
//! * **MSD** – mean of `MSD(1)` and `MSD(2)`; undefined unless both are defined.
//! * **Directionality Ratio** – mean of the per-row ratio over the whole track.
//! * **Migration Persistence** – decay rate `alpha` of `exp(-alpha t)` fitted to the
//!   track autocorrelation at lags `1..=9`, `t = lag × time_interval`.
//!
//! A metric that cannot be computed is `None` and is left out of every test.
use std::fmt;
use std::str::FromStr;

use log::error;

use crate::aggregation::{mean, mean_defined};
use crate::analysis::autocorrelation::persistence_curve;
use crate::analysis::dir_ratio::dir_ratio_series;
use crate::analysis::msd::msd_at;
use crate::config::Configuration;
use crate::constants::{
    TrackId, CELL_MSD_MAX_LAG, PERSISTENCE_FIT_ALPHA0, PERSISTENCE_FIT_MAX_LAG,
};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::kinematics::KinematicsExt;
use crate::motility_errors::MotilityError;
use crate::statistics::persistence_fit::fit_exponential_decay;
use crate::track::{Track, TrackTable};

/// Scalar compared across conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Speed,
    Msd,
    DirectionalityRatio,
    Persistence,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Speed,
        Metric::Msd,
        Metric::DirectionalityRatio,
        Metric::Persistence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Speed => "Speed",
            Metric::Msd => "MSD",
            Metric::DirectionalityRatio => "Directionality Ratio",
            Metric::Persistence => "Migration Persistence (Autocorrelation)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MotilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MotilityError::UnknownMetric(s.to_string()))
    }
}

/// The four scalars of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetricRecord {
    pub cell_id: TrackId,
    pub condition: String,
    pub speed: Option<f64>,
    pub msd: Option<f64>,
    pub directionality_ratio: Option<f64>,
    pub persistence: Option<f64>,
}

impl CellMetricRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Speed => self.speed,
            Metric::Msd => self.msd,
            Metric::DirectionalityRatio => self.directionality_ratio,
            Metric::Persistence => self.persistence,
        }
    }
}

fn cell_msd(track: &Track) -> Option<f64> {
    let lags: Option<Vec<f64>> = (1..=CELL_MSD_MAX_LAG)
        .map(|tau| msd_at(track.points(), tau))
        .collect();
    mean(&lags?)
}

/// Collapse one track into its [`CellMetricRecord`].
///
/// A failed persistence fit is reported as [`Diagnostic::PersistenceFitFailed`] and
/// leaves `persistence` undefined.
pub fn cell_metrics(
    track: &Track,
    condition: &str,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> CellMetricRecord {
    let mut track = track.clone();

    let speed = mean_defined(
        track
            .ensure_instant_speed(params.speed_formula, params.time_interval)
            .iter()
            .copied(),
    );
    let msd = cell_msd(&track);

    let (to_start, cumulative) = track.ensure_path_length();
    let directionality_ratio = mean_defined(dir_ratio_series(to_start, cumulative));

    let curve = persistence_curve(track.ensure_direction(), PERSISTENCE_FIT_MAX_LAG);
    let (t, y): (Vec<f64>, Vec<f64>) = curve
        .iter()
        .enumerate()
        .filter_map(|(i, v)| Some((params.time_of(i + 1), (*v)?)))
        .unzip();
    let persistence = match fit_exponential_decay(&t, &y, PERSISTENCE_FIT_ALPHA0) {
        Ok(alpha) => Some(alpha),
        Err(failure) => {
            error!("{condition}: exponential fit error for track {}: {failure}", track.id());
            diag.report(Diagnostic::PersistenceFitFailed {
                condition: condition.to_string(),
                track_id: track.id(),
                reason: failure.to_string(),
            });
            None
        }
    };

    CellMetricRecord {
        cell_id: track.id(),
        condition: condition.to_string(),
        speed,
        msd,
        directionality_ratio,
        persistence,
    }
}

/// One record per track of every table, in table then track-id order.
///
/// The condition of a record is the label of its table.
pub fn collect_cell_metrics(
    tables: &[TrackTable],
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Vec<CellMetricRecord> {
    tables
        .iter()
        .flat_map(|table| table.tracks().iter().map(move |t| (table.label(), t)))
        .map(|(label, track)| cell_metrics(track, label, params, diag))
        .collect()
}

/// Defined values of one metric grouped by condition, conditions in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroups {
    pub metric: Metric,
    pub groups: Vec<(String, Vec<f64>)>,
}

impl MetricGroups {
    pub fn from_records(records: &[CellMetricRecord], metric: Metric) -> Self {
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        for record in records {
            let idx = match groups.iter().position(|(c, _)| *c == record.condition) {
                Some(idx) => idx,
                None => {
                    groups.push((record.condition.clone(), Vec::new()));
                    groups.len() - 1
                }
            };
            if let Some(v) = record.value(metric).filter(|v| v.is_finite()) {
                groups[idx].1.push(v);
            }
        }
        MetricGroups { metric, groups }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(c, _)| c.as_str())
    }

    /// At least two conditions, each with at least two defined values.
    ///
    /// Return
    /// ----------
    /// * `MotilityError::InsufficientData` naming the offending condition otherwise.
    pub fn check_comparable(&self) -> Result<(), MotilityError> {
        if self.groups.len() < 2 {
            return Err(MotilityError::InsufficientData(format!(
                "{}: at least 2 conditions are required, got {}",
                self.metric,
                self.groups.len()
            )));
        }
        if let Some((condition, values)) = self.groups.iter().find(|(_, v)| v.len() < 2) {
            return Err(MotilityError::InsufficientData(format!(
                "{}: condition '{condition}' has {} defined value(s), at least 2 are required",
                self.metric,
                values.len()
            )));
        }
        Ok(())
    }
}
