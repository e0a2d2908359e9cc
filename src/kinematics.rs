//! # Per-track kinematics
//!
//! Shared vector primitives used by every analysis: step displacement, step length,
//! unit direction, elapsed time, path length and instantaneous speed.
//!
//! ## Structure
//!
//! * Free functions (`displacement`, `direction`, …) are **pure**: slice in, column out.
//!   They never look outside the track they are given.
//! * [`KinematicsExt`] wraps them with *compute-if-absent* caching on a [`Track`].
//!   This is the only place where that caching policy lives; analyses call the
//!   `ensure_*` methods and never recompute a kinematic column themselves.
//!
//! ## Undefined values
//!
//! * The first row has no displacement (no previous point).
//! * A missing coordinate makes every quantity touching that row undefined.
//! * A zero-length step has a magnitude of `0` but **no direction**.
//! * Cumulative distance treats undefined steps as zero so it stays monotone.
//!
//! No function here ever produces `±∞`: divisions by zero yield `None`.
use nalgebra::Vector2;

use crate::config::{Configuration, SpeedFormula};
use crate::track::{SpeedColumn, TimeColumn, Track, TrackPoint, TrackTable};

/// `(Δx, Δy)` between each row and the previous one.
pub fn displacement(points: &[TrackPoint]) -> Vec<Option<Vector2<f64>>> {
    let mut out = Vec::with_capacity(points.len());
    if points.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(
        points
            .windows(2)
            .map(|w| Some(w[1].position()? - w[0].position()?)),
    );
    out
}

/// Step length of each displacement.
pub fn magnitude(displacement: &[Option<Vector2<f64>>]) -> Vec<Option<f64>> {
    displacement.iter().map(|d| d.map(|v| v.norm())).collect()
}

/// Unit direction `(cos θ, sin θ)` of each displacement.
///
/// Undefined where the displacement is undefined or has zero length.
pub fn direction(displacement: &[Option<Vector2<f64>>]) -> Vec<Option<Vector2<f64>>> {
    displacement
        .iter()
        .map(|d| {
            let v = (*d)?;
            let m = v.norm();
            (m > 0.0 && m.is_finite()).then(|| v / m)
        })
        .collect()
}

/// `time[i] = slice_index[i] × time_interval`.
pub fn elapsed_time(points: &[TrackPoint], time_interval: f64) -> Vec<f64> {
    points
        .iter()
        .map(|p| p.slice_index as f64 * time_interval)
        .collect()
}

/// Distance to the first point and cumulative path length.
///
/// Return
/// ----------
/// * `distance_to_start[i] = |p[i] - p[0]|` (undefined if either position is missing),
/// * `cumulative_distance[i] = Σ magnitude[0..=i]`, undefined steps counted as zero.
pub fn path_length(points: &[TrackPoint], magnitude: &[Option<f64>]) -> (Vec<Option<f64>>, Vec<f64>) {
    let origin = points.first().and_then(TrackPoint::position);
    let distance_to_start = points
        .iter()
        .map(|p| Some((p.position()? - origin?).norm()))
        .collect();

    let cumulative_distance = magnitude
        .iter()
        .scan(0.0, |acc, m| {
            *acc += m.unwrap_or(0.0);
            Some(*acc)
        })
        .collect();

    (distance_to_start, cumulative_distance)
}

/// Instantaneous speed of each row.
///
/// * [`SpeedFormula::StepInterval`]: `magnitude / time_interval`.
/// * [`SpeedFormula::ElapsedTime`]: `magnitude / time`, undefined where `time <= 0`.
pub fn instant_speed(
    magnitude: &[Option<f64>],
    time: &[f64],
    formula: SpeedFormula,
    time_interval: f64,
) -> Vec<Option<f64>> {
    magnitude
        .iter()
        .zip(time)
        .map(|(m, &t)| {
            let m = (*m)?;
            let duration = match formula {
                SpeedFormula::StepInterval => time_interval,
                SpeedFormula::ElapsedTime => t,
            };
            (duration > 0.0).then(|| m / duration)
        })
        .collect()
}

/// Compute-if-absent access to the kinematic columns of a track.
///
/// Every method fills its column on first call and returns the cached column on the
/// next ones. Time and speed are recomputed when requested with a different
/// interval or formula than the cached one.
pub trait KinematicsExt {
    fn ensure_displacement(&mut self) -> &[Option<Vector2<f64>>];
    fn ensure_magnitude(&mut self) -> &[Option<f64>];
    fn ensure_direction(&mut self) -> &[Option<Vector2<f64>>];
    fn ensure_time(&mut self, time_interval: f64) -> &[f64];
    fn ensure_path_length(&mut self) -> (&[Option<f64>], &[f64]);
    fn ensure_instant_speed(&mut self, formula: SpeedFormula, time_interval: f64)
        -> &[Option<f64>];
}

impl KinematicsExt for Track {
    fn ensure_displacement(&mut self) -> &[Option<Vector2<f64>>] {
        if self.columns.displacement.is_none() {
            self.columns.displacement = Some(displacement(&self.points));
        }
        self.columns.displacement.as_deref().unwrap_or_default()
    }

    fn ensure_magnitude(&mut self) -> &[Option<f64>] {
        if self.columns.magnitude.is_none() {
            let m = magnitude(self.ensure_displacement());
            self.columns.magnitude = Some(m);
        }
        self.columns.magnitude.as_deref().unwrap_or_default()
    }

    fn ensure_direction(&mut self) -> &[Option<Vector2<f64>>] {
        if self.columns.direction.is_none() {
            let dir = direction(self.ensure_displacement());
            self.columns.direction = Some(dir);
        }
        self.columns.direction.as_deref().unwrap_or_default()
    }

    fn ensure_time(&mut self, time_interval: f64) -> &[f64] {
        let stale = self
            .columns
            .time
            .as_ref()
            .map_or(true, |t| t.time_interval != time_interval);
        if stale {
            let values = elapsed_time(self.points(), time_interval);
            self.columns.time = Some(TimeColumn {
                time_interval,
                values,
            });
        }
        self.columns
            .time
            .as_ref()
            .map(|t| t.values.as_slice())
            .unwrap_or_default()
    }

    fn ensure_path_length(&mut self) -> (&[Option<f64>], &[f64]) {
        if self.columns.distance_to_start.is_none() || self.columns.cumulative_distance.is_none()
        {
            let m = self.ensure_magnitude().to_vec();
            let (to_start, cumulative) = path_length(self.points(), &m);
            self.columns.distance_to_start = Some(to_start);
            self.columns.cumulative_distance = Some(cumulative);
        }
        (
            self.columns.distance_to_start.as_deref().unwrap_or_default(),
            self.columns
                .cumulative_distance
                .as_deref()
                .unwrap_or_default(),
        )
    }

    fn ensure_instant_speed(
        &mut self,
        formula: SpeedFormula,
        time_interval: f64,
    ) -> &[Option<f64>] {
        let stale = self
            .columns
            .instant_speed
            .as_ref()
            .map_or(true, |s| {
                s.formula != formula || s.time_interval != time_interval
            });
        if stale {
            let m = self.ensure_magnitude().to_vec();
            let t = self.ensure_time(time_interval).to_vec();
            self.columns.instant_speed = Some(SpeedColumn {
                formula,
                time_interval,
                values: instant_speed(&m, &t, formula, time_interval),
            });
        }
        self.columns
            .instant_speed
            .as_ref()
            .map(|s| s.values.as_slice())
            .unwrap_or_default()
    }
}

impl TrackTable {
    /// Copy of the table with every kinematic column filled in.
    pub fn with_kinematics(&self, params: &Configuration) -> TrackTable {
        let mut table = self.clone();
        for track in table.tracks_mut() {
            track.ensure_direction();
            track.ensure_path_length();
            track.ensure_instant_speed(params.speed_formula, params.time_interval);
        }
        table
    }
}
