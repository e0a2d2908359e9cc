//! Directional persistence: mean cosine between step directions separated by a lag.
//!
//! For a lag `step`, every pair of rows `(i, i + step)` of a track whose two unit
//! directions are defined contributes `dir[i] · dir[i + step]`. Pairs are averaged
//! within the track first, then the track averages are aggregated across the
//! sample (mean and SEM). Lag `0` is `1` for every track by definition.
use nalgebra::Vector2;

use crate::aggregation::{mean, ConditionSummary, SummaryPoint};
use crate::config::Configuration;
use crate::kinematics::KinematicsExt;
use crate::motility_errors::MotilityError;
use crate::track::{PersistenceColumn, TrackTable};

pub const X_LABEL: &str = "Time lag";
pub const Y_LABEL: &str = "Mean persistence";

/// Mean dot product of the unit directions `step` rows apart.
///
/// `None` when no pair has both directions defined.
pub fn track_persistence(direction: &[Option<Vector2<f64>>], step: usize) -> Option<f64> {
    let dots: Vec<f64> = direction
        .iter()
        .zip(direction.iter().skip(step))
        .filter_map(|(a, b)| Some(a.as_ref()?.dot(b.as_ref()?)))
        .collect();
    mean(&dots)
}

/// [`track_persistence`] for every lag `1..=max_lag`.
pub fn persistence_curve(direction: &[Option<Vector2<f64>>], max_lag: usize) -> Vec<Option<f64>> {
    (1..=max_lag)
        .map(|step| track_persistence(direction, step))
        .collect()
}

/// Run the autocorrelation analysis on a cleaned table.
///
/// Arguments
/// -----------------
/// * `table`: Cleaned track table of one sample.
/// * `params`: Run configuration; lags `1..=n_plot_points` are computed.
///
/// Return
/// ----------
/// * A copy of `table` with the `persistence` column of every track filled, and the
///   condition curve: lag `0` first, then one point per lag at `x = step × time_interval`.
/// * `MotilityError::InvalidConfiguration` if `n_plot_points == 0`.
pub fn autocorrelation(
    table: &TrackTable,
    params: &Configuration,
) -> Result<(TrackTable, ConditionSummary), MotilityError> {
    params.require_plot_points()?;
    let n_lags = params.n_plot_points;

    let mut out = table.clone();
    for track in out.tracks_mut() {
        let values = persistence_curve(track.ensure_direction(), n_lags);
        track.columns.persistence = Some(PersistenceColumn {
            time_interval: params.time_interval,
            values,
        });
    }

    let mut points = Vec::with_capacity(n_lags + 1);
    points.push(SummaryPoint::new(0.0, vec![1.0; out.len()]));
    for step in 1..=n_lags {
        let values = out
            .tracks()
            .iter()
            .filter_map(|t| t.columns().persistence.as_ref()?.at(step))
            .collect();
        points.push(SummaryPoint::new(params.time_of(step), values));
    }

    let summary = ConditionSummary::new(out.label(), X_LABEL, Y_LABEL, points);
    Ok((out, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::TrajectorySample;
    use approx::assert_relative_eq;

    fn table(tracks: Vec<(i64, Vec<(f64, f64)>)>) -> TrackTable {
        TrackTable::from_sample(&TrajectorySample::from_positions("s", tracks, 0).unwrap())
    }

    #[test]
    fn constant_direction_is_fully_persistent() {
        let t = table(vec![(1, (0..6).map(|i| (i as f64, 2.0 * i as f64)).collect())]);
        let params = Configuration::builder()
            .n_time_points(6)
            .n_plot_points(3)
            .build()
            .unwrap();
        let (out, summary) = autocorrelation(&t, &params).unwrap();

        let curve = out.tracks()[0].columns().persistence.clone().unwrap().values;
        for v in curve {
            assert_relative_eq!(v.unwrap(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(summary.points.len(), 4);
        assert_eq!(summary.points[0].stats.unwrap().mean, 1.0);
        assert_eq!(summary.points[3].x, 3.0);
    }

    #[test]
    fn reversal_gives_negative_persistence() {
        // right, left, right, left
        let dir = vec![
            None,
            Some(Vector2::new(1.0, 0.0)),
            Some(Vector2::new(-1.0, 0.0)),
            Some(Vector2::new(1.0, 0.0)),
            Some(Vector2::new(-1.0, 0.0)),
        ];
        assert_eq!(track_persistence(&dir, 1), Some(-1.0));
        assert_eq!(track_persistence(&dir, 2), Some(1.0));
        assert_eq!(track_persistence(&dir, 4), None);
    }

    #[test]
    fn lags_without_pairs_are_undefined() {
        let t = table(vec![(1, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);
        let params = Configuration::builder()
            .n_time_points(3)
            .n_plot_points(3)
            .build()
            .unwrap();
        let (_, summary) = autocorrelation(&t, &params).unwrap();

        assert!(summary.points[1].stats.is_some());
        assert!(summary.points[2].stats.is_none());
        assert!(summary.points[3].stats.is_none());
    }

    #[test]
    fn zero_plot_points_is_rejected() {
        let t = table(vec![(1, vec![(0.0, 0.0), (1.0, 0.0)])]);
        let params = Configuration::builder().n_plot_points(0).build().unwrap();
        assert!(matches!(
            autocorrelation(&t, &params),
            Err(MotilityError::InvalidConfiguration(_))
        ));
    }
}
