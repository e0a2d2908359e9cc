//! Mean squared displacement as a function of the lag `tau`.
use crate::aggregation::{mean, ConditionSummary, SummaryPoint};
use crate::config::Configuration;
use crate::track::{TrackPoint, TrackTable};

pub const X_LABEL: &str = "Time lag";
pub const Y_LABEL: &str = "MSD";

/// Mean squared displacement of one lag.
///
/// Averages `|p[i + tau] - p[i]|²` over every `i` such that `i + tau` is inside the
/// track and both positions are defined. `MSD(0) = 0`.
pub fn msd_at(points: &[TrackPoint], tau: usize) -> Option<f64> {
    if tau == 0 {
        return Some(0.0);
    }
    let squared: Vec<f64> = points
        .iter()
        .zip(points.iter().skip(tau))
        .filter_map(|(a, b)| Some((b.position()? - a.position()?).norm_squared()))
        .collect();
    mean(&squared)
}

/// MSD curve for `tau = 0..len`; entries beyond the track length are undefined.
pub fn msd_curve(points: &[TrackPoint], len: usize) -> Vec<Option<f64>> {
    (0..len).map(|tau| msd_at(points, tau)).collect()
}

/// Run the MSD analysis on a cleaned table.
///
/// Each track gets its MSD curve for `tau = 0..n_time_points`; the condition curve
/// holds, for every `tau`, the mean and SEM across tracks at `x = tau × time_interval`.
pub fn msd(table: &TrackTable, params: &Configuration) -> (TrackTable, ConditionSummary) {
    let n = params.n_time_points;

    let mut out = table.clone();
    for track in out.tracks_mut() {
        track.columns.msd = Some(msd_curve(&track.points, n));
    }

    let points = (0..n)
        .map(|tau| {
            let values = out
                .tracks()
                .iter()
                .filter_map(|t| t.columns().msd.as_ref()?.get(tau).copied().flatten())
                .collect();
            SummaryPoint::new(params.time_of(tau), values)
        })
        .collect();

    let summary = ConditionSummary::new(out.label(), X_LABEL, Y_LABEL, points);
    (out, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::TrajectorySample;
    use approx::assert_relative_eq;

    #[test]
    fn constant_velocity_is_ballistic() {
        let sample = TrajectorySample::from_positions(
            "s",
            vec![(1, (0..5).map(|i| (0.5 * i as f64, 0.0)).collect::<Vec<_>>())],
            0,
        )
        .unwrap();
        let table = TrackTable::from_sample(&sample);
        let params = Configuration::builder()
            .time_interval(2.0)
            .n_time_points(5)
            .build()
            .unwrap();

        let (out, summary) = msd(&table, &params);
        let curve = out.tracks()[0].columns().msd.clone().unwrap();
        for (tau, v) in curve.iter().enumerate() {
            assert_relative_eq!(v.unwrap(), (0.5 * tau as f64).powi(2));
        }
        assert_eq!(summary.points[4].x, 8.0);
        assert_eq!(summary.points[0].stats.unwrap().mean, 0.0);
    }

    #[test]
    fn undefined_positions_are_skipped() {
        let points = vec![
            TrackPoint {
                slice_index: 0,
                x: Some(0.0),
                y: Some(0.0),
            },
            TrackPoint {
                slice_index: 1,
                x: None,
                y: Some(0.0),
            },
            TrackPoint {
                slice_index: 2,
                x: Some(2.0),
                y: Some(0.0),
            },
        ];
        assert_eq!(msd_at(&points, 1), None);
        assert_eq!(msd_at(&points, 2), Some(4.0));
        assert_eq!(msd_at(&points, 3), None);
    }
}
