//! Average instantaneous speed per track and per condition.
use crate::aggregation::{mean_defined, ConditionSummary, SummaryPoint};
use crate::config::{Configuration, SpeedFormula};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::kinematics::KinematicsExt;
use crate::track::TrackTable;

pub const X_LABEL: &str = "Condition";
pub const Y_LABEL: &str = "Average speed";

/// Run the speed analysis on a cleaned table.
///
/// Every track gets its instantaneous speed column (formula from `params`) and
/// `average_speed`, the mean of its defined speeds. The condition summary is a
/// single point: mean and SEM of the track averages.
///
/// Using [`SpeedFormula::ElapsedTime`] reports [`Diagnostic::SpeedFormulaLegacy`].
pub fn speed(
    table: &TrackTable,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> (TrackTable, ConditionSummary) {
    if params.speed_formula == SpeedFormula::ElapsedTime {
        diag.report(Diagnostic::SpeedFormulaLegacy {
            sample: table.label().to_string(),
        });
    }

    let mut out = table.clone();
    for track in out.tracks_mut() {
        let average = mean_defined(
            track
                .ensure_instant_speed(params.speed_formula, params.time_interval)
                .iter()
                .copied(),
        );
        track.columns.average_speed = Some(average);
    }

    let values = out
        .tracks()
        .iter()
        .filter_map(|t| t.columns().average_speed.flatten())
        .collect();
    let summary = ConditionSummary::new(
        out.label(),
        X_LABEL,
        Y_LABEL,
        vec![SummaryPoint::new(0.0, values)],
    );
    (out, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::sample::TrajectorySample;
    use approx::assert_relative_eq;

    fn sample_table() -> TrackTable {
        let sample = TrajectorySample::from_positions(
            "ctrl",
            vec![
                (1, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
                (2, vec![(0.0, 0.0), (0.0, 3.0), (0.0, 6.0)]),
            ],
            1,
        )
        .unwrap();
        TrackTable::from_sample(&sample)
    }

    #[test]
    fn averages_per_track_then_across_tracks() {
        let params = Configuration::builder()
            .time_interval(1.0)
            .n_time_points(3)
            .build()
            .unwrap();
        let mut diag = CollectingDiagnostics::default();
        let (out, summary) = speed(&sample_table(), &params, &mut diag);

        assert_eq!(out.tracks()[0].columns().average_speed, Some(Some(1.0)));
        assert_eq!(out.tracks()[1].columns().average_speed, Some(Some(3.0)));

        let stats = summary.points[0].stats.unwrap();
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.sem.unwrap(), 1.0);
        assert!(diag.is_empty());
    }

    #[test]
    fn legacy_formula_is_reported() {
        let params = Configuration::builder()
            .n_time_points(3)
            .speed_formula(SpeedFormula::ElapsedTime)
            .build()
            .unwrap();
        let mut diag = CollectingDiagnostics::default();
        let (out, _) = speed(&sample_table(), &params, &mut diag);

        // slices 2 and 3: 1/2 and 1/3
        assert_relative_eq!(
            out.tracks()[0].columns().average_speed.flatten().unwrap(),
            (0.5 + 1.0 / 3.0) / 2.0
        );
        assert_eq!(
            diag.events(),
            &[Diagnostic::SpeedFormulaLegacy {
                sample: "ctrl".into()
            }]
        );
    }
}
