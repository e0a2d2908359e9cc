//! Directionality ratio: straight-line distance from the start over path length.
//!
//! The condition curve is point-wise in time: position `i` averages the ratio of
//! row `i` of every track, which relies on the preprocessor giving every track the
//! same number of rows.
use crate::aggregation::{ConditionSummary, SummaryPoint};
use crate::config::Configuration;
use crate::kinematics::KinematicsExt;
use crate::track::TrackTable;

pub const X_LABEL: &str = "Time";
pub const Y_LABEL: &str = "Directionality ratio";

/// `distance_to_start / cumulative_distance` per row, undefined where the path
/// length is zero (always the first row).
pub fn dir_ratio_series(distance_to_start: &[Option<f64>], cumulative: &[f64]) -> Vec<Option<f64>> {
    distance_to_start
        .iter()
        .zip(cumulative)
        .map(|(d, &c)| {
            let d = (*d)?;
            (c > 0.0).then(|| d / c)
        })
        .collect()
}

/// Run the directionality-ratio analysis on a cleaned table.
pub fn dir_ratio(table: &TrackTable, params: &Configuration) -> (TrackTable, ConditionSummary) {
    let mut out = table.clone();
    for track in out.tracks_mut() {
        let (to_start, cumulative) = track.ensure_path_length();
        let ratio = dir_ratio_series(to_start, cumulative);
        track.columns.dir_ratio = Some(ratio);
    }

    let points = (0..params.n_time_points)
        .map(|i| {
            let values = out
                .tracks()
                .iter()
                .filter_map(|t| t.columns().dir_ratio.as_ref()?.get(i).copied().flatten())
                .collect();
            SummaryPoint::new(params.time_of(i), values)
        })
        .collect();

    let summary = ConditionSummary::new(out.label(), X_LABEL, Y_LABEL, points);
    (out, summary)
}
