//! Plot data for the trajectory view: tracks translated to start at the origin.
//!
//! Works on the grouped sample without the preprocessing window filter, so short
//! tracks are drawn too. No statistics are computed.
use crate::config::Configuration;
use crate::constants::TrackId;
use crate::track::TrackTable;

/// Origin-centred paths of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPlot {
    pub label: String,
    /// `(track_id, [(x, y), …])`, in track-id order.
    pub paths: Vec<(TrackId, Vec<(f64, f64)>)>,
    /// Half-extent of the square viewport `[-radius, radius]²` holding every point.
    pub radius: f64,
}

/// Build the trajectory view of a sample.
///
/// Arguments
/// -----------------
/// * `table`: Every track of the sample, grouped and sorted.
/// * `params`: `n_tracks` caps the number of tracks drawn (`0` draws them all) and
///   `n_time_points` the number of points per track.
///
/// Each path is shifted by its first defined position; points with an undefined
/// coordinate are left out.
pub fn trajectory_plot(table: &TrackTable, params: &Configuration) -> TrajectoryPlot {
    let n_tracks = if params.n_tracks == 0 {
        table.len()
    } else {
        params.n_tracks
    };

    let paths: Vec<(TrackId, Vec<(f64, f64)>)> = table
        .tracks()
        .iter()
        .take(n_tracks)
        .filter_map(|track| {
            let positions: Vec<_> = track
                .points()
                .iter()
                .take(params.n_time_points)
                .filter_map(|p| p.position())
                .collect();
            let origin = *positions.first()?;
            let path = positions
                .iter()
                .map(|p| {
                    let v = p - origin;
                    (v.x, v.y)
                })
                .collect();
            Some((track.id(), path))
        })
        .collect();

    let radius = paths
        .iter()
        .flat_map(|(_, path)| path.iter())
        .fold(0.0_f64, |r, &(x, y)| r.max(x.abs()).max(y.abs()));

    TrajectoryPlot {
        label: table.label().to_string(),
        paths,
        radius,
    }
}
