//! # Tracks and per-sample track tables
//!
//! A [`Track`] is the slice-ordered sequence of positions sharing one track id. A
//! [`TrackTable`] owns every track of one sample and is the unit each analysis
//! receives and returns.
//!
//! ## Derived columns
//!
//! Besides its points, a track carries a [`DerivedColumns`] cache. Each column is
//! `None` until the component that owns it fills it in:
//!
//! * kinematic columns (displacement, direction, time, path length, speed) are filled
//!   by [`crate::kinematics::KinematicsExt`], once, and reused afterwards;
//! * analysis columns (MSD curve, persistence per lag, directionality ratio, average
//!   speed) are written by the corresponding analysis on its own copy of the table.
//!
//! Every value inside a column is row-aligned with the track points and uses
//! `Option<f64>` for *undefined* (missing coordinate, zero-length step, …).
//!
//! ## Value semantics
//!
//! Analyses never mutate the table they are given: they clone it, enrich the clone
//! and return it. Two analyses run on the same input cannot see each other's columns.
use std::collections::BTreeMap;

use nalgebra::Vector2;

use crate::config::SpeedFormula;
use crate::constants::{SliceIndex, TrackId};
use crate::sample::{TrajectoryRecord, TrajectorySample};

/// One position of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub slice_index: SliceIndex,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl TrackPoint {
    /// Position as a vector, when both coordinates are defined.
    #[inline]
    pub fn position(&self) -> Option<Vector2<f64>> {
        Some(Vector2::new(self.x?, self.y?))
    }
}

impl From<&TrajectoryRecord> for TrackPoint {
    fn from(r: &TrajectoryRecord) -> Self {
        TrackPoint {
            slice_index: r.slice_index,
            x: r.x,
            y: r.y,
        }
    }
}

/// Elapsed-time column, tagged with the interval it was computed with.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeColumn {
    pub time_interval: f64,
    pub values: Vec<f64>,
}

/// Instantaneous-speed column, tagged with the formula and interval used.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedColumn {
    pub formula: SpeedFormula,
    pub time_interval: f64,
    pub values: Vec<Option<f64>>,
}

/// Per-track persistence curve, one entry per lag `1..=values.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceColumn {
    pub time_interval: f64,
    pub values: Vec<Option<f64>>,
}

impl PersistenceColumn {
    /// Persistence at lag `step` (`step >= 1`).
    pub fn at(&self, step: usize) -> Option<f64> {
        self.values.get(step.checked_sub(1)?).copied().flatten()
    }
}

/// Cached per-row columns of a track. See the module documentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedColumns {
    /// `(Δx, Δy)` from the previous row; undefined on the first row.
    pub displacement: Option<Vec<Option<Vector2<f64>>>>,
    /// Step length `|(Δx, Δy)|`.
    pub magnitude: Option<Vec<Option<f64>>>,
    /// Unit direction `(cos θ, sin θ)`; undefined for zero-length steps.
    pub direction: Option<Vec<Option<Vector2<f64>>>>,
    /// `slice_index × time_interval`.
    pub time: Option<TimeColumn>,
    /// Straight-line distance from the first point.
    pub distance_to_start: Option<Vec<Option<f64>>>,
    /// Running sum of step lengths (undefined steps count as zero).
    pub cumulative_distance: Option<Vec<f64>>,
    pub instant_speed: Option<SpeedColumn>,

    /// MSD as a function of lag `tau`, stored at row `tau` (row 0 holds `MSD(0) = 0`).
    pub msd: Option<Vec<Option<f64>>>,
    /// Mean direction autocorrelation of this track, one entry per lag `1..=n_plot_points`.
    pub persistence: Option<PersistenceColumn>,
    /// `distance_to_start / cumulative_distance` per row.
    pub dir_ratio: Option<Vec<Option<f64>>>,
    /// Mean of the defined instantaneous speeds of the track.
    pub average_speed: Option<Option<f64>>,
}

/// A slice-ordered track with its cached derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: TrackId,
    pub(crate) points: Vec<TrackPoint>,
    pub(crate) columns: DerivedColumns,
}

impl Track {
    /// Build a track; points are sorted by slice index.
    pub fn new(id: TrackId, mut points: Vec<TrackPoint>) -> Self {
        points.sort_by_key(|p| p.slice_index);
        Track {
            id,
            points,
            columns: DerivedColumns::default(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn columns(&self) -> &DerivedColumns {
        &self.columns
    }

    /// Keep only the first `n` points and drop every cached column.
    pub(crate) fn truncate(&mut self, n: usize) {
        self.points.truncate(n);
        self.columns = DerivedColumns::default();
    }
}

/// All tracks of one sample, sorted by track id.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTable {
    label: String,
    tracks: Vec<Track>,
}

impl TrackTable {
    pub fn new(label: impl Into<String>, mut tracks: Vec<Track>) -> Self {
        tracks.sort_by_key(|t| t.id);
        TrackTable {
            label: label.into(),
            tracks,
        }
    }

    /// Group the rows of a sample by track id; every track is kept, whatever its length.
    pub fn from_sample(sample: &TrajectorySample) -> Self {
        let mut grouped: BTreeMap<TrackId, Vec<TrackPoint>> = BTreeMap::new();
        for record in sample.records() {
            grouped
                .entry(record.track_id)
                .or_default()
                .push(TrackPoint::from(record));
        }

        TrackTable {
            label: sample.label().to_string(),
            tracks: grouped
                .into_iter()
                .map(|(id, points)| Track::new(id, points))
                .collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub(crate) fn retain_tracks<F: FnMut(&Track) -> bool>(&mut self, f: F) {
        self.tracks.retain(f);
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|i| &self.tracks[i])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of rows across all tracks.
    pub fn row_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Length of the longest track.
    pub fn max_track_len(&self) -> usize {
        self.tracks.iter().map(Track::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_are_grouped_and_sorted() {
        let sample = TrajectorySample::new(
            "ctrl",
            vec![
                TrajectoryRecord::new(7, 2, 2.0, 0.0),
                TrajectoryRecord::new(3, 0, 0.0, 0.0),
                TrajectoryRecord::new(7, 0, 0.0, 0.0),
                TrajectoryRecord::new(7, 1, 1.0, 0.0),
            ],
        )
        .unwrap();

        let table = TrackTable::from_sample(&sample);
        assert_eq!(table.label(), "ctrl");
        assert_eq!(table.len(), 2);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.max_track_len(), 3);

        let t7 = table.track(7).unwrap();
        let slices: Vec<_> = t7.points().iter().map(|p| p.slice_index).collect();
        assert_eq!(slices, vec![0, 1, 2]);
        assert!(table.track(4).is_none());
    }

    #[test]
    fn truncation_clears_cached_columns() {
        let mut track = Track::new(
            1,
            (0..4)
                .map(|i| TrackPoint {
                    slice_index: i,
                    x: Some(i as f64),
                    y: None,
                })
                .collect(),
        );
        track.columns.magnitude = Some(vec![None; 4]);
        track.truncate(2);

        assert_eq!(track.len(), 2);
        assert!(track.columns().magnitude.is_none());
        assert!(track.points()[1].position().is_none());
    }
}
