//! # Trajectory samples
//!
//! A *sample* is one table of tracked positions (one sheet of a workbook, one CSV
//! file). Its label doubles as the **condition** name: samples sharing a label are
//! pooled by the statistics layer.
//!
//! Two representations exist:
//!
//! * [`RawSample`] – cells exactly as the external table delivered them (text,
//!   possibly empty or malformed). This is what the
//!   [`preprocess`](crate::preprocess) stage consumes.
//! * [`TrajectorySample`] – typed rows `(track_id, slice_index, x, y)` with unique
//!   `(track_id, slice_index)` pairs. Coordinates that were not numeric are `None`.
//!
//! Modules
//! -----------------
//! * [`csv_reader`] – CSV ingestion into a [`RawSample`].
use ahash::RandomState;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{SliceIndex, TrackId};
use crate::motility_errors::MotilityError;

pub mod csv_reader;

/// One untyped row of an external trajectory table.
///
/// Every cell is optional text; empty cells deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Track n")]
    pub track: Option<String>,
    #[serde(rename = "Slice n")]
    pub slice: Option<String>,
    #[serde(rename = "X")]
    pub x: Option<String>,
    #[serde(rename = "Y")]
    pub y: Option<String>,
}

impl RawRecord {
    pub fn new(track: &str, slice: &str, x: &str, y: &str) -> Self {
        let cell = |s: &str| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        RawRecord {
            track: cell(track),
            slice: cell(slice),
            x: cell(x),
            y: cell(y),
        }
    }

    /// True when every cell is missing.
    pub fn is_blank(&self) -> bool {
        [&self.track, &self.slice, &self.x, &self.y]
            .iter()
            .all(|c| c.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// An untyped sample, as handed over by the table/file layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub label: String,
    pub rows: Vec<RawRecord>,
}

impl RawSample {
    pub fn new(label: impl Into<String>, rows: Vec<RawRecord>) -> Self {
        RawSample {
            label: label.into(),
            rows,
        }
    }
}

impl From<&TrajectorySample> for RawSample {
    fn from(sample: &TrajectorySample) -> Self {
        let fmt_coord = |v: Option<f64>| v.map(|v| v.to_string());
        RawSample {
            label: sample.label.clone(),
            rows: sample
                .records
                .iter()
                .map(|r| RawRecord {
                    track: Some(r.track_id.to_string()),
                    slice: Some(r.slice_index.to_string()),
                    x: fmt_coord(r.x),
                    y: fmt_coord(r.y),
                })
                .collect(),
        }
    }
}

/// One typed row of a trajectory table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRecord {
    pub track_id: TrackId,
    pub slice_index: SliceIndex,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl TrajectoryRecord {
    pub fn new(track_id: TrackId, slice_index: SliceIndex, x: f64, y: f64) -> Self {
        TrajectoryRecord {
            track_id,
            slice_index,
            x: Some(x).filter(|v| v.is_finite()),
            y: Some(y).filter(|v| v.is_finite()),
        }
    }
}

/// A typed sample: ordered rows plus the condition label.
///
/// Invariants
/// -----------------
/// * `(track_id, slice_index)` pairs are unique (checked by [`TrajectorySample::new`]).
/// * Row order is kept as provided; consumers sort each track by `slice_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    label: String,
    records: Vec<TrajectoryRecord>,
}

impl TrajectorySample {
    /// Build a sample, rejecting duplicated `(track_id, slice_index)` pairs.
    pub fn new(
        label: impl Into<String>,
        records: Vec<TrajectoryRecord>,
    ) -> Result<Self, MotilityError> {
        let label = label.into();
        let mut seen: HashSet<(TrackId, SliceIndex), RandomState> = HashSet::default();
        for r in &records {
            if !seen.insert((r.track_id, r.slice_index)) {
                return Err(MotilityError::DuplicateSlice {
                    sample: label,
                    track_id: r.track_id,
                    slice_index: r.slice_index,
                });
            }
        }
        Ok(TrajectorySample { label, records })
    }

    /// Build a sample from per-track position lists.
    ///
    /// Arguments
    /// -----------------
    /// * `label`: Sample / condition label.
    /// * `tracks`: `(track_id, positions)` pairs; positions get consecutive slice
    ///   indices starting at `first_slice`.
    /// * `first_slice`: Slice index of the first position of every track.
    ///
    /// Return
    /// ----------
    /// * The sample, or `MotilityError::DuplicateSlice` if a track id is repeated.
    pub fn from_positions<I, P>(
        label: impl Into<String>,
        tracks: I,
        first_slice: SliceIndex,
    ) -> Result<Self, MotilityError>
    where
        I: IntoIterator<Item = (TrackId, P)>,
        P: IntoIterator<Item = (f64, f64)>,
    {
        let records = tracks
            .into_iter()
            .flat_map(|(id, positions)| {
                positions
                    .into_iter()
                    .enumerate()
                    .map(move |(i, (x, y))| {
                        TrajectoryRecord::new(id, first_slice + i as SliceIndex, x, y)
                    })
            })
            .collect();
        Self::new(label, records)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct track ids.
    pub fn track_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.track_id)
            .collect::<HashSet<_, RandomState>>()
            .len()
    }
}
