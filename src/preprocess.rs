//! # Track preprocessing
//!
//! Turn one raw sample into a [`TrackTable`] restricted to a uniform time window.
//!
//! ## Pipeline
//!
//! 1. **Coercion** ([`coerce_sample`]) – rows missing a track or slice cell are dropped,
//!    track and slice cells are converted to integers, coordinates to `f64`
//!    (non-numeric coordinates become undefined). A track/slice cell that cannot be
//!    read as a number makes the whole sample unusable (`DataTypeError`).
//! 2. **Grouping** – rows are grouped by track id and each track sorted by slice.
//! 3. **Window** – a track is kept only if it has at least `n_time_points` rows; kept
//!    tracks are truncated to their first `n_time_points` rows.
//! 4. **Reporting** – a [`Diagnostic::TrackCountMismatch`] when the number of distinct
//!    tracks differs from `n_tracks`, a [`Diagnostic::MissingTracks`] listing the
//!    excluded ids.
//!
//! Slice continuity inside a track is the caller's responsibility and is not checked.
use log::debug;

use crate::config::Configuration;
use crate::constants::{SliceIndex, TrackId, COL_SLICE, COL_TRACK};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::motility_errors::MotilityError;
use crate::sample::{RawSample, TrajectoryRecord, TrajectorySample};
use crate::track::TrackTable;

/// What the preprocessor did to a sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreprocessReport {
    /// Distinct track ids found after coercion.
    pub distinct_tracks: usize,
    /// Tracks kept (and truncated).
    pub kept: usize,
    /// Ids of the tracks excluded for having fewer than `n_time_points` rows.
    pub missing_tracks: Vec<TrackId>,
}

/// A cleaned table and the report of how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSample {
    pub table: TrackTable,
    pub report: PreprocessReport,
}

/// Parse an integer cell; floating-point text is truncated toward zero.
fn parse_index(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

fn parse_coordinate(cell: Option<&str>) -> Option<f64> {
    cell?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce the cells of a raw sample into typed rows.
///
/// Arguments
/// -----------------
/// * `raw`: The untyped sample.
///
/// Return
/// ----------
/// * The typed sample; rows missing a track or slice cell are dropped.
/// * `MotilityError::DataTypeError` if a track or slice cell is not numeric.
/// * `MotilityError::DuplicateSlice` if a `(track, slice)` pair appears twice.
pub fn coerce_sample(raw: &RawSample) -> Result<TrajectorySample, MotilityError> {
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let (Some(track), Some(slice)) = (row.track.as_deref(), row.slice.as_deref()) else {
            continue;
        };
        if track.trim().is_empty() || slice.trim().is_empty() {
            continue;
        }

        let not_numeric = |column: &str, cell: &str| MotilityError::DataTypeError {
            sample: raw.label.clone(),
            reason: format!("'{cell}' in column {column} is not a number"),
        };
        let track_id: TrackId = parse_index(track).ok_or_else(|| not_numeric(COL_TRACK, track))?;
        let slice_index: SliceIndex =
            parse_index(slice).ok_or_else(|| not_numeric(COL_SLICE, slice))?;

        records.push(TrajectoryRecord {
            track_id,
            slice_index,
            x: parse_coordinate(row.x.as_deref()),
            y: parse_coordinate(row.y.as_deref()),
        });
    }

    TrajectorySample::new(raw.label.clone(), records)
}

/// Restrict a typed sample to `n_time_points` leading slices per qualifying track.
///
/// Arguments
/// -----------------
/// * `sample`: The typed sample.
/// * `params`: Run configuration (`n_time_points`, `n_tracks`).
/// * `diag`: Diagnostics sink receiving the mismatch / exclusion warnings.
///
/// Return
/// ----------
/// * The [`CleanedSample`].
/// * `MotilityError::NoUsableTracks` if every track is shorter than the window.
pub fn preprocess_sample(
    sample: &TrajectorySample,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<CleanedSample, MotilityError> {
    let mut table = TrackTable::from_sample(sample);
    let distinct_tracks = table.len();
    let n = params.n_time_points;

    if distinct_tracks != params.n_tracks {
        diag.report(Diagnostic::TrackCountMismatch {
            sample: sample.label().to_string(),
            expected: params.n_tracks,
            found: distinct_tracks,
        });
    }

    let missing_tracks: Vec<TrackId> = table
        .tracks()
        .iter()
        .filter(|t| t.len() < n)
        .map(|t| t.id())
        .collect();
    if !missing_tracks.is_empty() {
        table.retain_tracks(|t| t.len() >= n);
        diag.report(Diagnostic::MissingTracks {
            sample: sample.label().to_string(),
            required_slices: n,
            track_ids: missing_tracks.clone(),
        });
    }

    for track in table.tracks_mut() {
        track.truncate(n);
    }

    if table.is_empty() {
        return Err(MotilityError::NoUsableTracks(sample.label().to_string()));
    }

    debug!(
        "{}: kept {} of {} tracks, {} slices each",
        sample.label(),
        table.len(),
        distinct_tracks,
        n
    );

    Ok(CleanedSample {
        report: PreprocessReport {
            distinct_tracks,
            kept: table.len(),
            missing_tracks,
        },
        table,
    })
}

/// [`coerce_sample`] followed by [`preprocess_sample`].
pub fn clean_sample(
    raw: &RawSample,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<CleanedSample, MotilityError> {
    let sample = coerce_sample(raw)?;
    preprocess_sample(&sample, params, diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::sample::RawRecord;

    fn params(n_time_points: usize, n_tracks: usize) -> Configuration {
        Configuration::builder()
            .n_time_points(n_time_points)
            .n_tracks(n_tracks)
            .build()
            .unwrap()
    }

    #[test]
    fn coercion_drops_incomplete_rows_and_keeps_bad_coordinates_undefined() {
        let raw = RawSample::new(
            "ctrl",
            vec![
                RawRecord::new("1", "1", "0.0", "0.0"),
                RawRecord::new("", "2", "1.0", "0.0"),
                RawRecord::new("1", "2.0", "n/a", "1.0"),
                RawRecord::new("2", "", "1.0", "1.0"),
            ],
        );
        let sample = coerce_sample(&raw).unwrap();

        assert_eq!(sample.len(), 2);
        assert_eq!(sample.records()[1].slice_index, 2);
        assert_eq!(sample.records()[1].x, None);
        assert_eq!(sample.records()[1].y, Some(1.0));
    }

    #[test]
    fn garbage_track_id_rejects_the_sample() {
        let raw = RawSample::new("ctrl", vec![RawRecord::new("cell-a", "1", "0", "0")]);
        let err = coerce_sample(&raw).unwrap_err();
        assert!(matches!(err, MotilityError::DataTypeError { ref sample, .. } if sample == "ctrl"));
    }

    #[test]
    fn short_tracks_are_excluded_and_long_ones_truncated() {
        let sample = TrajectorySample::from_positions(
            "ctrl",
            vec![
                (1, vec![(0.0, 0.0); 5]),
                (2, vec![(0.0, 0.0); 2]),
                (3, vec![(0.0, 0.0); 3]),
            ],
            1,
        )
        .unwrap();
        let mut diag = CollectingDiagnostics::default();
        let cleaned = preprocess_sample(&sample, &params(3, 3), &mut diag).unwrap();

        assert_eq!(cleaned.report.kept, 2);
        assert_eq!(cleaned.report.missing_tracks, vec![2]);
        assert!(cleaned.table.tracks().iter().all(|t| t.len() == 3));
        assert_eq!(
            diag.events(),
            &[Diagnostic::MissingTracks {
                sample: "ctrl".into(),
                required_slices: 3,
                track_ids: vec![2],
            }]
        );
    }

    #[test]
    fn track_count_mismatch_is_only_a_warning() {
        let sample =
            TrajectorySample::from_positions("ctrl", vec![(1, vec![(0.0, 0.0); 2])], 0).unwrap();
        let mut diag = CollectingDiagnostics::default();
        let cleaned = preprocess_sample(&sample, &params(2, 4), &mut diag).unwrap();

        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(
            diag.events(),
            &[Diagnostic::TrackCountMismatch {
                sample: "ctrl".into(),
                expected: 4,
                found: 1,
            }]
        );
    }

    #[test]
    fn no_usable_track_is_an_error() {
        let raw = RawSample::new("ctrl", vec![RawRecord::new("1", "1", "0", "0")]);
        let mut diag = CollectingDiagnostics::default();
        let err = clean_sample(&raw, &params(4, 1), &mut diag).unwrap_err();
        assert_eq!(err, MotilityError::NoUsableTracks("ctrl".into()));
    }
}
