use thiserror::Error;

use crate::constants::{SliceIndex, TrackId};

#[derive(Error, Debug)]
pub enum MotilityError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Incorrect type of data in columns Track n or Slice n of sample '{sample}': {reason}")]
    DataTypeError { sample: String, reason: String },

    #[error("Duplicated slice {slice_index} for track {track_id} in sample '{sample}'")]
    DuplicateSlice {
        sample: String,
        track_id: TrackId,
        slice_index: SliceIndex,
    },

    #[error("No track of sample '{0}' has enough slices")]
    NoUsableTracks(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Error while reading CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for MotilityError {
    fn eq(&self, other: &Self) -> bool {
        use MotilityError::*;
        match (self, other) {
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (
                DataTypeError {
                    sample: s1,
                    reason: r1,
                },
                DataTypeError {
                    sample: s2,
                    reason: r2,
                },
            ) => s1 == s2 && r1 == r2,
            (
                DuplicateSlice {
                    sample: s1,
                    track_id: t1,
                    slice_index: i1,
                },
                DuplicateSlice {
                    sample: s2,
                    track_id: t2,
                    slice_index: i2,
                },
            ) => s1 == s2 && t1 == t2 && i1 == i2,
            (NoUsableTracks(a), NoUsableTracks(b)) => a == b,
            (InsufficientData(a), InsufficientData(b)) => a == b,
            (MissingColumn(a), MissingColumn(b)) => a == b,
            (UnknownMetric(a), UnknownMetric(b)) => a == b,

            // Wrapped foreign errors are not comparable: same variant is enough
            (Csv(_), Csv(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
