//! # CSV ingestion
//!
//! Read a trajectory table exported as CSV (`Track n, Slice n, X, Y`, extra columns
//! ignored) into a [`RawSample`]. No type checking happens here: cells are kept as
//! text and handed to [`crate::preprocess`], which owns coercion and error policy.
//!
//! Rows whose cells are all empty (spreadsheet padding) are dropped.
use std::fs::File;
use std::io::Read;

use camino::Utf8Path;

use crate::constants::{COL_SLICE, COL_TRACK, COL_X, COL_Y};
use crate::motility_errors::MotilityError;
use crate::sample::{RawRecord, RawSample};

/// Read a raw sample from any CSV source with a header row.
///
/// Arguments
/// -----------------
/// * `reader`: CSV byte source.
/// * `label`: Sample / condition label attached to the result.
///
/// Return
/// ----------
/// * The [`RawSample`].
/// * `MotilityError::MissingColumn` if one of the four required headers is absent.
/// * `MotilityError::Csv` on malformed CSV.
pub fn read_raw_sample<R: Read>(reader: R, label: &str) -> Result<RawSample, MotilityError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    for column in [COL_TRACK, COL_SLICE, COL_X, COL_Y] {
        if !headers.iter().any(|h| h == column) {
            return Err(MotilityError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawRecord>() {
        let record = record?;
        if !record.is_blank() {
            rows.push(record);
        }
    }

    Ok(RawSample::new(label, rows))
}

/// Read a raw sample from a CSV file; the label is the file stem.
pub fn read_raw_sample_from_path(path: &Utf8Path) -> Result<RawSample, MotilityError> {
    let label = path.file_stem().unwrap_or(path.as_str()).to_string();
    let file = File::open(path)?;
    read_raw_sample(file, &label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_skips_blank_rows() {
        let data = "Track n,Slice n,X,Y,Comment\n\
                    1,1,0.5,1.5,a\n\
                    ,,,,\n\
                    1,2,abc,2.0,b\n";
        let raw = read_raw_sample(data.as_bytes(), "ctrl").unwrap();

        assert_eq!(raw.label, "ctrl");
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0], RawRecord::new("1", "1", "0.5", "1.5"));
        assert_eq!(raw.rows[1].x.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_column_is_reported() {
        let data = "Track n,Slice n,X\n1,1,0.5\n";
        let err = read_raw_sample(data.as_bytes(), "ctrl").unwrap_err();
        assert_eq!(err, MotilityError::MissingColumn("Y".into()));
    }
}
