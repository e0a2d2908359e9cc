mod common;

use std::io::Write;

use camino::Utf8PathBuf;

use motility::analysis::{run_analysis, Analysis};
use motility::diagnostics::{CollectingDiagnostics, Diagnostic};
use motility::motility_errors::MotilityError;
use motility::preprocess::coerce_sample;
use motility::sample::csv_reader::{read_raw_sample, read_raw_sample_from_path};

use common::{assert_means_close, params};

const EXPORT: &str = "\
Track n,Slice n,X,Y,Distance
1,1,0,0,
1,2,3,4,5
1,3,6,8,5
2,1,10,10,
2,2,10,11,1
2,3,10,12,1
3,1.0,5,5,
,,,,
3,2,,5,
";

#[test]
fn exported_table_runs_end_to_end() {
    let raw = read_raw_sample(EXPORT.as_bytes(), "ctrl").unwrap();
    assert_eq!(raw.rows.len(), 8);

    let mut diag = CollectingDiagnostics::default();
    let run = run_analysis(Analysis::Msd, &[raw], &params(3, 3, 1), &mut diag).unwrap();
    let cleaned = run.samples[0].report.as_ref().unwrap();
    assert_eq!(cleaned.distinct_tracks, 3);
    assert_eq!(cleaned.missing_tracks, vec![3]);

    // track 1 steps 5, track 2 steps 1
    let summary = run.summaries().next().unwrap();
    assert_means_close(summary, &[Some(0.0), Some(13.0), Some(52.0)], 1e-12);
    assert!(diag
        .events()
        .iter()
        .any(|e| matches!(e, Diagnostic::MissingTracks { track_ids, .. } if track_ids == &[3])));
}

#[test]
fn float_indices_are_truncated_and_blank_coordinates_undefined() {
    let raw = read_raw_sample(EXPORT.as_bytes(), "ctrl").unwrap();
    let sample = coerce_sample(&raw).unwrap();

    let track3: Vec<_> = sample
        .records()
        .iter()
        .filter(|r| r.track_id == 3)
        .collect();
    assert_eq!(track3.len(), 2);
    assert_eq!(track3[0].slice_index, 1);
    assert_eq!(track3[1].x, None);
    assert_eq!(track3[1].y, Some(5.0));
}

#[test]
fn non_numeric_track_cell_rejects_the_sample() {
    let data = "Track n,Slice n,X,Y\nA,1,0,0\n";
    let raw = read_raw_sample(data.as_bytes(), "bad").unwrap();
    assert!(matches!(
        coerce_sample(&raw),
        Err(MotilityError::DataTypeError { sample, .. }) if sample == "bad"
    ));
}

#[test]
fn file_stem_becomes_the_label() {
    let path = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap()
        .join(format!("motility_ctrl_{}.csv", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
    }
    let raw = read_raw_sample_from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(raw.label.starts_with("motility_ctrl_"));
    assert_eq!(raw.rows.len(), 8);

    let missing = read_raw_sample_from_path(&path);
    assert!(matches!(missing, Err(MotilityError::IoError(_))));
}
