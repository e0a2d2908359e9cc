mod common;

use approx::assert_relative_eq;

use motility::analysis::Analysis;
use motility::config::Configuration;
use motility::diagnostics::{CollectingDiagnostics, Diagnostic};
use motility::motility_errors::MotilityError;
use motility::pipeline::{run, Outcome, Selection};
use motility::statistics::anova::AnovaOutcome;
use motility::statistics::metrics::Metric;
use motility::statistics::{run_statistics, Comparison, StatisticsTest};

use common::{random_walk_sample, straight_line_sample};

fn three_speeds() -> Vec<motility::sample::RawSample> {
    vec![
        random_walk_sample("low", 6, 12, 1.0, 1),
        random_walk_sample("mid", 6, 12, 10.0, 2),
        random_walk_sample("high", 6, 12, 100.0, 3),
    ]
}

#[test]
fn anova_on_separated_speeds_runs_tukey() {
    let mut diag = CollectingDiagnostics::default();
    let report = run_statistics(
        StatisticsTest::Anova,
        Metric::Speed,
        &three_speeds(),
        &Configuration::default(),
        &mut diag,
    )
    .unwrap();

    assert_eq!(report.records.len(), 18);
    let Comparison::Anova(AnovaOutcome::Significant { anova, tukey }) = &report.comparison else {
        panic!("expected Tukey HSD, got {:?}", report.comparison);
    };
    assert!(anova.p_value < 0.05);
    assert_eq!(tukey.len(), 3);
    let pairs: Vec<_> = tukey
        .iter()
        .map(|r| (r.group1.as_str(), r.group2.as_str()))
        .collect();
    assert_eq!(pairs, vec![("high", "low"), ("high", "mid"), ("low", "mid")]);
    assert!(tukey.iter().any(|r| r.reject));
}

#[test]
fn anova_on_identical_conditions_is_not_significant() {
    let samples: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|label| random_walk_sample(label, 5, 10, 2.0, 42))
        .collect();
    let mut diag = CollectingDiagnostics::default();
    let report = run_statistics(
        StatisticsTest::Anova,
        Metric::Msd,
        &samples,
        &Configuration::default(),
        &mut diag,
    )
    .unwrap();

    let Comparison::Anova(outcome) = &report.comparison else {
        panic!("expected an ANOVA outcome");
    };
    assert!(!outcome.is_significant());
    assert_relative_eq!(outcome.anova().p_value, 1.0, epsilon = 1e-9);
}

#[test]
fn pairwise_matrix_is_symmetric() {
    let mut diag = CollectingDiagnostics::default();
    let report = run_statistics(
        StatisticsTest::Pairwise,
        Metric::DirectionalityRatio,
        &three_speeds(),
        &Configuration::default(),
        &mut diag,
    )
    .unwrap();

    let Comparison::Pairwise(matrix) = &report.comparison else {
        panic!("expected a p-value matrix");
    };
    assert_eq!(matrix.labels, vec!["low", "mid", "high"]);
    for i in 0..matrix.len() {
        assert_eq!(matrix.values[i][i], None);
        for j in 0..matrix.len() {
            assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            if let Some(p) = matrix.values[i][j] {
                assert!((0.0..=1.0).contains(&p));
                // four decimals
                assert_relative_eq!(p, (p * 1e4).round() / 1e4);
            }
        }
    }
}

#[test]
fn samples_with_one_label_are_pooled_into_one_condition() {
    let samples = vec![
        random_walk_sample("ctrl", 3, 10, 1.0, 5),
        random_walk_sample("ctrl", 3, 10, 1.0, 6),
        random_walk_sample("drug", 4, 10, 4.0, 7),
    ];
    let mut diag = CollectingDiagnostics::default();
    let report = run_statistics(
        StatisticsTest::Pairwise,
        Metric::Speed,
        &samples,
        &Configuration::default(),
        &mut diag,
    )
    .unwrap();

    let Comparison::Pairwise(matrix) = &report.comparison else {
        panic!("expected a p-value matrix");
    };
    assert_eq!(matrix.labels, vec!["ctrl", "drug"]);
    assert_eq!(
        report.records.iter().filter(|r| r.condition == "ctrl").count(),
        6
    );
}

#[test]
fn a_single_condition_cannot_be_compared() {
    let samples = vec![random_walk_sample("only", 5, 10, 1.0, 9)];
    let mut diag = CollectingDiagnostics::default();
    let err = run_statistics(
        StatisticsTest::Anova,
        Metric::Speed,
        &samples,
        &Configuration::default(),
        &mut diag,
    )
    .unwrap_err();
    assert!(matches!(err, MotilityError::InsufficientData(_)));
}

#[test]
fn straight_tracks_have_unit_scalars() {
    let samples = vec![
        straight_line_sample("a", 3, 6, 1.0),
        straight_line_sample("b", 3, 6, 1.0),
    ];
    let mut diag = CollectingDiagnostics::default();
    let report = run_statistics(
        StatisticsTest::Pairwise,
        Metric::Speed,
        &samples,
        &Configuration::default(),
        &mut diag,
    )
    .unwrap();

    for record in &report.records {
        assert_relative_eq!(record.speed.unwrap(), 1.0);
        // mean of MSD(1) = 1 and MSD(2) = 4
        assert_relative_eq!(record.msd.unwrap(), 2.5);
        assert_relative_eq!(record.directionality_ratio.unwrap(), 1.0);
    }
    // every value tied
    let Comparison::Pairwise(matrix) = &report.comparison else {
        panic!("expected a p-value matrix");
    };
    assert_eq!(matrix.get("a", "b"), Some(1.0));
}

#[test]
fn pipeline_dispatches_both_kinds_of_selection() {
    let samples = three_speeds();
    let params = Configuration {
        n_time_points: 8,
        n_tracks: 6,
        ..Configuration::default()
    };
    let mut diag = CollectingDiagnostics::default();

    let outcome = run(Selection::Analysis(Analysis::Msd), &samples, &params, &mut diag).unwrap();
    let Outcome::Analysis(analysis) = outcome else {
        panic!("expected an analysis run");
    };
    assert_eq!(analysis.combined.len(), 3);

    let selection = Selection::Statistics {
        test: StatisticsTest::Pairwise,
        metric: Metric::Speed,
    };
    let Outcome::Statistics(report) = run(selection, &samples, &params, &mut diag).unwrap() else {
        panic!("expected a statistics report");
    };
    assert_eq!(report.metric, Metric::Speed);
    assert!(!diag
        .events()
        .iter()
        .any(|e| matches!(e, Diagnostic::SampleRejected { .. })));
}
