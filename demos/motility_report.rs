//! Run every analysis and both statistical tests on a batch of samples and print the
//! resulting tables.
//!
//! ```text
//! RUST_LOG=info cargo run --example motility_report -- ctrl.csv drug.csv
//! ```
//!
//! Without arguments, three synthetic conditions are generated.
use camino::Utf8PathBuf;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use motility::analysis::{run_analysis, Analysis, AnalysisOutput};
use motility::config::Configuration;
use motility::constants::TrackId;
use motility::diagnostics::LogDiagnostics;
use motility::display::CellMetricsTable;
use motility::motility_errors::MotilityError;
use motility::sample::csv_reader::read_raw_sample_from_path;
use motility::sample::{RawSample, TrajectorySample};
use motility::statistics::metrics::Metric;
use motility::statistics::{run_statistics, Comparison, StatisticsTest};

fn synthetic(label: &str, speed: f64, turn: f64, seed: u64) -> Result<RawSample, MotilityError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tracks: Vec<(TrackId, Vec<(f64, f64)>)> = (1..=15)
        .map(|id| {
            let mut heading = rng.random::<f64>() * std::f64::consts::TAU;
            let mut pos = (0.0, 0.0);
            let path = (0..40)
                .map(|_| {
                    let p = pos;
                    heading += (rng.random::<f64>() - 0.5) * turn;
                    let step = speed * (0.5 + rng.random::<f64>());
                    pos = (pos.0 + step * heading.cos(), pos.1 + step * heading.sin());
                    p
                })
                .collect();
            (id, path)
        })
        .collect();
    Ok(RawSample::from(&TrajectorySample::from_positions(
        label, tracks, 1,
    )?))
}

fn main() -> Result<(), MotilityError> {
    env_logger::init();

    let paths: Vec<Utf8PathBuf> = std::env::args().skip(1).map(Utf8PathBuf::from).collect();
    let samples = if paths.is_empty() {
        vec![
            synthetic("control", 1.0, 1.5, 1)?,
            synthetic("drug_a", 2.5, 0.6, 2)?,
            synthetic("drug_b", 0.6, 3.0, 3)?,
        ]
    } else {
        paths
            .iter()
            .map(|p| read_raw_sample_from_path(p))
            .collect::<Result<Vec<_>, _>>()?
    };

    let params = Configuration::builder()
        .time_interval(5.0)
        .n_time_points(30)
        .n_tracks(15)
        .n_plot_points(10)
        .build()?;
    println!("{params:#}");

    let mut diag = LogDiagnostics;

    for analysis in Analysis::ALL {
        let run = run_analysis(analysis, &samples, &params, &mut diag)?;
        println!("\n=== {analysis} ===");
        for summary in &run.combined {
            println!("{summary}");
        }
        if analysis == Analysis::Trajectories {
            for sample in &run.samples {
                if let Ok(AnalysisOutput::Trajectories(plot)) = &sample.output {
                    println!(
                        "{}: {} paths, viewport ±{:.1}",
                        plot.label,
                        plot.paths.len(),
                        plot.radius
                    );
                }
            }
        }
        for (label, err) in run.failures() {
            println!("{label}: {err}");
        }
    }

    for metric in Metric::ALL {
        for test in [StatisticsTest::Pairwise, StatisticsTest::Anova] {
            println!("\n=== {metric} / {test:?} ===");
            match run_statistics(test, metric, &samples, &params, &mut diag) {
                Ok(report) => {
                    if test == StatisticsTest::Pairwise && metric == Metric::Speed {
                        println!("{}", CellMetricsTable(&report.records));
                    }
                    match &report.comparison {
                        Comparison::Pairwise(matrix) => println!("{matrix}"),
                        Comparison::Anova(outcome) => println!("{outcome}"),
                    }
                }
                Err(err) => println!("{err}"),
            }
        }
    }

    Ok(())
}
