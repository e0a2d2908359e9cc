//! # Trajectory analyses
//!
//! The four motility analyses plus the trajectory view, and the batch runner that
//! drives them over a set of samples.
//!
//! ## Flow of one run
//!
//! ```text
//! RawSample ─▶ preprocess::clean_sample ─▶ TrackTable ─▶ analysis ─▶ (TrackTable', ConditionSummary)
//!                                                                      │
//!                                   aggregation::combine ◀─────────────┘
//! ```
//!
//! * The configuration is validated **before** any sample is touched; an invalid
//!   configuration is the only error that aborts the whole run.
//! * Each sample is processed independently. A sample that cannot be cleaned is
//!   reported ([`Diagnostic::SampleRejected`]) and kept in the run as an `Err`,
//!   the others carry on.
//! * Analyses never mutate their input table; they return an enriched copy.
//!
//! Modules
//! -----------------
//! * [`autocorrelation`] – directional persistence versus lag.
//! * [`msd`] – mean squared displacement versus lag.
//! * [`speed`] – average instantaneous speed.
//! * [`dir_ratio`] – directionality ratio versus time.
//! * [`trajectories`] – origin-centred paths for display.
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::aggregation::{combine, ConditionSummary};
use crate::config::Configuration;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::motility_errors::MotilityError;
use crate::preprocess::{clean_sample, coerce_sample, PreprocessReport};
use crate::sample::RawSample;
use crate::track::TrackTable;

pub mod autocorrelation;
pub mod dir_ratio;
pub mod msd;
pub mod speed;
pub mod trajectories;

use trajectories::TrajectoryPlot;

/// Analysis selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    Autocorrelation,
    Msd,
    Speed,
    DirectionalityRatio,
    Trajectories,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::Autocorrelation,
        Analysis::Msd,
        Analysis::Speed,
        Analysis::DirectionalityRatio,
        Analysis::Trajectories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Analysis::Autocorrelation => "Autocorrelation",
            Analysis::Msd => "MSD",
            Analysis::Speed => "Speed",
            Analysis::DirectionalityRatio => "Directionality_Ratio",
            Analysis::Trajectories => "Trajectories",
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Analysis {
    type Err = MotilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(' ', "_");
        Analysis::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                MotilityError::InvalidConfiguration(format!("unknown analysis '{s}'"))
            })
    }
}

/// Result of one analysis on one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutput {
    /// Enriched table and the condition curve of the sample.
    Curve {
        table: TrackTable,
        summary: ConditionSummary,
    },
    Trajectories(TrajectoryPlot),
}

impl AnalysisOutput {
    pub fn summary(&self) -> Option<&ConditionSummary> {
        match self {
            AnalysisOutput::Curve { summary, .. } => Some(summary),
            AnalysisOutput::Trajectories(_) => None,
        }
    }

    pub fn table(&self) -> Option<&TrackTable> {
        match self {
            AnalysisOutput::Curve { table, .. } => Some(table),
            AnalysisOutput::Trajectories(_) => None,
        }
    }
}

/// Run one analysis on an already cleaned table.
///
/// [`Analysis::Trajectories`] is accepted too and draws whatever the table holds.
pub fn analyse_table(
    analysis: Analysis,
    table: &TrackTable,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<AnalysisOutput, MotilityError> {
    let (table, summary) = match analysis {
        Analysis::Autocorrelation => autocorrelation::autocorrelation(table, params)?,
        Analysis::Msd => msd::msd(table, params),
        Analysis::Speed => speed::speed(table, params, diag),
        Analysis::DirectionalityRatio => dir_ratio::dir_ratio(table, params),
        Analysis::Trajectories => {
            return Ok(AnalysisOutput::Trajectories(
                trajectories::trajectory_plot(table, params),
            ))
        }
    };
    summary.report_undefined_sem(diag);
    Ok(AnalysisOutput::Curve { table, summary })
}

/// Outcome of one sample inside a run.
#[derive(Debug, PartialEq)]
pub struct SampleResult {
    pub label: String,
    /// Preprocessing report; absent when the sample was rejected or not windowed.
    pub report: Option<PreprocessReport>,
    pub output: Result<AnalysisOutput, MotilityError>,
}

/// Every sample result of a run, and the per-label pooled curves.
#[derive(Debug, PartialEq)]
pub struct AnalysisRun {
    pub analysis: Analysis,
    pub samples: Vec<SampleResult>,
    /// One curve per distinct label, in first-seen order.
    pub combined: Vec<ConditionSummary>,
}

impl AnalysisRun {
    /// Curves of the samples that succeeded, in input order.
    pub fn summaries(&self) -> impl Iterator<Item = &ConditionSummary> {
        self.samples
            .iter()
            .filter_map(|s| s.output.as_ref().ok()?.summary())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &MotilityError)> {
        self.samples
            .iter()
            .filter_map(|s| Some((s.label.as_str(), s.output.as_ref().err()?)))
    }
}

fn process_sample(
    analysis: Analysis,
    raw: &RawSample,
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> (Option<PreprocessReport>, Result<AnalysisOutput, MotilityError>) {
    if analysis == Analysis::Trajectories {
        let output = coerce_sample(raw).map(|sample| {
            AnalysisOutput::Trajectories(trajectories::trajectory_plot(
                &TrackTable::from_sample(&sample),
                params,
            ))
        });
        return (None, output);
    }

    match clean_sample(raw, params, diag) {
        Ok(cleaned) => (
            Some(cleaned.report),
            analyse_table(analysis, &cleaned.table, params, diag),
        ),
        Err(err) => (None, Err(err)),
    }
}

/// Run one analysis over a batch of raw samples.
///
/// Arguments
/// -----------------
/// * `analysis`: The analysis to run.
/// * `samples`: Raw samples, in display order; the label is the condition.
/// * `params`: Run configuration.
/// * `diag`: Diagnostics sink for the whole run.
///
/// Return
/// ----------
/// * An [`AnalysisRun`] with one [`SampleResult`] per input sample.
/// * `MotilityError::InvalidConfiguration` before any sample is processed if the
///   configuration is unusable (or `n_plot_points == 0` for the autocorrelation).
pub fn run_analysis(
    analysis: Analysis,
    samples: &[RawSample],
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<AnalysisRun, MotilityError> {
    params.validate()?;
    if analysis == Analysis::Autocorrelation {
        params.require_plot_points()?;
    }

    #[cfg(feature = "progress")]
    let mut progress = crate::progress::BatchProgress::new(samples.len());

    let mut results = Vec::with_capacity(samples.len());
    for raw in samples {
        #[cfg(feature = "progress")]
        progress.start(&raw.label);

        debug!("{analysis}: processing sample '{}'", raw.label);
        let (report, output) = process_sample(analysis, raw, params, diag);
        if let Err(err) = &output {
            diag.report(Diagnostic::SampleRejected {
                sample: raw.label.clone(),
                reason: err.to_string(),
            });
        }
        results.push(SampleResult {
            label: raw.label.clone(),
            report,
            output,
        });

        #[cfg(feature = "progress")]
        progress.inc();
    }

    #[cfg(feature = "progress")]
    progress.finish();

    let summaries: Vec<ConditionSummary> = results
        .iter()
        .filter_map(|s| s.output.as_ref().ok()?.summary().cloned())
        .collect();

    Ok(AnalysisRun {
        analysis,
        samples: results,
        combined: combine(&summaries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::sample::RawRecord;

    #[test]
    fn analysis_names_round_trip() {
        for a in Analysis::ALL {
            assert_eq!(a.name().parse::<Analysis>().unwrap(), a);
        }
        assert_eq!(
            "directionality ratio".parse::<Analysis>().unwrap(),
            Analysis::DirectionalityRatio
        );
        assert!("Curvature".parse::<Analysis>().is_err());
    }

    #[test]
    fn bad_sample_does_not_abort_the_batch() {
        let good = RawSample::new(
            "good",
            vec![
                RawRecord::new("1", "1", "0", "0"),
                RawRecord::new("1", "2", "1", "0"),
            ],
        );
        let bad = RawSample::new("bad", vec![RawRecord::new("x", "1", "0", "0")]);
        let params = Configuration::builder()
            .n_time_points(2)
            .n_tracks(1)
            .build()
            .unwrap();
        let mut diag = CollectingDiagnostics::default();

        let run = run_analysis(Analysis::Msd, &[bad, good], &params, &mut diag).unwrap();
        assert_eq!(run.samples.len(), 2);
        assert_eq!(run.failures().count(), 1);
        assert_eq!(run.summaries().count(), 1);
        assert_eq!(run.combined.len(), 1);
        assert!(diag
            .events()
            .iter()
            .any(|e| matches!(e, Diagnostic::SampleRejected { sample, .. } if sample == "bad")));
    }

    #[test]
    fn invalid_configuration_fails_before_any_sample() {
        let mut params = Configuration::default();
        params.time_interval = 0.0;
        let mut diag = CollectingDiagnostics::default();

        let err = run_analysis(Analysis::Speed, &[RawSample::default()], &params, &mut diag);
        assert!(matches!(err, Err(MotilityError::InvalidConfiguration(_))));
        assert!(diag.is_empty());
    }
}
