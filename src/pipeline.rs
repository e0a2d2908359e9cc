//! Single entry point dispatching a caller's selection to the analyses or the
//! statistics engine.
use crate::analysis::{run_analysis, Analysis, AnalysisRun};
use crate::config::Configuration;
use crate::diagnostics::Diagnostics;
use crate::motility_errors::MotilityError;
use crate::sample::RawSample;
use crate::statistics::metrics::Metric;
use crate::statistics::{run_statistics, StatisticsReport, StatisticsTest};

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Analysis(Analysis),
    Statistics { test: StatisticsTest, metric: Metric },
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Analysis(AnalysisRun),
    Statistics(StatisticsReport),
}

/// Run a selection over a batch of raw samples.
pub fn run(
    selection: Selection,
    samples: &[RawSample],
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<Outcome, MotilityError> {
    match selection {
        Selection::Analysis(analysis) => {
            run_analysis(analysis, samples, params, diag).map(Outcome::Analysis)
        }
        Selection::Statistics { test, metric } => {
            run_statistics(test, metric, samples, params, diag).map(Outcome::Statistics)
        }
    }
}
