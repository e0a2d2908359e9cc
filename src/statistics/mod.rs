//! # Statistics engine
//!
//! Cross-condition comparison of per-cell scalar metrics.
//!
//! ## Flow
//!
//! 1. Every selected sample is coerced and grouped by track (no time window: the
//!    whole track is summarised).
//! 2. Each track becomes one [`metrics::CellMetricRecord`]; its condition is the
//!    sample label, so samples sharing a label are pooled.
//! 3. The defined values of the chosen [`metrics::Metric`] are grouped by condition.
//! 4. Either a pairwise Mann–Whitney matrix ([`pairwise`]) or a one-way ANOVA with
//!    Tukey HSD ([`anova`]) is computed.
//!
//! A test needs at least two conditions with at least two defined values each;
//! otherwise `MotilityError::InsufficientData` is returned.
//!
//! Modules
//! -----------------
//! * [`metrics`] – per-cell scalars and grouping.
//! * [`persistence_fit`] – exponential decay fit of the persistence curve.
//! * [`distributions`] – normal, F, studentized range and Mann–Whitney distributions.
//! * [`pairwise`] – Mann–Whitney p-value matrix.
//! * [`anova`] – one-way ANOVA and Tukey HSD.
use log::warn;

use crate::config::Configuration;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::motility_errors::MotilityError;
use crate::preprocess::coerce_sample;
use crate::sample::RawSample;
use crate::track::TrackTable;

pub mod anova;
pub mod distributions;
pub mod metrics;
pub mod pairwise;
pub mod persistence_fit;

use anova::{run_anova, AnovaOutcome};
use metrics::{collect_cell_metrics, CellMetricRecord, Metric, MetricGroups};
use pairwise::{run_pairwise, PValueMatrix};

/// Comparison to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsTest {
    /// Mann–Whitney U between every pair of conditions.
    Pairwise,
    /// One-way ANOVA, Tukey HSD when significant.
    Anova,
}

/// Result of the comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Pairwise(PValueMatrix),
    Anova(AnovaOutcome),
}

/// Records used by a comparison, and its result.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    pub metric: Metric,
    pub records: Vec<CellMetricRecord>,
    pub comparison: Comparison,
}

/// Compare conditions on per-cell records already collected.
pub fn compare(
    test: StatisticsTest,
    metric: Metric,
    records: &[CellMetricRecord],
    diag: &mut dyn Diagnostics,
) -> Result<Comparison, MotilityError> {
    let groups = MetricGroups::from_records(records, metric);
    match test {
        StatisticsTest::Pairwise => run_pairwise(&groups).map(Comparison::Pairwise),
        StatisticsTest::Anova => run_anova(&groups, diag).map(Comparison::Anova),
    }
}

/// Compute per-cell metrics from raw samples and compare conditions.
///
/// Arguments
/// -----------------
/// * `test`: Pairwise Mann–Whitney or ANOVA.
/// * `metric`: Scalar compared.
/// * `samples`: Raw samples; the label is the condition.
/// * `params`: Run configuration (time interval and speed formula).
/// * `diag`: Diagnostics sink.
///
/// Return
/// ----------
/// * The [`StatisticsReport`].
/// * `MotilityError::InvalidConfiguration` before any work on a bad configuration.
/// * `MotilityError::InsufficientData` when the comparison cannot be made.
///
/// A sample that cannot be coerced is skipped with [`Diagnostic::SampleRejected`].
pub fn run_statistics(
    test: StatisticsTest,
    metric: Metric,
    samples: &[RawSample],
    params: &Configuration,
    diag: &mut dyn Diagnostics,
) -> Result<StatisticsReport, MotilityError> {
    params.validate()?;

    let mut tables = Vec::with_capacity(samples.len());
    for raw in samples {
        match coerce_sample(raw) {
            Ok(sample) => tables.push(TrackTable::from_sample(&sample)),
            Err(err) => {
                warn!("Statistics: sample '{}' skipped: {err}", raw.label);
                diag.report(Diagnostic::SampleRejected {
                    sample: raw.label.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let records = collect_cell_metrics(&tables, params, diag);
    let comparison = compare(test, metric, &records, diag)?;

    Ok(StatisticsReport {
        metric,
        records,
        comparison,
    })
}
