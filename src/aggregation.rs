//! # Condition-level aggregation
//!
//! Mean / standard-error helpers shared by every analysis, and the
//! [`ConditionSummary`] record they produce for plotting.
//!
//! The SEM is always `sample_std(ddof = 1) / sqrt(n)`. With a single value it is
//! **undefined** (`None`), never zero or NaN; callers draw such points without an
//! error bar and report [`Diagnostic::UndefinedSem`].
//!
//! Undefined inputs (`None`, NaN, ±∞) are excluded from every average.
use itertools::Itertools;

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Mean and standard error of a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanSem {
    pub mean: f64,
    /// `None` when fewer than two values were averaged.
    pub sem: Option<f64>,
    pub n: usize,
}

/// Arithmetic mean of the finite values, `None` if there is none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Keep the defined, finite values of an optional series.
pub fn defined<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect()
}

/// Mean of the defined values of an optional series.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    mean(&defined(values))
}

/// Mean and SEM of the finite values of `values`.
///
/// Return
/// ----------
/// * `None` if no value is finite.
/// * `Some(MeanSem)` otherwise, with `sem = None` when only one value is available.
pub fn mean_sem(values: &[f64]) -> Option<MeanSem> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    let mean = mean(&finite)?;

    let sem = (n >= 2).then(|| {
        let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        (var / n as f64).sqrt()
    });

    Some(MeanSem { mean, sem, n })
}

/// [`mean_sem`] over the defined values of an optional series.
pub fn mean_sem_defined<I>(values: I) -> Option<MeanSem>
where
    I: IntoIterator<Item = Option<f64>>,
{
    mean_sem(&defined(values))
}

/// One x position of a condition curve.
///
/// `values` keeps the per-track observations behind `stats` so summaries of
/// several samples can be pooled.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPoint {
    pub x: f64,
    pub values: Vec<f64>,
    pub stats: Option<MeanSem>,
}

impl SummaryPoint {
    pub fn new(x: f64, values: Vec<f64>) -> Self {
        let stats = mean_sem(&values);
        SummaryPoint { x, values, stats }
    }
}

/// Condition-level curve (or single bar) produced by one analysis on one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSummary {
    /// Sample / condition label.
    pub label: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<SummaryPoint>,
}

/// Plot-ready view of a [`ConditionSummary`]: points without data are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Error bar per point; `None` draws the point without a bar.
    pub err: Vec<Option<f64>>,
}

impl ConditionSummary {
    pub fn new(
        label: impl Into<String>,
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<SummaryPoint>,
    ) -> Self {
        ConditionSummary {
            label: label.into(),
            x_label,
            y_label,
            points,
        }
    }

    /// Number of points holding a mean but no SEM.
    pub fn undefined_sem_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.stats.is_some_and(|s| s.sem.is_none()))
            .count()
    }

    /// Emit one [`Diagnostic::UndefinedSem`] if any point lacks its SEM.
    pub fn report_undefined_sem(&self, diag: &mut dyn Diagnostics) {
        let count = self.undefined_sem_count();
        if count > 0 {
            diag.report(Diagnostic::UndefinedSem {
                label: self.label.clone(),
                context: format!("{} ({count} of {} points)", self.y_label, self.points.len()),
            });
        }
    }

    pub fn to_series(&self) -> PlotSeries {
        let (x, y, err): (Vec<f64>, Vec<f64>, Vec<Option<f64>>) = self
            .points
            .iter()
            .filter_map(|p| p.stats.map(|s| (p.x, s.mean, s.sem)))
            .multiunzip();
        PlotSeries {
            label: self.label.clone(),
            x,
            y,
            err,
        }
    }
}

/// Pool summaries sharing a label into one summary per label.
///
/// Labels keep their first-seen order. Points are matched by position: the pooled
/// point `i` averages the per-track values of point `i` of every summary with that
/// label, and takes its `x` from the first one providing it.
pub fn combine(summaries: &[ConditionSummary]) -> Vec<ConditionSummary> {
    let mut combined: Vec<ConditionSummary> = Vec::new();

    for (label, group) in &summaries
        .iter()
        .sorted_by_key(|s| {
            summaries
                .iter()
                .position(|o| o.label == s.label)
                .unwrap_or(usize::MAX)
        })
        .chunk_by(|s| s.label.clone())
    {
        let group: Vec<&ConditionSummary> = group.collect();
        let Some(first) = group.first() else {
            continue;
        };
        let len = group.iter().map(|s| s.points.len()).max().unwrap_or(0);

        let points = (0..len)
            .map(|i| {
                let x = group
                    .iter()
                    .find_map(|s| s.points.get(i).map(|p| p.x))
                    .unwrap_or(f64::NAN);
                let values = group
                    .iter()
                    .filter_map(|s| s.points.get(i))
                    .flat_map(|p| p.values.iter().copied())
                    .collect();
                SummaryPoint::new(x, values)
            })
            .collect();

        combined.push(ConditionSummary::new(
            label,
            first.x_label,
            first.y_label,
            points,
        ));
    }

    combined
}
