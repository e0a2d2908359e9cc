//! Pairwise Mann–Whitney U tests between conditions.
//!
//! Two-sided test. The null distribution is exact when neither sample has ties and
//! the smaller one has at most [`MANN_WHITNEY_EXACT_MAX_N`] values; otherwise the
//! normal approximation is used, with tie correction of the variance and a
//! continuity correction of `0.5`.
use itertools::Itertools;

use crate::constants::{MANN_WHITNEY_EXACT_MAX_N, P_VALUE_DECIMALS};
use crate::motility_errors::MotilityError;
use crate::statistics::distributions::{mann_whitney_exact_sf, normal_sf};
use crate::statistics::metrics::MetricGroups;

/// Null distribution used for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MannWhitneyMethod {
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MannWhitneyResult {
    /// `U` of the first sample.
    pub u1: f64,
    pub p_value: f64,
    pub method: MannWhitneyMethod,
}

/// Average ranks (1-based) of the pooled values, and the sizes of the tie groups.
fn rank_with_ties(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let order: Vec<usize> = (0..values.len())
        .sorted_by(|&a, &b| values[a].total_cmp(&values[b]))
        .collect();

    let mut ranks = vec![0.0; values.len()];
    let mut ties = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end share the average of ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        ties.push(end - start);
        start = end;
    }
    (ranks, ties)
}

/// Two-sided Mann–Whitney U test of `x` against `y`.
///
/// Return
/// ----------
/// * `MotilityError::InsufficientData` if a sample is empty.
/// * When every value is tied the p-value is `1`.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitneyResult, MotilityError> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return Err(MotilityError::InsufficientData(
            "Mann-Whitney U test needs two non-empty samples".into(),
        ));
    }

    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let (ranks, ties) = rank_with_ties(&pooled);
    let r1: f64 = ranks[..n1].iter().sum();

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.max(u2);

    let has_ties = ties.iter().any(|&t| t > 1);
    let method = if !has_ties && n1.min(n2) <= MANN_WHITNEY_EXACT_MAX_N {
        MannWhitneyMethod::Exact
    } else {
        MannWhitneyMethod::Asymptotic
    };

    let p = match method {
        MannWhitneyMethod::Exact => 2.0 * mann_whitney_exact_sf(u, n1, n2),
        MannWhitneyMethod::Asymptotic => {
            let n = n1f + n2f;
            let tie_term: f64 = ties
                .iter()
                .map(|&t| {
                    let t = t as f64;
                    t * t * t - t
                })
                .sum();
            let var = n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
            if var > 0.0 {
                let z = (u - n1f * n2f / 2.0 - 0.5) / var.sqrt();
                2.0 * normal_sf(z)
            } else {
                1.0
            }
        }
    };

    Ok(MannWhitneyResult {
        u1,
        p_value: p.clamp(0.0, 1.0),
        method,
    })
}

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Symmetric condition × condition matrix of p-values, diagonal undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct PValueMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl PValueMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// p-value between two conditions by label.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Mann–Whitney U test between every pair of conditions.
///
/// Arguments
/// -----------------
/// * `groups`: Defined values of the metric, per condition.
///
/// Return
/// ----------
/// * The [`PValueMatrix`] with conditions in first-seen order, p-values rounded to
///   four decimals.
/// * `MotilityError::InsufficientData` unless there are at least two conditions
///   with at least two values each.
pub fn run_pairwise(groups: &MetricGroups) -> Result<PValueMatrix, MotilityError> {
    groups.check_comparable()?;

    let k = groups.groups.len();
    let mut values = vec![vec![None; k]; k];
    for (i, j) in (0..k).tuple_combinations() {
        let test = mann_whitney_u(&groups.groups[i].1, &groups.groups[j].1)?;
        let p = round_to(test.p_value, P_VALUE_DECIMALS);
        values[i][j] = Some(p);
        values[j][i] = Some(p);
    }

    Ok(PValueMatrix {
        labels: groups.labels().map(str::to_string).collect(),
        values,
    })
}
