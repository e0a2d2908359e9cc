//! One-way ANOVA across conditions, followed by Tukey HSD when significant.
//!
//! Tukey HSD
//! -----------------
//! * Conditions are sorted by name and compared pairwise in that order.
//! * `meandiff = mean(group2) - mean(group1)`.
//! * Standard error of a pair: `sqrt(MSW / 2 · (1/n1 + 1/n2))`, with `MSW` the
//!   within-group mean square of the ANOVA.
//! * `p-adj` from the studentized range distribution with `k` means and `N - k`
//!   degrees of freedom; confidence interval from its 95 % quantile.
//! * A pair is rejected when `p-adj < 0.05`.
use itertools::Itertools;
use log::{error, info};

use crate::aggregation::mean;
use crate::constants::SIGNIFICANCE_LEVEL;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::motility_errors::MotilityError;
use crate::statistics::distributions::{f_sf, ptukey, qtukey};
use crate::statistics::metrics::MetricGroups;

/// Omnibus one-way ANOVA result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneWayAnova {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
    /// Within-group mean square.
    pub ms_within: f64,
}

/// One row of the Tukey HSD table.
#[derive(Debug, Clone, PartialEq)]
pub struct TukeyRow {
    pub group1: String,
    pub group2: String,
    pub meandiff: f64,
    pub p_adj: f64,
    pub lower: f64,
    pub upper: f64,
    pub reject: bool,
}

/// Result of [`run_anova`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnovaOutcome {
    /// `p < 0.05`: the post-hoc table, one row per pair of conditions.
    Significant {
        anova: OneWayAnova,
        tukey: Vec<TukeyRow>,
    },
    /// `p >= 0.05`: only the omnibus p-value is reported.
    NotSignificant { anova: OneWayAnova },
}

impl AnovaOutcome {
    pub fn anova(&self) -> &OneWayAnova {
        match self {
            AnovaOutcome::Significant { anova, .. } | AnovaOutcome::NotSignificant { anova } => {
                anova
            }
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, AnovaOutcome::Significant { .. })
    }
}

/// One-way ANOVA `F = MSB / MSW` with `p = P(F(k-1, N-k) > F)`.
///
/// Return
/// ----------
/// * `MotilityError::InsufficientData` when a group has fewer than two values or
///   when every value is identical (the statistic is undefined).
pub fn one_way_anova(groups: &[&[f64]]) -> Result<OneWayAnova, MotilityError> {
    let k = groups.len();
    if k < 2 {
        return Err(MotilityError::InsufficientData(format!(
            "ANOVA needs at least 2 groups, got {k}"
        )));
    }
    if let Some(g) = groups.iter().find(|g| g.len() < 2) {
        return Err(MotilityError::InsufficientData(format!(
            "ANOVA needs at least 2 values per group, got a group of {}",
            g.len()
        )));
    }

    let n: usize = groups.iter().map(|g| g.len()).sum();
    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand_mean = mean(&all).unwrap_or(f64::NAN);

    let (ss_between, ss_within) = groups.iter().fold((0.0, 0.0), |(ssb, ssw), g| {
        let m = mean(g).unwrap_or(f64::NAN);
        let within: f64 = g.iter().map(|v| (v - m).powi(2)).sum();
        (ssb + g.len() as f64 * (m - grand_mean).powi(2), ssw + within)
    });

    let df_between = k - 1;
    let df_within = n - k;
    if ss_within == 0.0 && ss_between == 0.0 {
        return Err(MotilityError::InsufficientData(
            "ANOVA undefined: every value is identical".into(),
        ));
    }

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = if ms_within > 0.0 {
        ms_between / ms_within
    } else {
        f64::INFINITY
    };

    Ok(OneWayAnova {
        f_statistic,
        p_value: f_sf(f_statistic, df_between as f64, df_within as f64),
        df_between,
        df_within,
        ms_within,
    })
}

/// Tukey HSD over every pair of groups (sorted by label).
pub fn tukey_hsd(groups: &[(String, Vec<f64>)], ms_within: f64, df_within: usize) -> Vec<TukeyRow> {
    let sorted: Vec<&(String, Vec<f64>)> = groups.iter().sorted_by(|a, b| a.0.cmp(&b.0)).collect();
    let k = sorted.len() as f64;
    let df = df_within as f64;
    let q_crit = qtukey(1.0 - SIGNIFICANCE_LEVEL, k, df);

    sorted
        .iter()
        .tuple_combinations()
        .map(|((g1, v1), (g2, v2))| {
            let meandiff = mean(v2).unwrap_or(f64::NAN) - mean(v1).unwrap_or(f64::NAN);
            let se = (ms_within / 2.0 * (1.0 / v1.len() as f64 + 1.0 / v2.len() as f64)).sqrt();

            let p_adj = if se > 0.0 {
                1.0 - ptukey(meandiff.abs() / se, k, df)
            } else if meandiff == 0.0 {
                1.0
            } else {
                0.0
            }
            .clamp(0.0, 1.0);

            TukeyRow {
                group1: g1.clone(),
                group2: g2.clone(),
                meandiff,
                p_adj,
                lower: meandiff - q_crit * se,
                upper: meandiff + q_crit * se,
                reject: p_adj < SIGNIFICANCE_LEVEL,
            }
        })
        .collect()
}

/// One-way ANOVA on a metric, with Tukey HSD when the omnibus test is significant.
///
/// Arguments
/// -----------------
/// * `groups`: Defined values of the metric, per condition.
/// * `diag`: Receives [`Diagnostic::AnovaFailed`] when the test cannot be computed.
///
/// Return
/// ----------
/// * [`AnovaOutcome::Significant`] with the Tukey table when `p < 0.05`,
///   [`AnovaOutcome::NotSignificant`] otherwise.
/// * `MotilityError::InsufficientData` when fewer than two conditions with two
///   values each are available, or the ANOVA is undefined.
pub fn run_anova(
    groups: &MetricGroups,
    diag: &mut dyn Diagnostics,
) -> Result<AnovaOutcome, MotilityError> {
    groups.check_comparable()?;

    let slices: Vec<&[f64]> = groups.groups.iter().map(|(_, v)| v.as_slice()).collect();
    let anova = match one_way_anova(&slices) {
        Ok(anova) => anova,
        Err(err) => {
            error!("ANOVA on {}: {err}", groups.metric);
            diag.report(Diagnostic::AnovaFailed {
                reason: err.to_string(),
            });
            return Err(err);
        }
    };

    if anova.p_value < SIGNIFICANCE_LEVEL {
        info!("ANOVA: p-value significant, Tukey HSD is performed");
        let tukey = tukey_hsd(&groups.groups, anova.ms_within, anova.df_within);
        Ok(AnovaOutcome::Significant { anova, tukey })
    } else {
        info!("ANOVA: p-value is not significant");
        Ok(AnovaOutcome::NotSignificant { anova })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::statistics::metrics::Metric;
    use approx::assert_relative_eq;

    fn groups(data: Vec<(&str, Vec<f64>)>) -> MetricGroups {
        MetricGroups {
            metric: Metric::Speed,
            groups: data.into_iter().map(|(l, v)| (l.to_string(), v)).collect(),
        }
    }

    #[test]
    fn f_statistic_by_hand() {
        // means 2, 4, 6 ; SSB = 3 * (4 + 0 + 4) = 24 ; SSW = 3 * 2 = 6
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 4.0, 5.0];
        let c = [5.0, 6.0, 7.0];
        let res = one_way_anova(&[&a, &b, &c]).unwrap();

        assert_eq!(res.df_between, 2);
        assert_eq!(res.df_within, 6);
        assert_relative_eq!(res.f_statistic, 12.0);
        assert_relative_eq!(res.ms_within, 1.0);
        // F(2, 6): sf(12) = (1 + 2·12/6)^-3
        assert_relative_eq!(res.p_value, 1.0 / 125.0, epsilon = 1e-10);
    }

    #[test]
    fn separated_groups_take_the_tukey_branch() {
        let g = groups(vec![
            ("high", vec![99.0, 100.0, 101.0, 100.5]),
            ("low", vec![0.9, 1.0, 1.1, 1.05]),
            ("mid", vec![9.9, 10.0, 10.1, 10.05]),
        ]);
        let mut diag = CollectingDiagnostics::default();
        let outcome = run_anova(&g, &mut diag).unwrap();

        let AnovaOutcome::Significant { tukey, .. } = outcome else {
            panic!("expected the significant branch");
        };
        assert_eq!(tukey.len(), 3);
        assert_eq!((tukey[0].group1.as_str(), tukey[0].group2.as_str()), ("high", "low"));
        assert!(tukey[0].meandiff < 0.0);
        assert!(tukey.iter().all(|r| r.reject && r.lower <= r.meandiff && r.meandiff <= r.upper));
    }

    #[test]
    fn identical_groups_are_not_significant() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let g = groups(vec![
            ("a", values.clone()),
            ("b", values.clone()),
            ("c", values),
        ]);
        let mut diag = CollectingDiagnostics::default();
        let outcome = run_anova(&g, &mut diag).unwrap();

        assert!(!outcome.is_significant());
        assert_relative_eq!(outcome.anova().p_value, 1.0);
    }

    #[test]
    fn constant_data_is_reported() {
        let g = groups(vec![("a", vec![1.0, 1.0]), ("b", vec![1.0, 1.0])]);
        let mut diag = CollectingDiagnostics::default();
        let err = run_anova(&g, &mut diag).unwrap_err();

        assert!(matches!(err, MotilityError::InsufficientData(_)));
        assert!(matches!(diag.events(), [Diagnostic::AnovaFailed { .. }]));
    }

    #[test]
    fn tukey_p_value_for_two_groups_matches_t_test() {
        // with k = 2 Tukey reduces to the two-sample t-test: q = sqrt(2)·t
        let rows = tukey_hsd(
            &[("a".into(), vec![1.0, 2.0, 3.0]), ("b".into(), vec![3.0, 4.0, 5.0])],
            1.0,
            4,
        );
        // t = 2 / sqrt(2/3) = 2.449 ; two-sided p(t4) = 0.0705
        assert_relative_eq!(rows[0].p_adj, 0.070_484, epsilon = 1e-4);
        assert!(!rows[0].reject);
    }
}
