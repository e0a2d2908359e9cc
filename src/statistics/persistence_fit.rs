//! Exponential decay fit of a persistence curve, `A(t) = exp(-alpha · t)`.
//!
//! Levenberg–Marquardt least squares on the single parameter `alpha`, written over
//! `nalgebra` dynamic matrices. Convergence uses the usual MINPACK tolerances on the
//! relative step and the relative cost reduction.
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

const MAX_ITER: usize = 200;
const XTOL: f64 = 1.49012e-8;
const FTOL: f64 = 1.49012e-8;
const LAMBDA_MAX: f64 = 1e16;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitFailure {
    #[error("no lag with a defined persistence")]
    NoData,
    #[error("time and value series have different lengths ({0} vs {1})")]
    LengthMismatch(usize, usize),
    #[error("no convergence after {0} iterations")]
    NotConverged(usize),
    #[error("fit produced a non-finite decay rate")]
    NonFinite,
}

fn model(t: &DVector<f64>, alpha: f64) -> DVector<f64> {
    t.map(|ti| (-alpha * ti).exp())
}

/// Fit `exp(-alpha t)` to `(t, y)` starting from `alpha0`.
///
/// Arguments
/// -----------------
/// * `t`: Time of each point (lag × time interval).
/// * `y`: Persistence at each time.
/// * `alpha0`: Initial decay rate.
///
/// Return
/// ----------
/// * The fitted `alpha` (may be negative for a growing curve).
/// * A [`FitFailure`] when there is no point, the iteration diverges or does not
///   converge.
pub fn fit_exponential_decay(t: &[f64], y: &[f64], alpha0: f64) -> Result<f64, FitFailure> {
    if t.len() != y.len() {
        return Err(FitFailure::LengthMismatch(t.len(), y.len()));
    }
    if t.is_empty() {
        return Err(FitFailure::NoData);
    }

    let t = DVector::from_column_slice(t);
    let y = DVector::from_column_slice(y);

    let mut alpha = alpha0;
    let mut r = &y - model(&t, alpha);
    let mut cost = r.norm_squared();
    let mut lambda = 1e-3;

    for _ in 0..MAX_ITER {
        // d model / d alpha
        let j = DMatrix::from_fn(t.len(), 1, |i, _| -t[i] * (-alpha * t[i]).exp());
        let jt = j.transpose();
        let jtj = &jt * &j;
        let jtr = &jt * &r;

        let mut damped = jtj.clone();
        for k in 0..damped.nrows() {
            damped[(k, k)] += lambda * jtj[(k, k)].max(f64::EPSILON);
        }

        let Some(delta) = damped.lu().solve(&jtr) else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
            continue;
        };

        let candidate = alpha + delta[0];
        let r_new = &y - model(&t, candidate);
        let cost_new = r_new.norm_squared();

        if cost_new.is_finite() && cost_new <= cost {
            let small_step = delta[0].abs() <= XTOL * (alpha.abs() + XTOL);
            let small_gain = cost - cost_new <= FTOL * cost;

            alpha = candidate;
            r = r_new;
            cost = cost_new;
            lambda = (lambda / 10.0).max(1e-12);

            if small_step || small_gain {
                return finite(alpha);
            }
        } else {
            lambda *= 10.0;
            // no descent direction left: stationary point
            if lambda > LAMBDA_MAX {
                return finite(alpha);
            }
        }
    }

    Err(FitFailure::NotConverged(MAX_ITER))
}

fn finite(alpha: f64) -> Result<f64, FitFailure> {
    if alpha.is_finite() {
        Ok(alpha)
    } else {
        Err(FitFailure::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_known_decay() {
        let t: Vec<f64> = (1..=9).map(|s| s as f64 * 10.0).collect();
        let y: Vec<f64> = t.iter().map(|ti| (-0.03 * ti).exp()).collect();

        let alpha = fit_exponential_decay(&t, &y, 0.01).unwrap();
        assert_relative_eq!(alpha, 0.03, epsilon = 1e-6);
    }

    #[test]
    fn perfect_persistence_gives_zero_rate() {
        let t = [1.0, 2.0, 3.0];
        let alpha = fit_exponential_decay(&t, &[1.0, 1.0, 1.0], 0.01).unwrap();
        assert_relative_eq!(alpha, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn single_point_is_enough() {
        let alpha = fit_exponential_decay(&[2.0], &[(-1.0_f64).exp()], 0.01).unwrap();
        assert_relative_eq!(alpha, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn empty_series_fails() {
        assert_eq!(fit_exponential_decay(&[], &[], 0.01), Err(FitFailure::NoData));
        assert_eq!(
            fit_exponential_decay(&[1.0], &[], 0.01),
            Err(FitFailure::LengthMismatch(1, 0))
        );
    }
}
