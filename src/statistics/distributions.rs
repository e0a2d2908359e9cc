//! # Reference distributions
//!
//! The few distribution functions the statistical tests need:
//!
//! * standard normal survival function (`libm::erfc`),
//! * Fisher–Snedecor F survival function, through the regularized incomplete beta
//!   function (continued fraction, modified Lentz),
//! * studentized range distribution (`ptukey`, Gauss–Legendre quadrature of the
//!   Copenhaver & Holland integral) and its quantile (`qtukey`, bisection),
//! * exact null distribution of the Mann–Whitney U statistic.
//!
//! Precision targets are those of the usual statistical packages: about `1e-10` for
//! the normal and F functions, `1e-8` for the studentized range.
use std::f64::consts::{LN_2, SQRT_2};

const SQRT_2PI: f64 = 2.506_628_274_631_000_7;

/// `P(Z > z)` for a standard normal `Z`.
#[inline]
pub fn normal_sf(z: f64) -> f64 {
    0.5 * libm::erfc(z / SQRT_2)
}

/// `P(Z <= z)` for a standard normal `Z`.
#[inline]
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * libm::erfc(-z / SQRT_2)
}

#[inline]
fn ln_gamma(x: f64) -> f64 {
    libm::lgamma(x)
}

/// Continued fraction of the incomplete beta function (modified Lentz).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const FPMIN: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function `I_x(a, b)`.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// `P(F > f)` for `F ~ F(d1, d2)`.
pub fn f_sf(f: f64, d1: f64, d2: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    regularized_incomplete_beta(d2 / (d2 + d1 * f), d2 / 2.0, d1 / 2.0)
}

// -------------------------------------------------------------------------------------------------
// Studentized range
// -------------------------------------------------------------------------------------------------

/// Probability integral of the range of `cc` standard normals, raised to the power
/// `rr` (number of independent ranges).
fn wprob(w: f64, rr: f64, cc: f64) -> f64 {
    const NLEG: usize = 12;
    const IHALF: usize = 6;
    const C1: f64 = -30.0;
    const C2: f64 = -50.0;
    const C3: f64 = 60.0;
    const BB: f64 = 8.0;
    const WLAR: f64 = 3.0;
    const WINCR1: usize = 2;
    const WINCR2: usize = 3;
    const XLEG: [f64; IHALF] = [
        0.981_560_634_246_719_3,
        0.904_117_256_370_474_9,
        0.769_902_674_194_304_7,
        0.587_317_954_286_617_4,
        0.367_831_498_998_180_2,
        0.125_233_408_511_468_9,
    ];
    const ALEG: [f64; IHALF] = [
        0.047_175_336_386_511_83,
        0.106_939_325_995_318_4,
        0.160_078_328_543_346_2,
        0.203_167_426_723_065_9,
        0.233_492_536_538_354_8,
        0.249_147_045_813_402_8,
    ];

    let qsqz = w * 0.5;
    if qsqz >= BB {
        return 1.0;
    }

    // (2Φ(w/2) - 1)^cc
    let mut pr_w = 2.0 * normal_cdf(qsqz) - 1.0;
    pr_w = if pr_w >= (C2 / cc).exp() {
        pr_w.powf(cc)
    } else {
        0.0
    };

    let wincr = if w > WLAR { WINCR1 } else { WINCR2 };
    let mut blb = qsqz;
    let binc = (BB - qsqz) / wincr as f64;
    let mut bub = blb + binc;
    let mut einsum = 0.0;
    let cc1 = cc - 1.0;

    for _ in 0..wincr {
        let mut elsum = 0.0;
        let a = 0.5 * (bub + blb);
        let b = 0.5 * (bub - blb);

        for jj in 1..=NLEG {
            let (j, xx) = if IHALF < jj {
                let j = NLEG - jj + 1;
                (j, XLEG[j - 1])
            } else {
                (jj, -XLEG[jj - 1])
            };
            let ac = a + b * xx;

            let qexpo = ac * ac;
            if qexpo > C3 {
                break;
            }

            let pplus = 2.0 * normal_cdf(ac);
            let pminus = 2.0 * normal_cdf(ac - w);
            let rinsum = pplus * 0.5 - pminus * 0.5;
            if rinsum >= (C1 / cc1).exp() {
                elsum += ALEG[j - 1] * (-(0.5 * qexpo)).exp() * rinsum.powf(cc1);
            }
        }
        elsum *= 2.0 * b * cc / SQRT_2PI;
        einsum += elsum;
        blb = bub;
        bub += binc;
    }

    pr_w += einsum;
    if pr_w <= (C1 / rr).exp() {
        return 0.0;
    }
    pr_w.powf(rr).min(1.0)
}

/// Cumulative distribution of the studentized range `P(Q <= q)` for `k` means and
/// `df` degrees of freedom.
///
/// Return
/// ----------
/// * `NaN` when `k < 2` or `df < 2`.
pub fn ptukey(q: f64, k: f64, df: f64) -> f64 {
    const NLEGQ: usize = 16;
    const IHALFQ: usize = 8;
    const EPS1: f64 = -30.0;
    const EPS2: f64 = 1.0e-14;
    const DHAF: f64 = 100.0;
    const DQUAR: f64 = 800.0;
    const DEIGH: f64 = 5000.0;
    const DLARG: f64 = 25000.0;
    const XLEGQ: [f64; IHALFQ] = [
        0.989_400_934_991_649_9,
        0.944_575_023_073_232_6,
        0.865_631_202_387_831_7,
        0.755_404_408_355_003,
        0.617_876_244_402_643_7,
        0.458_016_777_657_227_4,
        0.281_603_550_779_258_9,
        0.095_012_509_837_637_44,
    ];
    const ALEGQ: [f64; IHALFQ] = [
        0.027_152_459_411_754_095,
        0.062_253_523_938_647_89,
        0.095_158_511_682_492_78,
        0.124_628_971_255_533_87,
        0.149_595_988_816_576_73,
        0.169_156_519_395_002_54,
        0.182_603_415_044_923_6,
        0.189_450_610_455_068_5,
    ];
    let rr = 1.0;

    if q.is_nan() || k < 2.0 || df < 2.0 {
        return f64::NAN;
    }
    if q <= 0.0 {
        return 0.0;
    }
    if q.is_infinite() {
        return 1.0;
    }
    if df > DLARG {
        return wprob(q, rr, k);
    }

    let f2 = df * 0.5;
    let mut f2lf = f2 * df.ln() - df * LN_2 - ln_gamma(f2);
    let f21 = f2 - 1.0;
    let ff4 = df * 0.25;
    let ulen: f64 = if df <= DHAF {
        1.0
    } else if df <= DQUAR {
        0.5
    } else if df <= DEIGH {
        0.25
    } else {
        0.125
    };
    f2lf += ulen.ln();

    let mut ans = 0.0;
    for i in 1..=50 {
        let mut otsum = 0.0;
        let twa1 = (2 * i - 1) as f64 * ulen;

        for jj in 1..=NLEGQ {
            let (j, upper) = if IHALFQ < jj {
                (jj - IHALFQ - 1, true)
            } else {
                (jj - 1, false)
            };
            let offset = XLEGQ[j] * ulen;
            let t1 = if upper {
                f2lf + f21 * (twa1 + offset).ln() - (offset + twa1) * ff4
            } else {
                f2lf + f21 * (twa1 - offset).ln() + (offset - twa1) * ff4
            };

            if t1 >= EPS1 {
                let qsqz = if upper {
                    q * ((offset + twa1) * 0.5).sqrt()
                } else {
                    q * ((twa1 - offset) * 0.5).sqrt()
                };
                otsum += wprob(qsqz, rr, k) * ALEGQ[j] * t1.exp();
            }
        }

        if i as f64 * ulen >= 1.0 && otsum <= EPS2 {
            break;
        }
        ans += otsum;
    }

    ans.min(1.0)
}

/// Quantile of the studentized range: the `q` with `ptukey(q, k, df) = p`.
///
/// Bisection to an absolute tolerance of `1e-10`; `NaN` outside `0 < p < 1`.
pub fn qtukey(p: f64, k: f64, df: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) || k < 2.0 || df < 2.0 {
        return f64::NAN;
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    while ptukey(hi, k, df) < p {
        lo = hi;
        hi *= 2.0;
        if hi > 1e6 {
            return f64::NAN;
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if ptukey(mid, k, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-10 {
            break;
        }
    }
    0.5 * (lo + hi)
}

// -------------------------------------------------------------------------------------------------
// Mann–Whitney U
// -------------------------------------------------------------------------------------------------

/// Number of arrangements giving each value `u = 0..=n1·n2` of the U statistic
/// of a sample of size `n1` against one of size `n2` (no ties).
///
/// Built from `f(m, n, u) = f(m-1, n, u-n) + f(m, n-1, u)`: the largest observation
/// either belongs to the first sample (and beats the `n` others) or to the second.
pub fn mann_whitney_counts(n1: usize, n2: usize) -> Vec<f64> {
    // table[j] holds f(j, n, ·) for the current n
    let mut table: Vec<Vec<f64>> = vec![vec![1.0]; n1 + 1];

    for n in 1..=n2 {
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(n1 + 1);
        next.push(vec![1.0]);
        for j in 1..=n1 {
            let len = j * n + 1;
            let f: Vec<f64> = (0..len)
                .map(|u| {
                    let beats_all = if u >= n {
                        next[j - 1].get(u - n).copied().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    beats_all + table[j].get(u).copied().unwrap_or(0.0)
                })
                .collect();
            next.push(f);
        }
        table = next;
    }

    table.swap_remove(n1)
}

/// Exact `P(U >= u)` under the null hypothesis, without ties.
pub fn mann_whitney_exact_sf(u: f64, n1: usize, n2: usize) -> f64 {
    let counts = mann_whitney_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    let start = u.ceil().max(0.0) as usize;
    let tail: f64 = counts.iter().skip(start).sum();
    tail / total
}
