//! Paired significance tests for per-query effectiveness scores.
//!
//! - Paired t-test (two-tailed p, with a one-sided helper)
//! - Wilcoxon signed-rank test (normal approximation)
//! - Paired effect size (mean difference over its standard deviation)
//!
//! # References
//!
//! - Smucker et al. (2007). "A comparison of statistical significance tests for IR evaluation"
//! - Wilcoxon (1945). "Individual comparisons by ranking methods"

use serde::Serialize;

/// Result of a paired t-test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TTestResult {
    /// t-statistic (positive if the second sample is higher)
    pub t_statistic: f64,
    /// Two-tailed p-value
    pub p_value: f64,
    /// Degrees of freedom
    pub df: usize,
}

impl TTestResult {
    /// Two-tailed p halved.
    pub fn one_sided_p(&self) -> f64 {
        self.p_value / 2.0
    }

    /// Formats the result for display.
    pub fn format(&self) -> String {
        format!("t({})={:.3}, p={:.4}", self.df, self.t_statistic, self.p_value)
    }
}

/// Paired t-test of `alternate` against `baseline` (same queries, same order).
///
/// # Panics
///
/// Panics if the slices differ in length or hold fewer than two pairs.
pub fn paired_ttest(baseline: &[f64], alternate: &[f64]) -> TTestResult {
    assert_eq!(
        baseline.len(),
        alternate.len(),
        "Paired t-test requires equal-length arrays"
    );
    assert!(baseline.len() >= 2, "Paired t-test needs at least two pairs");

    let n = baseline.len();
    let df = n - 1;
    let diffs = differences(baseline, alternate);
    let (mean_diff, std_diff) = mean_and_std(&diffs);
    let se = std_diff / (n as f64).sqrt();

    let t = if se > 0.0 {
        mean_diff / se
    } else if mean_diff == 0.0 {
        0.0
    } else {
        // Constant non-zero difference
        f64::INFINITY.copysign(mean_diff)
    };

    TTestResult {
        t_statistic: t,
        p_value: t_distribution_p_value(t.abs(), df),
        df,
    }
}

/// Result of a Wilcoxon signed-rank test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WilcoxonResult {
    /// Rank sum of positive differences
    pub w_plus: f64,
    /// Rank sum of negative (and zero) differences
    pub w_minus: f64,
    /// Standardized statistic
    pub z: f64,
    /// Two-tailed p-value
    pub p_value: f64,
}

/// Wilcoxon signed-rank test of `alternate` against `baseline`.
///
/// Zero differences are ranked with the others; tied absolute differences
/// get their average rank. The p-value uses the normal approximation with a
/// 0.5 continuity correction.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
pub fn wilcoxon_signed_rank(baseline: &[f64], alternate: &[f64]) -> WilcoxonResult {
    assert_eq!(
        baseline.len(),
        alternate.len(),
        "Wilcoxon test requires equal-length arrays"
    );
    assert!(!baseline.is_empty(), "Cannot perform Wilcoxon test on empty arrays");

    let diffs = differences(baseline, alternate);
    let abs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = average_ranks(&abs);

    let n = diffs.len() as f64;
    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let total = n * (n + 1.0) / 2.0;
    let w_minus = total - w_plus;

    let w_min = total - w_plus.max(w_minus);
    let expected = n * (n + 1.0) / 4.0;
    let variance = expected * (2.0 * n + 1.0) / 6.0;
    let z = (w_min - expected - 0.5) / variance.sqrt();
    let p_value = (2.0 * normal_cdf(z)).min(1.0);

    WilcoxonResult {
        w_plus,
        w_minus,
        z,
        p_value,
    }
}

/// Paired effect size: mean difference over the standard deviation of differences.
///
/// Returns 0 when the differences do not vary.
pub fn paired_effect_size(baseline: &[f64], alternate: &[f64]) -> f64 {
    if baseline.len() < 2 || baseline.len() != alternate.len() {
        return 0.0;
    }
    let (mean, std) = mean_and_std(&differences(baseline, alternate));
    if std == 0.0 {
        0.0
    } else {
        mean / std
    }
}

/// Interprets an effect size with Cohen's conventions.
pub fn interpret_effect_size(d: f64) -> &'static str {
    let d_abs = d.abs();
    if d_abs < 0.2 {
        "negligible"
    } else if d_abs < 0.5 {
        "small"
    } else if d_abs < 0.8 {
        "medium"
    } else {
        "large"
    }
}

/// Arithmetic mean (NaN for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn differences(baseline: &[f64], alternate: &[f64]) -> Vec<f64> {
    baseline
        .iter()
        .zip(alternate)
        .map(|(b, a)| a - b)
        .collect()
}

/// Mean and sample standard deviation (n - 1).
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// 1-based ranks with ties averaged.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share the average of ranks i+1..=j+1
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

// ============================================================================
// Internal: distribution functions
// ============================================================================

/// Two-tailed p-value of the t-distribution.
///
/// p = I_{df/(df+t²)}(df/2, 1/2) for every df.
fn t_distribution_p_value(t_abs: f64, df: usize) -> f64 {
    let x = df as f64 / (df as f64 + t_abs * t_abs);
    incomplete_beta(df as f64 / 2.0, 0.5, x)
}

/// Standard normal CDF.
pub(crate) fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / 2.0_f64.sqrt()))
}

/// Error function (Abramowitz and Stegun 7.1.26).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Regularized incomplete beta function.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let bt = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * beta_cf(a, b, x) / a
    } else {
        1.0 - bt * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 1e-12;
    const TINY: f64 = 1e-30;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
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

/// Log gamma (Lanczos approximation).
fn ln_gamma(x: f64) -> f64 {
    let coeffs = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();

    let mut ser = 1.000000000190015;
    for (i, &coeff) in coeffs.iter().enumerate() {
        ser += coeff / (x + 1.0 + i as f64);
    }

    -tmp + (2.5066282746310005 * ser / x).ln()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_ttest_significant() {
        let baseline = vec![0.7, 0.72, 0.68, 0.71, 0.69, 0.73, 0.67, 0.70];
        let alternate = vec![0.9, 0.91, 0.89, 0.92, 0.88, 0.95, 0.86, 0.90];

        let result = paired_ttest(&baseline, &alternate);
        assert!(result.p_value < 0.001);
        assert!(result.t_statistic > 0.0);
        assert!((result.one_sided_p() - result.p_value / 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_paired_ttest_not_significant() {
        let baseline = vec![0.84, 0.86, 0.87, 0.85, 0.86];
        let alternate = vec![0.85, 0.87, 0.86, 0.84, 0.85];

        let result = paired_ttest(&baseline, &alternate);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_paired_ttest_known_value() {
        // diffs 1, 2, 3: mean 2, sd 1, t = 2 * sqrt(3) = 3.4641, df 2, two-tailed p = 0.0742
        let result = paired_ttest(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert!((result.t_statistic - 3.4641016).abs() < 1e-6);
        assert!((result.p_value - 0.0741799).abs() < 1e-4);
    }

    #[test]
    fn test_t_distribution_large_df() {
        // Student-t tail: p(|t| > 1.65) is 0.10104 at df 150 (0.09894 under N(0, 1))
        assert!((t_distribution_p_value(1.65, 150) - 0.101035).abs() < 1e-5);
        assert!((t_distribution_p_value(2.0, 249) - 0.046586).abs() < 1e-5);
    }

    #[test]
    fn test_paired_ttest_many_pairs() {
        // 151 diffs of c +/- 1 (and one c): mean c, sd 1, t = c * sqrt(151)
        let n = 151;
        let c = 1.65 / (n as f64).sqrt();
        let baseline = vec![0.5; n];
        let alternate: Vec<f64> = (0..n)
            .map(|i| {
                let e = match i {
                    0 => 0.0,
                    i if i % 2 == 0 => 1.0,
                    _ => -1.0,
                };
                0.5 + c + e
            })
            .collect();

        let result = paired_ttest(&baseline, &alternate);
        assert_eq!(result.df, 150);
        assert!((result.t_statistic - 1.65).abs() < 1e-9);
        assert!((result.p_value - 0.101035).abs() < 1e-5);
        assert!(result.one_sided_p() > 0.05);
    }

    #[test]
    fn test_paired_ttest_identical_samples() {
        let result = paired_ttest(&[0.5, 0.6, 0.7], &[0.5, 0.6, 0.7]);
        assert_eq!(result.t_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_paired_ttest_constant_shift() {
        let result = paired_ttest(&[0.1, 0.2, 0.3], &[0.2, 0.3, 0.4]);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    #[should_panic(expected = "at least two pairs")]
    fn test_paired_ttest_single_pair_panics() {
        paired_ttest(&[0.1], &[0.2]);
    }

    #[test]
    fn test_wilcoxon_all_positive() {
        let baseline = [1.0, 2.0, 3.0, 4.0, 5.0];
        let alternate = [2.0, 4.0, 6.0, 8.0, 10.0];
        let result = wilcoxon_signed_rank(&baseline, &alternate);
        assert_eq!(result.w_plus, 15.0);
        assert_eq!(result.w_minus, 0.0);
        // z = (0 - 7.5 - 0.5) / sqrt(13.75)
        assert!((result.z + 2.157_44).abs() < 1e-4);
        assert!((result.p_value - 0.03098).abs() < 1e-3);
    }

    #[test]
    fn test_wilcoxon_ties_and_zeros() {
        // |diffs| = 0, 1, 1, 2 -> ranks 1, 2.5, 2.5, 4
        let baseline = [0.0, 0.0, 1.0, 0.0];
        let alternate = [0.0, 1.0, 0.0, 2.0];
        let result = wilcoxon_signed_rank(&baseline, &alternate);
        assert!((result.w_plus - 6.5).abs() < 1e-12);
        assert!((result.w_minus - 3.5).abs() < 1e-12);
        assert!(result.p_value > 0.05 && result.p_value <= 1.0);
    }

    #[test]
    fn test_wilcoxon_symmetric_in_direction() {
        let a = [0.3, 0.5, 0.2, 0.8, 0.4, 0.6];
        let b = [0.4, 0.7, 0.1, 0.9, 0.45, 0.8];
        let forward = wilcoxon_signed_rank(&a, &b);
        let backward = wilcoxon_signed_rank(&b, &a);
        assert!((forward.p_value - backward.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_average_ranks() {
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
        assert_eq!(average_ranks(&[1.0, 1.0, 1.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_effect_size() {
        let d = paired_effect_size(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(interpret_effect_size(d), "large");
        assert_eq!(paired_effect_size(&[0.5, 1.0], &[1.5, 2.0]), 0.0);
        assert_eq!(interpret_effect_size(0.1), "negligible");
        assert_eq!(interpret_effect_size(-0.3), "small");
        assert_eq!(interpret_effect_size(0.6), "medium");
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 0.001);
        assert!((normal_cdf(1.96) - 0.975).abs() < 0.001);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 0.001);
    }
}
