//! Shared numeric helpers.
//!
//! Every ratio in the metrics and analyzers goes through [`safe_ratio`], so the
//! zero-denominator policy (result is 0.0, never NaN or infinity) lives in one
//! place.

/// `numerator / denominator`, or 0.0 when the denominator is zero or either
/// input or the result is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentile of an ascending slice using linear interpolation between the
/// two closest ranks. Empty input yields 0.0.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Sort a vector of floats ascending; NaNs compare equal.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    safe_ratio(values.iter().sum::<f64>(), values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), 0.0 for fewer than 2 values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn safe_ratio_zero_denominator() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn safe_ratio_non_finite_inputs() {
        assert_eq!(safe_ratio(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_ratio(1.0, f64::INFINITY), 0.0);
        assert_eq!(safe_ratio(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }

    #[test]
    fn safe_ratio_normal() {
        assert_abs_diff_eq!(safe_ratio(3.0, 4.0), 0.75);
        assert_abs_diff_eq!(safe_ratio(-3.0, 4.0), -0.75);
    }

    #[test]
    fn round_to_two_places() {
        assert_abs_diff_eq!(round_to(3.14159, 2), 3.14);
        assert_abs_diff_eq!(round_to(-2.675_1, 2), -2.68);
        assert_abs_diff_eq!(round_to(74.96, 1), 75.0);
    }

    #[test]
    fn percentile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(percentile_sorted(&sorted, 0.0), 1.0);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 50.0), 3.0);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 100.0), 5.0);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 5.0), 1.2);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 95.0), 4.8);
    }

    #[test]
    fn percentile_degenerate_inputs() {
        assert_eq!(percentile_sorted(&[], 50.0), 0.0);
        assert_eq!(percentile_sorted(&[7.0], 5.0), 7.0);
    }

    #[test]
    fn percentile_even_count_median() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(percentile_sorted(&sorted, 50.0), 2.5);
    }

    #[test]
    fn stddev_uses_sample_denominator() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population stddev is 2.0; sample stddev is sqrt(32/7)
        assert_abs_diff_eq!(sample_stddev(&values), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_eq!(sample_stddev(&[1.0]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
