//! Window statistics over normalized samples.
//!
//! All helpers skip missing values and return `None` instead of NaN when
//! nothing usable remains, so classification code never sees NaN.

use statrs::statistics::Statistics;

use crate::model::TimePoint;

/// Present values of `field` across `points`, in order.
pub fn present(points: &[TimePoint], field: &str) -> Vec<f64> {
    points.iter().filter_map(|p| p.value(field)).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::mean(values))
}

pub fn max(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::max(values))
}

/// Sample standard deviation (n - 1 denominator); needs two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(Statistics::std_dev(values))
}

/// Population standard deviation (n denominator).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::population_std_dev(values))
}

/// Quantile with linear interpolation between the closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Rounds to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_inputs_are_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(max(&[]), None);
        assert_eq!(quantile(&[], 0.1), None);
        assert_eq!(sample_std_dev(&[5.0]), None);
    }

    #[test]
    fn test_mean_max_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(max(&values).unwrap(), 9.0);
        // Sample std: sqrt(32 / 7)
        assert_relative_eq!(sample_std_dev(&values).unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_population_std_uses_n() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std_dev(&values).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(population_std_dev(&[3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_quantile_interpolates_between_ranks() {
        let values = [10.0, 1.0, 4.0, 7.0];
        // Sorted [1, 4, 7, 10]; rank 0.3 → 1 + 0.3 * 3
        assert_relative_eq!(quantile(&values, 0.1).unwrap(), 1.9, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 10.0);
        assert_eq!(quantile(&values, 1.5), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.956, 2), 0.96);
        assert_eq!(round_to(14.7129, 3), 14.713);
    }
}
