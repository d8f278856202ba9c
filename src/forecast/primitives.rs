//! Stateless numeric primitives used by the forecasting stages.
//!
//! These are pure functions over slices and can be composed with the
//! windowing strategies in `windows`.

/// Coerces a raw value to a usable non-negative finite number.
///
/// NaN, infinities and negative values all become `0.0`.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ordinary least squares fit of `y = slope * x + intercept` where `x` is the
/// position of each value in the slice.
///
/// Returns `(slope, intercept)`. A slice with fewer than two points (or no
/// spread in `x`) yields a zero slope through the mean.
pub fn ols_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.len() < 2 {
        return (0.0, mean(values));
    }

    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator.abs() < 1e-12 {
        return (0.0, y_mean);
    }

    let slope = numerator / denominator;
    (slope, y_mean - slope * x_mean)
}

/// Root mean squared error between two equally long series.
///
/// Extra points in the longer slice are ignored; empty input yields `0.0`.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    let len = predicted.len().min(actual.len());
    if len == 0 {
        return 0.0;
    }

    let sum_squared: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();

    (sum_squared / len as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn non_negative_zeroes_invalid_values() {
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
        assert_eq!(non_negative(f64::NEG_INFINITY), 0.0);
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(12.5), 12.5);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn ols_recovers_exact_line() {
        let values: Vec<f64> = (0..10).map(|x| 3.0 + 2.0 * x as f64).collect();
        let (slope, intercept) = ols_fit(&values);
        assert_relative_eq!(slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(intercept, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn ols_single_point_is_flat() {
        assert_eq!(ols_fit(&[7.0]), (0.0, 7.0));
        assert_eq!(ols_fit(&[]), (0.0, 0.0));
    }

    #[test]
    fn rmse_matches_hand_computation() {
        let result = rmse(&[1.0, 2.0, 3.0], &[1.0, 4.0, 3.0]);
        assert_relative_eq!(result, (4.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(rmse(&[], &[1.0]), 0.0);
    }
}
