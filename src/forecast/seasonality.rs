//! Weekday seasonality.
//!
//! The series carries no dates, so "weekday" here is position modulo 7
//! counted from the start of the input. Callers are expected to pass a
//! gap-free daily series for the buckets to line up with real weekdays.

use super::primitives::mean;
use super::windows::{TailWindow, WindowStrategy};
use tracing::trace;

/// Default number of recent raw points the factors are estimated from.
pub const DEFAULT_SEASONALITY_WINDOW: usize = 56;
/// Below this many points no seasonality is applied.
pub const MIN_SEASONALITY_POINTS: usize = 14;

/// Factor set that leaves a forecast unchanged.
pub const NEUTRAL_FACTORS: [f64; 7] = [1.0; 7];

/// Estimates one multiplicative factor per weekday bucket from the last
/// `recent_days` raw points. The factors average to 1.
pub fn weekday_factors(series: &[f64], recent_days: usize) -> [f64; 7] {
    let strategy = TailWindow::new(recent_days, MIN_SEASONALITY_POINTS);
    let window = strategy.slice(series);
    if !strategy.is_warm(window) {
        trace!(
            points = window.len(),
            required = strategy.burn_in(),
            "not enough history for seasonality"
        );
        return NEUTRAL_FACTORS;
    }

    let start_index = strategy.start_index(series);
    let mut sums = [0.0_f64; 7];
    let mut counts = [0_usize; 7];
    for (offset, &value) in window.iter().enumerate() {
        let bucket = (start_index + offset) % 7;
        sums[bucket] += value;
        counts[bucket] += 1;
    }

    let mut bucket_means = [0.0_f64; 7];
    for bucket in 0..7 {
        if counts[bucket] > 0 {
            bucket_means[bucket] = sums[bucket] / counts[bucket] as f64;
        }
    }

    let grand_mean = mean(&bucket_means);
    if grand_mean <= 0.0 || !grand_mean.is_finite() {
        return NEUTRAL_FACTORS;
    }

    bucket_means.map(|bucket_mean| bucket_mean / grand_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn short_window_is_neutral() {
        assert_eq!(weekday_factors(&[10.0; 13], DEFAULT_SEASONALITY_WINDOW), NEUTRAL_FACTORS);
        // A long series with a tiny lookback is also too short.
        assert_eq!(weekday_factors(&[10.0; 100], 7), NEUTRAL_FACTORS);
    }

    #[test]
    fn constant_series_is_neutral() {
        let factors = weekday_factors(&[42.0; 56], DEFAULT_SEASONALITY_WINDOW);
        for factor in factors {
            assert_relative_eq!(factor, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn all_zero_series_is_neutral() {
        assert_eq!(weekday_factors(&[0.0; 30], DEFAULT_SEASONALITY_WINDOW), NEUTRAL_FACTORS);
    }

    #[test]
    fn weekly_pattern_is_recovered_and_normalized() {
        let pattern = [140.0, 120.0, 100.0, 100.0, 100.0, 70.0, 70.0];
        let series: Vec<f64> = (0..56).map(|i| pattern[i % 7]).collect();
        let factors = weekday_factors(&series, DEFAULT_SEASONALITY_WINDOW);

        assert_relative_eq!(factors.iter().sum::<f64>() / 7.0, 1.0, epsilon = 1e-12);
        assert_relative_eq!(factors[0], 1.4, epsilon = 1e-12);
        assert_relative_eq!(factors[5], 0.7, epsilon = 1e-12);
    }

    #[test]
    fn buckets_follow_absolute_index() {
        // Spike every index divisible by 7; 60 points so the window starts at 4.
        let series: Vec<f64> = (0..60).map(|i| if i % 7 == 0 { 70.0 } else { 0.0 }).collect();
        let factors = weekday_factors(&series, DEFAULT_SEASONALITY_WINDOW);
        assert_relative_eq!(factors[0], 7.0, epsilon = 1e-12);
        for factor in &factors[1..] {
            assert_eq!(*factor, 0.0);
        }
    }
}
