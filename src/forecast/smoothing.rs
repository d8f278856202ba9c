//! Moving-average smoothing and linear trend estimation.

use super::primitives::{mean, ols_fit};
use super::windows::{FixedWindow, TailWindow, WindowStrategy};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Width of the trailing moving average, in days.
pub const SMOOTHING_WINDOW: usize = 7;
/// How many of the most recent smoothed points the trend is fitted on.
pub const TREND_WINDOW: usize = 56;
/// Below this many points the trend falls back to a flat line.
pub const MIN_TREND_POINTS: usize = 8;

/// Linear trend `y = slope * x + intercept`, with `x` the position inside the
/// fitting window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendParams {
    /// Value of the fitted line at window position `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Trailing moving average where the first `size - 1` points use a shorter
/// window instead of being undefined.
pub fn moving_average(series: &[f64], size: usize) -> Vec<f64> {
    FixedWindow::new(size).apply(series, mean)
}

/// The window of smoothed points the trend (and its backcast) is computed over.
pub fn trend_window() -> TailWindow {
    TailWindow::new(TREND_WINDOW, MIN_TREND_POINTS)
}

/// Fits a linear trend to the last `TREND_WINDOW` smoothed points.
///
/// With fewer than `MIN_TREND_POINTS` points the result is a flat line at the
/// last smoothed value.
pub fn fit_trend(smoothed: &[f64]) -> TrendParams {
    let strategy = trend_window();
    let window = strategy.slice(smoothed);

    if !strategy.is_warm(window) {
        let last = smoothed.last().copied().unwrap_or(0.0);
        trace!(
            points = window.len(),
            required = strategy.burn_in(),
            last,
            "trend window too short, using flat line"
        );
        return TrendParams {
            slope: 0.0,
            intercept: last,
        };
    }

    let (slope, intercept) = ols_fit(window);
    TrendParams { slope, intercept }
}
