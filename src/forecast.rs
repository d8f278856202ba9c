//! Traffic forecasting
//!
//! Turns a daily clicks series into a 30-day forecast: a 7-day moving average
//! feeds a linear trend, weekday factors are re-applied on top of the
//! projection, and the backcast error of the trend sets an uncertainty band.
//! Everything here is pure and synchronous; calls never fail and degrade to
//! neutral values when history is too short.

pub mod nudges;
pub mod primitives;
pub mod seasonality;
pub mod smoothing;
pub mod windows;

pub use nudges::{apply_nudges, scale_series, NudgeDetails, NudgeInputs, NudgeOutcome};
pub use seasonality::{weekday_factors, DEFAULT_SEASONALITY_WINDOW};
pub use smoothing::{fit_trend, moving_average, TrendParams};

use primitives::{mean, non_negative, rmse};
use serde::{Deserialize, Serialize};
use smoothing::{trend_window, SMOOTHING_WINDOW};
use tracing::{debug, trace};

/// Number of days projected forward.
pub const HORIZON: usize = 30;
/// Shortest history that is forecast at all.
pub const MIN_HISTORY: usize = 45;
/// The band is never tighter than this relative error.
pub const MIN_RELATIVE_ERROR: f64 = 0.15;

/// Output of [`forecast30`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// Projected daily values for the next `HORIZON` days.
    pub forecast: Vec<f64>,
    /// The last `HORIZON` smoothed historical values, for comparison.
    pub baseline: Vec<f64>,
    /// Fractional change of the forecast total against the baseline total.
    pub growth_pct: f64,
    pub band_low: Vec<f64>,
    pub band_high: Vec<f64>,
}

impl ForecastResult {
    /// The result returned when there is too little history to forecast.
    pub fn zeroed() -> Self {
        ForecastResult {
            forecast: vec![0.0; HORIZON],
            baseline: vec![0.0; HORIZON],
            growth_pct: 0.0,
            band_low: vec![0.0; HORIZON],
            band_high: vec![0.0; HORIZON],
        }
    }
}

/// Replaces every non-finite or negative value with zero.
pub fn clean_series(series: &[f64]) -> Vec<f64> {
    series.iter().copied().map(non_negative).collect()
}

/// Relative error of the trend against the smoothed history it was fitted on,
/// floored at `MIN_RELATIVE_ERROR`.
fn relative_error(smoothed: &[f64], trend: &TrendParams) -> f64 {
    let window = trend_window().slice(smoothed);
    let backcast: Vec<f64> = (0..window.len()).map(|i| trend.at(i as f64)).collect();

    let level = mean(window);
    if level <= 0.0 {
        return MIN_RELATIVE_ERROR;
    }

    let relative = rmse(&backcast, window) / level;
    if relative.is_finite() {
        relative.max(MIN_RELATIVE_ERROR)
    } else {
        MIN_RELATIVE_ERROR
    }
}

/// Forecasts the next 30 days of a daily series.
///
/// The projection continues from the last smoothed level (not the trend's
/// intercept) so there is no jump at the forecast origin.
///
/// # Examples
/// ```
/// use sumryze::forecast::forecast30;
///
/// let history = vec![100.0; 60];
/// let result = forecast30(&history);
///
/// assert_eq!(result.forecast.len(), 30);
/// assert!((result.forecast[0] - 100.0).abs() < 1e-9);
/// assert!(result.growth_pct.abs() < 1e-9);
/// ```
pub fn forecast30(series: &[f64]) -> ForecastResult {
    if series.len() < MIN_HISTORY {
        trace!(points = series.len(), "history too short, returning zeroed forecast");
        return ForecastResult::zeroed();
    }

    let clean = clean_series(series);
    let smoothed = moving_average(&clean, SMOOTHING_WINDOW);
    let trend = fit_trend(&smoothed);
    let last = smoothed[smoothed.len() - 1];
    if !last.is_finite() || !trend.slope.is_finite() {
        debug!(points = clean.len(), "series magnitude overflows, returning zeroed forecast");
        return ForecastResult::zeroed();
    }
    let factors = weekday_factors(&clean, DEFAULT_SEASONALITY_WINDOW);

    let start_dow = clean.len() % 7;
    let forecast: Vec<f64> = (0..HORIZON)
        .map(|t| {
            let projected = (last + trend.slope * (t + 1) as f64).max(0.0);
            (projected * factors[(start_dow + t + 1) % 7]).max(0.0)
        })
        .collect();

    let baseline = smoothed[smoothed.len() - HORIZON..].to_vec();

    let rel = relative_error(&smoothed, &trend);
    let band_low = scale_series(&forecast, 1.0 - rel);
    let band_high = scale_series(&forecast, 1.0 + rel);

    let forecast_total: f64 = forecast.iter().sum();
    let baseline_total: f64 = baseline.iter().sum();
    let growth_pct =
        if baseline_total > 0.0 && baseline_total.is_finite() && forecast_total.is_finite() {
            (forecast_total - baseline_total) / baseline_total
        } else {
            0.0
        };

    debug!(
        points = clean.len(),
        slope = trend.slope,
        intercept = trend.intercept,
        relative_error = rel,
        growth_pct,
        "computed 30-day forecast"
    );

    ForecastResult {
        forecast,
        baseline,
        growth_pct,
        band_low,
        band_high,
    }
}
