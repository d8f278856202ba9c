//! Bounded adjustments from auxiliary signals.
//!
//! Each signal contributes a clamped fraction; the sum is clamped again and the
//! whole forecast is scaled by `1 + total`.

use super::primitives::{mean, non_negative};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum CTR history before the momentum signal is considered.
pub const MIN_CTR_POINTS: usize = 30;
/// Days on each side of the CTR momentum comparison.
pub const CTR_HALF_WINDOW: usize = 14;
pub const CTR_WEIGHT: f64 = 0.5;
pub const CTR_LIMIT: f64 = 0.10;
pub const TOP_PAGES_WEIGHT: f64 = 0.4;
pub const TOP_PAGES_LIMIT: f64 = 0.08;
pub const CWV_LIMIT: f64 = 0.03;
/// Bound on the combined adjustment.
pub const TOTAL_LIMIT: f64 = 0.20;

/// A single auxiliary signal that may nudge the forecast.
pub trait NudgeSignal {
    fn name(&self) -> &'static str;
    /// The clamped fractional contribution, or `None` when the signal has
    /// insufficient or unusable data.
    fn contribution(&self) -> Option<f64>;
}

/// Recent-vs-prior click-through-rate momentum.
pub struct CtrMomentum<'a> {
    series: &'a [f64],
}

impl<'a> CtrMomentum<'a> {
    pub fn new(series: &'a [f64]) -> Self {
        CtrMomentum { series }
    }
}

impl NudgeSignal for CtrMomentum<'_> {
    fn name(&self) -> &'static str {
        "ctr"
    }

    fn contribution(&self) -> Option<f64> {
        if self.series.len() < MIN_CTR_POINTS {
            return None;
        }

        let cleaned: Vec<f64> = self.series.iter().copied().map(non_negative).collect();
        let tail = &cleaned[cleaned.len() - 2 * CTR_HALF_WINDOW..];
        let (prior, recent) = tail.split_at(CTR_HALF_WINDOW);

        let prior_mean = mean(prior);
        if prior_mean <= 0.0 {
            return None;
        }

        let delta = (mean(recent) - prior_mean) / prior_mean;
        Some((delta * CTR_WEIGHT).clamp(-CTR_LIMIT, CTR_LIMIT))
    }
}

/// Growth of the site's top pages over a recent window.
pub struct TopPagesGrowth(pub f64);

impl NudgeSignal for TopPagesGrowth {
    fn name(&self) -> &'static str {
        "top_pages"
    }

    fn contribution(&self) -> Option<f64> {
        if !self.0.is_finite() {
            return None;
        }
        Some((self.0 * TOP_PAGES_WEIGHT).clamp(-TOP_PAGES_LIMIT, TOP_PAGES_LIMIT))
    }
}

/// Relative change in Core Web Vitals.
pub struct CoreWebVitals(pub f64);

impl NudgeSignal for CoreWebVitals {
    fn name(&self) -> &'static str {
        "cwv"
    }

    fn contribution(&self) -> Option<f64> {
        if !self.0.is_finite() {
            return None;
        }
        Some(self.0.clamp(-CWV_LIMIT, CWV_LIMIT))
    }
}

/// Optional auxiliary inputs; anything left `None` is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeInputs {
    #[serde(default)]
    pub ctr_series: Option<Vec<f64>>,
    #[serde(default)]
    pub top_pages_delta: Option<f64>,
    #[serde(default)]
    pub cwv_delta: Option<f64>,
}

/// Per-signal contributions after clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeDetails {
    pub ctr: Option<f64>,
    pub top_pages: Option<f64>,
    pub cwv: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeOutcome {
    pub adjusted: Vec<f64>,
    pub total_nudge: f64,
    pub details: NudgeDetails,
}

impl NudgeOutcome {
    /// The multiplier that was applied to the forecast.
    pub fn factor(&self) -> f64 {
        1.0 + self.total_nudge
    }
}

/// Multiplies every value by `factor`, clamping each result at zero.
pub fn scale_series(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|value| (value * factor).max(0.0)).collect()
}

/// Applies the combined, bounded nudge of all present signals to `forecast`.
pub fn apply_nudges(forecast: &[f64], inputs: &NudgeInputs) -> NudgeOutcome {
    let details = NudgeDetails {
        ctr: inputs
            .ctr_series
            .as_deref()
            .and_then(|series| CtrMomentum::new(series).contribution()),
        top_pages: inputs
            .top_pages_delta
            .and_then(|delta| TopPagesGrowth(delta).contribution()),
        cwv: inputs
            .cwv_delta
            .and_then(|delta| CoreWebVitals(delta).contribution()),
    };

    let total_nudge = [details.ctr, details.top_pages, details.cwv]
        .into_iter()
        .flatten()
        .fold(0.0, |total, contribution| total + contribution)
        .clamp(-TOTAL_LIMIT, TOTAL_LIMIT);

    debug!(?details, total_nudge, "composed forecast nudges");

    NudgeOutcome {
        adjusted: scale_series(forecast, 1.0 + total_nudge),
        total_nudge,
        details,
    }
}
