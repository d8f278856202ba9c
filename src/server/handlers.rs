//! HTTP request handlers for API endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use rayon::prelude::*;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use super::state::AppState;
use crate::daily_series::split_metrics;
use crate::forecast::{apply_nudges, forecast30, scale_series, NudgeDetails, NudgeInputs};

/// Maximum number of series accepted by the batch endpoint.
pub const MAX_BATCH_SERIES: usize = 500;
/// Largest daily click count accepted from callers.
pub const MAX_DAILY_CLICKS: f64 = 1e12;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Health check endpoint
///
/// Returns a simple status response to verify the server is running
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}

/// Per-signal nudges plus their bounded total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(flatten)]
    pub details: NudgeDetails,
    pub total_nudge: f64,
}

/// Forecast numbers after nudging, shared by single and batch responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPayload {
    pub growth_pct: f64,
    pub forecast: Vec<f64>,
    pub baseline: Vec<f64>,
    pub band_low: Vec<f64>,
    pub band_high: Vec<f64>,
    pub breakdown: Breakdown,
}

/// Runs the forecaster and applies nudges to the forecast and its band.
///
/// `growth_pct` is the forecaster's figure, before nudging.
pub fn run_forecast(clicks: &[f64], inputs: &NudgeInputs) -> ForecastPayload {
    let base = forecast30(clicks);
    let nudged = apply_nudges(&base.forecast, inputs);
    let factor = nudged.factor();

    ForecastPayload {
        growth_pct: base.growth_pct,
        band_low: scale_series(&base.band_low, factor),
        band_high: scale_series(&base.band_high, factor),
        forecast: nudged.adjusted,
        baseline: base.baseline,
        breakdown: Breakdown {
            details: nudged.details,
            total_nudge: nudged.total_nudge,
        },
    }
}

/// Query parameters for the forecast endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQueryParams {
    pub url: Option<String>,
    pub top_pages_delta: Option<f64>,
    pub cwv_delta: Option<f64>,
}

/// Response for the forecast endpoint
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub source: String,
    #[serde(flatten)]
    pub payload: ForecastPayload,
}

fn validate_site(url: Option<&str>) -> Result<String, ApiError> {
    let site = url
        .map(str::trim)
        .filter(|site| !site.is_empty())
        .ok_or_else(|| ApiError::InvalidParameter("Missing 'url' query parameter".to_string()))?;

    Url::parse(site)
        .map_err(|e| ApiError::InvalidParameter(format!("Invalid url '{}': {}", site, e)))?;

    Ok(site.to_string())
}

/// GET /forecast?url=... - 30-day clicks forecast for a site
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let site = validate_site(params.url.as_deref())?;
    let resolved = state.resolve_series(&site).await?;
    let (clicks, ctr) = split_metrics(&resolved.points);

    let inputs = NudgeInputs {
        ctr_series: Some(ctr),
        top_pages_delta: params.top_pages_delta,
        cwv_delta: params.cwv_delta,
    };
    let payload = run_forecast(&clicks, &inputs);

    info!(
        site = %site,
        source = resolved.source,
        points = clicks.len(),
        growth_pct = payload.growth_pct,
        total_nudge = payload.breakdown.total_nudge,
        "served forecast"
    );

    let response = ForecastResponse {
        source: resolved.source.to_string(),
        payload,
    };

    Ok((
        [(header::CACHE_CONTROL, NO_STORE), (header::PRAGMA, "no-cache")],
        Json(response),
    ))
}

/// Request for batch forecasts
#[derive(Debug, Deserialize)]
pub struct BatchForecastRequest {
    pub series: Vec<BatchSeries>,
}

/// One caller-supplied series in a batch request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSeries {
    pub id: String,
    pub clicks: Vec<f64>,
    #[serde(default)]
    pub ctr: Option<Vec<f64>>,
    #[serde(default)]
    pub top_pages_delta: Option<f64>,
    #[serde(default)]
    pub cwv_delta: Option<f64>,
}

/// Result for one series of a batch
#[derive(Debug, Serialize)]
pub struct BatchForecastItem {
    pub id: String,
    #[serde(flatten)]
    pub payload: ForecastPayload,
}

/// Response for batch forecasts
#[derive(Debug, Serialize)]
pub struct BatchForecastResponse {
    pub results: Vec<BatchForecastItem>,
}

/// POST /forecast/batch - Forecast many caller-supplied series at once
///
/// Forecasts are pure, so items are spread over the rayon pool on a blocking
/// thread and returned in request order.
pub async fn batch_forecast(
    Json(request): Json<BatchForecastRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.series.len() > MAX_BATCH_SERIES {
        return Err(ApiError::LimitExceeded(format!(
            "At most {} series per batch, got {}",
            MAX_BATCH_SERIES,
            request.series.len()
        )));
    }

    if let Some(item) = request
        .series
        .iter()
        .find(|item| item.clicks.iter().any(|&value| value > MAX_DAILY_CLICKS))
    {
        return Err(ApiError::InvalidParameter(format!(
            "Series '{}' has daily clicks above {}",
            item.id, MAX_DAILY_CLICKS
        )));
    }

    let count = request.series.len();
    let results = tokio::task::spawn_blocking(move || {
        request
            .series
            .into_par_iter()
            .map(|item| {
                let inputs = NudgeInputs {
                    ctr_series: item.ctr,
                    top_pages_delta: item.top_pages_delta,
                    cwv_delta: item.cwv_delta,
                };
                BatchForecastItem {
                    payload: run_forecast(&item.clicks, &inputs),
                    id: item.id,
                }
            })
            .collect::<Vec<_>>()
    })
    .await?;

    info!(count, "served batch forecast");

    Ok((
        [(header::CACHE_CONTROL, NO_STORE), (header::PRAGMA, "no-cache")],
        Json(BatchForecastResponse { results }),
    ))
}
