//! Shared application state for the API server

use crate::daily_series::{densify_reported, DailyPoint, DateRange, SeriesProvider, SeriesProviderError};
use crate::mock_series::MockSeriesProvider;
use crate::search_console::{FetchError, SearchConsoleClient};
use chrono::{Duration as DateDuration, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source label reported when data came from Search Console.
pub const SEARCH_CONSOLE_SOURCE: &str = "gsc";

/// How the forecast endpoint resolves series.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    /// Skip the live source and serve fallback data only
    pub force_mock: bool,
    /// Upper bound on the live fetch before falling back
    pub fetch_timeout: Duration,
    /// Days of history requested, ending yesterday
    pub lookback_days: u32,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        ForecastSettings {
            force_mock: false,
            fetch_timeout: Duration::from_millis(8000),
            lookback_days: 90,
        }
    }
}

/// A resolved daily series and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedSeries {
    pub source: &'static str,
    pub points: Vec<DailyPoint>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: ForecastSettings,
    /// Live source, absent when no credentials are configured
    pub search_console: Option<SearchConsoleClient>,
    /// Offline sources tried in order before the mock generator
    pub fallbacks: Vec<Arc<dyn SeriesProvider + Send + Sync>>,
    pub mock: MockSeriesProvider,
}

impl AppState {
    /// Creates a new application state with no live source and no fallbacks
    /// other than the mock generator.
    pub fn new(settings: ForecastSettings) -> Self {
        AppState {
            settings,
            search_console: None,
            fallbacks: Vec::new(),
            mock: MockSeriesProvider::new(),
        }
    }

    pub fn with_search_console(mut self, client: SearchConsoleClient) -> Self {
        self.search_console = Some(client);
        self
    }

    pub fn with_fallback(mut self, provider: Arc<dyn SeriesProvider + Send + Sync>) -> Self {
        self.fallbacks.push(provider);
        self
    }

    /// The history window requested for a forecast made on `today`.
    pub fn history_range(&self, today: NaiveDate) -> DateRange {
        DateRange::trailing(today - DateDuration::days(1), self.settings.lookback_days)
    }

    /// Resolves the daily series for `site`.
    ///
    /// Tries Search Console (bounded by the fetch timeout) unless mocking is
    /// forced, then each fallback provider, then the mock generator. Live
    /// failures are logged and never reach the client. Series are densified
    /// only up to their last reported day.
    pub async fn resolve_series(&self, site: &str) -> Result<ResolvedSeries, SeriesProviderError> {
        let range = self.history_range(Utc::now().date_naive());

        if let Some(points) = self.fetch_live(site, &range).await {
            let points = densify_reported(&points, &range);
            if !points.is_empty() {
                return Ok(ResolvedSeries {
                    source: SEARCH_CONSOLE_SOURCE,
                    points,
                });
            }
            warn!(site, "search console rows fall outside the history range");
        }

        for provider in &self.fallbacks {
            match provider.daily_series(site, &range) {
                Ok(points) if !points.is_empty() => {
                    return Ok(ResolvedSeries {
                        source: provider.name(),
                        points: densify_reported(&points, &range),
                    });
                }
                Ok(_) => debug!(site, provider = provider.name(), "fallback has no points in range"),
                Err(SeriesProviderError::SiteNotFound(_)) => {
                    debug!(site, provider = provider.name(), "site not in fallback")
                }
                Err(e) => warn!(site, provider = provider.name(), error = %e, "fallback provider failed"),
            }
        }

        let points = self.mock.daily_series(site, &range)?;
        Ok(ResolvedSeries {
            source: self.mock.name(),
            points,
        })
    }

    async fn fetch_live(&self, site: &str, range: &DateRange) -> Option<Vec<DailyPoint>> {
        if self.settings.force_mock {
            return None;
        }
        let client = self.search_console.as_ref()?;

        let outcome = tokio::time::timeout(self.settings.fetch_timeout, client.fetch_daily(site, range))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        match outcome {
            Ok(points) if !points.is_empty() => Some(points),
            Ok(_) => {
                warn!(site, "search console returned no rows, using fallback data");
                None
            }
            Err(e) => {
                warn!(site, error = %e, "search console fetch failed, using fallback data");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily_series::InMemorySeriesProvider;
    use crate::search_console::SearchConsoleConfig;

    fn recent_points(range: &DateRange) -> Vec<DailyPoint> {
        range
            .dates()
            .step_by(2)
            .map(|date| DailyPoint::new(date, 25.0, 0.04))
            .collect()
    }

    #[tokio::test]
    async fn mock_is_the_last_resort() {
        let state = AppState::new(ForecastSettings::default());
        let resolved = state.resolve_series("https://example.com/").await.unwrap();
        assert_eq!(resolved.source, "mock");
        assert_eq!(resolved.points.len(), 90);
    }

    #[tokio::test]
    async fn fallback_provider_is_densified() {
        let state = AppState::new(ForecastSettings::default());
        let range = state.history_range(Utc::now().date_naive());
        let mut memory = InMemorySeriesProvider::new();
        memory.add_series("https://example.com/", recent_points(&range));

        let state = state.with_fallback(Arc::new(memory));
        let resolved = state.resolve_series("https://example.com/").await.unwrap();
        assert_eq!(resolved.source, "memory");
        // Every other day from the start of an even-length range: the last
        // day is unreported and is not padded.
        assert_eq!(resolved.points.len(), range.num_days() - 1);
        assert_eq!(resolved.points[1].clicks, 0.0);
        assert_eq!(resolved.points[0].clicks, 25.0);
    }

    #[tokio::test]
    async fn lagging_live_rows_are_not_padded_with_zeros() {
        let state = AppState::new(ForecastSettings::default());
        let range = state.history_range(Utc::now().date_naive());
        let reported_end = range.end - DateDuration::days(2);
        let rows: Vec<serde_json::Value> = DateRange::new(range.start, reported_end)
            .dates()
            .map(|date| {
                serde_json::json!({
                    "keys": [date.format("%Y-%m-%d").to_string()],
                    "clicks": 100,
                    "ctr": 0.05
                })
            })
            .collect();
        let body = serde_json::json!({ "rows": rows });

        let app = axum::Router::new().fallback(move || {
            let body = body.clone();
            async move { axum::Json(body) }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = SearchConsoleConfig::new("token").with_api_base(format!("http://{}/v3", addr));
        let state = state.with_search_console(SearchConsoleClient::new(config).unwrap());
        let resolved = state.resolve_series("https://example.com/").await.unwrap();

        assert_eq!(resolved.source, SEARCH_CONSOLE_SOURCE);
        assert_eq!(resolved.points.len(), range.num_days() - 2);
        assert_eq!(resolved.points.last().unwrap().date, reported_end);

        let (clicks, _) = crate::daily_series::split_metrics(&resolved.points);
        let result = crate::forecast::forecast30(&clicks);
        assert!((result.forecast[0] - 100.0).abs() < 1e-9);
        assert!(result.growth_pct.abs() < 1e-9);
    }

    #[tokio::test]
    async fn unknown_site_in_fallback_uses_mock() {
        let state = AppState::new(ForecastSettings::default())
            .with_fallback(Arc::new(InMemorySeriesProvider::new()));
        let resolved = state.resolve_series("https://other.example/").await.unwrap();
        assert_eq!(resolved.source, "mock");
    }

    #[tokio::test]
    async fn failing_live_source_falls_back() {
        let mut config = SearchConsoleConfig::new("token").with_api_base("http://127.0.0.1:9/v3");
        config.timeout_seconds = 2;
        let settings = ForecastSettings {
            fetch_timeout: Duration::from_millis(3000),
            ..ForecastSettings::default()
        };
        let state = AppState::new(settings)
            .with_search_console(SearchConsoleClient::new(config).unwrap());
        let resolved = state.resolve_series("https://example.com/").await.unwrap();
        assert_eq!(resolved.source, "mock");
    }

    #[tokio::test]
    async fn forced_mock_skips_live_source() {
        let config = SearchConsoleConfig::new("token").with_api_base("http://127.0.0.1:9/v3");
        let settings = ForecastSettings {
            force_mock: true,
            ..ForecastSettings::default()
        };
        let state = AppState::new(settings)
            .with_search_console(SearchConsoleClient::new(config).unwrap());
        assert!(state
            .fetch_live("https://example.com/", &state.history_range(Utc::now().date_naive()))
            .await
            .is_none());
    }

    #[test]
    fn history_range_ends_yesterday() {
        let state = AppState::new(ForecastSettings::default());
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let range = state.history_range(today);
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(range.num_days(), 90);
    }
}
