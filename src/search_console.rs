use crate::daily_series::{DailyPoint, DateRange};
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Search Console API root.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/webmasters/v3";

/// Configuration for the Search Console client
#[derive(Debug, Clone)]
pub struct SearchConsoleConfig {
    /// API root, overridable for testing (default: the public Google endpoint)
    pub api_base: String,
    /// OAuth access token sent as a bearer token
    pub access_token: String,
    /// Request timeout in seconds (default: 10)
    pub timeout_seconds: u64,
    /// Maximum rows requested per query (default: 1000)
    pub row_limit: u32,
}

impl SearchConsoleConfig {
    /// Creates a configuration with default endpoint and limits.
    pub fn new(access_token: impl Into<String>) -> Self {
        SearchConsoleConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: access_token.into(),
            timeout_seconds: 10,
            row_limit: 1000,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Body of a `searchAnalytics/query` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    start_date: String,
    end_date: String,
    dimensions: Vec<&'static str>,
    row_limit: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<QueryRow>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    ctr: f64,
}

/// Google Search Console client
///
/// Fetches daily clicks and CTR for a verified site property.
#[derive(Debug, Clone)]
pub struct SearchConsoleClient {
    client: Client,
    config: SearchConsoleConfig,
}

impl SearchConsoleClient {
    /// Creates a new client.
    ///
    /// # Returns
    /// Returns `Ok(SearchConsoleClient)` if successful, or an error if the
    /// HTTP client cannot be built or the API base is not a valid URL.
    pub fn new(config: SearchConsoleConfig) -> Result<Self, FetchError> {
        Url::parse(&config.api_base)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.api_base, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FetchError::ClientCreation(e.to_string()))?;

        Ok(SearchConsoleClient { client, config })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &SearchConsoleConfig {
        &self.config
    }

    /// Builds the query endpoint for a site property.
    ///
    /// The site URL becomes a single, percent-encoded path segment.
    pub fn query_url(&self, site: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", self.config.api_base)))?
            .pop_if_empty()
            .push("sites")
            .push(site)
            .push("searchAnalytics")
            .push("query");
        Ok(url)
    }

    /// Fetches one point per day with data in `date_range`, oldest first.
    ///
    /// Days the API reports nothing for are absent; callers densify.
    ///
    /// # Errors
    /// Returns `FetchError` if the request fails, the API answers with a
    /// non-success status, or the body cannot be parsed.
    pub async fn fetch_daily(
        &self,
        site: &str,
        date_range: &DateRange,
    ) -> Result<Vec<DailyPoint>, FetchError> {
        let url = self.query_url(site)?;
        let body = QueryRequest {
            start_date: date_range.start.format("%Y-%m-%d").to_string(),
            end_date: date_range.end.format("%Y-%m-%d").to_string(),
            dimensions: vec!["date"],
            row_limit: self.config.row_limit,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::ParseError(e.to_string()))?;

        parse_query_response(&text)
    }
}

/// Parses a `searchAnalytics/query` response body keyed by date.
///
/// Rows whose first key is not an ISO date are skipped.
pub fn parse_query_response(body: &str) -> Result<Vec<DailyPoint>, FetchError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;

    let mut points: Vec<DailyPoint> = response
        .rows
        .into_iter()
        .filter_map(|row| {
            let key = row.keys.first()?;
            let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
            Some(DailyPoint::new(date, row.clicks, row.ctr))
        })
        .collect();

    points.sort_by_key(|point| point.date);
    Ok(points)
}

/// Errors that can occur while fetching from Search Console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP client creation failed
    ClientCreation(String),
    /// Endpoint URL could not be built
    InvalidUrl(String),
    /// Network error occurred
    NetworkError(String),
    /// API returned an error response
    ApiError(String),
    /// Failed to parse response data
    ParseError(String),
    /// Request did not complete within the allotted time
    Timeout,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::ClientCreation(msg) => write!(f, "Client creation error: {}", msg),
            FetchError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            FetchError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            FetchError::ApiError(msg) => write!(f, "API error: {}", msg),
            FetchError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FetchError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = SearchConsoleClient::new(SearchConsoleConfig::new("token"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().config().row_limit, 1000);
    }

    #[test]
    fn invalid_api_base_is_rejected() {
        let config = SearchConsoleConfig::new("token").with_api_base("not a url");
        assert!(matches!(
            SearchConsoleClient::new(config),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn query_url_encodes_site_as_one_segment() {
        let client = SearchConsoleClient::new(SearchConsoleConfig::new("token")).unwrap();
        let url = client.query_url("https://example.com/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/webmasters/v3/sites/https:%2F%2Fexample.com%2F/searchAnalytics/query"
        );
    }

    #[test]
    fn query_url_tolerates_trailing_slash_in_base() {
        let config = SearchConsoleConfig::new("token").with_api_base("http://127.0.0.1:9/v3/");
        let client = SearchConsoleClient::new(config).unwrap();
        let url = client.query_url("sc-domain:example.com").unwrap();
        assert_eq!(url.path(), "/v3/sites/sc-domain:example.com/searchAnalytics/query");
    }

    #[test]
    fn parse_response_sorts_and_skips_bad_keys() {
        let body = r#"{
            "rows": [
                {"keys": ["2024-04-02"], "clicks": 12, "impressions": 400, "ctr": 0.03, "position": 8.1},
                {"keys": ["2024-04-01"], "clicks": 10, "impressions": 500, "ctr": 0.02, "position": 9.0},
                {"keys": ["yesterday"], "clicks": 99, "ctr": 0.5},
                {"keys": [], "clicks": 1}
            ],
            "responseAggregationType": "byProperty"
        }"#;
        let points = parse_query_response(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(points[0].clicks, 10.0);
        assert_eq!(points[1].ctr, 0.03);
    }

    #[test]
    fn parse_response_without_rows_is_empty() {
        assert!(parse_query_response(r#"{"responseAggregationType": "auto"}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn parse_response_rejects_garbage() {
        assert!(matches!(
            parse_query_response("<html>"),
            Err(FetchError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let mut config = SearchConsoleConfig::new("token").with_api_base("http://127.0.0.1:9/v3");
        config.timeout_seconds = 2;
        let client = SearchConsoleClient::new(config).unwrap();
        let range = DateRange::trailing(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), 30);
        let result = client.fetch_daily("https://example.com/", &range).await;
        assert!(matches!(result, Err(FetchError::NetworkError(_))));
    }

    #[test]
    fn fetch_error_display() {
        let error = FetchError::NetworkError("Connection refused".to_string());
        assert!(error.to_string().contains("Network error"));
        assert!(error.to_string().contains("Connection refused"));
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
    }
}
