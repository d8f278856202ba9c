//! REST API serving forecasts to the dashboard

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::{
    run_forecast, BatchForecastRequest, BatchForecastResponse, BatchSeries, Breakdown,
    ForecastPayload, ForecastResponse, MAX_BATCH_SERIES,
};
pub use routes::create_router;
pub use state::{AppState, ForecastSettings, ResolvedSeries, SEARCH_CONSOLE_SOURCE};

use crate::csv_provider::CsvSeriesProvider;
use crate::search_console::{SearchConsoleClient, SearchConsoleConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: "127.0.0.1")
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
    /// Serve fallback data even when Search Console is configured
    pub force_mock: bool,
    /// Live fetch timeout in milliseconds (default: 8000)
    pub fetch_timeout_ms: u64,
    /// Days of history fetched per forecast (default: 90)
    pub lookback_days: u32,
    /// Optional CSV export consulted before the mock generator
    pub series_csv: Option<PathBuf>,
    /// Search Console credentials; `None` disables the live source
    pub search_console: Option<SearchConsoleConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            force_mock: false,
            fetch_timeout_ms: 8000,
            lookback_days: 90,
            series_csv: None,
            search_console: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration with default forecast settings
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerConfig {
            host: host.into(),
            port,
            ..ServerConfig::default()
        }
    }

    pub fn forecast_settings(&self) -> ForecastSettings {
        ForecastSettings {
            force_mock: self.force_mock,
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            lookback_days: self.lookback_days,
        }
    }
}

impl AppState {
    /// Builds state from configuration, loading the CSV fallback and creating
    /// the Search Console client when configured.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut state = AppState::new(config.forecast_settings());

        if let Some(search_console) = &config.search_console {
            state = state.with_search_console(SearchConsoleClient::new(search_console.clone())?);
        }

        if let Some(path) = &config.series_csv {
            let provider = CsvSeriesProvider::from_path(path)?;
            tracing::info!("Loaded fallback series from {}", path.display());
            state = state.with_fallback(Arc::new(provider));
        }

        Ok(state)
    }
}

/// Runs the API server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns an error if the server fails to start or encounters a fatal error
///
/// # Example
/// ```rust,no_run
/// use sumryze::server::{run_server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::default();
///     run_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let state = Arc::new(AppState::from_config(&config)?);
    if state.search_console.is_none() || config.force_mock {
        tracing::info!("Search Console disabled, serving fallback data");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
