//! Sumryze Forecast API Server Binary
//!
//! Run with: `cargo run --bin sumryze-server`

use std::path::PathBuf;
use sumryze::search_console::SearchConsoleConfig;
use sumryze::{run_server, ServerConfig};

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Note: Tracing is initialized in run_server()
    // Set RUST_LOG environment variable to control log level:
    //   RUST_LOG=debug cargo run --bin sumryze-server
    //   RUST_LOG=sumryze::forecast=trace cargo run --bin sumryze-server  (core only)

    // Environment is read here only; the library takes explicit configuration
    let defaults = ServerConfig::default();
    let host = std::env::var("HOST").unwrap_or(defaults.host.clone());
    let port = env_parse("PORT", defaults.port);

    let search_console = std::env::var("GSC_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
        .map(|token| {
            let config = SearchConsoleConfig::new(token.trim());
            match std::env::var("GSC_API_BASE") {
                Ok(base) => config.with_api_base(base),
                Err(_) => config,
            }
        });

    let config = ServerConfig {
        force_mock: env_flag("SUMRYZE_FORCE_MOCK"),
        fetch_timeout_ms: env_parse("SUMRYZE_FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms),
        lookback_days: env_parse("SUMRYZE_LOOKBACK_DAYS", defaults.lookback_days),
        series_csv: std::env::var("SUMRYZE_SERIES_CSV").ok().map(PathBuf::from),
        search_console,
        ..ServerConfig::new(host, port)
    };

    println!("Starting Sumryze Forecast API Server...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!(
        "   Search Console: {}",
        if config.search_console.is_some() { "configured" } else { "not configured" }
    );
    println!("   Force mock: {}", config.force_mock);
    if let Some(path) = &config.series_csv {
        println!("   Series CSV: {}", path.display());
    }
    println!();
    println!("Available endpoints:");
    println!("  GET  /health                 - Health check");
    println!("  GET  /forecast?url=<site>    - 30-day clicks forecast");
    println!("  POST /forecast/batch         - Forecast caller-supplied series");
    println!();

    run_server(config).await?;

    Ok(())
}
