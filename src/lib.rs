pub mod daily_series;
pub mod csv_provider;
pub mod mock_series;
pub mod search_console;
pub mod forecast;
pub mod server;

#[cfg(test)]
mod integration_tests;

pub use daily_series::{
    densify, densify_reported, DailyPoint, DateRange, InMemorySeriesProvider, SeriesProvider,
    SeriesProviderError,
};
pub use csv_provider::CsvSeriesProvider;
pub use mock_series::MockSeriesProvider;
pub use search_console::{FetchError, SearchConsoleClient, SearchConsoleConfig};
pub use forecast::{
    apply_nudges, forecast30, ForecastResult, NudgeDetails, NudgeInputs, NudgeOutcome,
};
pub use server::{run_server, ServerConfig};
