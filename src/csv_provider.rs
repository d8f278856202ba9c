use crate::daily_series::{
    DailyPoint, DateRange, InMemorySeriesProvider, SeriesProvider, SeriesProviderError,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One row of a series export: `site,date,clicks,ctr`.
#[derive(Debug, Deserialize)]
struct SeriesRecord {
    site: String,
    date: String,
    clicks: f64,
    #[serde(default)]
    ctr: Option<f64>,
}

/// File-backed series provider.
///
/// Loads a CSV export of per-site daily metrics once and serves it from memory.
/// Useful for demos and for sites whose Search Console data is exported offline.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    inner: InMemorySeriesProvider,
}

impl CsvSeriesProvider {
    /// Loads a provider from a CSV file with a `site,date,clicks,ctr` header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or any row is malformed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeriesProviderError> {
        let reader = csv::Reader::from_path(path.as_ref()).map_err(|e| {
            SeriesProviderError::Other(format!(
                "Failed to open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_csv_reader(reader)
    }

    /// Loads a provider from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeriesProviderError> {
        Self::from_csv_reader(csv::Reader::from_reader(reader))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, SeriesProviderError> {
        let mut by_site: HashMap<String, Vec<DailyPoint>> = HashMap::new();

        for (line, record) in reader.deserialize::<SeriesRecord>().enumerate() {
            let record = record.map_err(|e| SeriesProviderError::Malformed(e.to_string()))?;
            let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").map_err(|e| {
                SeriesProviderError::Malformed(format!(
                    "row {}: invalid date '{}': {}",
                    line + 1,
                    record.date,
                    e
                ))
            })?;

            by_site
                .entry(record.site.trim().to_string())
                .or_default()
                .push(DailyPoint::new(date, record.clicks, record.ctr.unwrap_or(0.0)));
        }

        let mut inner = InMemorySeriesProvider::new();
        for (site, points) in by_site {
            inner.add_series(site, points);
        }

        Ok(CsvSeriesProvider { inner })
    }
}

impl SeriesProvider for CsvSeriesProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn daily_series(
        &self,
        site: &str,
        date_range: &DateRange,
    ) -> Result<Vec<DailyPoint>, SeriesProviderError> {
        self.inner.daily_series(site, date_range)
    }
}
