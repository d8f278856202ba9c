use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One day of search analytics for a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Calendar day the metrics belong to
    pub date: NaiveDate,
    /// Organic clicks on that day
    pub clicks: f64,
    /// Click-through rate (0..1)
    pub ctr: f64,
}

impl DailyPoint {
    /// Creates a new DailyPoint.
    pub fn new(date: NaiveDate, clicks: f64, ctr: f64) -> Self {
        DailyPoint { date, clicks, ctr }
    }

    /// A day with no recorded activity.
    pub fn empty(date: NaiveDate) -> Self {
        DailyPoint::new(date, 0.0, 0.0)
    }
}

/// Date range for querying daily series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The `days` days ending on (and including) `end`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        DateRange::new(end - Duration::days(span), end)
    }

    /// Number of calendar days covered, zero for an inverted range.
    pub fn num_days(&self) -> usize {
        if self.start > self.end {
            return 0;
        }
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every date in the range, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.num_days()).map(move |offset| self.start + Duration::days(offset as i64))
    }
}

/// Trait for daily series source abstraction.
///
/// The forecasting code only sees plain `f64` slices; providers are how the
/// service turns a site into one. Implementations include:
/// - In-memory maps (for testing and CSV-backed data)
/// - The deterministic mock generator
pub trait SeriesProvider {
    /// Short label reported to clients as the data source.
    fn name(&self) -> &'static str;

    /// Retrieves daily points for `site` within `date_range`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the site is unknown to this provider, the date range
    /// is invalid, or the underlying source cannot be read.
    fn daily_series(
        &self,
        site: &str,
        date_range: &DateRange,
    ) -> Result<Vec<DailyPoint>, SeriesProviderError>;
}

/// Errors that can occur when querying a series provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesProviderError {
    /// Site not known to this provider
    SiteNotFound(String),
    /// Invalid date range (e.g., start > end)
    InvalidDateRange,
    /// Malformed source data
    Malformed(String),
    /// Generic error message
    Other(String),
}

impl std::fmt::Display for SeriesProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesProviderError::SiteNotFound(site) => write!(f, "Site not found: {}", site),
            SeriesProviderError::InvalidDateRange => write!(f, "Invalid date range"),
            SeriesProviderError::Malformed(msg) => write!(f, "Malformed series data: {}", msg),
            SeriesProviderError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SeriesProviderError {}

/// Fills a series so that it holds exactly one point per day of `range`.
///
/// Days with no data become zero-activity points and points outside the range
/// are dropped. When a day appears more than once the last occurrence wins.
/// The forecaster infers weekdays from positions, so gaps must not survive.
pub fn densify(points: &[DailyPoint], range: &DateRange) -> Vec<DailyPoint> {
    let by_date: BTreeMap<NaiveDate, &DailyPoint> = points
        .iter()
        .filter(|point| range.contains(point.date))
        .map(|point| (point.date, point))
        .collect();

    range
        .dates()
        .map(|date| match by_date.get(&date) {
            Some(point) => (*point).clone(),
            None => DailyPoint::empty(date),
        })
        .collect()
}

/// Densifies up to the last day the source actually reported.
///
/// Sources such as Search Console lag a few days behind `range.end`; filling
/// that tail with zeros would read as a traffic collapse. Returns an empty
/// series when no point falls inside `range`.
pub fn densify_reported(points: &[DailyPoint], range: &DateRange) -> Vec<DailyPoint> {
    let last_reported = points
        .iter()
        .map(|point| point.date)
        .filter(|date| range.contains(*date))
        .max();

    match last_reported {
        Some(end) => densify(points, &DateRange::new(range.start, end)),
        None => Vec::new(),
    }
}

/// Splits points into the clicks and CTR series consumed by the forecaster.
pub fn split_metrics(points: &[DailyPoint]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|point| (point.clicks, point.ctr)).unzip()
}

/// In-memory series provider.
///
/// Stores daily points in a HashMap keyed by site. Backs the CSV provider and
/// lets tests run without network access.
#[derive(Debug, Clone)]
pub struct InMemorySeriesProvider {
    data: HashMap<String, Vec<DailyPoint>>,
}

impl InMemorySeriesProvider {
    /// Creates a new empty in-memory provider.
    pub fn new() -> Self {
        InMemorySeriesProvider {
            data: HashMap::new(),
        }
    }

    /// Adds daily points for a site, keeping them sorted by date.
    pub fn add_series(&mut self, site: impl Into<String>, mut points: Vec<DailyPoint>) {
        points.sort_by_key(|point| point.date);
        self.data.insert(site.into(), points);
    }
}

impl Default for InMemorySeriesProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesProvider for InMemorySeriesProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn daily_series(
        &self,
        site: &str,
        date_range: &DateRange,
    ) -> Result<Vec<DailyPoint>, SeriesProviderError> {
        if date_range.start > date_range.end {
            return Err(SeriesProviderError::InvalidDateRange);
        }

        let all_points = self
            .data
            .get(site)
            .ok_or_else(|| SeriesProviderError::SiteNotFound(site.to_string()))?;

        Ok(all_points
            .iter()
            .filter(|point| date_range.contains(point.date))
            .cloned()
            .collect())
    }
}
