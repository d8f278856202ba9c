//! Deterministic stand-in data for sites without a live analytics source.
//!
//! The same site and date always produce the same numbers, so dashboards stay
//! stable across reloads while still looking like real traffic: a per-site
//! level, a weekly shape, a slow drift and bounded day-to-day noise.

use crate::daily_series::{DailyPoint, DateRange, SeriesProvider, SeriesProviderError};
use chrono::{Datelike, NaiveDate};

/// Relative traffic by weekday, Monday first.
const WEEKLY_SHAPE: [f64; 7] = [1.08, 1.12, 1.10, 1.05, 0.97, 0.82, 0.86];
const CLICK_NOISE: f64 = 0.08;
const CTR_NOISE: f64 = 0.05;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Fixed algorithm, so mock data survives toolchain upgrades.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Pseudo-random value in `[-1, 1]` for a seed and a day.
fn day_noise(seed: u64, date: NaiveDate, channel: u8) -> f64 {
    let mut key = [0_u8; 13];
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..12].copy_from_slice(&date.num_days_from_ce().to_le_bytes());
    key[12] = channel;
    let bucket = fnv1a(&key) % 10_001;
    bucket as f64 / 5_000.0 - 1.0
}

/// Shape parameters derived once per site.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SiteProfile {
    seed: u64,
    level: f64,
    daily_drift: f64,
    ctr_level: f64,
    ctr_drift: f64,
}

impl SiteProfile {
    fn for_site(site: &str) -> Self {
        let seed = fnv1a(site.trim().to_ascii_lowercase().as_bytes());
        SiteProfile {
            seed,
            level: 150.0 + (seed % 850) as f64,
            // -0.2% .. +0.4% per day
            daily_drift: ((seed >> 12) % 61) as f64 / 10_000.0 - 0.002,
            ctr_level: 0.015 + ((seed >> 24) % 40) as f64 / 1_000.0,
            ctr_drift: ((seed >> 32) % 21) as f64 / 100_000.0 - 0.0001,
        }
    }

    fn point(&self, date: NaiveDate, offset: usize) -> DailyPoint {
        let weekday = WEEKLY_SHAPE[date.weekday().num_days_from_monday() as usize];
        let trend = (1.0 + self.daily_drift * offset as f64).max(0.1);
        let noise = 1.0 + CLICK_NOISE * day_noise(self.seed, date, 0);
        let clicks = (self.level * trend * weekday * noise).max(0.0).round();

        let ctr_noise = 1.0 + CTR_NOISE * day_noise(self.seed, date, 1);
        let ctr = ((self.ctr_level + self.ctr_drift * offset as f64) * ctr_noise).clamp(0.0, 1.0);

        DailyPoint::new(date, clicks, ctr)
    }
}

/// Generates plausible daily series for any site.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSeriesProvider;

impl MockSeriesProvider {
    pub fn new() -> Self {
        MockSeriesProvider
    }

    /// Mock series for `site` covering every day of `date_range`.
    pub fn generate(&self, site: &str, date_range: &DateRange) -> Vec<DailyPoint> {
        let profile = SiteProfile::for_site(site);
        date_range
            .dates()
            .enumerate()
            .map(|(offset, date)| profile.point(date, offset))
            .collect()
    }
}

impl SeriesProvider for MockSeriesProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn daily_series(
        &self,
        site: &str,
        date_range: &DateRange,
    ) -> Result<Vec<DailyPoint>, SeriesProviderError> {
        if date_range.start > date_range.end {
            return Err(SeriesProviderError::InvalidDateRange);
        }
        Ok(self.generate(site, date_range))
    }
}
