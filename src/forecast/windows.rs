//! Windowing strategies that supply slices to the forecasting primitives.
//!
//! `TailWindow` implements `WindowStrategy` so callers can reason about how
//! much history a stage needs before it produces anything better than its
//! neutral fallback.

/// Common behavior shared by every windowing strategy.
pub trait WindowStrategy {
    /// The number of data points required before meaningful output can be produced.
    fn burn_in(&self) -> usize;
}

/// Trailing window applied at every index (e.g., moving averages).
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    size: usize,
}

impl FixedWindow {
    /// Creates a fixed window that always includes the `size` most recent values
    /// (or fewer when the prefix is shorter than `size`).
    pub fn new(size: usize) -> Self {
        FixedWindow { size: size.max(1) }
    }

    /// Applies the given primitive to every prefix window ending at each index.
    pub fn apply<F>(&self, data: &[f64], mut primitive: F) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64,
    {
        if data.is_empty() {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(data.len());
        for index in 0..data.len() {
            let start = (index + 1).saturating_sub(self.size);
            result.push(primitive(&data[start..=index]));
        }

        result
    }
}

/// The most recent `length` points of a series, with a minimum sample size
/// below which the window is considered too short to estimate from.
#[derive(Debug, Clone, Copy)]
pub struct TailWindow {
    length: usize,
    min_points: usize,
}

impl TailWindow {
    pub fn new(length: usize, min_points: usize) -> Self {
        TailWindow { length, min_points }
    }

    /// Index in `data` where the tail starts.
    pub fn start_index(&self, data: &[f64]) -> usize {
        data.len().saturating_sub(self.length)
    }

    /// Returns the trailing slice (possibly shorter than `length`).
    pub fn slice<'a>(&self, data: &'a [f64]) -> &'a [f64] {
        &data[self.start_index(data)..]
    }

    /// True when `window` holds enough points to estimate from.
    pub fn is_warm(&self, window: &[f64]) -> bool {
        window.len() >= self.min_points
    }
}

impl WindowStrategy for TailWindow {
    fn burn_in(&self) -> usize {
        self.min_points
    }
}
