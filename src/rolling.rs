//! # Rolling Window
//! Trailing mean over the last `N` date-ordered rows.
//!
//! Until `N` rows have been seen the mean covers the available prefix, so
//! there is no null lead-in: row `i` averages `[max(0, i-N+1) ..= i]`.

use std::collections::VecDeque;

/// Fixed-size trailing window over `f64` samples.
#[derive(Debug, Clone)]
pub struct RollingMean {
    buf: VecDeque<f64>,
    window: usize,
}

impl RollingMean {
    /// Create a window holding at most `window` samples (minimum 1).
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            buf: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Record a sample and return the mean of the current window.
    pub fn push(&mut self, value: f64) -> f64 {
        self.buf.push_back(value);
        while self.buf.len() > self.window {
            self.buf.pop_front();
        }
        // Summing the (small) window each time avoids running-sum drift.
        self.buf.iter().sum::<f64>() / self.buf.len() as f64
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// Trailing means for a whole series (already in date order).
pub fn trailing_means(values: &[f64], window: usize) -> Vec<f64> {
    let mut w = RollingMean::with_window(window);
    values.iter().map(|&v| w.push(v)).collect()
}
