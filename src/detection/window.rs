//! Sliding window of request outcomes.

use std::collections::VecDeque;

/// Fixed-capacity FIFO of "was this a server error" flags.
///
/// The error count is maintained incrementally so `current_rate` is O(1).
#[derive(Debug, Clone)]
pub struct ErrorWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
    errors: usize,
}

impl ErrorWindow {
    /// Create an empty window. A zero capacity is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            errors: 0,
        }
    }

    /// Append an outcome, evicting the oldest one once full.
    pub fn record(&mut self, is_error: bool) {
        if self.outcomes.len() == self.capacity {
            if let Some(true) = self.outcomes.pop_front() {
                self.errors -= 1;
            }
        }
        self.outcomes.push_back(is_error);
        if is_error {
            self.errors += 1;
        }
    }

    /// Samples required before a rate is reported.
    pub fn min_samples(&self) -> usize {
        (self.capacity / 4).max(10)
    }

    /// Error percentage in [0, 100], or `None` while the window is too cold.
    pub fn current_rate(&self) -> Option<f64> {
        if self.outcomes.len() < self.min_samples() {
            return None;
        }
        Some(self.raw_rate())
    }

    /// Error percentage regardless of sample count; 0 when empty.
    pub fn raw_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            100.0 * self.errors as f64 / self.outcomes.len() as f64
        }
    }

    /// Number of outcomes held.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Maximum number of outcomes held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Server errors currently in the window.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Outcomes oldest first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.outcomes.iter().copied()
    }
}
