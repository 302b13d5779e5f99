//! Active pool tracking.

/// A detected switch of the serving pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolChange {
    pub previous: String,
    pub current: String,
}

/// Remembers the last pool seen and reports when it changes.
#[derive(Debug, Clone)]
pub struct PoolMonitor {
    current: String,
}

impl PoolMonitor {
    /// Start tracking from the configured active pool.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
        }
    }

    /// Compare a record's pool against the tracked one.
    ///
    /// An absent pool never changes state. Comparison is exact, so `Blue`
    /// and `blue` are different pools.
    pub fn observe(&mut self, pool: Option<&str>) -> Option<PoolChange> {
        let pool = pool?;
        if pool == self.current {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, pool.to_string());
        Some(PoolChange {
            previous,
            current: self.current.clone(),
        })
    }

    /// Pool seen most recently.
    pub fn current(&self) -> &str {
        &self.current
    }
}
