//! Clocks used to timestamp span ends

use chrono::{DateTime, Utc};

/// Source of span timestamps
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall-clock anchor advanced by tokio's monotonic clock.
///
/// Never goes backwards, and follows paused/advanced time under
/// `tokio::time::pause`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current wall time
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Create a clock reporting `anchor` right now
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.started.elapsed();
        chrono::Duration::from_std(elapsed)
            .map(|d| self.anchor + d)
            .unwrap_or(self.anchor)
    }
}
