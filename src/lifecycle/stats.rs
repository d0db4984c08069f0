//! Hook statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every callback of one hook table
#[derive(Debug, Default)]
pub struct HookStats {
    spans_opened: AtomicU64,
    spans_closed: AtomicU64,
    stale_spans_closed: AtomicU64,
    before_skipped: AtomicU64,
    after_skipped: AtomicU64,
    root_spans_started: AtomicU64,
    root_spans_closed: AtomicU64,
    timers_armed: AtomicU64,
}

impl HookStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_span_opened(&self) {
        self.spans_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_span_closed(&self) {
        self.spans_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_span_closed(&self) {
        self.stale_spans_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_before_skipped(&self) {
        self.before_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_after_skipped(&self) {
        self.after_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_root_started(&self) {
        self.root_spans_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_root_closed(&self) {
        self.root_spans_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timer_armed(&self) {
        self.timers_armed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            spans_opened: self.spans_opened.load(Ordering::Relaxed),
            spans_closed: self.spans_closed.load(Ordering::Relaxed),
            stale_spans_closed: self.stale_spans_closed.load(Ordering::Relaxed),
            before_skipped: self.before_skipped.load(Ordering::Relaxed),
            after_skipped: self.after_skipped.load(Ordering::Relaxed),
            root_spans_started: self.root_spans_started.load(Ordering::Relaxed),
            root_spans_closed: self.root_spans_closed.load(Ordering::Relaxed),
            timers_armed: self.timers_armed.load(Ordering::Relaxed),
        }
    }
}

/// Hook statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Operation spans opened
    pub spans_opened: u64,
    /// Operation spans closed by their after-hook
    pub spans_closed: u64,
    /// Operation spans closed because a second before-hook arrived
    pub stale_spans_closed: u64,
    /// Before-hooks ignored for lack of a trace context
    pub before_skipped: u64,
    /// After-hooks ignored for lack of an open span
    pub after_skipped: u64,
    /// Root spans started
    pub root_spans_started: u64,
    /// Root spans closed
    pub root_spans_closed: u64,
    /// Quiet-period timers armed
    pub timers_armed: u64,
}
