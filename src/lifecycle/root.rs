//! Root span coordination
//!
//! The root instance of a component tree owns one [`RootSpanCoordinator`].
//! It holds at most one root span at a time and closes it once the whole
//! tree has been quiet for the configured timeout. Every completed
//! operation in the tree re-arms a single close timer, so a burst of
//! activity produces one root span covering the burst.

use super::stats::HookStats;
use crate::trace::{SpanBuilder, SpanContext, Tracer, TracingError, TracingResult};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Pending close of the root span
#[derive(Debug)]
struct CloseTimer {
    /// Matches [`RootState::generation`] while this timer is the armed one
    generation: u64,

    /// When the quiet period runs out
    deadline: Instant,

    /// End time the root span gets when this timer closes it
    timestamp: DateTime<Utc>,

    /// Sleeping task that closes the root span
    task: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct RootState {
    /// Open root span; `None` while idle
    span: Option<SpanContext>,

    /// Armed close timer, at most one
    timer: Option<CloseTimer>,

    /// Bumped every time a timer is armed
    generation: u64,
}

impl RootState {
    /// Take the span and timer if the timer's deadline has passed, even
    /// when its task has not run yet.
    fn take_expired(&mut self) -> Option<(SpanContext, DateTime<Utc>)> {
        if self.timer.as_ref()?.deadline > Instant::now() {
            return None;
        }

        let timer = self.timer.take()?;
        timer.task.abort();
        self.span.take().map(|span| (span, timer.timestamp))
    }
}

/// Tree-wide root span state, owned by the root component instance
#[derive(Debug, Default)]
pub struct RootSpanCoordinator {
    state: Arc<Mutex<RootState>>,
}

impl RootSpanCoordinator {
    /// Create an idle coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// The open root span, if any
    pub fn current_span(&self) -> Option<SpanContext> {
        self.state.lock().ok().and_then(|state| state.span)
    }

    /// Whether a root span is open
    pub fn is_active(&self) -> bool {
        self.current_span().is_some()
    }

    /// Whether a close timer is armed
    pub fn has_pending_close(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.timer.is_some())
            .unwrap_or(false)
    }

    /// End the root span if its close timer is overdue but has not fired.
    ///
    /// The span ends at the timestamp the timer was armed with. Returns the
    /// closed span.
    pub fn close_if_expired(
        &self,
        tracer: &dyn Tracer,
        stats: &HookStats,
    ) -> TracingResult<Option<SpanContext>> {
        let expired = self.lock()?.take_expired();
        let Some((span, timestamp)) = expired else {
            return Ok(None);
        };

        tracer.end_span(&span, Some(timestamp))?;
        stats.record_root_closed();
        debug!(span = %span, "root span closed after quiet period");

        Ok(Some(span))
    }

    /// Open the root span under `parent` unless one is already open.
    ///
    /// An overdue root span is closed first, so a burst that starts at or
    /// after the deadline gets a fresh root span. Returns the new span, or
    /// `None` when already active.
    pub fn ensure_started(
        &self,
        tracer: &dyn Tracer,
        stats: &HookStats,
        builder: SpanBuilder,
        parent: &SpanContext,
    ) -> TracingResult<Option<SpanContext>> {
        self.close_if_expired(tracer, stats)?;

        let mut state = self.lock()?;
        if state.span.is_some() {
            return Ok(None);
        }

        let span = tracer.start_span(builder, parent)?;
        state.span = Some(span);
        debug!(span = %span, "root span started");

        Ok(Some(span))
    }

    /// Cancel any pending close and schedule a new one `timeout` from now.
    ///
    /// When the timer fires the root span is ended at `timestamp`, the
    /// completion time that armed it. A timer already past its deadline
    /// closes the root span before the new one is armed.
    pub fn arm_close_timer(
        &self,
        tracer: Arc<dyn Tracer>,
        stats: Arc<HookStats>,
        runtime: &Handle,
        timeout: Duration,
        timestamp: DateTime<Utc>,
    ) -> TracingResult<()> {
        self.close_if_expired(tracer.as_ref(), &stats)?;

        let mut state = self.lock()?;

        if let Some(previous) = state.timer.take() {
            previous.task.abort();
        }

        state.generation += 1;
        let generation = state.generation;
        let deadline = Instant::now() + timeout;
        let shared = Arc::clone(&self.state);
        let task_stats = Arc::clone(&stats);

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            Self::fire(&shared, generation, tracer.as_ref(), &task_stats, timestamp);
        });

        state.timer = Some(CloseTimer {
            generation,
            deadline,
            timestamp,
            task,
        });
        stats.record_timer_armed();
        trace!(generation, ?timeout, "root close timer armed");

        Ok(())
    }

    /// Cancel any pending close and end the root span now.
    ///
    /// Returns the span that was closed, if the coordinator was active.
    pub fn close_now(
        &self,
        tracer: &dyn Tracer,
        stats: &HookStats,
        timestamp: Option<DateTime<Utc>>,
    ) -> TracingResult<Option<SpanContext>> {
        let span = {
            let mut state = self.lock()?;
            if let Some(timer) = state.timer.take() {
                timer.task.abort();
            }
            state.span.take()
        };

        if let Some(span) = &span {
            tracer.end_span(span, timestamp)?;
            stats.record_root_closed();
            debug!(span = %span, "root span closed");
        }

        Ok(span)
    }

    fn fire(
        state: &Mutex<RootState>,
        generation: u64,
        tracer: &dyn Tracer,
        stats: &HookStats,
        timestamp: DateTime<Utc>,
    ) {
        let span = {
            let Ok(mut state) = state.lock() else {
                warn!("root span state poisoned, close timer dropped");
                return;
            };

            if state.timer.as_ref().map(|t| t.generation) != Some(generation) {
                trace!(generation, "superseded close timer ignored");
                return;
            }

            state.timer = None;
            state.span.take()
        };

        let Some(span) = span else {
            return;
        };

        match tracer.end_span(&span, Some(timestamp)) {
            Ok(()) => {
                stats.record_root_closed();
                debug!(span = %span, "root span closed after quiet period");
            },
            Err(e) => warn!(span = %span, error = %e, "failed to end root span"),
        }
    }

    fn lock(&self) -> TracingResult<MutexGuard<'_, RootState>> {
        self.state
            .lock()
            .map_err(|_| TracingError::poisoned("root span"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Clock, InMemoryTracer, MonotonicClock};

    fn setup() -> (Arc<InMemoryTracer>, SpanContext, Arc<HookStats>, MonotonicClock) {
        let clock = MonotonicClock::new();
        let tracer = Arc::new(InMemoryTracer::with_clock(Arc::new(clock)));
        let trace = tracer.start_trace("pageload").unwrap();
        (tracer, trace, Arc::new(HookStats::new()), clock)
    }

    /// Runtime that is never driven: timers armed on it only close through
    /// the overdue check.
    fn idle_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    fn root_builder() -> SpanBuilder {
        SpanBuilder::new("Application Render").op("ui.vue.render")
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_started_once() {
        let (tracer, trace, stats, _) = setup();
        let root = RootSpanCoordinator::new();
        assert!(!root.is_active());

        let first = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap();
        assert!(first.is_some());

        let second = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap();
        assert!(second.is_none());
        assert_eq!(root.current_span(), first);
        assert_eq!(tracer.stats().spans_started, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_closes_with_armed_timestamp() {
        let (tracer, trace, stats, clock) = setup();
        let root = RootSpanCoordinator::new();
        let span = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap()
            .unwrap();

        let completed_at = clock.now();
        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            &Handle::current(),
            Duration::from_millis(100),
            completed_at,
        )
        .unwrap();
        assert!(root.has_pending_close());

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(root.is_active());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!root.is_active());
        assert!(!root.has_pending_close());

        let record = tracer.get(&span).unwrap();
        assert_eq!(record.end_time, Some(completed_at));
        assert_eq!(stats.snapshot().root_spans_closed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_debounces() {
        let (tracer, trace, stats, clock) = setup();
        let root = RootSpanCoordinator::new();
        root.ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap();

        for _ in 0..5 {
            root.arm_close_timer(
                tracer.clone(),
                stats.clone(),
                &Handle::current(),
                Duration::from_millis(100),
                clock.now(),
            )
            .unwrap();
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(root.is_active());
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!root.is_active());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.timers_armed, 5);
        assert_eq!(snapshot.root_spans_closed, 1);
        assert_eq!(tracer.stats().duplicate_ends, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_now_cancels_timer() {
        let (tracer, trace, stats, clock) = setup();
        let root = RootSpanCoordinator::new();
        root.ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap();

        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            &Handle::current(),
            Duration::from_millis(100),
            clock.now(),
        )
        .unwrap();

        let closed = root
            .close_now(tracer.as_ref(), &stats, Some(clock.now()))
            .unwrap();
        assert!(closed.is_some());
        assert!(!root.has_pending_close());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(stats.snapshot().root_spans_closed, 1);
        assert_eq!(tracer.stats().duplicate_ends, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_on_idle_root_is_noop() {
        let (tracer, _, stats, clock) = setup();
        let root = RootSpanCoordinator::new();

        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            &Handle::current(),
            Duration::from_millis(10),
            clock.now(),
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!root.has_pending_close());
        assert_eq!(stats.snapshot().root_spans_closed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overdue_timer_closes_before_restart() {
        let (tracer, trace, stats, clock) = setup();
        let idle = idle_runtime();
        let root = RootSpanCoordinator::new();
        let first = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap()
            .unwrap();

        let completed_at = clock.now();
        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            idle.handle(),
            Duration::from_millis(100),
            completed_at,
        )
        .unwrap();

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(root.has_pending_close());

        let second = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap()
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(root.current_span(), Some(second));
        assert!(!root.has_pending_close());

        let record = tracer.get(&first).unwrap();
        assert_eq!(record.end_time, Some(completed_at));
        assert_eq!(stats.snapshot().root_spans_closed, 1);
        assert_eq!(tracer.stats().duplicate_ends, 0);

        idle.shutdown_background();
    }

    #[tokio::test(start_paused = true)]
    async fn test_overdue_timer_closes_on_rearm() {
        let (tracer, trace, stats, clock) = setup();
        let idle = idle_runtime();
        let root = RootSpanCoordinator::new();
        let span = root
            .ensure_started(tracer.as_ref(), &stats, root_builder(), &trace)
            .unwrap()
            .unwrap();

        let completed_at = clock.now();
        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            idle.handle(),
            Duration::from_millis(100),
            completed_at,
        )
        .unwrap();

        tokio::time::advance(Duration::from_millis(150)).await;
        root.arm_close_timer(
            tracer.clone(),
            stats.clone(),
            idle.handle(),
            Duration::from_millis(100),
            clock.now(),
        )
        .unwrap();

        assert!(!root.is_active());
        assert!(root.has_pending_close());

        let record = tracer.get(&span).unwrap();
        assert_eq!(record.end_time, Some(completed_at));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.timers_armed, 2);
        assert_eq!(snapshot.root_spans_closed, 1);

        idle.shutdown_background();
    }
}
