//! In-memory tracer
//!
//! Keeps open spans in a registry and ended spans in a list. Useful for
//! tests and for hosts that ship finished spans themselves.

use super::clock::{Clock, SystemClock};
use super::context::SpanContext;
use super::error::{TracingError, TracingResult};
use super::span::{SpanBuilder, SpanId, SpanRecord, TraceId};
use super::tracer::Tracer;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Active span registry for tracking in-flight spans
#[derive(Default)]
struct SpanRegistry {
    /// Open spans by span ID
    spans: HashMap<SpanId, SpanRecord>,

    /// IDs of every span ended so far; survives [`InMemoryTracer::clear`]
    ended: HashSet<SpanId>,
}

impl SpanRegistry {
    fn insert(&mut self, span: SpanRecord) {
        self.spans.insert(span.span_id, span);
    }

    fn remove(&mut self, span_id: &SpanId) -> Option<SpanRecord> {
        let span = self.spans.remove(span_id)?;
        self.ended.insert(*span_id);
        Some(span)
    }

    fn has_ended(&self, span_id: &SpanId) -> bool {
        self.ended.contains(span_id)
    }

    fn count(&self) -> usize {
        self.spans.len()
    }
}

/// Tracer that records every span in memory
pub struct InMemoryTracer {
    /// Clock for start times and default end times
    clock: Arc<dyn Clock>,

    /// Open spans
    registry: Mutex<SpanRegistry>,

    /// Ended spans, in end order
    finished: Mutex<Vec<SpanRecord>>,

    /// Span standing in for the surrounding trace
    active: Mutex<Option<SpanContext>>,

    /// Statistics
    spans_started: AtomicU64,
    spans_ended: AtomicU64,
    duplicate_ends: AtomicU64,
}

impl InMemoryTracer {
    /// Create a tracer on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a tracer with a custom clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            registry: Mutex::new(SpanRegistry::default()),
            finished: Mutex::new(Vec::new()),
            active: Mutex::new(None),
            spans_started: AtomicU64::new(0),
            spans_ended: AtomicU64::new(0),
            duplicate_ends: AtomicU64::new(0),
        }
    }

    /// Start a new trace and make its top-level span the active span
    pub fn start_trace(&self, name: impl Into<String>) -> TracingResult<SpanContext> {
        let span = SpanRecord::new(name, TraceId::generate(), self.clock.now());
        let context = SpanContext::from(&span);

        self.registry
            .lock()
            .map_err(|_| TracingError::poisoned("registry"))?
            .insert(span);
        self.spans_started.fetch_add(1, Ordering::Relaxed);

        self.set_active(Some(context))?;
        Ok(context)
    }

    /// End the active trace span and clear the active span
    pub fn finish_trace(&self) -> TracingResult<()> {
        let active = self
            .active
            .lock()
            .map_err(|_| TracingError::poisoned("active span"))?
            .take();

        match active {
            Some(context) => self.end_span(&context, None),
            None => Ok(()),
        }
    }

    /// Replace the active span
    pub fn set_active(&self, context: Option<SpanContext>) -> TracingResult<()> {
        *self
            .active
            .lock()
            .map_err(|_| TracingError::poisoned("active span"))? = context;
        Ok(())
    }

    /// All ended spans
    pub fn finished_spans(&self) -> Vec<SpanRecord> {
        self.finished.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Ended spans with the given name
    pub fn find_by_name(&self, name: &str) -> Vec<SpanRecord> {
        self.finished
            .lock()
            .map(|spans| spans.iter().filter(|s| s.name == name).cloned().collect())
            .unwrap_or_default()
    }

    /// Ended spans with the given operation tag
    pub fn find_by_op(&self, op: &str) -> Vec<SpanRecord> {
        self.finished
            .lock()
            .map(|spans| {
                spans
                    .iter()
                    .filter(|s| s.op.as_deref() == Some(op))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a span, open or ended
    pub fn get(&self, context: &SpanContext) -> Option<SpanRecord> {
        if let Some(span) = self
            .registry
            .lock()
            .ok()
            .and_then(|r| r.spans.get(&context.span_id).cloned())
        {
            return Some(span);
        }

        self.finished.lock().ok().and_then(|spans| {
            spans
                .iter()
                .find(|s| s.span_id == context.span_id)
                .cloned()
        })
    }

    /// Check whether a span is still open
    pub fn is_open(&self, context: &SpanContext) -> bool {
        self.registry
            .lock()
            .map(|r| r.spans.contains_key(&context.span_id))
            .unwrap_or(false)
    }

    /// Ended spans as a JSON array, for hosts shipping them elsewhere
    pub fn export_json(&self, pretty: bool) -> TracingResult<String> {
        let spans = self.finished_spans();
        let json = if pretty {
            serde_json::to_string_pretty(&spans)?
        } else {
            serde_json::to_string(&spans)?
        };
        Ok(json)
    }

    /// Clear ended spans. Ending one of them again still counts as a
    /// duplicate end.
    pub fn clear(&self) {
        if let Ok(mut spans) = self.finished.lock() {
            spans.clear();
        }
    }

    /// Get statistics
    pub fn stats(&self) -> TracerStats {
        TracerStats {
            spans_started: self.spans_started.load(Ordering::Relaxed),
            spans_ended: self.spans_ended.load(Ordering::Relaxed),
            duplicate_ends: self.duplicate_ends.load(Ordering::Relaxed),
            spans_open: self.registry.lock().map(|r| r.count()).unwrap_or(0) as u64,
        }
    }
}

impl Default for InMemoryTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for InMemoryTracer {
    fn active_span(&self) -> Option<SpanContext> {
        self.active.lock().ok().and_then(|active| *active)
    }

    fn start_span(&self, builder: SpanBuilder, parent: &SpanContext) -> TracingResult<SpanContext> {
        let mut span = SpanRecord::new(builder.name, parent.trace_id, self.clock.now());
        span.op = builder.op;
        span.parent_span_id = Some(parent.span_id);
        span.attributes = builder.attributes;

        let context = SpanContext::from(&span);
        trace!(span = %context, name = %span.name, "span started");

        self.registry
            .lock()
            .map_err(|_| TracingError::poisoned("registry"))?
            .insert(span);
        self.spans_started.fetch_add(1, Ordering::Relaxed);

        Ok(context)
    }

    fn end_span(&self, span: &SpanContext, timestamp: Option<DateTime<Utc>>) -> TracingResult<()> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| TracingError::poisoned("registry"))?;

        let Some(mut record) = registry.remove(&span.span_id) else {
            if registry.has_ended(&span.span_id) {
                self.duplicate_ends.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            return Err(TracingError::SpanNotFound(span.span_id.to_hex()));
        };
        drop(registry);

        record.end(timestamp.unwrap_or_else(|| self.clock.now()));
        trace!(span = %span, name = %record.name, "span ended");

        self.finished
            .lock()
            .map_err(|_| TracingError::poisoned("finished spans"))?
            .push(record);
        self.spans_ended.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }
}

/// Tracer statistics
#[derive(Debug, Clone, Default)]
pub struct TracerStats {
    /// Total spans started
    pub spans_started: u64,
    /// Total spans ended
    pub spans_ended: u64,
    /// End calls on spans that had already ended
    pub duplicate_ends: u64,
    /// Currently open spans
    pub spans_open: u64,
}
