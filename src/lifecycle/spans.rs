//! Per-instance operation spans

use super::operation::Operation;
use crate::trace::{SpanBuilder, SpanContext, Tracer, TracingError, TracingResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Open operation spans of one component instance.
///
/// At most one span is open per operation: opening a second one ends the
/// first.
#[derive(Debug, Default)]
pub struct SpanLifecycleManager {
    open: Mutex<HashMap<Operation, SpanContext>>,
}

impl SpanLifecycleManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a span for `operation` under `parent`.
    ///
    /// A span still open for the same operation (its after-hook never
    /// came) is ended first and returned.
    pub fn open(
        &self,
        tracer: &dyn Tracer,
        operation: Operation,
        builder: SpanBuilder,
        parent: &SpanContext,
    ) -> TracingResult<Option<SpanContext>> {
        let stale = self.lock()?.remove(&operation);
        if let Some(stale) = &stale {
            tracer.end_span(stale, None)?;
        }

        let span = tracer.start_span(builder, parent)?;
        self.lock()?.insert(operation, span);

        Ok(stale)
    }

    /// Close the span open for `operation`, ending it at `timestamp`.
    ///
    /// Returns `None` when no span is open, which happens whenever the
    /// before-hook ran without a trace context.
    pub fn close(
        &self,
        tracer: &dyn Tracer,
        operation: Operation,
        timestamp: DateTime<Utc>,
    ) -> TracingResult<Option<SpanContext>> {
        let Some(span) = self.lock()?.remove(&operation) else {
            return Ok(None);
        };

        tracer.end_span(&span, Some(timestamp))?;
        Ok(Some(span))
    }

    /// Span currently open for `operation`
    pub fn open_span(&self, operation: Operation) -> Option<SpanContext> {
        self.open
            .lock()
            .ok()
            .and_then(|open| open.get(&operation).copied())
    }

    /// Number of open spans
    pub fn open_count(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }

    fn lock(&self) -> TracingResult<std::sync::MutexGuard<'_, HashMap<Operation, SpanContext>>> {
        self.open
            .lock()
            .map_err(|_| TracingError::poisoned("operation spans"))
    }
}
