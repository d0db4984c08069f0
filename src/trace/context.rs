//! Span context: the handle callers hold for a span owned by a tracer

use super::span::{SpanId, SpanRecord, TraceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Span context containing trace identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanContext {
    /// Trace ID
    pub trace_id: TraceId,

    /// Span ID
    pub span_id: SpanId,
}

impl SpanContext {
    /// Create a new span context
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self { trace_id, span_id }
    }
}

impl From<&SpanRecord> for SpanContext {
    fn from(span: &SpanRecord) -> Self {
        Self::new(span.trace_id, span.span_id)
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.trace_id, self.span_id)
    }
}
