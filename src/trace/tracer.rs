//! The tracer capability consumed by lifecycle instrumentation

use super::context::SpanContext;
use super::error::TracingResult;
use super::span::SpanBuilder;
use chrono::{DateTime, Utc};

/// Span creation and termination backend.
///
/// Implementations own span storage and transmission. Ending an already
/// ended span must be a no-op.
pub trait Tracer: Send + Sync {
    /// The span currently active in the surrounding trace, if any.
    fn active_span(&self) -> Option<SpanContext>;

    /// Start a span described by `builder` as a child of `parent`.
    fn start_span(&self, builder: SpanBuilder, parent: &SpanContext) -> TracingResult<SpanContext>;

    /// End `span` at `timestamp`, or at the tracer's notion of now when `None`.
    fn end_span(&self, span: &SpanContext, timestamp: Option<DateTime<Utc>>) -> TracingResult<()>;
}
