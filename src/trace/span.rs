//! Span types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 128-bit trace identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId {
    high: u64,
    low: u64,
}

impl TraceId {
    /// Create a new trace ID from high and low parts
    pub fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Generate a unique trace ID
    pub fn generate() -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        counter.hash(&mut hasher);
        timestamp.hash(&mut hasher);
        std::process::id().hash(&mut hasher);

        Self {
            high: timestamp,
            low: hasher.finish(),
        }
    }

    /// Convert to hex string (32 characters)
    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.high, self.low)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.to_hex())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 64-bit span identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(u64);

impl SpanId {
    /// Create a new span ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Generate a unique span ID
    ///
    /// The low 16 bits carry a process-wide counter so IDs minted within the
    /// same microsecond stay distinct.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;

        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self((timestamp << 16) | (counter & 0xFFFF))
    }

    /// Convert to hex string (16 characters)
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({})", self.to_hex())
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A recorded span, as kept by a tracer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Span name
    pub name: String,

    /// Operation tag
    pub op: Option<String>,

    /// Trace ID
    pub trace_id: TraceId,

    /// Span ID
    pub span_id: SpanId,

    /// Parent span ID (if any)
    pub parent_span_id: Option<SpanId>,

    /// Start time
    pub start_time: DateTime<Utc>,

    /// End time (None if still open)
    pub end_time: Option<DateTime<Utc>>,

    /// Span attributes
    pub attributes: HashMap<String, String>,
}

impl SpanRecord {
    /// Create a new open span starting at `start_time`
    pub fn new(name: impl Into<String>, trace_id: TraceId, start_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            op: None,
            trace_id,
            span_id: SpanId::generate(),
            parent_span_id: None,
            start_time,
            end_time: None,
            attributes: HashMap::new(),
        }
    }

    /// End the span. Ending an already ended span keeps the first end time.
    pub fn end(&mut self, timestamp: DateTime<Utc>) {
        if self.end_time.is_none() {
            self.end_time = Some(timestamp);
        }
    }

    /// Get the duration of the span
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> Option<i64> {
        self.duration().map(|d| d.num_milliseconds())
    }
}

/// Description of a span to start, handed to a [`Tracer`](super::Tracer)
#[derive(Debug, Clone)]
pub struct SpanBuilder {
    /// Span name
    pub name: String,

    /// Operation tag
    pub op: Option<String>,

    /// Initial attributes
    pub attributes: HashMap<String, String>,
}

impl SpanBuilder {
    /// Create a new span builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: None,
            attributes: HashMap::new(),
        }
    }

    /// Set the operation tag
    pub fn op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
