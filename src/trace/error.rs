//! Tracing error types

use std::fmt;

/// Tracing error types
#[derive(Debug)]
pub enum TracingError {
    /// Span not found
    SpanNotFound(String),

    /// No async runtime available to host timers
    Runtime(String),

    /// Serialization error
    Serialization(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for TracingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpanNotFound(msg) => write!(f, "span not found: {}", msg),
            Self::Runtime(msg) => write!(f, "runtime unavailable: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for TracingError {}

impl From<serde_json::Error> for TracingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl TracingError {
    /// Error for a poisoned lock guarding `what`
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Internal(format!("{} lock poisoned", what))
    }
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;
