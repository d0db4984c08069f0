//! # Span Model and Tracer Capability
//!
//! The span types, the [`Tracer`] and [`Clock`] seams lifecycle
//! instrumentation is written against, and an in-memory tracer.
//!
//! ## Features
//!
//! - Trace/span identifiers and recorded span data
//! - [`SpanContext`] handles passed between instrumentation and tracer
//! - Wall and monotonic clocks
//! - [`InMemoryTracer`] with idempotent span ends

pub mod clock;
pub mod context;
pub mod error;
pub mod memory;
pub mod span;
pub mod tracer;

pub use clock::*;
pub use context::*;
pub use error::*;
pub use memory::*;
pub use span::*;
pub use tracer::*;
