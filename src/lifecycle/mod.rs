//! # Component Lifecycle Instrumentation
//!
//! Converts the lifecycle hooks of a component tree into timing spans.
//!
//! ## Features
//!
//! - Fixed operation to before/after hook mapping
//! - Component filtering by display name, root always included
//! - One open span per operation per instance, stale spans closed
//! - A shared root span per tree, closed after a quiet period
//!
//! ## Example
//!
//! ```no_run
//! use lifecycle_tracing::config::TrackingConfig;
//! use lifecycle_tracing::lifecycle::{ComponentInstance, Hook, HookInstaller};
//! use lifecycle_tracing::trace::InMemoryTracer;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tracer = Arc::new(InMemoryTracer::new());
//! let hooks = HookInstaller::new(tracer.clone()).build(&TrackingConfig::default())?;
//!
//! tracer.start_trace("pageload")?;
//! let app = ComponentInstance::root("App");
//! hooks.invoke(Hook::BeforeMount, &app)?;
//! hooks.invoke(Hook::Mounted, &app)?;
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod dispatch;
pub mod filter;
pub mod installer;
pub mod naming;
pub mod operation;
pub mod root;
pub mod spans;
pub mod stats;

pub use component::ComponentInstance;
pub use dispatch::{HookCallback, LifecycleDispatch};
pub use filter::ComponentFilter;
pub use installer::{HookInstaller, HookTable, ROOT_SPAN_NAME};
pub use naming::{format_component_name, ComponentName};
pub use operation::{resolve_operations, Hook, HookPhase, Operation, ResolvedOperations};
pub use root::RootSpanCoordinator;
pub use spans::SpanLifecycleManager;
pub use stats::{HookStats, StatsSnapshot};
