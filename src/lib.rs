//! # Lifecycle Tracing
//!
//! Instrumentation that turns the lifecycle hooks of a hierarchical UI
//! component tree into timing spans for a distributed-tracing backend.
//!
//! ## Features
//!
//! - Per-component spans for create, mount, update, activate, unmount and
//!   destroy operations
//! - One shared root span per tree, closed after a configurable quiet
//!   period
//! - Defensive handling of missing or repeated hooks
//! - TOML configuration with validation
//!
//! ## Architecture
//!
//! The backend is reached through the [`trace::Tracer`] trait. The
//! [`lifecycle::HookInstaller`] builds a table of hook callbacks from a
//! [`config::TrackingConfig`]; the host calls them with the
//! [`lifecycle::ComponentInstance`] the hook fired on.

pub mod config;
pub mod lifecycle;
pub mod trace;
