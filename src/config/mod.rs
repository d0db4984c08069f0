//! # Configuration System
//!
//! TOML-based configuration for lifecycle tracking, with validation.
//!
//! ## Example Configuration
//!
//! ```toml
//! tracked_operations = ["create", "destroy"]
//! track_components = ["AppHeader", "UserList"]
//! timeout = "2s"
//! span_name_prefix = "Vue"
//! op_prefix = "ui.vue"
//! ```
//!
//! `track_components` also accepts a plain boolean applying to every
//! component. Unknown operations are reported as warnings, never errors.

mod error;
mod loader;
mod types;
mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use types::{TrackComponents, TrackingConfig};
pub use validation::{
    OperationValidator, ValidationError, ValidationResult, ValidationSeverity, Validator,
};
