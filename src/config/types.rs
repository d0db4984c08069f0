//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Operations to trace in addition to the built-in defaults
    /// (`activate`, `mount`, `update`).
    pub tracked_operations: Vec<String>,

    /// Which non-root components produce spans.
    pub track_components: TrackComponents,

    /// Quiet period after the last completed operation before the root
    /// span is closed.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Prefix of component span names (`"<prefix> <component>"`).
    pub span_name_prefix: String,

    /// Prefix of span operation tags (`"<prefix>.<operation>"`).
    pub op_prefix: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tracked_operations: Vec::new(),
            track_components: TrackComponents::default(),
            timeout: Duration::from_millis(2000),
            span_name_prefix: "Vue".to_string(),
            op_prefix: "ui.vue".to_string(),
        }
    }
}

impl TrackingConfig {
    /// Create a configuration with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to track.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.tracked_operations.push(operation.into());
        self
    }

    /// Set the component filter.
    #[must_use]
    pub fn with_track_components(mut self, track: TrackComponents) -> Self {
        self.track_components = track;
        self
    }

    /// Set the root quiet period.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Component filter setting: a flag for every component, or an allow-list
/// of display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackComponents {
    /// Track every component, or none.
    All(bool),

    /// Track only components whose display name is listed.
    Names(Vec<String>),
}

impl Default for TrackComponents {
    fn default() -> Self {
        Self::All(false)
    }
}

impl TrackComponents {
    /// Allow-list from names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }
}
