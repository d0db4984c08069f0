//! Component instances as seen by the hooks

use super::naming::{format_component_name, ComponentName};
use super::root::RootSpanCoordinator;
use super::spans::SpanLifecycleManager;
use std::fmt;
use std::sync::{Arc, Weak};

/// How an instance reaches the root record of its tree
#[derive(Debug)]
enum RootLink {
    /// The root owns the record
    Owner(Arc<RootSpanCoordinator>),

    /// Descendants only point at it
    Descendant(Weak<RootSpanCoordinator>),
}

/// One node of the host's component tree.
///
/// Created by the host when it creates the component and passed to every
/// hook callback. The display name and root flag are fixed for the
/// instance's lifetime.
pub struct ComponentInstance {
    display_name: String,
    is_root: bool,
    root: RootLink,
    spans: SpanLifecycleManager,
}

impl ComponentInstance {
    /// Create the root of a new tree, with its own root record
    pub fn root(name: impl Into<ComponentName>) -> Self {
        Self {
            display_name: format_component_name(&name.into(), true),
            is_root: true,
            root: RootLink::Owner(Arc::new(RootSpanCoordinator::new())),
            spans: SpanLifecycleManager::new(),
        }
    }

    /// Create a descendant sharing this instance's root record
    pub fn child(&self, name: impl Into<ComponentName>) -> Self {
        let root = match &self.root {
            RootLink::Owner(coordinator) => Arc::downgrade(coordinator),
            RootLink::Descendant(weak) => weak.clone(),
        };

        Self {
            display_name: format_component_name(&name.into(), false),
            is_root: false,
            root: RootLink::Descendant(root),
            spans: SpanLifecycleManager::new(),
        }
    }

    /// Whether this is the tree root
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Name used for filtering and span names
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The tree's root record, or `None` once the root is gone
    pub fn root_coordinator(&self) -> Option<Arc<RootSpanCoordinator>> {
        match &self.root {
            RootLink::Owner(coordinator) => Some(Arc::clone(coordinator)),
            RootLink::Descendant(weak) => weak.upgrade(),
        }
    }

    /// In-flight operation spans of this instance
    pub fn spans(&self) -> &SpanLifecycleManager {
        &self.spans
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("display_name", &self.display_name)
            .field("is_root", &self.is_root)
            .field("open_spans", &self.spans.open_count())
            .finish()
    }
}
