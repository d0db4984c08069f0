//! Lifecycle operations and the hooks that bracket them

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical lifecycle transition of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Kept-alive component (re)activated
    Activate,

    /// Component instance created
    Create,

    /// Component unmounted
    Unmount,

    /// Component destroyed
    Destroy,

    /// Component mounted
    Mount,

    /// Component re-rendered
    Update,
}

impl Operation {
    /// Every operation, in table order
    pub const ALL: [Operation; 6] = [
        Self::Activate,
        Self::Create,
        Self::Unmount,
        Self::Destroy,
        Self::Mount,
        Self::Update,
    ];

    /// Operations tracked whatever the configuration says
    pub const DEFAULTS: [Operation; 3] = [Self::Activate, Self::Mount, Self::Update];

    /// Parse from a configuration name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "activate" => Some(Self::Activate),
            "create" => Some(Self::Create),
            "unmount" => Some(Self::Unmount),
            "destroy" => Some(Self::Destroy),
            "mount" => Some(Self::Mount),
            "update" => Some(Self::Update),
            _ => None,
        }
    }

    /// Configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Create => "create",
            Self::Unmount => "unmount",
            Self::Destroy => "destroy",
            Self::Mount => "mount",
            Self::Update => "update",
        }
    }

    /// The `(before, after)` hook pair bracketing this operation
    pub fn hooks(&self) -> (Hook, Hook) {
        match self {
            Self::Activate => (Hook::Activated, Hook::Deactivated),
            Self::Create => (Hook::BeforeCreate, Hook::Created),
            Self::Unmount => (Hook::BeforeUnmount, Hook::Unmounted),
            Self::Destroy => (Hook::BeforeDestroy, Hook::Destroyed),
            Self::Mount => (Hook::BeforeMount, Hook::Mounted),
            Self::Update => (Hook::BeforeUpdate, Hook::Updated),
        }
    }

    /// Hook fired for the given phase of this operation
    pub fn hook(&self, phase: HookPhase) -> Hook {
        let (before, after) = self.hooks();
        match phase {
            HookPhase::Before => before,
            HookPhase::After => after,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of an operation a hook fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Operation about to start
    Before,

    /// Operation completed
    After,
}

/// Lifecycle hook identifier, as named by the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hook {
    /// Kept-alive instance activated; opens `activate`
    Activated,
    /// Kept-alive instance deactivated; closes `activate`
    Deactivated,
    /// Before instance setup; opens `create`
    BeforeCreate,
    /// Instance set up; closes `create`
    Created,
    /// Before removal from the tree; opens `unmount`
    BeforeUnmount,
    /// Removed from the tree; closes `unmount`
    Unmounted,
    /// Legacy name of [`Hook::BeforeUnmount`]; opens `destroy`
    BeforeDestroy,
    /// Legacy name of [`Hook::Unmounted`]; closes `destroy`
    Destroyed,
    /// Before first render into the tree; opens `mount`
    BeforeMount,
    /// Inserted into the tree; closes `mount`
    Mounted,
    /// Before a re-render; opens `update`
    BeforeUpdate,
    /// Re-render applied; closes `update`
    Updated,
}

impl Hook {
    /// Host framework name of the hook
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::BeforeCreate => "beforeCreate",
            Self::Created => "created",
            Self::BeforeUnmount => "beforeUnmount",
            Self::Unmounted => "unmounted",
            Self::BeforeDestroy => "beforeDestroy",
            Self::Destroyed => "destroyed",
            Self::BeforeMount => "beforeMount",
            Self::Mounted => "mounted",
            Self::BeforeUpdate => "beforeUpdate",
            Self::Updated => "updated",
        }
    }

    /// Parse from the host framework name
    pub fn parse(s: &str) -> Option<Self> {
        Operation::ALL
            .iter()
            .flat_map(|op| {
                let (before, after) = op.hooks();
                [before, after]
            })
            .find(|hook| hook.as_str() == s)
    }

    /// The operation this hook belongs to, and on which side
    pub fn operation(&self) -> (Operation, HookPhase) {
        match self {
            Self::Activated => (Operation::Activate, HookPhase::Before),
            Self::Deactivated => (Operation::Activate, HookPhase::After),
            Self::BeforeCreate => (Operation::Create, HookPhase::Before),
            Self::Created => (Operation::Create, HookPhase::After),
            Self::BeforeUnmount => (Operation::Unmount, HookPhase::Before),
            Self::Unmounted => (Operation::Unmount, HookPhase::After),
            Self::BeforeDestroy => (Operation::Destroy, HookPhase::Before),
            Self::Destroyed => (Operation::Destroy, HookPhase::After),
            Self::BeforeMount => (Operation::Mount, HookPhase::Before),
            Self::Mounted => (Operation::Mount, HookPhase::After),
            Self::BeforeUpdate => (Operation::Update, HookPhase::Before),
            Self::Updated => (Operation::Update, HookPhase::After),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations resolved from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOperations {
    /// Known operations, deduplicated, configured ones first
    pub operations: Vec<Operation>,

    /// Configured names with no hook mapping
    pub unknown: Vec<String>,
}

/// Merge configured operation names with [`Operation::DEFAULTS`].
///
/// First occurrence wins; unknown names are collected, not fatal.
pub fn resolve_operations<S: AsRef<str>>(configured: &[S]) -> ResolvedOperations {
    let mut resolved = ResolvedOperations::default();

    let defaults = Operation::DEFAULTS.iter().map(|op| op.as_str());
    for name in configured.iter().map(AsRef::as_ref).chain(defaults) {
        match Operation::parse(name) {
            Some(op) if !resolved.operations.contains(&op) => resolved.operations.push(op),
            Some(_) => {},
            None if !resolved.unknown.iter().any(|u| u == name) => {
                resolved.unknown.push(name.to_string())
            },
            None => {},
        }
    }

    resolved
}
