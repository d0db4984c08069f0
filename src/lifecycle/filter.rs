//! Component filter

use super::component::ComponentInstance;
use crate::config::TrackComponents;

/// Decides which components produce spans
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    track: TrackComponents,
}

impl ComponentFilter {
    /// Create a filter from the configured setting
    pub fn new(track: TrackComponents) -> Self {
        Self { track }
    }

    /// Whether a non-root component with this display name is tracked.
    ///
    /// Allow-lists match exactly.
    pub fn should_track(&self, display_name: &str) -> bool {
        match &self.track {
            TrackComponents::All(enabled) => *enabled,
            TrackComponents::Names(names) => names.iter().any(|n| n == display_name),
        }
    }

    /// Whether hooks on `instance` are handled. The root always is.
    pub fn admits(&self, instance: &ComponentInstance) -> bool {
        instance.is_root() || self.should_track(instance.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ComponentName;

    #[test]
    fn test_default_tracks_nothing() {
        let filter = ComponentFilter::default();
        assert!(!filter.should_track("Foo"));
    }

    #[test]
    fn test_flag() {
        let filter = ComponentFilter::new(TrackComponents::All(true));
        assert!(filter.should_track("Foo"));
        assert!(filter.should_track("<Anonymous>"));
    }

    #[test]
    fn test_allow_list_exact_match() {
        let filter = ComponentFilter::new(TrackComponents::names(["Foo"]));
        assert!(filter.should_track("Foo"));
        assert!(!filter.should_track("foo"));
        assert!(!filter.should_track("FooBar"));
        assert!(!filter.should_track("<Foo>"));
    }

    #[test]
    fn test_root_always_admitted() {
        let filter = ComponentFilter::new(TrackComponents::names(["Foo"]));
        let root = ComponentInstance::root(ComponentName::named("App"));
        let foo = root.child(ComponentName::named("Foo"));
        let bar = root.child(ComponentName::named("Bar"));

        assert!(filter.admits(&root));
        assert!(filter.admits(&foo));
        assert!(!filter.admits(&bar));
    }
}
