//! Host-side hook dispatch

use super::component::ComponentInstance;
use super::operation::Hook;
use crate::trace::TracingResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback bound to one lifecycle hook
pub type HookCallback = Arc<dyn Fn(&ComponentInstance) -> TracingResult<()> + Send + Sync>;

/// Hook set of a component: every hook maps to the callbacks registered
/// for it, in registration order.
#[derive(Default, Clone)]
pub struct LifecycleDispatch {
    hooks: HashMap<Hook, Vec<HookCallback>>,
}

impl LifecycleDispatch {
    /// Create an empty hook set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to `hook`
    pub fn register(&mut self, hook: Hook, callback: HookCallback) {
        self.hooks.entry(hook).or_default().push(callback);
    }

    /// Run every callback for `hook` against `instance`.
    ///
    /// All callbacks run even if one fails; the first error is returned.
    pub fn fire(&self, hook: Hook, instance: &ComponentInstance) -> TracingResult<()> {
        let Some(callbacks) = self.hooks.get(&hook) else {
            return Ok(());
        };

        let mut first_error = None;
        for callback in callbacks {
            if let Err(e) = callback(instance) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of callbacks registered for `hook`
    pub fn callback_count(&self, hook: Hook) -> usize {
        self.hooks.get(&hook).map_or(0, Vec::len)
    }
}

impl fmt::Debug for LifecycleDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<_> = self
            .hooks
            .iter()
            .map(|(hook, callbacks)| (*hook, callbacks.len()))
            .collect();
        hooks.sort();

        f.debug_struct("LifecycleDispatch")
            .field("hooks", &hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TracingError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn callback(
        f: impl Fn(&ComponentInstance) -> TracingResult<()> + Send + Sync + 'static,
    ) -> HookCallback {
        Arc::new(f)
    }

    fn counting(counter: &Arc<AtomicUsize>) -> HookCallback {
        let counter = Arc::clone(counter);
        callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_fire_runs_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut dispatch = LifecycleDispatch::new();

        for i in 0..3 {
            let order = Arc::clone(&order);
            dispatch.register(
                Hook::Mounted,
                callback(move |_| {
                    order.lock().unwrap().push(i);
                    Ok(())
                }),
            );
        }

        let root = ComponentInstance::root("App");
        dispatch.fire(Hook::Mounted, &root).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_fire_unregistered_hook() {
        let dispatch = LifecycleDispatch::new();
        let root = ComponentInstance::root("App");
        assert!(dispatch.fire(Hook::Updated, &root).is_ok());
        assert_eq!(dispatch.callback_count(Hook::Updated), 0);
    }

    #[test]
    fn test_first_error_returned_all_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut dispatch = LifecycleDispatch::new();

        dispatch.register(
            Hook::Created,
            callback(|_| Err(TracingError::Internal("first".to_string()))),
        );
        dispatch.register(
            Hook::Created,
            callback(|_| Err(TracingError::Internal("second".to_string()))),
        );
        dispatch.register(Hook::Created, counting(&counter));

        let root = ComponentInstance::root("App");
        let err = dispatch.fire(Hook::Created, &root).unwrap_err();
        assert_eq!(err.to_string(), TracingError::Internal("first".to_string()).to_string());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
