//! Hook installation
//!
//! [`HookInstaller::build`] turns a [`TrackingConfig`] into a
//! [`HookTable`]: one callback per before/after hook of every tracked
//! operation. The callbacks share one environment holding the
//! tracer, clock, filter and runtime; all lifecycle state lives on the
//! component instances they are called with.

use super::component::ComponentInstance;
use super::dispatch::{HookCallback, LifecycleDispatch};
use super::filter::ComponentFilter;
use super::operation::{resolve_operations, Hook, HookPhase, Operation};
use super::stats::{HookStats, StatsSnapshot};
use crate::config::TrackingConfig;
use crate::trace::{
    Clock, SpanBuilder, SpanContext, SystemClock, Tracer, TracingError, TracingResult,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, trace};

/// Name of the root span
pub const ROOT_SPAN_NAME: &str = "Application Render";

/// Operation suffix of the root span
const ROOT_SPAN_OPERATION: &str = "render";

/// Shared environment of every callback in one hook table
struct Instrumentation {
    tracer: Arc<dyn Tracer>,
    clock: Arc<dyn Clock>,
    filter: ComponentFilter,
    timeout: Duration,
    span_name_prefix: String,
    op_prefix: String,
    runtime: Handle,
    stats: Arc<HookStats>,
}

impl Instrumentation {
    fn handle(
        &self,
        instance: &ComponentInstance,
        operation: Operation,
        phase: HookPhase,
    ) -> TracingResult<()> {
        match phase {
            HookPhase::Before => self.before(instance, operation),
            HookPhase::After => self.after(instance, operation),
        }
    }

    fn before(&self, instance: &ComponentInstance, operation: Operation) -> TracingResult<()> {
        let active = self.tracer.active_span();
        let root = instance.root_coordinator();

        if let Some(root) = &root {
            root.close_if_expired(self.tracer.as_ref(), &self.stats)?;
        }

        if instance.is_root() {
            if let (Some(active), Some(root)) = (&active, &root) {
                let started = root.ensure_started(
                    self.tracer.as_ref(),
                    &self.stats,
                    self.root_builder(),
                    active,
                )?;
                if started.is_some() {
                    self.stats.record_root_started();
                }
            }
        }

        if !self.filter.admits(instance) {
            return Ok(());
        }

        let parent = root.as_ref().and_then(|r| r.current_span()).or(active);
        let Some(parent) = parent else {
            debug!(
                component = %instance.display_name(),
                operation = %operation,
                "no trace context, span not started"
            );
            self.stats.record_before_skipped();
            return Ok(());
        };

        let builder = self.operation_builder(instance, operation);
        let stale = instance
            .spans()
            .open(self.tracer.as_ref(), operation, builder, &parent)?;

        if let Some(stale) = stale {
            debug!(
                component = %instance.display_name(),
                operation = %operation,
                span = %stale,
                "closed span left open by a missed hook"
            );
            self.stats.record_stale_span_closed();
        }
        self.stats.record_span_opened();

        Ok(())
    }

    fn after(&self, instance: &ComponentInstance, operation: Operation) -> TracingResult<()> {
        if !self.filter.admits(instance) {
            return Ok(());
        }

        let timestamp = self.clock.now();
        let closed = instance
            .spans()
            .close(self.tracer.as_ref(), operation, timestamp)?;

        if closed.is_none() {
            debug!(
                component = %instance.display_name(),
                operation = %operation,
                "no open span, nothing to close"
            );
            self.stats.record_after_skipped();
            return Ok(());
        }
        self.stats.record_span_closed();

        match instance.root_coordinator() {
            Some(root) => root.arm_close_timer(
                Arc::clone(&self.tracer),
                Arc::clone(&self.stats),
                &self.runtime,
                self.timeout,
                timestamp,
            ),
            None => {
                trace!(component = %instance.display_name(), "root gone, no close timer");
                Ok(())
            },
        }
    }

    fn root_builder(&self) -> SpanBuilder {
        SpanBuilder::new(ROOT_SPAN_NAME)
            .op(format!("{}.{}", self.op_prefix, ROOT_SPAN_OPERATION))
            .attribute("origin", self.origin())
    }

    fn operation_builder(&self, instance: &ComponentInstance, operation: Operation) -> SpanBuilder {
        SpanBuilder::new(format!(
            "{} {}",
            self.span_name_prefix,
            instance.display_name()
        ))
        .op(format!("{}.{}", self.op_prefix, operation))
        .attribute("origin", self.origin())
    }

    fn origin(&self) -> String {
        format!("auto.{}", self.op_prefix)
    }
}

/// Hook identifier to callback table produced by [`HookInstaller::build`]
pub struct HookTable {
    callbacks: BTreeMap<Hook, HookCallback>,
    operations: Vec<Operation>,
    instrumentation: Arc<Instrumentation>,
}

impl HookTable {
    /// Callback bound to `hook`
    pub fn get(&self, hook: Hook) -> Option<&HookCallback> {
        self.callbacks.get(&hook)
    }

    /// Whether `hook` is bound
    pub fn contains(&self, hook: Hook) -> bool {
        self.callbacks.contains_key(&hook)
    }

    /// Run the callback bound to `hook`, if any
    pub fn invoke(&self, hook: Hook, instance: &ComponentInstance) -> TracingResult<()> {
        match self.callbacks.get(&hook) {
            Some(callback) => callback(instance),
            None => Ok(()),
        }
    }

    /// Bound hooks in hook order
    pub fn iter(&self) -> impl Iterator<Item = (Hook, &HookCallback)> {
        self.callbacks.iter().map(|(hook, callback)| (*hook, callback))
    }

    /// Number of bound hooks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no hook is bound
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Tracked operations, configured ones first
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Statistics of every callback in this table
    pub fn stats(&self) -> StatsSnapshot {
        self.instrumentation.stats.snapshot()
    }

    /// End the root span of `instance`'s tree now, cancelling its pending
    /// close. For hosts tearing a tree down.
    ///
    /// Returns the closed span; `None` when the tree had none open or the
    /// root is gone.
    pub fn close_root(&self, instance: &ComponentInstance) -> TracingResult<Option<SpanContext>> {
        let Some(root) = instance.root_coordinator() else {
            return Ok(None);
        };

        let env = &self.instrumentation;
        root.close_now(env.tracer.as_ref(), &env.stats, Some(env.clock.now()))
    }

    /// Register every callback into a component's hook set
    pub fn merge_into(&self, dispatch: &mut LifecycleDispatch) {
        for (hook, callback) in self.iter() {
            dispatch.register(hook, Arc::clone(callback));
        }
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("hooks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("operations", &self.operations)
            .finish()
    }
}

/// Builds hook tables against a tracer
pub struct HookInstaller {
    tracer: Arc<dyn Tracer>,
    clock: Arc<dyn Clock>,
}

impl HookInstaller {
    /// Create an installer timestamping with the wall clock
    pub fn new(tracer: Arc<dyn Tracer>) -> Self {
        Self {
            tracer,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for completion timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the hook table for `config`.
    ///
    /// Must be called inside a tokio runtime, which hosts the root close
    /// timers.
    pub fn build(&self, config: &TrackingConfig) -> TracingResult<HookTable> {
        let runtime =
            Handle::try_current().map_err(|e| TracingError::Runtime(e.to_string()))?;

        let resolved = resolve_operations(&config.tracked_operations);
        for name in &resolved.unknown {
            debug!(operation = %name, "unknown lifecycle operation ignored");
        }

        let instrumentation = Arc::new(Instrumentation {
            tracer: Arc::clone(&self.tracer),
            clock: Arc::clone(&self.clock),
            filter: ComponentFilter::new(config.track_components.clone()),
            timeout: config.timeout,
            span_name_prefix: config.span_name_prefix.clone(),
            op_prefix: config.op_prefix.clone(),
            runtime,
            stats: Arc::new(HookStats::new()),
        });

        let mut callbacks = BTreeMap::new();
        for &operation in &resolved.operations {
            for phase in [HookPhase::Before, HookPhase::After] {
                let instrumentation = Arc::clone(&instrumentation);
                let callback: HookCallback = Arc::new(move |instance: &ComponentInstance| {
                    instrumentation.handle(instance, operation, phase)
                });
                callbacks.insert(operation.hook(phase), callback);
            }
        }

        debug!(
            operations = ?resolved.operations,
            hooks = callbacks.len(),
            "lifecycle hooks built"
        );

        Ok(HookTable {
            callbacks,
            operations: resolved.operations,
            instrumentation,
        })
    }
}

impl fmt::Debug for HookInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookInstaller").finish_non_exhaustive()
    }
}
