//! # Module Lifecycle
//!
//! [`Coordinator::register`] runs the registration pipeline for one module,
//! synchronously and in this order:
//!
//! 1. **Claim the namespace.** An occupied namespace is reported and the call
//!    stops; nothing else about the module is looked at.
//! 2. **Compose mixins.** Named mixins are looked up among registered modules
//!    (missing ones are skipped) and merged under the module's own fields.
//! 3. **Join the render gate.** The module's `before_render` preconditions are
//!    pushed onto the application-wide barrier, so every render waits on them,
//!    not just this module's.
//! 4. **Load.** A synchronous load failure, a panic included, is recorded in
//!    the load-error map, logged, and ends the call without a render attempt. A pending load
//!    postpones the render attempt until it fulfills.
//! 5. **Attempt render.** The render capability is queued behind the barrier
//!    and runs once it settles, subject to the [`RenderPolicy`].
//!
//! Only the async continuations (pending loads, queued renders) run later, on
//! tasks tracked by the application.

use crate::domain::{compose, Descriptor, LoadFn, Loaded, RenderFn};
use crate::error::{ApplitudeError, LoadError};
use crate::framework::{EventBus, JoinBarrier, Promise};
use crate::registry::NamespaceTree;
use crate::runtime::{LogSink, TaskTracker};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Whether render capabilities run when the render gate rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPolicy {
    /// Render on either outcome; the capability receives the outcome.
    #[default]
    Always,
    /// Render only if every precondition fulfilled.
    FulfilledOnly,
}

/// Everything a lifecycle operation needs from the application, passed
/// explicitly on each call.
pub struct LifecycleContext<'a> {
    pub app_namespace: &'a str,
    pub render_policy: RenderPolicy,
    pub barrier: &'a JoinBarrier,
    pub events: &'a EventBus,
    pub log: &'a Arc<LogSink>,
    pub tasks: &'a TaskTracker,
}

/// Owns the namespace tree and the load-error map.
#[derive(Debug, Default)]
pub struct Coordinator {
    registry: Mutex<NamespaceTree<Arc<Descriptor>>>,
    load_errors: Mutex<HashMap<String, LoadError>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` at `namespace`.
    ///
    /// Returns the stored module. A load failure still returns `Err` even
    /// though the module stays registered; a refused precondition push is
    /// reported the same way once the remaining steps have run.
    #[instrument(skip(self, ctx, descriptor), fields(app = %ctx.app_namespace))]
    pub fn register(
        &self,
        ctx: &LifecycleContext<'_>,
        namespace: &str,
        mut descriptor: Descriptor,
    ) -> Result<Arc<Descriptor>, ApplitudeError> {
        descriptor.module_namespace = Some(namespace.to_owned());

        // 1 + 2: claim the namespace and compose under one lock.
        let module = {
            let mut registry = self.registry.lock();
            if let Err(e) = registry.check_vacant(namespace) {
                drop(registry);
                warn!(module = %namespace, error = %e, "Registration refused");
                ctx.log.log(format_args!("Error: {e}"));
                return Err(e.into());
            }

            let module = if descriptor.mixins.is_empty() {
                descriptor
            } else {
                let mixins = resolve_mixins(&registry, namespace, &descriptor.mixins);
                compose(descriptor, mixins.iter().map(|mixin| &**mixin))
            };
            let module = Arc::new(module);
            registry.insert(namespace, module.clone())?;
            module
        };
        info!(module = %namespace, "Module registered");
        ctx.events.emit(
            &format!("module_added.{}", ctx.app_namespace),
            Value::String(namespace.to_owned()),
        );

        // 3: join the application-wide render gate.
        let mut refused = None;
        if !module.before_render.is_empty() {
            debug!(module = %namespace, count = module.before_render.len(), "Adding render preconditions");
            if let Err(e) = ctx.barrier.push(module.before_render.iter().cloned()) {
                warn!(module = %namespace, error = %e, "Render preconditions refused");
                ctx.log.log(format_args!("Error: {namespace}: {e}"));
                refused = Some(ApplitudeError::from(e));
            }
        }

        // 4 + 5: load, then render.
        match module.load.as_ref().map(run_load) {
            Some(Err(error)) => {
                warn!(module = %namespace, error = %error, "Load failed");
                ctx.log
                    .log(format_args!("Error loading module: {namespace} {error}"));
                self.load_errors
                    .lock()
                    .insert(namespace.to_owned(), error.clone());
                return Err(ApplitudeError::Load {
                    namespace: namespace.to_owned(),
                    source: error,
                });
            }
            Some(Ok(Loaded::Ready)) => self.attempt_render(ctx, namespace, &module, None),
            Some(Ok(Loaded::Pending(loading))) => {
                debug!(module = %namespace, "Load pending");
                self.attempt_render(ctx, namespace, &module, Some(loading));
            }
            None => {
                if !self.load_errors.lock().contains_key(namespace) {
                    self.attempt_render(ctx, namespace, &module, None);
                }
            }
        }

        match refused {
            Some(e) => Err(e),
            None => Ok(module),
        }
    }

    /// Queues the module's render behind the barrier, optionally after an
    /// async load. A rejected load is logged and skips the render.
    fn attempt_render(
        &self,
        ctx: &LifecycleContext<'_>,
        namespace: &str,
        module: &Descriptor,
        after_load: Option<Promise<()>>,
    ) {
        let render: Option<RenderFn> = module.render.clone();
        if render.is_none() && after_load.is_none() {
            return;
        }

        let namespace = namespace.to_owned();
        let gate = ctx.barrier.promise();
        let policy = ctx.render_policy;
        let log = ctx.log.clone();
        ctx.tasks.spawn(async move {
            if let Some(loading) = after_load {
                if let Err(reason) = loading.settled().await {
                    warn!(module = %namespace, error = %reason, "Async load rejected");
                    log.log(format_args!("Error loading module: {namespace} {reason}"));
                    return;
                }
                debug!(module = %namespace, "Load finished");
            }

            let Some(render) = render else {
                return;
            };
            let readiness = gate.settled().await;
            if readiness.is_err() && policy == RenderPolicy::FulfilledOnly {
                debug!(module = %namespace, "Render gate rejected, render skipped");
                return;
            }
            debug!(module = %namespace, ready = readiness.is_ok(), "Render");
            render(&readiness);
        });
    }

    pub fn module(&self, namespace: &str) -> Option<Arc<Descriptor>> {
        self.registry.lock().get(namespace).cloned()
    }

    pub fn modules(&self) -> Vec<String> {
        self.registry.lock().paths()
    }

    pub fn load_error(&self, namespace: &str) -> Option<LoadError> {
        self.load_errors.lock().get(namespace).cloned()
    }
}

/// Runs a load capability, turning a panic into a [`LoadError`].
fn run_load(load: &LoadFn) -> Result<Loaded, LoadError> {
    panic::catch_unwind(AssertUnwindSafe(|| load())).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| (*msg).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        Err(LoadError::new(format!("load panicked: {message}")))
    })
}

fn resolve_mixins(
    registry: &NamespaceTree<Arc<Descriptor>>,
    namespace: &str,
    names: &[String],
) -> Vec<Arc<Descriptor>> {
    names
        .iter()
        .filter_map(|name| {
            let mixin = registry.get(name).cloned();
            if mixin.is_none() {
                debug!(module = %namespace, mixin = %name, "Mixin not registered, skipped");
            }
            mixin
        })
        .collect()
}
