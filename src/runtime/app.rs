use super::config::AppConfig;
use super::log::LogSink;
use super::options::{AppOptions, Environment, HostReady};
use super::tasks::TaskTracker;
use crate::domain::Descriptor;
use crate::error::{ApplitudeError, LoadError};
use crate::framework::{Deferred, Event, EventBus, JoinBarrier, ListenerId, Promise};
use crate::lifecycle::{Coordinator, LifecycleContext};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt::{self, Display};
use std::iter;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

/// The application root.
///
/// Holds the module registry, the shared render gate, the event bus and the
/// root settings. Each [`Applitude::init`] builds an independent context;
/// clones share it.
///
/// # Example
///
/// ```ignore
/// let app = Applitude::init("shop", Environment::default(), AppOptions::new());
///
/// app.register("utils.uniqueId", Descriptor::new().on_load(|| Ok(Loaded::Ready)))
///    .register("cart", Descriptor::new().on_render(|ready| println!("{ready:?}")));
///
/// app.when_render_ready().await?;
/// app.shutdown().await;
/// ```
#[derive(Clone)]
pub struct Applitude {
    inner: Arc<AppInner>,
}

/// A non-owning handle to an [`Applitude`], for capabilities stored inside
/// the application they call back into.
#[derive(Clone)]
pub struct WeakApplitude {
    inner: Weak<AppInner>,
}

impl WeakApplitude {
    pub fn upgrade(&self) -> Option<Applitude> {
        self.inner.upgrade().map(|inner| Applitude { inner })
    }
}

struct Settings {
    app_namespace: String,
    environment: Environment,
    options: AppOptions,
}

struct AppInner {
    settings: RwLock<Settings>,
    coordinator: Coordinator,
    barrier: JoinBarrier,
    page_ready: Deferred<()>,
    events: EventBus,
    log: Arc<LogSink>,
    tasks: TaskTracker,
}

impl fmt::Debug for Applitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.inner.settings.read();
        f.debug_struct("Applitude")
            .field("app_namespace", &settings.app_namespace)
            .field("modules", &self.inner.coordinator.modules().len())
            .field("barrier", &self.inner.barrier)
            .finish()
    }
}

impl Applitude {
    /// Builds a new application context.
    ///
    /// The render gate starts with the page-ready precondition followed by
    /// `options.before_render`. Page readiness comes from `options.host_ready`.
    #[instrument(skip_all, fields(app = tracing::field::Empty))]
    pub fn init(app_namespace: impl Into<String>, environment: Environment, options: AppOptions) -> Self {
        let app_namespace = app_namespace.into();
        tracing::Span::current().record("app", app_namespace.as_str());

        let page_ready = Deferred::new();
        let barrier = JoinBarrier::with_policy(
            options.late_join,
            iter::once(page_ready.promise()).chain(options.before_render.iter().cloned()),
        );
        let log = Arc::new(LogSink::new(environment.debug));
        let tasks = TaskTracker::new();

        match &options.host_ready {
            HostReady::Immediate => {
                page_ready.resolve(());
            }
            HostReady::Manual => debug!("Waiting for host_ready()"),
            HostReady::Signal(signal) => {
                let signal = signal.clone();
                let page_ready = page_ready.clone();
                tasks.spawn(async move {
                    match signal.ready().await {
                        Ok(()) => page_ready.resolve(()),
                        Err(reason) => {
                            warn!(error = %reason, "Host ready signal rejected");
                            page_ready.reject(reason)
                        }
                    };
                });
            }
        }

        info!(
            preconditions = barrier.joined(),
            debug = environment.debug,
            "Application initialised"
        );

        Self {
            inner: Arc::new(AppInner {
                settings: RwLock::new(Settings {
                    app_namespace,
                    environment,
                    options,
                }),
                coordinator: Coordinator::new(),
                barrier,
                page_ready,
                events: EventBus::new(),
                log,
                tasks,
            }),
        }
    }

    /// A handle that does not keep the application alive. Module capabilities
    /// that need the root should hold this instead of a clone.
    pub fn downgrade(&self) -> WeakApplitude {
        WeakApplitude {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Builds a context from file-backed settings.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::init(
            config.app_namespace.clone(),
            config.environment.clone(),
            config.app_options(),
        )
    }

    /// Re-applies init on this context. Root settings are replaced; the new
    /// preconditions join the existing render gate; registered modules and
    /// load errors are kept. The gate's late-join policy and the host-ready
    /// source stay as first initialised.
    #[instrument(skip_all, fields(app = %app_namespace))]
    pub fn configure(&self, app_namespace: &str, environment: Environment, options: AppOptions) -> &Self {
        let preconditions = options.before_render.clone();
        if options.late_join != self.inner.barrier.late_join() {
            debug!(late_join = ?self.inner.barrier.late_join(), "Late-join policy is fixed at init, keeping it");
        }

        self.inner.log.set_debug(environment.debug);
        {
            let mut settings = self.inner.settings.write();
            settings.app_namespace = app_namespace.to_owned();
            settings.environment = environment;
            settings.options = options;
        }

        if !preconditions.is_empty() {
            if let Err(e) = self.inner.barrier.push(preconditions) {
                warn!(error = %e, "Render preconditions refused");
                self.log(format_args!("Error: {e}"));
            }
        }
        info!("Application reconfigured");
        self
    }

    /// Marks the host as ready when `HostReady::Manual` is configured.
    /// Returns false if page readiness had already settled.
    pub fn host_ready(&self) -> bool {
        let fired = self.inner.page_ready.resolve(());
        if fired {
            debug!("Host ready");
        }
        fired
    }

    /// Registers a module. Failures are logged and recorded, never returned;
    /// use [`try_register`](Self::try_register) to observe them.
    pub fn register(&self, namespace: &str, descriptor: Descriptor) -> &Self {
        let _ = self.try_register(namespace, descriptor);
        self
    }

    pub fn try_register(
        &self,
        namespace: &str,
        descriptor: Descriptor,
    ) -> Result<Arc<Descriptor>, ApplitudeError> {
        // Copy settings out so modules may call back into the root.
        let (app_namespace, render_policy) = {
            let settings = self.inner.settings.read();
            (
                settings.app_namespace.clone(),
                settings.options.render_policy,
            )
        };
        let ctx = LifecycleContext {
            app_namespace: &app_namespace,
            render_policy,
            barrier: &self.inner.barrier,
            events: &self.inner.events,
            log: &self.inner.log,
            tasks: &self.inner.tasks,
        };
        self.inner.coordinator.register(&ctx, namespace, descriptor)
    }

    pub fn app_namespace(&self) -> String {
        self.inner.settings.read().app_namespace.clone()
    }

    pub fn environment(&self) -> Environment {
        self.inner.settings.read().environment.clone()
    }

    pub fn options(&self) -> AppOptions {
        self.inner.settings.read().options.clone()
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// The shared render gate.
    pub fn barrier(&self) -> &JoinBarrier {
        &self.inner.barrier
    }

    pub fn module(&self, namespace: &str) -> Option<Arc<Descriptor>> {
        self.inner.coordinator.module(namespace)
    }

    /// Every registered namespace, sorted.
    pub fn modules(&self) -> Vec<String> {
        self.inner.coordinator.modules()
    }

    pub fn load_error(&self, namespace: &str) -> Option<LoadError> {
        self.inner.coordinator.load_error(namespace)
    }

    /// Writes to the log sink: `tracing` in debug environments, the debug log
    /// otherwise.
    pub fn log(&self, message: impl Display) {
        self.inner.log.log(message);
    }

    pub fn debug_log(&self) -> Vec<String> {
        self.inner.log.entries()
    }

    /// Settles with the render gate.
    pub fn when_render_ready(&self) -> Promise<()> {
        self.inner.barrier.promise()
    }

    pub fn on<F>(&self, pattern: &str, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.events.on(pattern, handler)
    }

    /// Emits on the event bus; returns the number of listeners reached.
    pub fn trigger(&self, topic: &str, payload: impl Into<Value>) -> usize {
        self.inner.events.emit(topic, payload.into())
    }

    /// Aborts load and render continuations that are still waiting and
    /// returns how many were cut off.
    pub async fn shutdown(&self) -> usize {
        info!("Shutting down application...");
        let aborted = self.inner.tasks.abort_all().await;
        info!(aborted, "Application shutdown complete.");
        aborted
    }
}
