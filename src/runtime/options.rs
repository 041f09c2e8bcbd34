use crate::error::Rejection;
use crate::framework::{LateJoin, Promise};
use crate::lifecycle::RenderPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Ambient facts about where the application runs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Send log lines to `tracing` instead of the in-memory buffer.
    pub debug: bool,
    pub name: Option<String>,
    /// Anything else the host wants to expose.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Environment {
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }
}

/// The host's one-shot "bootstrap finished" notification.
#[async_trait]
pub trait HostSignal: Send + Sync {
    async fn ready(&self) -> Result<(), Rejection>;
}

#[async_trait]
impl HostSignal for Promise<()> {
    async fn ready(&self) -> Result<(), Rejection> {
        self.settled().await
    }
}

/// Where the page-ready precondition comes from.
#[derive(Clone, Default)]
pub enum HostReady {
    /// Ready as soon as the application is initialised.
    #[default]
    Immediate,
    /// Ready when [`Applitude::host_ready`](crate::Applitude::host_ready) is called.
    Manual,
    /// Ready when the signal fires; a rejected signal rejects the render gate.
    Signal(Arc<dyn HostSignal>),
}

impl fmt::Debug for HostReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostReady::Immediate => f.write_str("Immediate"),
            HostReady::Manual => f.write_str("Manual"),
            HostReady::Signal(_) => f.write_str("Signal(..)"),
        }
    }
}

/// Options accepted by [`Applitude::init`](crate::Applitude::init).
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Extra preconditions for the render gate, next to page readiness.
    pub before_render: Vec<Promise<()>>,
    pub host_ready: HostReady,
    pub render_policy: RenderPolicy,
    /// Fixed when the render gate is built; later reconfiguration keeps it.
    pub late_join: LateJoin,
    /// Free-form application options.
    pub extra: Map<String, Value>,
}

impl AppOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_render(mut self, precondition: Promise<()>) -> Self {
        self.before_render.push(precondition);
        self
    }

    pub fn host_ready(mut self, host_ready: HostReady) -> Self {
        self.host_ready = host_ready;
        self
    }

    pub fn render_policy(mut self, policy: RenderPolicy) -> Self {
        self.render_policy = policy;
        self
    }

    pub fn late_join(mut self, late_join: LateJoin) -> Self {
        self.late_join = late_join;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
