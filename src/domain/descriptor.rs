use crate::error::{LoadError, Rejection};
use crate::framework::Promise;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// What a render capability is told when the render gate opens: `Ok` if every
/// precondition fulfilled, otherwise the first rejection.
pub type Readiness = Result<(), Rejection>;

/// Setup capability. `Err` is a synchronous load failure.
pub type LoadFn = Arc<dyn Fn() -> Result<Loaded, LoadError> + Send + Sync>;

/// Capability invoked once the shared render gate settles.
pub type RenderFn = Arc<dyn Fn(&Readiness) + Send + Sync>;

/// Result of a successful load call.
#[derive(Debug, Clone)]
pub enum Loaded {
    /// Setup finished during the call; render may be attempted right away.
    Ready,
    /// Setup continues asynchronously; render waits for this to fulfill.
    Pending(Promise<()>),
}

impl From<Promise<()>> for Loaded {
    fn from(promise: Promise<()>) -> Self {
        Loaded::Pending(promise)
    }
}

/// A registrable unit of functionality.
///
/// Plain data lives in `properties`. The optional capabilities (`load`,
/// `render`) and the precondition list are typed fields. Everything is
/// optional; an empty descriptor is a valid module.
///
/// ```rust
/// use applitude::domain::{Descriptor, Loaded};
/// use serde_json::json;
///
/// let widget = Descriptor::new()
///     .with_property("title", json!("Cart"))
///     .with_mixin_list("widgets.base, widgets.theme")
///     .on_load(|| Ok(Loaded::Ready))
///     .on_render(|readiness| println!("render gate open: {}", readiness.is_ok()));
///
/// assert_eq!(widget.mixins, vec!["widgets.base", "widgets.theme"]);
/// assert!(widget.has_render());
/// ```
#[derive(Clone, Default)]
pub struct Descriptor {
    pub properties: Map<String, Value>,
    /// Registered namespaces whose fields fill the gaps in this descriptor.
    pub mixins: Vec<String>,
    pub load: Option<LoadFn>,
    pub render: Option<RenderFn>,
    /// Preconditions this module adds to the application-wide render gate.
    pub before_render: Vec<Promise<()>>,
    /// Stamped with the registration path by the coordinator.
    pub module_namespace: Option<String>,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("module_namespace", &self.module_namespace)
            .field("properties", &self.properties)
            .field("mixins", &self.mixins)
            .field("load", &self.load.is_some())
            .field("render", &self.render.is_some())
            .field("before_render", &self.before_render.len())
            .finish()
    }
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A descriptor holding a single `value` property.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::new().with_property("value", value)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_mixins<I, S>(mut self, mixins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mixins.extend(mixins.into_iter().map(Into::into));
        self
    }

    /// Adds mixins from a comma-separated list (`"a, b ,c"`).
    pub fn with_mixin_list(self, list: &str) -> Self {
        self.with_mixins(parse_list(list))
    }

    pub fn on_load<F>(mut self, load: F) -> Self
    where
        F: Fn() -> Result<Loaded, LoadError> + Send + Sync + 'static,
    {
        self.load = Some(Arc::new(load));
        self
    }

    pub fn on_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Readiness) + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn before_render(mut self, precondition: Promise<()>) -> Self {
        self.before_render.push(precondition);
        self
    }

    pub fn before_render_all<I>(mut self, preconditions: I) -> Self
    where
        I: IntoIterator<Item = Promise<()>>,
    {
        self.before_render.extend(preconditions);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn has_load(&self) -> bool {
        self.load.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }
}

/// Splits a comma-separated list, trimming blanks and dropping empty items.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
