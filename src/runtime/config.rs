use super::options::{AppOptions, Environment, HostReady};
use crate::error::ConfigError;
use crate::framework::LateJoin;
use crate::lifecycle::RenderPolicy;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// File-backed application settings.
///
/// ```toml
/// app_namespace = "shop"
/// render_policy = "fulfilled_only"
/// late_join = "reject"
/// wait_for_host = true
///
/// [environment]
/// debug = true
/// name = "staging"
///
/// [options]
/// theme = "dark"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_namespace: String,
    pub environment: Environment,
    pub render_policy: RenderPolicy,
    pub late_join: LateJoin,
    /// Keep the render gate closed until the host calls `host_ready()`.
    pub wait_for_host: bool,
    pub options: Map<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_namespace: "applitude".to_string(),
            environment: Environment::default(),
            render_policy: RenderPolicy::default(),
            late_join: LateJoin::default(),
            wait_for_host: false,
            options: Map::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Options for [`Applitude::init`](crate::Applitude::init). Runtime-only
    /// parts (preconditions, host signals) start empty.
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            before_render: Vec::new(),
            host_ready: if self.wait_for_host {
                HostReady::Manual
            } else {
                HostReady::Immediate
            },
            render_policy: self.render_policy,
            late_join: self.late_join,
            extra: self.options.clone(),
        }
    }
}
