//! Runtime wiring for an application.
//!
//! - [`Applitude`] - The application root: registry, render gate, event bus and settings
//! - [`AppOptions`] / [`Environment`] / [`HostReady`] - What `init` is given
//! - [`AppConfig`] - The same settings loaded from TOML
//! - [`LogSink`] - The debug-aware log sink behind [`Applitude::log`]
//! - [`TaskTracker`] - Handles of pending load/render continuations, for shutdown
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod app;
pub mod config;
pub mod log;
pub mod options;
pub mod tasks;
pub mod tracing;

pub use app::{Applitude, WeakApplitude};
pub use config::AppConfig;
pub use log::LogSink;
pub use options::{AppOptions, Environment, HostReady, HostSignal};
pub use tasks::TaskTracker;
pub use self::tracing::setup_tracing;
