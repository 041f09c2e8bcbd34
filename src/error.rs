//! # Errors
//!
//! Every failure the module system can produce. None of these cross the public
//! [`Applitude::register`](crate::Applitude::register) boundary; they are
//! recorded, logged, or handed to callers that opt in via
//! [`Applitude::try_register`](crate::Applitude::try_register).

use thiserror::Error;

/// Why a [`Promise`](crate::framework::Promise) was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    /// Rejected explicitly with a reason.
    #[error("{0}")]
    Reason(String),

    /// Every settle handle was dropped while the value was still pending.
    #[error("deferred dropped before it settled")]
    Abandoned,
}

impl Rejection {
    pub fn reason(reason: impl Into<String>) -> Self {
        Rejection::Reason(reason.into())
    }
}

impl From<&str> for Rejection {
    fn from(reason: &str) -> Self {
        Rejection::Reason(reason.to_string())
    }
}

impl From<String> for Rejection {
    fn from(reason: String) -> Self {
        Rejection::Reason(reason)
    }
}

/// Failures of the insert-once namespace tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamespaceError {
    /// The final segment is already occupied.
    #[error("Module already registered: {0}")]
    Collision(String),

    /// A registered module sits where an intermediate container is needed.
    #[error("Cannot register {path}: {at} is already a module")]
    Blocked { path: String, at: String },

    /// Empty path, or a path with an empty segment (`a..b`).
    #[error("Invalid namespace: {0:?}")]
    InvalidPath(String),
}

/// A synchronous failure raised by a module's load capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        LoadError::new(message)
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        LoadError { message }
    }
}

/// Misuse of a [`JoinBarrier`](crate::framework::JoinBarrier).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BarrierError {
    /// A member was pushed after the barrier settled while
    /// [`LateJoin::Reject`](crate::framework::LateJoin::Reject) is configured.
    #[error("Barrier already settled; {0} late member(s) refused")]
    AlreadySettled(usize),
}

/// Failures while reading an [`AppConfig`](crate::runtime::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Umbrella error for the lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplitudeError {
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error("Error loading module {namespace}: {source}")]
    Load {
        namespace: String,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    Barrier(#[from] BarrierError),
}
