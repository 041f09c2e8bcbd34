//! Module registration and the render lifecycle.
//!
//! [`Coordinator`] owns the namespace tree and the load-error map and drives
//! each registration through claim, compose, precondition, load and render.
//! See [`coordinator`] for the step-by-step contract.

pub mod coordinator;

pub use coordinator::{Coordinator, LifecycleContext, RenderPolicy};
