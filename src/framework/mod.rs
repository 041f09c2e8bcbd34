//! Generic building blocks for the module system.
//!
//! Nothing in here knows about modules or namespaces; the lifecycle layer
//! composes these pieces.
//!
//! # Main Components
//!
//! - [`Deferred`] / [`Promise`] - A one-shot value with a write side and any number of read sides
//! - [`JoinBarrier`] - A promise that settles once every member has, and accepts members while pending
//! - [`EventBus`] - Topic-based publish/subscribe with `*` and `**` wildcards
//!
//! # Testing
//!
//! See the [`mock`] module for scripted load and render capabilities.

pub mod barrier;
pub mod deferred;
pub mod events;
pub mod mock;

pub use barrier::{JoinBarrier, LateJoin};
pub use deferred::{when_all, Deferred, Promise, PromiseState};
pub use events::{Event, EventBus, Handler, ListenerId};
