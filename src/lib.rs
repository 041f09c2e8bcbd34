//! # Applitude
//!
//! > **Application namespacing and module management on Tokio.**
//!
//! An application registers modules under dotted namespaces. Each module may
//! load itself, borrow fields from other modules (mixins), contribute
//! preconditions to a shared render gate, and render once that gate opens.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One gate, many contributors
//! Every module's `before_render` preconditions join a single
//! [`JoinBarrier`](framework::JoinBarrier). Rendering waits on *all* of them,
//! and the set may keep growing while modules are still being registered,
//! even after some preconditions already settled.
//!
//! ### Insert-once namespaces
//! The registry never overwrites a module. A second registration at the same
//! path is logged and ignored; the first writer owns the namespace.
//!
//! ### No globals
//! [`Applitude::init`] returns a context object. Tests and hosts can run as
//! many independent applications as they like.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Failures are `thiserror` enums in [`error`]. `register` never returns them;
//! they are logged, recorded in the load-error map, or handed to callers of
//! [`Applitude::try_register`].
//!
//! ### 2. Explicit Context
//! The lifecycle coordinator receives everything it touches (barrier, event
//! bus, log sink, task tracker) through a
//! [`LifecycleContext`](lifecycle::LifecycleContext) on each call.
//!
//! ### 3. Concurrency Model
//! Registration runs synchronously. Only continuations (pending loads,
//! renders waiting on the gate) run as Tokio tasks, and they are tracked so
//! [`Applitude::shutdown`] can cut them off.
//!
//! ### 4. Observability
//! `tracing` everywhere, with spans on `init` and `register`. See
//! [`runtime::setup_tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Generic primitives: [`Deferred`](framework::Deferred) /
//! [`Promise`](framework::Promise), [`JoinBarrier`](framework::JoinBarrier),
//! [`EventBus`](framework::EventBus), and test doubles in [`framework::mock`].
//!
//! ### 2. The Data ([`domain`], [`registry`])
//! [`Descriptor`](domain::Descriptor), mixin [`compose`](domain::compose), and
//! the insert-once [`NamespaceTree`](registry::NamespaceTree).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! [`Coordinator`](lifecycle::Coordinator) drives a registration through
//! claim, compose, precondition, load and render.
//!
//! ### 4. The Root ([`runtime`])
//! [`Applitude`], its options and TOML config, the log sink and tracing setup.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use applitude::{AppOptions, Applitude, Descriptor, Environment, Loaded};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = Applitude::init("shop", Environment::default(), AppOptions::new());
//!
//! app.register("utils.greeting", Descriptor::value("hello"))
//!     .register(
//!         "cart",
//!         Descriptor::new()
//!             .on_load(|| Ok(Loaded::Ready))
//!             .on_render(|readiness| assert!(readiness.is_ok())),
//!     );
//!
//! assert!(app.when_render_ready().await.is_ok());
//! assert!(app.module("utils.greeting").is_some());
//! # }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -p applitude-sample
//! ```

pub mod domain;
pub mod error;
pub mod framework;
pub mod lifecycle;
pub mod registry;
pub mod runtime;

pub use domain::{Descriptor, Loaded, Readiness};
pub use error::{ApplitudeError, LoadError, Rejection};
pub use framework::{Deferred, Promise};
pub use lifecycle::RenderPolicy;
pub use runtime::{AppConfig, AppOptions, Applitude, Environment, HostReady};
