//! # Applitude Sample Library
//!
//! The modules of the demo application, exposed for integration testing.
//!
//! - [`modules`] - The registrable modules and [`register_all`](modules::register_all)
//! - [`host`] - A host bootstrap signal that gates rendering
//! - [`error`] - The demo's top-level error

pub mod error;
pub mod host;
pub mod modules;
