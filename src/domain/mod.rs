//! Module descriptors and how they are composed from mixins.

pub mod compose;
pub mod descriptor;

pub use compose::*;
pub use descriptor::*;
