//! # Namespace Registry
//!
//! An append-only tree of dotted paths (`shop.cart.badge`). Intermediate
//! containers appear on demand; a leaf, once assigned, is never overwritten,
//! so each namespace has exactly one writer for the life of the application.

pub mod tree;

pub use tree::NamespaceTree;
