// src/dag/mod.rs

//! Task graph construction and representation.
//!
//! - [`builder`] expands a root task set into the full dependency graph,
//!   deduplicating on `(name, parameters)` and detecting cycles.
//! - [`graph`] holds the expanded graph and its deterministic
//!   topological order.

pub mod builder;
pub mod graph;

pub use builder::GraphBuilder;
pub use graph::{NodeId, TaskGraph, TaskNode};
