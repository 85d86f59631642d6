//! Object dependency graphs
//!
//! Generic topological ordering with cycle detection, shared by the service
//! manager and the scene spawn pipeline.

mod object_graph;

pub use object_graph::{GraphItem, Node, ObjectGraph};
