//! Service module
//!
//! Process-wide singletons with declared type dependencies, ordered through
//! the object graph.

mod service;
mod service_graph_item;
mod service_manager;

pub use service::{Service, ServiceType, ServiceContext};
pub use service_graph_item::{ServiceObjectGraphItem, ServiceGraphContext};
pub use service_manager::ServiceManager;
