//! Resource management module
//!
//! Provides the immutable templates scenes spawn from: entity and component
//! resources, their property trees, and the component type registry.

mod resource_manager;
mod component_factory;
pub mod entity;
pub mod property;

pub use resource_manager::ResourceManager;
pub use component_factory::{ComponentFactory, ComponentConstructor};
pub use entity::{
    EntityResource, ComponentResource,
    InstanceProperty, RootEntity,
};
pub use property::{
    PropertyValue, PropertyPath, Properties,
    ComponentPtr, EntityPtr, PointerProperty,
};
