//! Service trait: process-wide singletons with declared dependencies.
//!
//! Services are registered with the ServiceManager, which orders them by
//! their declared dependencies, initializes dependencies first, and shuts
//! them down in reverse order.

use std::any::{Any, TypeId};
use crate::error::Result;

/// Identifies a service type (used to declare dependencies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    /// Service type of `S`
    pub fn of<S: Service>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, used as the service's graph ID
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Read access to the services initialized before the current one
pub struct ServiceContext<'a> {
    pub(crate) initialized: &'a [Box<dyn Service>],
}

impl<'a> ServiceContext<'a> {
    /// Get an already initialized service by type
    pub fn get<S: Service>(&self) -> Option<&'a S> {
        self.initialized.iter()
            .find_map(|s| s.as_any().downcast_ref::<S>())
    }
}

/// A process-wide singleton managed by the ServiceManager
pub trait Service: Any + Send {
    /// Full type name of the service
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Service types that must be initialized before this one
    fn dependencies(&self) -> Vec<ServiceType> {
        Vec::new()
    }

    /// Initialize the service; every dependency is already initialized
    fn init(&mut self, _services: &ServiceContext<'_>) -> Result<()> {
        Ok(())
    }

    fn pre_update(&mut self, _delta_time: f64) {}

    fn update(&mut self, _delta_time: f64) {}

    fn post_update(&mut self, _delta_time: f64) {}

    /// Called in reverse init order
    fn shutdown(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
