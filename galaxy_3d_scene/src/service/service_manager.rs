/// Central service manager for the engine.
///
/// Owns every registered service, orders them with an ObjectGraph built from
/// their declared dependencies, and drives their lifecycle:
/// init (dependencies first), per-frame updates, shutdown (reverse order).

use std::any::TypeId;
use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graph::ObjectGraph;
use super::service::{Service, ServiceContext};
use super::service_graph_item::{ServiceObjectGraphItem, ServiceGraphContext};

/// Service manager singleton (managed by Engine)
pub struct ServiceManager {
    /// Services, in init order once `init` has run
    services: Vec<Box<dyn Service>>,
    /// Number of services successfully initialized
    initialized: usize,
}

impl ServiceManager {
    /// Create a new empty service manager
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
            initialized: 0,
        }
    }

    /// Register a service
    ///
    /// # Errors
    ///
    /// Returns an error if a service of the same type is already registered,
    /// or if services are already initialized.
    pub fn register<S: Service>(&mut self, service: S) -> Result<()> {
        if self.is_initialized() {
            engine_bail!("galaxy3d::ServiceManager",
                "Cannot register '{}' after services are initialized", std::any::type_name::<S>());
        }
        if self.services.iter().any(|s| s.as_any().type_id() == TypeId::of::<S>()) {
            engine_bail!("galaxy3d::ServiceManager",
                "Service '{}' already registered", std::any::type_name::<S>());
        }

        self.services.push(Box::new(service));
        Ok(())
    }

    /// Sort services by dependency and initialize them in order
    ///
    /// On failure, services initialized so far are shut down again in
    /// reverse order.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown dependencies, dependency cycles, or the
    /// first service whose init fails.
    pub fn init(&mut self) -> Result<()> {
        if self.is_initialized() {
            engine_bail!("galaxy3d::ServiceManager", "Services already initialized");
        }

        self.sort_by_dependencies()?;

        for index in 0..self.services.len() {
            let (initialized, rest) = self.services.split_at_mut(index);
            let service = &mut rest[0];
            let name = service.type_name();

            let context = ServiceContext { initialized };
            if let Err(error) = service.init(&context) {
                crate::engine_error!("galaxy3d::ServiceManager",
                    "Failed to initialize service '{}': {}", name, error);
                self.shutdown();
                return Err(Error::InitializationFailed(
                    format!("service '{}': {}", name, error)
                ));
            }

            self.initialized = index + 1;
            crate::engine_info!("galaxy3d::ServiceManager", "Initialized service '{}'", name);
        }

        Ok(())
    }

    /// Reorder `services` so that dependencies come first
    fn sort_by_dependencies(&mut self) -> Result<()> {
        let registered: FxHashSet<&'static str> = self.services.iter()
            .map(|s| s.type_name())
            .collect();
        let context = ServiceGraphContext { registered: &registered };

        let graph = ObjectGraph::<ServiceObjectGraphItem>::build(
            self.services.iter(),
            |service| Ok(ServiceObjectGraphItem::new(
                service.type_name(),
                service.dependencies().iter().map(|d| d.name()).collect(),
            )),
            &context,
        )?;

        let order: Vec<String> = graph.sorted_nodes().iter()
            .map(|node| node.id().to_string())
            .collect();

        let mut pending: Vec<Option<Box<dyn Service>>> = self.services.drain(..).map(Some).collect();
        for id in &order {
            if let Some(slot) = pending.iter_mut()
                .find(|s| s.as_ref().map(|s| s.type_name()) == Some(id.as_str()))
            {
                if let Some(service) = slot.take() {
                    self.services.push(service);
                }
            }
        }
        Ok(())
    }

    /// Call `pre_update` on every initialized service, in init order
    pub fn pre_update(&mut self, delta_time: f64) {
        for service in self.services.iter_mut().take(self.initialized) {
            service.pre_update(delta_time);
        }
    }

    /// Call `update` on every initialized service, in init order
    pub fn update(&mut self, delta_time: f64) {
        for service in self.services.iter_mut().take(self.initialized) {
            service.update(delta_time);
        }
    }

    /// Call `post_update` on every initialized service, in init order
    pub fn post_update(&mut self, delta_time: f64) {
        for service in self.services.iter_mut().take(self.initialized) {
            service.post_update(delta_time);
        }
    }

    /// Shut down initialized services in reverse init order
    pub fn shutdown(&mut self) {
        for index in (0..self.initialized).rev() {
            let service = &mut self.services[index];
            service.shutdown();
            crate::engine_info!("galaxy3d::ServiceManager",
                "Shut down service '{}'", service.type_name());
        }
        self.initialized = 0;
    }

    /// Get a service by type
    pub fn service<S: Service>(&self) -> Option<&S> {
        self.services.iter().find_map(|s| s.as_any().downcast_ref::<S>())
    }

    /// Get a mutable service by type
    pub fn service_mut<S: Service>(&mut self) -> Option<&mut S> {
        self.services.iter_mut().find_map(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// Service type names, in init order once initialized
    pub fn service_names(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.type_name()).collect()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized > 0
    }
}

impl Drop for ServiceManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "service_manager_tests.rs"]
mod tests;
