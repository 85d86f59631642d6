//! Graph item for services: edges follow declared type dependencies.

use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::graph::GraphItem;

/// Lookup data for [`ServiceObjectGraphItem::pointees`]
pub struct ServiceGraphContext<'c> {
    /// Names of every registered service type
    pub registered: &'c FxHashSet<&'static str>,
}

/// A service as seen by the object graph
pub struct ServiceObjectGraphItem {
    name: &'static str,
    dependencies: Vec<&'static str>,
}

impl ServiceObjectGraphItem {
    pub fn new(name: &'static str, dependencies: Vec<&'static str>) -> Self {
        Self { name, dependencies }
    }
}

impl GraphItem for ServiceObjectGraphItem {
    type Context<'c> = ServiceGraphContext<'c>;

    fn id(&self) -> &str {
        self.name
    }

    fn pointees(&self, context: &Self::Context<'_>) -> Result<Vec<String>> {
        let mut pointees = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            if !context.registered.contains(dependency) {
                let message = format!(
                    "Service '{}' depends on '{}', which is not registered",
                    self.name, dependency
                );
                crate::engine_error!("galaxy3d::ServiceManager", "{}", message);
                return Err(Error::InitializationFailed(message));
            }
            pointees.push(dependency.to_string());
        }
        Ok(pointees)
    }
}
