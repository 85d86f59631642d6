//! Registry of component types.
//!
//! A component type is a name, the names of the types it depends on (their
//! instances are initialized first), and a constructor turning a component
//! resource into a live [`ComponentInstance`].

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::scene::ComponentInstance;
use super::entity::ComponentResource;

/// Constructor for a component type
pub type ComponentConstructor =
    Box<dyn Fn(&ComponentResource) -> Result<Box<dyn ComponentInstance>> + Send + Sync>;

struct ComponentType {
    dependencies: Vec<String>,
    constructor: ComponentConstructor,
}

/// Maps component type names to their constructor and type dependencies
#[derive(Default)]
pub struct ComponentFactory {
    types: FxHashMap<String, ComponentType>,
}

impl ComponentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type
    ///
    /// # Errors
    ///
    /// Returns an error if a type with the same name is already registered.
    pub fn register<F>(&mut self, type_name: &str, dependencies: &[&str], constructor: F) -> Result<()>
    where
        F: Fn(&ComponentResource) -> Result<Box<dyn ComponentInstance>> + Send + Sync + 'static,
    {
        if self.types.contains_key(type_name) {
            crate::engine_bail!("galaxy3d::ComponentFactory",
                "Component type '{}' already registered", type_name);
        }

        self.types.insert(type_name.to_string(), ComponentType {
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            constructor: Box::new(constructor),
        });

        crate::engine_debug!("galaxy3d::ComponentFactory",
            "Registered component type '{}'", type_name);
        Ok(())
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Type names whose instances must be initialized before instances of `type_name`
    pub fn dependencies(&self, type_name: &str) -> &[String] {
        self.types.get(type_name)
            .map(|t| t.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Construct an instance for a component resource
    ///
    /// # Errors
    ///
    /// Returns an error if the resource type is not registered, or whatever
    /// the constructor returns.
    pub fn create(&self, resource: &ComponentResource) -> Result<Box<dyn ComponentInstance>> {
        let component_type = self.types.get(resource.type_name())
            .ok_or_else(|| crate::engine_err!("galaxy3d::ComponentFactory",
                "Component type '{}' of '{}' is not registered",
                resource.type_name(), resource.id()))?;

        (component_type.constructor)(resource)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(|k| k.as_str()).collect()
    }
}
