/// Central resource manager for the engine.
///
/// Stores the entity and component resources that scenes spawn from, plus the
/// component type registry used to build instances.
/// IDs are unique across entities and components.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::engine_bail;
use crate::scene::ComponentInstance;
use super::component_factory::ComponentFactory;
use super::entity::{EntityResource, ComponentResource};

/// Resource manager singleton (managed by Engine)
pub struct ResourceManager {
    entities: FxHashMap<String, EntityResource>,
    components: FxHashMap<String, ComponentResource>,
    component_factory: ComponentFactory,
}

impl ResourceManager {
    /// Create a new empty resource manager
    pub fn new() -> Self {
        Self {
            entities: FxHashMap::default(),
            components: FxHashMap::default(),
            component_factory: ComponentFactory::new(),
        }
    }

    // ===== ENTITIES =====

    /// Add an entity resource
    ///
    /// # Errors
    ///
    /// Returns an error if any resource with the same ID already exists.
    pub fn create_entity(&mut self, resource: EntityResource) -> Result<&EntityResource> {
        let id = resource.id().to_string();
        if self.contains(&id) {
            engine_bail!("galaxy3d::ResourceManager",
                "Resource '{}' already exists", id);
        }

        self.entities.insert(id.clone(), resource);
        Ok(self.entities.get(&id).unwrap())
    }

    pub fn entity(&self, id: &str) -> Option<&EntityResource> {
        self.entities.get(id)
    }

    pub fn remove_entity(&mut self, id: &str) -> Option<EntityResource> {
        self.entities.remove(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|k| k.as_str()).collect()
    }

    // ===== COMPONENTS =====

    /// Add a component resource
    ///
    /// # Errors
    ///
    /// Returns an error if any resource with the same ID already exists.
    pub fn create_component(&mut self, resource: ComponentResource) -> Result<&ComponentResource> {
        let id = resource.id().to_string();
        if self.contains(&id) {
            engine_bail!("galaxy3d::ResourceManager",
                "Resource '{}' already exists", id);
        }

        self.components.insert(id.clone(), resource);
        Ok(self.components.get(&id).unwrap())
    }

    pub fn component(&self, id: &str) -> Option<&ComponentResource> {
        self.components.get(id)
    }

    pub fn remove_component(&mut self, id: &str) -> Option<ComponentResource> {
        self.components.remove(id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.keys().map(|k| k.as_str()).collect()
    }

    // ===== COMPONENT TYPES =====

    /// Register a component type (see [`ComponentFactory::register`])
    pub fn register_component_type<F>(&mut self, type_name: &str, dependencies: &[&str], constructor: F) -> Result<()>
    where
        F: Fn(&ComponentResource) -> Result<Box<dyn ComponentInstance>> + Send + Sync + 'static,
    {
        self.component_factory.register(type_name, dependencies, constructor)
    }

    pub fn component_factory(&self) -> &ComponentFactory {
        &self.component_factory
    }

    pub fn component_factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.component_factory
    }

    // ===== QUERIES =====

    /// Whether an entity or component with this ID exists
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id) || self.components.contains_key(id)
    }

    /// Collect the IDs of every resource reachable from an entity: children,
    /// components and pointer targets, recursively. Pointees come before the
    /// objects pointing at them; the root comes last.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or any referenced resource does not exist.
    pub fn collect_objects(&self, root_id: &str) -> Result<Vec<String>> {
        if !self.entities.contains_key(root_id) {
            engine_bail!("galaxy3d::ResourceManager",
                "Entity '{}' not found", root_id);
        }

        let mut visited = FxHashSet::default();
        let mut objects = Vec::new();
        self.collect_recursive(root_id, &mut visited, &mut objects)?;
        Ok(objects)
    }

    /// Collect the resources reachable through the pointers of `component`,
    /// which may be a clone not stored in this manager.
    ///
    /// IDs already in `visited` are skipped; new IDs are added to it and
    /// returned with pointees first.
    ///
    /// # Errors
    ///
    /// Returns an error if a pointer target or anything it reaches does not exist.
    pub fn collect_pointer_targets(
        &self,
        component: &ComponentResource,
        visited: &mut FxHashSet<String>,
    ) -> Result<Vec<String>> {
        let mut objects = Vec::new();
        for pointer in component.pointers() {
            if !self.contains(pointer.target()) {
                engine_bail!("galaxy3d::ResourceManager",
                    "Resource '{}' referenced by '{}' not found", pointer.target(), component.id());
            }
            self.collect_recursive(pointer.target(), visited, &mut objects)?;
        }
        Ok(objects)
    }

    fn collect_recursive(
        &self,
        id: &str,
        visited: &mut FxHashSet<String>,
        objects: &mut Vec<String>,
    ) -> Result<()> {
        if !visited.insert(id.to_string()) {
            return Ok(());
        }

        let pointees: Vec<String> = if let Some(entity) = self.entities.get(id) {
            entity.children().iter()
                .chain(entity.components().iter())
                .cloned()
                .collect()
        } else if let Some(component) = self.components.get(id) {
            component.pointers().iter()
                .map(|p| p.target().to_string())
                .collect()
        } else {
            engine_bail!("galaxy3d::ResourceManager",
                "Resource '{}' not found", id);
        };

        for pointee in &pointees {
            if !self.contains(pointee) {
                engine_bail!("galaxy3d::ResourceManager",
                    "Resource '{}' referenced by '{}' not found", pointee, id);
            }
            self.collect_recursive(pointee, visited, objects)?;
        }

        objects.push(id.to_string());
        Ok(())
    }

    /// Remove all resources (registered component types are kept)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
