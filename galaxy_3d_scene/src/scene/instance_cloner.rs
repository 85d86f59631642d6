//! InstanceCloner: applies per-spawn overrides to private component clones.
//!
//! Shared component resources are never modified. For every overridden
//! component occurrence, the cloner deep-copies the resource under a new
//! unique ID, records the original ID, and applies the override value to the
//! copy. The resulting CloneTable is owned by the spawned root entity and
//! dropped with it.

use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::resource::{ComponentResource, PropertyPath, ResourceManager, RootEntity};
use crate::utils::unique_id;
use super::component_path::ComponentResourcePath;
use super::scene_config::SceneConfig;

/// A clone and the component occurrence it replaces
#[derive(Debug, Clone)]
struct ClonedComponent {
    path: ComponentResourcePath,
    resource: ComponentResource,
}

/// Clones created for one root-entity spawn, keyed by structural path
#[derive(Debug, Clone, Default)]
pub struct CloneTable {
    clones: Vec<ClonedComponent>,
}

impl CloneTable {
    /// Clone replacing the component at `path`, if any
    pub fn find(&self, path: &ComponentResourcePath) -> Option<&ComponentResource> {
        self.clones.iter()
            .find(|c| &c.path == path)
            .map(|c| &c.resource)
    }

    /// Clone with the given (clone) ID
    pub fn component(&self, id: &str) -> Option<&ComponentResource> {
        self.clones.iter()
            .map(|c| &c.resource)
            .find(|r| r.id() == id)
    }

    /// Iterate over the cloned resources
    pub fn iter(&self) -> impl Iterator<Item = &ComponentResource> {
        self.clones.iter().map(|c| &c.resource)
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }
}

/// Builds the clone table of one root-entity spawn
pub struct InstanceCloner<'a> {
    resources: &'a ResourceManager,
    config: &'a SceneConfig,
}

impl<'a> InstanceCloner<'a> {
    pub fn new(resources: &'a ResourceManager, config: &'a SceneConfig) -> Self {
        Self { resources, config }
    }

    /// Clone every component targeted by the root's instance properties.
    ///
    /// Overrides addressing the same occurrence share one clone. `taken_ids`
    /// holds the clone IDs already in use (live and in-flight); new IDs are
    /// added to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolutionFailed`] if a target does not address a
    /// component of the subtree, or [`Error::CloneValidationFailed`] if a
    /// value cannot be applied.
    pub fn clone_overrides(&self, root: &RootEntity, taken_ids: &mut FxHashSet<String>) -> Result<CloneTable> {
        let entity = self.resources.entity(root.entity()).ok_or_else(|| {
            crate::engine_err!("galaxy3d::InstanceCloner", "Entity '{}' not found", root.entity())
        })?;

        let mut table = CloneTable::default();

        for property in root.instance_properties() {
            let path = ComponentResourcePath::resolve(entity, property.target(), self.resources)?;

            let index = match table.clones.iter().position(|c| c.path == path) {
                Some(index) => index,
                None => {
                    let original = self.resources.component(path.component()).ok_or_else(|| {
                        crate::engine_err!("galaxy3d::InstanceCloner",
                            "Component '{}' not found", path.component())
                    })?;

                    let base = self.config.clone_id(original.id());
                    let id = unique_id(&base, |id| taken_ids.contains(id) || self.resources.contains(id));
                    taken_ids.insert(id.clone());

                    crate::engine_trace!("galaxy3d::InstanceCloner",
                        "Cloned '{}' as '{}' for {}", original.id(), id, path);

                    table.clones.push(ClonedComponent {
                        path: path.clone(),
                        resource: original.clone_as(id),
                    });
                    table.clones.len() - 1
                }
            };

            let property_path = PropertyPath::parse(property.property())?;
            let clone = &mut table.clones[index].resource;
            clone.properties_mut()
                .set(&property_path, property.value().clone())
                .map_err(|error| match error {
                    Error::CloneValidationFailed(reason) => Error::CloneValidationFailed(format!(
                        "{} (override of '{}' on '{}')", reason, property.property(), property.target()
                    )),
                    other => other,
                })?;
        }

        Ok(table)
    }
}

#[cfg(test)]
#[path = "instance_cloner_tests.rs"]
mod tests;
