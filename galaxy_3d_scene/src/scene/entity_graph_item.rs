//! Graph item for entity and component resources.
//!
//! Edges:
//! - entity -> its child entities and components
//! - component -> targets of its component/entity pointers
//! - component -> every component whose type its own type depends on
//! - any edge to a resource that has per-spawn clones also goes to each clone

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graph::GraphItem;
use crate::resource::{ComponentResource, ResourceManager};
use super::instance_cloner::CloneTable;

/// Lookup data for [`EntityObjectGraphItem::pointees`]
pub struct EntityGraphContext<'c> {
    resources: &'c ResourceManager,
    clone_tables: &'c [CloneTable],
    components_by_type: FxHashMap<&'c str, Vec<&'c str>>,
    clones_by_original: FxHashMap<&'c str, Vec<&'c str>>,
}

impl<'c> EntityGraphContext<'c> {
    /// Index the graph's components by type and its clones by original ID.
    ///
    /// `objects` are the resource IDs in the graph (clones excluded; they are
    /// taken from `clone_tables`).
    pub fn new(resources: &'c ResourceManager, clone_tables: &'c [CloneTable], objects: &'c [String]) -> Self {
        let mut components_by_type: FxHashMap<&'c str, Vec<&'c str>> = FxHashMap::default();
        let mut clones_by_original: FxHashMap<&'c str, Vec<&'c str>> = FxHashMap::default();

        let originals = objects.iter().filter_map(|id| resources.component(id));
        let clones = clone_tables.iter().flat_map(|table| table.iter());

        for component in originals.chain(clones) {
            components_by_type.entry(component.type_name())
                .or_default()
                .push(component.id());
            if component.is_clone() {
                clones_by_original.entry(component.original_id())
                    .or_default()
                    .push(component.id());
            }
        }

        Self {
            resources,
            clone_tables,
            components_by_type,
            clones_by_original,
        }
    }

    /// Component resource or clone by ID
    pub fn component(&self, id: &str) -> Option<&'c ComponentResource> {
        self.resources.component(id).or_else(|| {
            self.clone_tables.iter().find_map(|table| table.component(id))
        })
    }

    fn clones_of(&self, id: &str) -> &[&'c str] {
        self.clones_by_original.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Entity,
    Component,
}

/// An entity or component resource as seen by the object graph
#[derive(Debug, Clone)]
pub struct EntityObjectGraphItem {
    id: String,
    kind: ResourceKind,
}

impl EntityObjectGraphItem {
    /// Create the item for a resource or clone ID
    pub fn create(id: &str, context: &EntityGraphContext<'_>) -> Result<Self> {
        let kind = if context.resources.entity(id).is_some() {
            ResourceKind::Entity
        } else if context.component(id).is_some() {
            ResourceKind::Component
        } else {
            crate::engine_bail!("galaxy3d::Scene", "Resource '{}' not found", id);
        };

        Ok(Self { id: id.to_string(), kind })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl GraphItem for EntityObjectGraphItem {
    type Context<'c> = EntityGraphContext<'c>;

    fn id(&self) -> &str {
        &self.id
    }

    fn pointees(&self, context: &Self::Context<'_>) -> Result<Vec<String>> {
        let mut direct: Vec<String> = Vec::new();

        match self.kind {
            ResourceKind::Entity => {
                if let Some(entity) = context.resources.entity(&self.id) {
                    direct.extend(entity.children().iter().cloned());
                    direct.extend(entity.components().iter().cloned());
                }
            }
            ResourceKind::Component => {
                let component = match context.component(&self.id) {
                    Some(component) => component,
                    None => crate::engine_bail!("galaxy3d::Scene",
                        "Component '{}' not found", self.id),
                };

                direct.extend(component.pointers().iter().map(|p| p.target().to_string()));

                let dependencies = context.resources.component_factory().dependencies(component.type_name());
                for dependency in dependencies {
                    if let Some(ids) = context.components_by_type.get(dependency.as_str()) {
                        direct.extend(ids.iter()
                            .filter(|id| **id != self.id)
                            .map(|id| id.to_string()));
                    }
                }
            }
        }

        let mut pointees = Vec::with_capacity(direct.len());
        for pointee in direct {
            let clones = context.clones_of(&pointee);
            pointees.push(pointee);
            pointees.extend(clones.iter().map(|c| c.to_string()));
        }
        pointees.retain(|id| id != &self.id);
        Ok(pointees)
    }
}

#[cfg(test)]
#[path = "entity_graph_item_tests.rs"]
mod tests;
