//! PathResolver: resolves instance paths against the live instance tree.
//!
//! A path is resolved from the entity owning the component that holds the
//! pointer. Single-segment paths are shortcuts searched over every instance
//! of the named resource; longer paths start at `.`, `..` or a root entity
//! and walk the hierarchy one segment at a time.

use slotmap::SlotMap;
use crate::error::{Error, PathError, Result};
use super::component_path::pick_match;
use super::instance::{
    ComponentInstanceKey, ComponentSlot, EntityInstance, EntityInstanceKey,
    InstanceKey, LinkKind,
};
use super::instance_path::{InstancePath, PathSegment};

type PathResult<T> = std::result::Result<T, PathError>;

/// Read-only view over a scene's instances
pub struct PathResolver<'a> {
    entities: &'a SlotMap<EntityInstanceKey, EntityInstance>,
    components: &'a SlotMap<ComponentInstanceKey, ComponentSlot>,
    roots: &'a [EntityInstanceKey],
}

impl<'a> PathResolver<'a> {
    /// `roots` lists the root entities that absolute paths may start from,
    /// in spawn order
    pub fn new(
        entities: &'a SlotMap<EntityInstanceKey, EntityInstance>,
        components: &'a SlotMap<ComponentInstanceKey, ComponentSlot>,
        roots: &'a [EntityInstanceKey],
    ) -> Self {
        Self { entities, components, roots }
    }

    /// Resolve a path to an entity or a component depending on `kind`
    pub fn resolve(&self, source: EntityInstanceKey, path: &str, kind: LinkKind) -> Result<InstanceKey> {
        match kind {
            LinkKind::Entity => self.resolve_entity(source, path).map(InstanceKey::Entity),
            LinkKind::Component => self.resolve_component(source, path).map(InstanceKey::Component),
        }
    }

    /// Resolve a path whose target is an entity
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolutionFailed`] with the failure reason.
    pub fn resolve_entity(&self, source: EntityInstanceKey, path: &str) -> Result<EntityInstanceKey> {
        let parsed = InstancePath::parse(path).map_err(|reason| Error::path(path, reason))?;

        let result = match parsed.shortcut() {
            Some(name) => {
                let matches: Vec<EntityInstanceKey> = self.entities.iter()
                    .filter(|(_, e)| e.resource_id() == name)
                    .map(|(key, _)| key)
                    .collect();
                single(matches, name)
            }
            None => self.walk(source, parsed.segments()),
        };

        result.map_err(|reason| Error::path(path, reason))
    }

    /// Resolve a path whose target is a component
    ///
    /// The last segment is matched against the original resource ID of each
    /// component, so overridden (cloned) components resolve like the rest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolutionFailed`] with the failure reason.
    pub fn resolve_component(&self, source: EntityInstanceKey, path: &str) -> Result<ComponentInstanceKey> {
        let parsed = InstancePath::parse(path).map_err(|reason| Error::path(path, reason))?;

        let result = match parsed.shortcut() {
            Some(name) => {
                let matches: Vec<ComponentInstanceKey> = self.components.iter()
                    .filter(|(_, c)| c.original_id() == name)
                    .map(|(key, _)| key)
                    .collect();
                single(matches, name)
            }
            None => self.walk_to_component(source, parsed.segments()),
        };

        result.map_err(|reason| Error::path(path, reason))
    }

    fn walk_to_component(&self, source: EntityInstanceKey, segments: &[PathSegment]) -> PathResult<ComponentInstanceKey> {
        let (component, entity_segments) = match segments.split_last() {
            Some((PathSegment::Child { name, index: None }, rest)) => (name.as_str(), rest),
            _ => return Err(PathError::InvalidSyntax("last segment must name a component".to_string())),
        };

        let owner = self.walk(source, entity_segments)?;
        self.entity(owner)?.components().iter()
            .copied()
            .find(|key| {
                self.components.get(*key)
                    .map(|c| c.original_id() == component)
                    .unwrap_or(false)
            })
            .ok_or_else(|| PathError::ComponentNotFound(component.to_string()))
    }

    /// Walk entity segments starting at `source`
    fn walk(&self, source: EntityInstanceKey, segments: &[PathSegment]) -> PathResult<EntityInstanceKey> {
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return Ok(source),
        };

        let mut current = match first {
            PathSegment::Current => source,
            PathSegment::Parent => self.parent_of(source)?,
            PathSegment::Child { name, index } => self.root(name, *index)?,
        };

        for segment in rest {
            current = match segment {
                PathSegment::Current => current,
                PathSegment::Parent => self.parent_of(current)?,
                PathSegment::Child { name, index } => {
                    let matches: Vec<EntityInstanceKey> = self.entity(current)?.children().iter()
                        .copied()
                        .filter(|key| {
                            self.entities.get(*key)
                                .map(|e| e.resource_id() == name)
                                .unwrap_or(false)
                        })
                        .collect();
                    pick_match(&matches, name, *index)?
                }
            };
        }

        Ok(current)
    }

    /// Root entity named by the first segment of an absolute path.
    ///
    /// An instance ID selects that root; otherwise the name is a resource ID
    /// and `name:index` picks among the roots spawned from it.
    fn root(&self, name: &str, index: Option<usize>) -> PathResult<EntityInstanceKey> {
        if index.is_none() {
            let by_id = self.roots.iter().copied().find(|key| {
                self.entities.get(*key).map(|e| e.id() == name).unwrap_or(false)
            });
            if let Some(key) = by_id {
                return Ok(key);
            }
        }

        let matches: Vec<EntityInstanceKey> = self.roots.iter()
            .copied()
            .filter(|key| {
                self.entities.get(*key)
                    .map(|e| e.resource_id() == name)
                    .unwrap_or(false)
            })
            .collect();

        match pick_match(&matches, name, index) {
            Err(PathError::ChildNotFound(_)) => Err(PathError::UnknownRoot(name.to_string())),
            Err(PathError::AmbiguousChild { name, count }) => Err(PathError::Ambiguous { name, count }),
            other => other,
        }
    }

    fn parent_of(&self, key: EntityInstanceKey) -> PathResult<EntityInstanceKey> {
        self.entity(key)?.parent().ok_or(PathError::NoParent)
    }

    fn entity(&self, key: EntityInstanceKey) -> PathResult<&'a EntityInstance> {
        self.entities.get(key)
            .ok_or_else(|| PathError::NotFound(format!("{:?}", key)))
    }
}

fn single<K: Copy>(matches: Vec<K>, name: &str) -> PathResult<K> {
    match matches.as_slice() {
        [] => Err(PathError::NotFound(name.to_string())),
        [key] => Ok(*key),
        _ => Err(PathError::Ambiguous { name: name.to_string(), count: matches.len() }),
    }
}

#[cfg(test)]
#[path = "path_resolver_tests.rs"]
mod tests;
