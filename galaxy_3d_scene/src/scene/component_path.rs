/// Structural address of a component occurrence inside a root entity resource.
///
/// The same component resource can appear at several places in one entity
/// tree (every `Wheel` child carries its own `WheelComp`). An override must
/// target exactly one occurrence, so it is keyed by the chain of child
/// indices leading from the root entity to the owning entity, plus the
/// component ID.

use std::fmt;
use crate::error::{Error, PathError, Result};
use crate::resource::{EntityResource, ResourceManager};
use super::instance_path::{InstancePath, PathSegment};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentResourcePath {
    child_indices: Vec<usize>,
    component: String,
}

impl ComponentResourcePath {
    pub(crate) fn new(child_indices: Vec<usize>, component: impl Into<String>) -> Self {
        Self {
            child_indices,
            component: component.into(),
        }
    }

    /// Resolve override target text against a root entity resource.
    ///
    /// Accepted forms: `Motor` (component of the root), `./Wheel:1/WheelComp`,
    /// or absolute paths starting with the root entity ID (`Car/Body/Paint`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolutionFailed`] with the reason the path does
    /// not address a component of the subtree.
    pub fn resolve(root: &EntityResource, text: &str, resources: &ResourceManager) -> Result<Self> {
        let path = InstancePath::parse(text).map_err(|reason| Error::path(text, reason))?;
        let fail = |reason: PathError| Error::path(text, reason);

        let (component, entity_segments) = match path.segments().split_last() {
            Some((PathSegment::Child { name, index: None }, rest)) => (name.as_str(), rest),
            _ => return Err(fail(PathError::InvalidSyntax(
                "last segment must name a component".to_string()
            ))),
        };

        // Stack of (entity, index in its parent's children); the root has no index
        let mut stack: Vec<(&EntityResource, Option<usize>)> = vec![(root, None)];

        for (position, segment) in entity_segments.iter().enumerate() {
            match segment {
                PathSegment::Current => {}
                PathSegment::Parent => {
                    if stack.len() == 1 {
                        return Err(fail(PathError::NoParent));
                    }
                    stack.pop();
                }
                PathSegment::Child { name, index } => {
                    // A leading root ID makes the path absolute
                    if position == 0 && index.is_none() && name == root.id() {
                        continue;
                    }

                    let current = stack[stack.len() - 1].0;
                    let child_index = select_child(current, name, *index).map_err(fail)?;
                    let child_id = &current.children()[child_index];
                    let child = resources.entity(child_id).ok_or_else(|| {
                        fail(PathError::ChildNotFound(child_id.clone()))
                    })?;
                    stack.push((child, Some(child_index)));
                }
            }
        }

        let owner = stack[stack.len() - 1].0;
        if !owner.components().iter().any(|c| c == component) {
            return Err(fail(PathError::ComponentNotFound(component.to_string())));
        }

        Ok(Self {
            child_indices: stack.iter().filter_map(|(_, index)| *index).collect(),
            component: component.to_string(),
        })
    }

    /// Child indices from the root entity to the owning entity
    pub fn child_indices(&self) -> &[usize] {
        &self.child_indices
    }

    /// ID of the component resource (original, never a clone ID)
    pub fn component(&self) -> &str {
        &self.component
    }
}

impl fmt::Display for ComponentResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".")?;
        for index in &self.child_indices {
            write!(f, "/{}", index)?;
        }
        write!(f, "/{}", self.component)
    }
}

/// Position in `entity.children()` of the child matching `name` / `name:index`
pub(crate) fn select_child(entity: &EntityResource, name: &str, index: Option<usize>) -> std::result::Result<usize, PathError> {
    let matches: Vec<usize> = entity.children().iter()
        .enumerate()
        .filter(|(_, child)| *child == name)
        .map(|(i, _)| i)
        .collect();

    pick_match(&matches, name, index)
}

/// Apply the child-matching rules to the list of matches of one segment
pub(crate) fn pick_match<T: Copy>(matches: &[T], name: &str, index: Option<usize>) -> std::result::Result<T, PathError> {
    match index {
        None => match matches {
            [] => Err(PathError::ChildNotFound(name.to_string())),
            [single] => Ok(*single),
            _ => Err(PathError::AmbiguousChild { name: name.to_string(), count: matches.len() }),
        },
        Some(index) => matches.get(index).copied().ok_or_else(|| {
            if matches.is_empty() {
                PathError::ChildNotFound(name.to_string())
            } else {
                PathError::IndexOutOfRange { name: name.to_string(), index, count: matches.len() }
            }
        }),
    }
}

#[cfg(test)]
#[path = "component_path_tests.rs"]
mod tests;
