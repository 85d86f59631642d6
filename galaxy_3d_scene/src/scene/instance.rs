//! Entity and component instances: the live counterparts of resources.
//!
//! Instances live in the Scene's slot maps and are addressed by stable keys.
//! Framework data (IDs, hierarchy, links) is kept next to the user behavior
//! (`ComponentInstance`) so that user code never sees the builder side.

use std::any::Any;
use slotmap::new_key_type;
use crate::error::Result;
use crate::resource::{ComponentResource, PointerProperty};

// ===== SLOT MAP KEYS =====

new_key_type! {
    /// Stable key for an EntityInstance within a Scene.
    ///
    /// A key becomes invalid only when its own entity is destroyed.
    pub struct EntityInstanceKey;

    /// Stable key for a component instance within a Scene.
    pub struct ComponentInstanceKey;

    /// Handle to an ID-based reference held outside the instance tree.
    ///
    /// Resolves to an instance once one with the tracked ID is committed,
    /// and back to nothing when that instance is destroyed.
    pub struct WeakInstanceRef;
}

/// Key of any live instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    Entity(EntityInstanceKey),
    Component(ComponentInstanceKey),
}

impl InstanceKey {
    pub fn as_entity(self) -> Option<EntityInstanceKey> {
        match self {
            InstanceKey::Entity(key) => Some(key),
            InstanceKey::Component(_) => None,
        }
    }

    pub fn as_component(self) -> Option<ComponentInstanceKey> {
        match self {
            InstanceKey::Component(key) => Some(key),
            InstanceKey::Entity(_) => None,
        }
    }
}

// ===== ENTITY INSTANCE =====

/// A spawned entity: a node of the instance tree.
#[derive(Debug, Clone)]
pub struct EntityInstance {
    id: String,
    resource_id: String,
    parent: Option<EntityInstanceKey>,
    children: Vec<EntityInstanceKey>,
    components: Vec<ComponentInstanceKey>,
}

impl EntityInstance {
    pub(crate) fn new(id: String, resource_id: String, parent: Option<EntityInstanceKey>) -> Self {
        Self {
            id,
            resource_id,
            parent,
            children: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Unique instance ID (`<resource>_instance`, suffixed on collision)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// ID of the entity resource this instance was spawned from
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Parent entity, `None` for root entities
    pub fn parent(&self) -> Option<EntityInstanceKey> {
        self.parent
    }

    /// Child entities, in resource order
    pub fn children(&self) -> &[EntityInstanceKey] {
        &self.children
    }

    /// Components, in resource order
    pub fn components(&self) -> &[ComponentInstanceKey] {
        &self.components
    }

    pub(crate) fn add_child(&mut self, child: EntityInstanceKey) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: EntityInstanceKey) {
        self.children.retain(|c| *c != child);
    }

    pub(crate) fn add_component(&mut self, component: ComponentInstanceKey) {
        self.components.push(component);
    }
}

// ===== LINKS =====

/// What a pointer link resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Component,
    Entity,
}

/// A pointer property of a component, carried to its instance.
///
/// `resolved` is filled in by the spawn pipeline once the instance path has
/// been resolved against the live instance tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceLink {
    property: String,
    path: String,
    target: String,
    kind: LinkKind,
    resolved: Option<InstanceKey>,
}

impl InstanceLink {
    pub(crate) fn from_pointer(pointer: &PointerProperty) -> Self {
        match pointer {
            PointerProperty::Component(property, ptr) => Self {
                property: property.clone(),
                path: ptr.path().to_string(),
                target: ptr.target().to_string(),
                kind: LinkKind::Component,
                resolved: None,
            },
            PointerProperty::Entity(property, ptr) => Self {
                property: property.clone(),
                path: ptr.path().to_string(),
                target: ptr.target().to_string(),
                kind: LinkKind::Entity,
                resolved: None,
            },
        }
    }

    /// Property path of the pointer in the component resource
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Instance path to resolve
    pub fn path(&self) -> &str {
        &self.path
    }

    /// ID of the pointed-to resource
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Resolved instance, once the pointer pass has run
    pub fn resolved(&self) -> Option<InstanceKey> {
        self.resolved
    }

    pub(crate) fn set_resolved(&mut self, key: InstanceKey) {
        self.resolved = Some(key);
    }
}

// ===== COMPONENT BEHAVIOR =====

/// Data handed to a component instance during initialization
pub struct InitContext<'a> {
    pub(crate) id: &'a str,
    pub(crate) entity: EntityInstanceKey,
    pub(crate) resource: &'a ComponentResource,
    pub(crate) links: &'a [InstanceLink],
}

impl<'a> InitContext<'a> {
    /// ID of the instance being initialized
    pub fn id(&self) -> &str {
        self.id
    }

    /// Entity owning the instance
    pub fn entity(&self) -> EntityInstanceKey {
        self.entity
    }

    /// Resource the instance was created from (the clone, if overridden)
    pub fn resource(&self) -> &ComponentResource {
        self.resource
    }

    /// Resolved component pointer stored at `property`
    pub fn component_link(&self, property: &str) -> Option<ComponentInstanceKey> {
        self.link(property).and_then(InstanceKey::as_component)
    }

    /// Resolved entity pointer stored at `property`
    pub fn entity_link(&self, property: &str) -> Option<EntityInstanceKey> {
        self.link(property).and_then(InstanceKey::as_entity)
    }

    fn link(&self, property: &str) -> Option<InstanceKey> {
        self.links.iter()
            .find(|l| l.property() == property)
            .and_then(|l| l.resolved())
    }
}

/// Behavior of a spawned component.
///
/// Implementations are built by the constructor registered for their type
/// name. All hooks have empty defaults except the downcast helpers.
pub trait ComponentInstance: Any + Send {
    /// Called once after all pointers are resolved, in dependency order
    fn init(&mut self, _context: &InitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called by `Scene::update`, parents before children
    fn update(&mut self, _delta_time: f64) {}

    /// Called when the owning entity is destroyed, in reverse init order
    fn shutdown(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ===== COMPONENT SLOT =====

/// A spawned component: framework data plus the user behavior.
pub struct ComponentSlot {
    id: String,
    entity: EntityInstanceKey,
    resource_id: String,
    original_id: String,
    type_name: String,
    links: Vec<InstanceLink>,
    init_order: Option<u64>,
    instance: Box<dyn ComponentInstance>,
}

impl ComponentSlot {
    pub(crate) fn new(
        id: String,
        entity: EntityInstanceKey,
        resource: &ComponentResource,
        instance: Box<dyn ComponentInstance>,
    ) -> Self {
        Self {
            id,
            entity,
            resource_id: resource.id().to_string(),
            original_id: resource.original_id().to_string(),
            type_name: resource.type_name().to_string(),
            links: resource.pointers().iter().map(InstanceLink::from_pointer).collect(),
            init_order: None,
            instance,
        }
    }

    /// Unique instance ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Entity owning this component
    pub fn entity(&self) -> EntityInstanceKey {
        self.entity
    }

    /// ID of the resource the instance was created from (a clone ID if overridden)
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// ID of the original (non-cloned) component resource
    pub fn original_id(&self) -> &str {
        &self.original_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Pointer links, resolved after a successful spawn
    pub fn links(&self) -> &[InstanceLink] {
        &self.links
    }

    /// Link stored at a property path
    pub fn link(&self, property: &str) -> Option<&InstanceLink> {
        self.links.iter().find(|l| l.property() == property)
    }

    /// Position in the scene-wide init sequence, `None` until initialized
    pub fn init_order(&self) -> Option<u64> {
        self.init_order
    }

    pub fn instance(&self) -> &dyn ComponentInstance {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> &mut dyn ComponentInstance {
        self.instance.as_mut()
    }

    /// Downcast the behavior to a concrete type
    pub fn get<T: ComponentInstance>(&self) -> Option<&T> {
        self.instance.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: ComponentInstance>(&mut self) -> Option<&mut T> {
        self.instance.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn links_mut(&mut self) -> &mut [InstanceLink] {
        &mut self.links
    }

    /// Run the init hook and record its position in the init sequence
    pub(crate) fn initialize(&mut self, resource: &ComponentResource, order: u64) -> Result<()> {
        let context = InitContext {
            id: &self.id,
            entity: self.entity,
            resource,
            links: &self.links,
        };
        self.instance.init(&context)?;
        self.init_order = Some(order);
        Ok(())
    }
}
