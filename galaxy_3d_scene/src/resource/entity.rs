//! Entity, component and root-entity resources.
//!
//! Resources are immutable templates. Spawning turns them into instances;
//! per-spawn overrides never touch them (see `InstanceCloner`).

use super::property::{Properties, PropertyValue, PointerProperty};

// ===== ENTITY RESOURCE =====

/// Template for an entity: an ordered list of child entities and components.
///
/// Children are referenced by ID. The same child ID may appear more than once
/// (a car listing `Wheel` four times); each occurrence spawns its own instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityResource {
    id: String,
    children: Vec<String>,
    components: Vec<String>,
}

impl EntityResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Append a child entity reference
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a component reference
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }
}

// ===== COMPONENT RESOURCE =====

/// Template for a component: a registered type name plus a property tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentResource {
    id: String,
    type_name: String,
    properties: Properties,
    /// Set on per-spawn clones; names the component this one was cloned from
    original_id: Option<String>,
}

impl ComponentResource {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            properties: Properties::new(),
            original_id: None,
        }
    }

    /// Add a property (builder form of [`Properties::insert`])
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the registered component type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// ID of the component this resource represents: its own ID, or the
    /// original's ID for a per-spawn clone
    pub fn original_id(&self) -> &str {
        self.original_id.as_deref().unwrap_or(&self.id)
    }

    /// Whether this resource is a per-spawn clone
    pub fn is_clone(&self) -> bool {
        self.original_id.is_some()
    }

    /// Pointer-valued properties of this component
    pub fn pointers(&self) -> Vec<PointerProperty> {
        self.properties.pointers()
    }

    /// Deep copy under a new ID, remembering where it came from
    pub(crate) fn clone_as(&self, id: String) -> Self {
        Self {
            id,
            type_name: self.type_name.clone(),
            properties: self.properties.clone(),
            original_id: Some(self.original_id().to_string()),
        }
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

// ===== ROOT ENTITY =====

/// A per-spawn override: set `property` on the component found at `target`.
///
/// `target` is a component path relative to the root entity resource, e.g.
/// `"./Wheel:1/WheelComp"` or `"Motor"`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceProperty {
    target: String,
    property: String,
    value: PropertyValue,
}

impl InstanceProperty {
    pub fn new(target: impl Into<String>, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Component path of the override target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Property path inside the target component
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

/// An entity resource to spawn at top level, plus its per-spawn overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RootEntity {
    entity: String,
    instance_properties: Vec<InstanceProperty>,
}

impl RootEntity {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            instance_properties: Vec::new(),
        }
    }

    /// Add an override applied only to this spawn
    pub fn with_override(mut self, property: InstanceProperty) -> Self {
        self.instance_properties.push(property);
        self
    }

    /// ID of the entity resource to spawn
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn instance_properties(&self) -> &[InstanceProperty] {
        &self.instance_properties
    }
}
