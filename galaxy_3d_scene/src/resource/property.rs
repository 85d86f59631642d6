//! Typed property tree for component resources.
//!
//! Component resources describe their data as a tree of [`PropertyValue`]s.
//! This is the small slice of reflection the instantiation engine needs:
//!
//! - get/set by [`PropertyPath`] (`"material/tint/2"`)
//! - enumeration of pointer-valued properties ([`ComponentPtr`], [`EntityPtr`])
//! - deep copy through `Clone`

use std::collections::BTreeMap;
use std::fmt;
use glam::Vec3;
use crate::error::{Error, Result};

// ===== POINTERS =====

/// Resource-level pointer to a component, plus the instance path used to
/// find the matching component instance after spawning.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPtr {
    target: String,
    path: String,
}

impl ComponentPtr {
    /// Point at a component by ID; the instance path is the ID itself
    ///
    /// A single-name path is resolved against every component instance of the
    /// scene, so it only resolves while exactly one instance of the target
    /// exists. A second spawn of the same subtree makes it `Ambiguous`; use
    /// [`ComponentPtr::with_path`] with a relative path for resources spawned more
    /// than once.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self { path: target.clone(), target }
    }

    /// Point at a component with an explicit instance path (e.g. `"../Engine/Motor"`)
    pub fn with_path(target: impl Into<String>, path: impl Into<String>) -> Self {
        Self { target: target.into(), path: path.into() }
    }

    /// ID of the target component resource
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Instance path resolved after spawning
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Resource-level pointer to an entity, plus its instance path.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPtr {
    target: String,
    path: String,
}

impl EntityPtr {
    /// Point at an entity by ID; the instance path is the ID itself
    ///
    /// A single-name path is resolved against every entity instance of the
    /// scene, so it only resolves while exactly one instance of the target
    /// exists. A second spawn of the same subtree makes it `Ambiguous`; use
    /// [`EntityPtr::with_path`] with a relative path for resources spawned more
    /// than once.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self { path: target.clone(), target }
    }

    /// Point at an entity with an explicit instance path (e.g. `"./Wheel:1"`)
    pub fn with_path(target: impl Into<String>, path: impl Into<String>) -> Self {
        Self { target: target.into(), path: path.into() }
    }

    /// ID of the target entity resource
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Instance path resolved after spawning
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A pointer found while walking a property tree
#[derive(Debug, Clone, PartialEq)]
pub enum PointerProperty {
    /// Component pointer found at the given property path
    Component(String, ComponentPtr),
    /// Entity pointer found at the given property path
    Entity(String, EntityPtr),
}

impl PointerProperty {
    /// Property path of the pointer within its component
    pub fn property(&self) -> &str {
        match self {
            PointerProperty::Component(property, _) | PointerProperty::Entity(property, _) => property,
        }
    }

    /// ID of the pointed-to resource
    pub fn target(&self) -> &str {
        match self {
            PointerProperty::Component(_, ptr) => ptr.target(),
            PointerProperty::Entity(_, ptr) => ptr.target(),
        }
    }
}

// ===== VALUES =====

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vec3(Vec3),
    List(Vec<PropertyValue>),
    Struct(BTreeMap<String, PropertyValue>),
    ComponentPtr(ComponentPtr),
    EntityPtr(EntityPtr),
}

impl PropertyValue {
    /// Name of the value kind, used in validation messages
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Vec3(_) => "vec3",
            PropertyValue::List(_) => "list",
            PropertyValue::Struct(_) => "struct",
            PropertyValue::ComponentPtr(_) => "component_ptr",
            PropertyValue::EntityPtr(_) => "entity_ptr",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value; ints are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Check that `value` may replace `self`, coercing ints into float slots
    fn coerce(&self, value: PropertyValue) -> Option<PropertyValue> {
        match (self, value) {
            (PropertyValue::Float(_), PropertyValue::Int(v)) => Some(PropertyValue::Float(v as f64)),
            (current, value) if current.kind() == value.kind() => Some(value),
            _ => None,
        }
    }

    fn collect_pointers(&self, path: &mut Vec<String>, out: &mut Vec<PointerProperty>) {
        match self {
            PropertyValue::ComponentPtr(ptr) => {
                out.push(PointerProperty::Component(path.join("/"), ptr.clone()));
            }
            PropertyValue::EntityPtr(ptr) => {
                out.push(PointerProperty::Entity(path.join("/"), ptr.clone()));
            }
            PropertyValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(index.to_string());
                    item.collect_pointers(path, out);
                    path.pop();
                }
            }
            PropertyValue::Struct(fields) => {
                for (name, field) in fields {
                    path.push(name.clone());
                    field.collect_pointers(path, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<Vec3> for PropertyValue {
    fn from(v: Vec3) -> Self {
        PropertyValue::Vec3(v)
    }
}

impl From<ComponentPtr> for PropertyValue {
    fn from(v: ComponentPtr) -> Self {
        PropertyValue::ComponentPtr(v)
    }
}

impl From<EntityPtr> for PropertyValue {
    fn from(v: EntityPtr) -> Self {
        PropertyValue::EntityPtr(v)
    }
}

// ===== PROPERTY PATH =====

/// Path to a property inside a property tree: struct field names and list
/// indices separated by `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a `/`-separated property path
    ///
    /// # Errors
    ///
    /// Returns [`Error::CloneValidationFailed`] for empty paths or empty segments.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::CloneValidationFailed("empty property path".to_string()));
        }

        let segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::CloneValidationFailed(format!(
                "property path '{}' contains an empty segment", path
            )));
        }

        Ok(Self { segments })
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

// ===== PROPERTIES =====

/// Top-level property set of a component resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    fields: BTreeMap<String, PropertyValue>,
}

impl Properties {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a top-level property (resource construction only)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a top-level property
    pub fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }

    /// Number of top-level properties
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over top-level properties in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a (possibly nested) property by path
    pub fn get(&self, path: &PropertyPath) -> Option<&PropertyValue> {
        let (first, rest) = path.segments.split_first()?;
        let mut current = self.fields.get(first)?;

        for segment in rest {
            current = match current {
                PropertyValue::Struct(fields) => fields.get(segment)?,
                PropertyValue::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Replace an existing (possibly nested) property.
    ///
    /// The property must already exist and the new value must be of the same
    /// kind (an int may be written into a float property).
    ///
    /// # Errors
    ///
    /// Returns [`Error::CloneValidationFailed`] if the path does not exist or
    /// the value kind does not match.
    pub fn set(&mut self, path: &PropertyPath, value: PropertyValue) -> Result<()> {
        let slot = self.get_mut(path).ok_or_else(|| {
            Error::CloneValidationFailed(format!("property '{}' not found", path))
        })?;

        let value_kind = value.kind();
        let coerced = slot.coerce(value).ok_or_else(|| {
            Error::CloneValidationFailed(format!(
                "property '{}' is of type {} but value is of type {}",
                path, slot.kind(), value_kind
            ))
        })?;

        *slot = coerced;
        Ok(())
    }

    /// All pointer-valued properties, depth-first in name order
    pub fn pointers(&self) -> Vec<PointerProperty> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        for (name, value) in &self.fields {
            path.push(name.clone());
            value.collect_pointers(&mut path, &mut out);
            path.pop();
        }
        out
    }

    fn get_mut(&mut self, path: &PropertyPath) -> Option<&mut PropertyValue> {
        let (first, rest) = path.segments.split_first()?;
        let mut current = self.fields.get_mut(first)?;

        for segment in rest {
            current = match current {
                PropertyValue::Struct(fields) => fields.get_mut(segment)?,
                PropertyValue::List(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }
}

#[cfg(test)]
#[path = "property_tests.rs"]
mod tests;
