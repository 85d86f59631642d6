/// Tests for ResourceManager
///
/// These tests validate resource registration, lookup, component type
/// registration, and recursive object collection.

use super::*;
use std::any::Any;
use crate::resource::{ComponentPtr, EntityPtr};
use crate::scene::ComponentInstance;

// ============================================================================
// Helper Functions
// ============================================================================

struct Dummy;

impl ComponentInstance for Dummy {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Car { Body, Wheel x2 } with a Motor pointing at a Fuel component and the first wheel
fn create_car_resources() -> ResourceManager {
    let mut rm = ResourceManager::new();
    rm.create_component(ComponentResource::new("Fuel", "FuelTank")).unwrap();
    rm.create_component(
        ComponentResource::new("Motor", "Motor")
            .with_property("tank", ComponentPtr::new("Fuel"))
            .with_property("front", EntityPtr::with_path("Wheel", "./Wheel:0")),
    ).unwrap();
    rm.create_component(ComponentResource::new("WheelComp", "Wheel")).unwrap();
    rm.create_entity(EntityResource::new("Wheel").with_component("WheelComp")).unwrap();
    rm.create_entity(EntityResource::new("Body").with_component("Fuel")).unwrap();
    rm.create_entity(
        EntityResource::new("Car")
            .with_component("Motor")
            .with_child("Body")
            .with_child("Wheel")
            .with_child("Wheel"),
    ).unwrap();
    rm
}

// ============================================================================
// Tests: ResourceManager Creation
// ============================================================================

#[test]
fn test_resource_manager_new() {
    let rm = ResourceManager::new();
    assert_eq!(rm.entity_count(), 0);
    assert_eq!(rm.component_count(), 0);
    assert_eq!(rm.component_factory().type_count(), 0);
}

// ============================================================================
// Tests: Entities and Components
// ============================================================================

#[test]
fn test_create_and_get_resources() {
    let rm = create_car_resources();
    assert_eq!(rm.entity_count(), 3);
    assert_eq!(rm.component_count(), 3);
    assert_eq!(rm.entity("Car").unwrap().children().len(), 3);
    assert_eq!(rm.component("Motor").unwrap().type_name(), "Motor");
    assert!(rm.entity("Motor").is_none());
    assert!(rm.contains("Fuel"));
}

#[test]
fn test_duplicate_id_fails_across_kinds() {
    let mut rm = create_car_resources();

    assert!(rm.create_entity(EntityResource::new("Car")).is_err());
    assert!(rm.create_entity(EntityResource::new("Motor")).is_err());
    assert!(rm.create_component(ComponentResource::new("Wheel", "Wheel")).is_err());
    assert_eq!(rm.entity_count(), 3);
    assert_eq!(rm.component_count(), 3);
}

#[test]
fn test_remove_and_clear() {
    let mut rm = create_car_resources();
    assert!(rm.remove_entity("Body").is_some());
    assert!(rm.remove_entity("Body").is_none());
    assert!(rm.remove_component("Fuel").is_some());
    assert_eq!(rm.entity_count(), 2);

    rm.clear();
    assert_eq!(rm.entity_count(), 0);
    assert_eq!(rm.component_count(), 0);
}

#[test]
fn test_names() {
    let rm = create_car_resources();
    let mut names = rm.entity_names();
    names.sort();
    assert_eq!(names, vec!["Body", "Car", "Wheel"]);
}

// ============================================================================
// Tests: Component Types
// ============================================================================

#[test]
fn test_register_component_type() {
    let mut rm = ResourceManager::new();
    rm.register_component_type("Motor", &["FuelTank"], |_| Ok(Box::new(Dummy))).unwrap();

    let factory = rm.component_factory();
    assert!(factory.is_registered("Motor"));
    assert_eq!(factory.dependencies("Motor"), &["FuelTank".to_string()]);
    assert!(factory.dependencies("Unknown").is_empty());
}

#[test]
fn test_register_component_type_twice_fails() {
    let mut rm = ResourceManager::new();
    rm.register_component_type("Motor", &[], |_| Ok(Box::new(Dummy))).unwrap();
    assert!(rm.register_component_type("Motor", &[], |_| Ok(Box::new(Dummy))).is_err());
}

#[test]
fn test_factory_create() {
    let mut rm = ResourceManager::new();
    rm.register_component_type("Motor", &[], |_| Ok(Box::new(Dummy))).unwrap();

    let motor = ComponentResource::new("Motor", "Motor");
    let instance = rm.component_factory().create(&motor).unwrap();
    assert!(instance.as_any().downcast_ref::<Dummy>().is_some());

    let unknown = ComponentResource::new("Light", "Light");
    assert!(rm.component_factory().create(&unknown).is_err());
}

// ============================================================================
// Tests: Object Collection
// ============================================================================

#[test]
fn test_collect_objects_reaches_everything_once() {
    let rm = create_car_resources();
    let objects = rm.collect_objects("Car").unwrap();

    assert_eq!(objects.len(), 6);
    assert_eq!(objects.iter().filter(|o| *o == "Car").count(), 1);
    assert_eq!(objects.last().map(String::as_str), Some("Car"));
    assert_eq!(objects.iter().filter(|o| *o == "Wheel").count(), 1);

    let pos = |id: &str| objects.iter().position(|o| o == id).unwrap();
    assert!(pos("Fuel") < pos("Motor"));
    assert!(pos("WheelComp") < pos("Wheel"));
    assert!(pos("Wheel") < pos("Motor"));
}

#[test]
fn test_collect_objects_unknown_root_fails() {
    let rm = create_car_resources();
    assert!(rm.collect_objects("Plane").is_err());
    assert!(rm.collect_objects("Motor").is_err());
}

#[test]
fn test_collect_objects_dangling_entity_pointer_fails() {
    let mut rm = ResourceManager::new();
    rm.create_component(
        ComponentResource::new("Motor", "Motor")
            .with_property("garage", EntityPtr::new("Garage")),
    ).unwrap();
    rm.create_entity(EntityResource::new("Car").with_component("Motor")).unwrap();

    assert!(rm.collect_objects("Car").is_err());
}

#[test]
fn test_collect_objects_dangling_reference_fails() {
    let mut rm = ResourceManager::new();
    rm.create_component(
        ComponentResource::new("Motor", "Motor")
            .with_property("tank", ComponentPtr::new("Missing")),
    ).unwrap();
    rm.create_entity(EntityResource::new("Car").with_component("Motor")).unwrap();

    let err = rm.collect_objects("Car").unwrap_err();
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn test_collect_pointer_targets_follows_retargeted_pointer() {
    let mut rm = create_car_resources();
    rm.create_component(ComponentResource::new("Spare", "Wheel")).unwrap();
    rm.create_entity(EntityResource::new("Garage").with_component("Spare")).unwrap();

    let mut visited: FxHashSet<String> = rm.collect_objects("Car").unwrap().into_iter().collect();
    let retargeted = ComponentResource::new("Motor_instanceproperties", "Motor")
        .with_property("spare", ComponentPtr::new("Spare"))
        .with_property("home", EntityPtr::new("Garage"));

    let objects = rm.collect_pointer_targets(&retargeted, &mut visited).unwrap();

    assert_eq!(objects, vec!["Spare".to_string(), "Garage".to_string()]);
    assert!(visited.contains("Garage"));
    assert!(rm.collect_pointer_targets(&retargeted, &mut visited).unwrap().is_empty());
}

#[test]
fn test_collect_pointer_targets_dangling_fails() {
    let rm = create_car_resources();
    let retargeted = ComponentResource::new("Motor_instanceproperties", "Motor")
        .with_property("spare", ComponentPtr::new("Missing"));

    let err = rm.collect_pointer_targets(&retargeted, &mut FxHashSet::default()).unwrap_err();
    assert!(err.to_string().contains("Missing"));
}
