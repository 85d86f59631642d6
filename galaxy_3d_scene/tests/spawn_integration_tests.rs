//! Integration tests for the spawn pipeline
//!
//! These tests drive Scene through the public API only: resources are
//! registered in a ResourceManager, spawned, resolved, updated and destroyed.
//!
//! Run with: cargo test --test spawn_integration_tests

use galaxy_3d_scene::galaxy3d::{Error, PathError, Result};
use galaxy_3d_scene::galaxy3d::graph::{GraphItem, ObjectGraph};
use galaxy_3d_scene::galaxy3d::resource::{
    ComponentPtr, ComponentResource, EntityPtr, EntityResource, InstanceProperty,
    PropertyValue, ResourceManager, RootEntity,
};
use galaxy_3d_scene::galaxy3d::scene::{
    ComponentInstance, EntityInstanceKey, InitContext, InstanceKey, Scene,
};
use galaxy_3d_scene::glam::Vec3;
use std::any::Any;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST COMPONENTS
// ============================================================================

type InitLog = Arc<Mutex<Vec<String>>>;

/// Records its init call and keeps its resolved links
struct Probe {
    resource: String,
    log: InitLog,
    target: Option<InstanceKey>,
    tint: Vec3,
}

impl ComponentInstance for Probe {
    fn init(&mut self, context: &InitContext<'_>) -> Result<()> {
        self.target = context.component_link("target").map(InstanceKey::Component)
            .or_else(|| context.entity_link("owner").map(InstanceKey::Entity));
        self.log.lock().unwrap().push(self.resource.clone());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn register_probe(rm: &mut ResourceManager, type_name: &str, dependencies: &[&str], log: &InitLog) {
    let log = log.clone();
    rm.register_component_type(type_name, dependencies, move |resource| {
        let tint = resource.properties().field("tint")
            .and_then(PropertyValue::as_vec3)
            .unwrap_or(Vec3::ONE);
        Ok(Box::new(Probe {
            resource: resource.original_id().to_string(),
            log: log.clone(),
            target: None,
            tint,
        }) as Box<dyn ComponentInstance>)
    }).unwrap();
}

/// Car { Body; Motor -> ./Body; children: Wheel, Wheel, Engine { Piston -> ../Motor } }
fn car_resources(log: &InitLog) -> ResourceManager {
    let mut rm = ResourceManager::new();
    register_probe(&mut rm, "Probe", &[], log);

    rm.create_component(ComponentResource::new("Body", "Probe").with_property("tint", Vec3::new(1.0, 0.0, 0.0))).unwrap();
    rm.create_component(
        ComponentResource::new("Motor", "Probe").with_property("target", ComponentPtr::with_path("Body", "./Body")),
    ).unwrap();
    rm.create_component(
        ComponentResource::new("Piston", "Probe").with_property("target", ComponentPtr::with_path("Motor", "../Motor")),
    ).unwrap();
    rm.create_component(ComponentResource::new("Rim", "Probe")).unwrap();

    rm.create_entity(EntityResource::new("Wheel").with_component("Rim")).unwrap();
    rm.create_entity(EntityResource::new("Engine").with_component("Piston")).unwrap();
    rm.create_entity(
        EntityResource::new("Car")
            .with_component("Body")
            .with_component("Motor")
            .with_child("Wheel")
            .with_child("Wheel")
            .with_child("Engine"),
    ).unwrap();
    rm
}

fn probe(scene: &Scene, entity: EntityInstanceKey) -> &Probe {
    scene.find_component::<Probe>(entity).unwrap()
}

fn child(scene: &Scene, entity: EntityInstanceKey, resource_id: &str) -> EntityInstanceKey {
    scene.entity(entity).unwrap()
        .children()
        .iter()
        .copied()
        .find(|k| scene.entity(*k).unwrap().resource_id() == resource_id)
        .unwrap()
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_integration_components_init_after_their_pointees() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();

    scene.spawn(&rm, "Car", &[]).unwrap();

    let order = log.lock().unwrap().clone();
    let position = |id: &str| order.iter().position(|e| e == id).unwrap();
    assert!(position("Body") < position("Motor"));
    assert!(position("Motor") < position("Piston"));
    assert_eq!(order.len(), 5);
}

#[test]
fn test_integration_sorted_nodes_respect_dependencies() {
    struct Item(&'static str, Vec<&'static str>);
    impl GraphItem for Item {
        type Context<'c> = ();
        fn id(&self) -> &str {
            self.0
        }
        fn pointees(&self, _context: &Self::Context<'_>) -> Result<Vec<String>> {
            Ok(self.1.iter().map(|s| s.to_string()).collect())
        }
    }

    let items = vec![
        Item("scene", vec!["mesh", "material"]),
        Item("material", vec!["shader", "texture"]),
        Item("mesh", vec![]),
        Item("texture", vec![]),
        Item("shader", vec![]),
    ];
    let graph = ObjectGraph::<Item>::build(items, Ok, &()).unwrap();

    let sorted: Vec<&str> = graph.sorted_nodes().iter().map(|n| n.id()).collect();
    for node in graph.sorted_nodes() {
        let index = sorted.iter().position(|id| *id == node.id()).unwrap();
        for pointee in graph.pointees(node.id()) {
            assert!(sorted.iter().position(|id| *id == pointee).unwrap() < index);
        }
    }
}

// ============================================================================
// FAILURES LEAVE THE SCENE UNTOUCHED
// ============================================================================

#[test]
fn test_integration_cycle_spawns_nothing() {
    let log = InitLog::default();
    let mut rm = car_resources(&log);
    rm.create_component(ComponentResource::new("A", "Probe").with_property("target", ComponentPtr::new("B"))).unwrap();
    rm.create_component(ComponentResource::new("B", "Probe").with_property("target", ComponentPtr::new("A"))).unwrap();
    rm.create_entity(EntityResource::new("Knot").with_component("A").with_component("B")).unwrap();
    let mut scene = Scene::new();

    match scene.spawn(&rm, "Knot", &[]) {
        Err(Error::CycleDetected(chain)) => {
            assert_eq!(chain.first(), chain.last());
            assert!(chain.contains(&"A".to_string()) && chain.contains(&"B".to_string()));
        }
        other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
    }
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.component_count(), 0);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_integration_missing_override_target_keeps_registry() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();
    let existing = scene.spawn(&rm, "Car", &[]).unwrap();
    let before = scene.instance_count();

    let result = scene.spawn(&rm, "Car", &[InstanceProperty::new("./Engine/Turbo", "boost", 2.0)]);

    assert_eq!(
        result.unwrap_err().path_error(),
        Some(&PathError::ComponentNotFound("Turbo".to_string()))
    );
    assert_eq!(scene.instance_count(), before);
    assert_eq!(scene.root_entities(), &[existing]);
    assert_eq!(scene.find_instance("Car_instance_0"), None);
}

// ============================================================================
// CLONES
// ============================================================================

#[test]
fn test_integration_overrides_are_independent_per_spawn() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();

    let green = scene.spawn(&rm, "Car", &[InstanceProperty::new("Body", "tint", Vec3::new(0.0, 1.0, 0.0))]).unwrap();
    let blue = scene.spawn(&rm, "Car", &[InstanceProperty::new("Body", "tint", Vec3::new(0.0, 0.0, 1.0))]).unwrap();
    let stock = scene.spawn(&rm, "Car", &[]).unwrap();

    assert_eq!(probe(&scene, green).tint, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(probe(&scene, blue).tint, Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(probe(&scene, stock).tint, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(
        rm.component("Body").unwrap().properties().field("tint"),
        Some(&PropertyValue::Vec3(Vec3::new(1.0, 0.0, 0.0)))
    );

    let green_clone = scene.clone_table(green).unwrap().iter().next().unwrap().id().to_string();
    let blue_clone = scene.clone_table(blue).unwrap().iter().next().unwrap().id().to_string();
    assert_ne!(green_clone, blue_clone);
}

#[test]
fn test_integration_pointers_into_clones_resolve_by_original_id() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();

    let car = scene.spawn(&rm, "Car", &[InstanceProperty::new("Body", "tint", Vec3::ZERO)]).unwrap();
    let entity = scene.entity(car).unwrap();
    let body = entity.components()[0];
    let motor = entity.components()[1];

    assert_eq!(scene.component(body).unwrap().original_id(), "Body");
    assert_ne!(scene.component(body).unwrap().resource_id(), "Body");
    assert_eq!(
        scene.component(motor).unwrap().get::<Probe>().unwrap().target,
        Some(InstanceKey::Component(body))
    );
}

// ============================================================================
// PATHS
// ============================================================================

#[test]
fn test_integration_current_and_parent_segments() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();
    let car = scene.spawn(&rm, "Car", &[]).unwrap();
    let engine = child(&scene, car, "Engine");

    assert_eq!(scene.resolve_entity(engine, ".").unwrap(), engine);
    assert_eq!(scene.resolve_entity(engine, "..").unwrap(), car);
    assert_eq!(
        scene.resolve_entity(car, "..").unwrap_err().path_error(),
        Some(&PathError::NoParent)
    );

    // The piston points at the motor one level up
    let motor = scene.entity(car).unwrap().components()[1];
    assert_eq!(probe(&scene, engine).target, Some(InstanceKey::Component(motor)));
}

#[test]
fn test_integration_duplicate_children_need_an_index() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();
    let car = scene.spawn(&rm, "Car", &[]).unwrap();
    let wheels = scene.entity(car).unwrap().children()[..2].to_vec();

    assert_eq!(
        scene.resolve_entity(car, "./Wheel").unwrap_err().path_error(),
        Some(&PathError::AmbiguousChild { name: "Wheel".to_string(), count: 2 })
    );
    assert_eq!(scene.resolve_entity(car, "./Wheel:0").unwrap(), wheels[0]);
    assert_eq!(scene.resolve_entity(car, "./Wheel:1").unwrap(), wheels[1]);
    assert_eq!(
        scene.resolve_entity(car, "./Wheel:2").unwrap_err().path_error(),
        Some(&PathError::IndexOutOfRange { name: "Wheel".to_string(), index: 2, count: 2 })
    );
    assert_eq!(scene.resolve_entity(car, "./Engine").unwrap(), child(&scene, car, "Engine"));
}

#[test]
fn test_integration_entity_pointer_across_roots() {
    let log = InitLog::default();
    let mut rm = car_resources(&log);
    rm.create_component(
        ComponentResource::new("Spotlight", "Probe").with_property("owner", EntityPtr::with_path("Car", "Car/Engine")),
    ).unwrap();
    rm.create_entity(EntityResource::new("Stage").with_component("Spotlight")).unwrap();
    let mut scene = Scene::new();

    let roots = scene.spawn_roots(&rm, &[RootEntity::new("Stage"), RootEntity::new("Car")]).unwrap();

    let engine = child(&scene, roots[1], "Engine");
    assert_eq!(probe(&scene, roots[0]).target, Some(InstanceKey::Entity(engine)));
}

// ============================================================================
// IDS AND DESTROY
// ============================================================================

#[test]
fn test_integration_generated_ids_survive_destroy() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();

    let first = scene.spawn(&rm, "Car", &[]).unwrap();
    let second = scene.spawn(&rm, "Car", &[]).unwrap();
    assert_eq!(scene.entity(first).unwrap().id(), "Car_instance");
    assert_eq!(scene.entity(second).unwrap().id(), "Car_instance_0");

    assert!(scene.destroy(first));

    assert_eq!(scene.find_instance("Car_instance_0"), Some(InstanceKey::Entity(second)));
    assert_eq!(scene.find_instance("Car_instance"), None);
}

#[test]
fn test_integration_destroy_forgets_every_descendant() {
    let log = InitLog::default();
    let rm = car_resources(&log);
    let mut scene = Scene::new();
    let car = scene.spawn(&rm, "Car", &[]).unwrap();
    let keep = scene.spawn(&rm, "Car", &[]).unwrap();

    let doomed: Vec<String> = {
        let mut ids = Vec::new();
        let mut stack = vec![car];
        while let Some(key) = stack.pop() {
            let entity = scene.entity(key).unwrap();
            ids.push(entity.id().to_string());
            ids.extend(entity.components().iter().map(|c| scene.component(*c).unwrap().id().to_string()));
            stack.extend_from_slice(entity.children());
        }
        ids
    };
    assert_eq!(doomed.len(), 9);

    scene.destroy(car);

    for id in &doomed {
        assert!(scene.find_instance(id).is_none(), "'{}' still registered", id);
    }
    assert_eq!(scene.entity_count(), 4);
    assert_eq!(scene.root_entities(), &[keep]);
}
