//! Integration tests for Engine lifecycle and management
//!
//! These tests verify the complete Engine workflow: the resource, scene and
//! service singletons, a spawn through the shared managers, and shutdown.
//!
//! Run with: cargo test --test engine_integration_tests

use galaxy_3d_scene::galaxy3d::{Engine, Result};
use galaxy_3d_scene::galaxy3d::resource::{ComponentResource, EntityResource};
use galaxy_3d_scene::galaxy3d::scene::{ComponentInstance, InitContext};
use galaxy_3d_scene::galaxy3d::service::{Service, ServiceContext};
use std::any::Any;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST SERVICE AND COMPONENT
// ============================================================================

type Journal = Arc<Mutex<Vec<String>>>;

/// Counts frames; components read it during init
struct FrameCounter {
    frames: u64,
    journal: Journal,
}

impl Service for FrameCounter {
    fn init(&mut self, _services: &ServiceContext<'_>) -> Result<()> {
        self.journal.lock().unwrap().push("init FrameCounter".to_string());
        Ok(())
    }

    fn update(&mut self, _delta_time: f64) {
        self.frames += 1;
    }

    fn shutdown(&mut self) {
        self.journal.lock().unwrap().push("shutdown FrameCounter".to_string());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Spinner {
    name: String,
    angle: f64,
    journal: Journal,
}

impl ComponentInstance for Spinner {
    fn init(&mut self, _context: &InitContext<'_>) -> Result<()> {
        self.journal.lock().unwrap().push(format!("init {}", self.name));
        Ok(())
    }

    fn update(&mut self, delta_time: f64) {
        self.angle += delta_time;
    }

    fn shutdown(&mut self) {
        self.journal.lock().unwrap().push(format!("shutdown {}", self.name));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn register_resources(journal: &Journal) {
    let rm = Engine::resource_manager().unwrap();
    let mut rm = rm.lock().unwrap();
    let journal = journal.clone();
    rm.register_component_type("Spinner", &[], move |resource| {
        Ok(Box::new(Spinner {
            name: resource.original_id().to_string(),
            angle: 0.0,
            journal: journal.clone(),
        }) as Box<dyn ComponentInstance>)
    }).unwrap();
    rm.create_component(ComponentResource::new("Blade", "Spinner")).unwrap();
    rm.create_entity(EntityResource::new("Fan").with_component("Blade")).unwrap();
}

// ============================================================================
// ENGINE LIFECYCLE TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_engine_full_lifecycle() {
    Engine::shutdown();
    let journal = Journal::default();

    // Step 1: Initialize engine
    let result = Engine::initialize();
    assert!(result.is_ok(), "Engine initialization should succeed");

    // Step 2: Services
    Engine::create_service_manager().unwrap();
    {
        let services = Engine::service_manager().unwrap();
        let mut services = services.lock().unwrap();
        services.register(FrameCounter { frames: 0, journal: journal.clone() }).unwrap();
        services.init().unwrap();
        services.update(0.016);
        assert_eq!(services.service::<FrameCounter>().unwrap().frames, 1);
    }

    // Step 3: Resources
    Engine::create_resource_manager().unwrap();
    register_resources(&journal);

    // Step 4: Spawn into a scene
    Engine::create_scene_manager().unwrap();
    let scene = Engine::scene_manager().unwrap().lock().unwrap().create_scene("main").unwrap();
    {
        let rm = Engine::resource_manager().unwrap();
        let rm = rm.lock().unwrap();
        let mut scene = scene.lock().unwrap();
        let fan = scene.spawn(&rm, "Fan", &[]).unwrap();

        scene.update(0.5);
        scene.update(0.25);
        assert_eq!(scene.find_component::<Spinner>(fan).unwrap().angle, 0.75);
        assert_eq!(scene.entity(fan).unwrap().id(), "Fan_instance");
    }

    // Step 5: Shutdown tears scenes down before services
    Engine::shutdown();
    assert_eq!(*journal.lock().unwrap(), vec![
        "init FrameCounter", "init Blade", "shutdown Blade", "shutdown FrameCounter",
    ]);
    assert_eq!(scene.lock().unwrap().entity_count(), 0);
    assert!(Engine::scene_manager().is_err());
}

#[test]
#[serial]
fn test_integration_engine_reinitialize_after_shutdown() {
    Engine::shutdown();

    // First lifecycle
    Engine::initialize().unwrap();
    Engine::create_resource_manager().unwrap();
    Engine::create_scene_manager().unwrap();
    register_resources(&Journal::default());

    // Shutdown
    Engine::shutdown();

    // Second lifecycle - reinitialize
    Engine::initialize().unwrap();

    let result = Engine::create_resource_manager();
    assert!(result.is_ok(), "Should be able to create ResourceManager after shutdown");
    let result = Engine::create_scene_manager();
    assert!(result.is_ok(), "Should be able to create SceneManager after shutdown");

    // Resources from the first lifecycle are gone
    let rm = Engine::resource_manager().unwrap();
    assert_eq!(rm.lock().unwrap().entity_count(), 0);
    assert!(rm.lock().unwrap().entity("Fan").is_none());

    // Cleanup
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_scenes_share_resource_manager() {
    Engine::shutdown();
    Engine::initialize().unwrap();
    Engine::create_resource_manager().unwrap();
    Engine::create_scene_manager().unwrap();
    let journal = Journal::default();
    register_resources(&journal);

    let (menu, level) = {
        let scenes = Engine::scene_manager().unwrap();
        let mut scenes = scenes.lock().unwrap();
        (scenes.create_scene("menu").unwrap(), scenes.create_scene("level").unwrap())
    };

    {
        let rm = Engine::resource_manager().unwrap();
        let rm = rm.lock().unwrap();
        menu.lock().unwrap().spawn(&rm, "Fan", &[]).unwrap();
        level.lock().unwrap().spawn(&rm, "Fan", &[]).unwrap();
    }

    // Instance IDs are unique per scene, not per process
    assert!(menu.lock().unwrap().find_instance("Fan_instance").is_some());
    assert!(level.lock().unwrap().find_instance("Fan_instance").is_some());

    Engine::scene_manager().unwrap().lock().unwrap().remove_scene("menu");
    assert_eq!(Engine::scene_manager().unwrap().lock().unwrap().scene_names(), vec!["level"]);

    Engine::shutdown();
    assert_eq!(
        journal.lock().unwrap().iter().filter(|entry| entry.starts_with("shutdown")).count(),
        1,
        "only the scene still registered is torn down by shutdown",
    );
}
