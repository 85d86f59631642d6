//! Central scene manager for the engine.
//!
//! Owns named scenes. Each scene is shared as `Arc<Mutex<Scene>>` so that
//! a host can hold on to it while spawning and updating under one lock.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use super::scene::Scene;
use super::scene_config::SceneConfig;

pub struct SceneManager {
    scenes: FxHashMap<String, Arc<Mutex<Scene>>>,
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self {
            scenes: FxHashMap::default(),
        }
    }

    /// Create a scene with the default naming rules
    ///
    /// # Errors
    ///
    /// Returns an error if a scene with the same name already exists.
    pub fn create_scene(&mut self, name: &str) -> Result<Arc<Mutex<Scene>>> {
        self.create_scene_with_config(name, SceneConfig::default())
    }

    /// Create a scene with custom instance and clone suffixes
    pub fn create_scene_with_config(&mut self, name: &str, config: SceneConfig) -> Result<Arc<Mutex<Scene>>> {
        if self.scenes.contains_key(name) {
            engine_bail!("galaxy3d::SceneManager",
                "Scene '{}' already exists", name);
        }

        let scene = Arc::new(Mutex::new(Scene::with_config(config)));
        self.scenes.insert(name.to_string(), Arc::clone(&scene));
        crate::engine_debug!("galaxy3d::SceneManager", "Created scene '{}'", name);
        Ok(scene)
    }

    pub fn scene(&self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        self.scenes.get(name).cloned()
    }

    /// Remove a scene from the manager.
    ///
    /// The scene itself lives on while other handles to it exist.
    pub fn remove_scene(&mut self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        self.scenes.remove(name)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.keys().map(|k| k.as_str()).collect()
    }

    /// Destroy the content of every scene, then drop them
    pub fn clear(&mut self) {
        for (name, scene) in self.scenes.drain() {
            match scene.lock() {
                Ok(mut scene) => scene.clear(),
                Err(_) => crate::engine_warn!("galaxy3d::SceneManager",
                    "Scene '{}' lock poisoned, dropping it without teardown", name),
            }
        }
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
