/// Galaxy3D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the resource manager,
/// the scene manager and the service manager. It uses thread-safe static
/// storage with RwLock for safe concurrent access.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::resource::ResourceManager;
use crate::scene::SceneManager;
use crate::service::ServiceManager;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// One singleton slot
type Slot<T> = RwLock<Option<Arc<Mutex<T>>>>;

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Resource manager singleton
    resource_manager: Slot<ResourceManager>,
    /// Scene manager singleton
    scene_manager: Slot<SceneManager>,
    /// Service manager singleton
    service_manager: Slot<ServiceManager>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            resource_manager: RwLock::new(None),
            scene_manager: RwLock::new(None),
            service_manager: RwLock::new(None),
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of all engine subsystems (resources, scenes, services)
/// using a singleton pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_scene::galaxy3d::Engine;
///
/// // Initialize engine
/// Engine::initialize()?;
///
/// // Create singletons
/// Engine::create_resource_manager()?;
/// Engine::create_scene_manager()?;
///
/// // Access them globally
/// let scenes = Engine::scene_manager()?;
/// let main = scenes.lock().unwrap().create_scene("main")?;
///
/// // Cleanup
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_scene::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    ///
    /// This ensures all Engine errors are automatically logged with proper severity
    /// and source information.
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("galaxy3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any subsystems.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// Scenes go first (their components may use resources and services),
    /// then resources, then services. After calling this, subsystems must be
    /// created again before use.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut sm) = state.scene_manager.write() {
                if let Some(scene_manager) = sm.take() {
                    if let Ok(mut scene_manager) = scene_manager.lock() {
                        scene_manager.clear();
                    }
                }
            }
            if let Ok(mut rm) = state.resource_manager.write() {
                *rm = None;
            }
            if let Ok(mut services) = state.service_manager.write() {
                if let Some(service_manager) = services.take() {
                    if let Ok(mut service_manager) = service_manager.lock() {
                        service_manager.shutdown();
                    }
                }
            }
        }
    }

    // ===== SINGLETON SLOTS =====

    fn create_singleton<T>(slot: &Slot<T>, name: &str, value: T) -> Result<()> {
        let mut lock = slot.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError(format!("{} lock poisoned", name))
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed(format!("{0} already exists. Call Engine::destroy_{1}() first.",
                    name, snake_case(name)))
            ));
        }

        *lock = Some(Arc::new(Mutex::new(value)));
        crate::engine_info!("galaxy3d::Engine", "{} singleton created successfully", name);
        Ok(())
    }

    fn get_singleton<T>(slot: &Slot<T>, name: &str) -> Result<Arc<Mutex<T>>> {
        let lock = slot.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError(format!("{} lock poisoned", name))
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed(format!("{0} not created. Call Engine::create_{1}() first.",
                    name, snake_case(name)))
            ))
    }

    fn destroy_singleton<T>(slot: &Slot<T>, name: &str) -> Result<Option<Arc<Mutex<T>>>> {
        let mut lock = slot.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError(format!("{} lock poisoned", name))
            ))?;

        let previous = lock.take();
        crate::engine_info!("galaxy3d::Engine", "{} singleton destroyed", name);
        Ok(previous)
    }

    // ===== RESOURCE MANAGER API =====

    /// Create and register the resource manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A resource manager already exists
    pub fn create_resource_manager() -> Result<()> {
        Self::create_singleton(&Self::state()?.resource_manager, "ResourceManager", ResourceManager::new())
    }

    /// Get the resource manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the resource
    /// manager has not been created.
    pub fn resource_manager() -> Result<Arc<Mutex<ResourceManager>>> {
        Self::get_singleton(&Self::state()?.resource_manager, "ResourceManager")
    }

    /// Destroy the resource manager singleton
    ///
    /// Existing references stay valid until dropped.
    pub fn destroy_resource_manager() -> Result<()> {
        Self::destroy_singleton(&Self::state()?.resource_manager, "ResourceManager")?;
        Ok(())
    }

    // ===== SCENE MANAGER API =====

    /// Create and register the scene manager singleton
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_scene::galaxy3d::Engine;
    ///
    /// Engine::initialize()?;
    /// Engine::create_scene_manager()?;
    /// # Ok::<(), galaxy_3d_scene::galaxy3d::Error>(())
    /// ```
    pub fn create_scene_manager() -> Result<()> {
        Self::create_singleton(&Self::state()?.scene_manager, "SceneManager", SceneManager::new())
    }

    /// Get the scene manager singleton
    pub fn scene_manager() -> Result<Arc<Mutex<SceneManager>>> {
        Self::get_singleton(&Self::state()?.scene_manager, "SceneManager")
    }

    /// Destroy the scene manager singleton, tearing down every scene it owns
    pub fn destroy_scene_manager() -> Result<()> {
        if let Some(scene_manager) = Self::destroy_singleton(&Self::state()?.scene_manager, "SceneManager")? {
            let mut scene_manager = scene_manager.lock()
                .map_err(|_| Self::log_and_return_error(
                    Error::BackendError("SceneManager lock poisoned".to_string())
                ))?;
            scene_manager.clear();
        }
        Ok(())
    }

    // ===== SERVICE MANAGER API =====

    /// Create and register the service manager singleton
    ///
    /// Services are registered and initialized through the returned manager:
    ///
    /// ```no_run
    /// use galaxy_3d_scene::galaxy3d::Engine;
    ///
    /// Engine::initialize()?;
    /// Engine::create_service_manager()?;
    /// let services = Engine::service_manager()?;
    /// services.lock().unwrap().init()?;
    /// # Ok::<(), galaxy_3d_scene::galaxy3d::Error>(())
    /// ```
    pub fn create_service_manager() -> Result<()> {
        Self::create_singleton(&Self::state()?.service_manager, "ServiceManager", ServiceManager::new())
    }

    /// Get the service manager singleton
    pub fn service_manager() -> Result<Arc<Mutex<ServiceManager>>> {
        Self::get_singleton(&Self::state()?.service_manager, "ServiceManager")
    }

    /// Destroy the service manager singleton, shutting its services down
    pub fn destroy_service_manager() -> Result<()> {
        if let Some(service_manager) = Self::destroy_singleton(&Self::state()?.service_manager, "ServiceManager")? {
            let mut service_manager = service_manager.lock()
                .map_err(|_| Self::log_and_return_error(
                    Error::BackendError("ServiceManager lock poisoned".to_string())
                ))?;
            service_manager.shutdown();
        }
        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut sm) = state.scene_manager.write() {
                *sm = None;
            }
            if let Ok(mut rm) = state.resource_manager.write() {
                *rm = None;
            }
            if let Ok(mut services) = state.service_manager.write() {
                *services = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// editor console, test capture, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_scene::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "galaxy3d::Scene")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = self::logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = self::logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

/// `SceneManager` -> `scene_manager`
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
