/*!
# Galaxy 3D Scene

Resource instantiation for the Galaxy 3D engine.

Scenes are spawned from declarative resources: entity resources list child
entities and components, component resources carry typed properties,
including pointers to other components and entities. Spawning a root entity
builds the dependency graph of everything it reaches, clones the components
targeted by per-spawn overrides, creates the instance tree, resolves pointer
paths to live instances and initializes components in dependency order. A
spawn either commits completely or leaves the scene untouched.

## Architecture

- **ObjectGraph**: generic dependency graph with topological order and cycle detection
- **ServiceManager**: process-wide services ordered by declared dependencies
- **ResourceManager**: entity and component resources plus the component type factory
- **Scene**: spawn / destroy / update of instance trees
- **PathResolver**: `./Wheel:1/WheelComp` style paths resolved against live instances
- **InstanceCloner**: per-spawn component clones carrying instance property overrides
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graph;
pub mod resource;
pub mod scene;
pub mod service;
pub mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, PathError, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Dependency graph sub-module
    pub mod graph {
        pub use crate::graph::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Service sub-module
    pub mod service {
        pub use crate::service::*;
    }
}

// Re-export math library at crate root
pub use glam;
