//! Scene management module
//!
//! Provides scenes of spawned entity and component instances: the spawn
//! pipeline, per-spawn override clones, instance path resolution and the
//! scene manager.

mod scene;
mod scene_manager;
mod scene_config;
mod instance;
mod instance_path;
mod component_path;
mod instance_cloner;
mod entity_graph_item;
mod path_resolver;

pub use scene::Scene;
pub use scene_manager::SceneManager;
pub use scene_config::SceneConfig;
pub use instance::{
    EntityInstance, EntityInstanceKey, ComponentInstanceKey, InstanceKey,
    WeakInstanceRef, ComponentInstance, ComponentSlot, InitContext,
    InstanceLink, LinkKind,
};
pub use instance_path::{InstancePath, PathSegment};
pub use component_path::ComponentResourcePath;
pub use instance_cloner::{CloneTable, InstanceCloner};
pub use entity_graph_item::{EntityObjectGraphItem, EntityGraphContext, ResourceKind};
pub use path_resolver::PathResolver;
