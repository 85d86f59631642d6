//! Scene: the live instance tree spawned from entity resources.
//!
//! Uses SlotMaps for O(1) insert/remove with stable keys, plus an ID
//! registry indexing every committed instance. A spawn either commits all
//! of its instances or none of them.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::engine_err;
use crate::graph::ObjectGraph;
use crate::resource::{ComponentResource, InstanceProperty, ResourceManager, RootEntity};
use crate::utils::unique_id;
use super::component_path::ComponentResourcePath;
use super::entity_graph_item::{EntityGraphContext, EntityObjectGraphItem, ResourceKind};
use super::instance::{
    ComponentInstance, ComponentInstanceKey, ComponentSlot, EntityInstance,
    EntityInstanceKey, InstanceKey, WeakInstanceRef,
};
use super::instance_cloner::{CloneTable, InstanceCloner};
use super::path_resolver::PathResolver;
use super::scene_config::SceneConfig;

/// Target of a weak reference
#[derive(Debug, Clone)]
struct WeakEntry {
    id: String,
    target: Option<InstanceKey>,
}

/// Instances created by a spawn that has not been committed yet
#[derive(Default)]
struct PendingSpawn {
    /// Generated IDs, in creation order
    ids: Vec<(String, InstanceKey)>,
    /// Same IDs, for collision checks
    id_set: FxHashSet<String>,
    entities: Vec<EntityInstanceKey>,
    /// Component instances with the ID of the resource (or clone) they come from
    components: Vec<(ComponentInstanceKey, String)>,
    roots: Vec<EntityInstanceKey>,
}

impl PendingSpawn {
    fn add(&mut self, id: String, key: InstanceKey) {
        self.id_set.insert(id.clone());
        self.ids.push((id, key));
    }
}

/// A scene of spawned entity and component instances.
///
/// Instances are addressed by stable keys (EntityInstanceKey,
/// ComponentInstanceKey) or by their generated ID. Keys remain valid until
/// the instance itself is destroyed.
pub struct Scene {
    /// Naming rules for instance and clone IDs
    config: SceneConfig,
    /// Entity instances
    entities: SlotMap<EntityInstanceKey, EntityInstance>,
    /// Component instances (framework data + behavior)
    components: SlotMap<ComponentInstanceKey, ComponentSlot>,
    /// ID registry of committed instances
    instances_by_id: FxHashMap<String, InstanceKey>,
    /// Root entities, in spawn order
    root_entities: Vec<EntityInstanceKey>,
    /// Per-spawn component clones, owned by their root entity
    cloned_components: FxHashMap<EntityInstanceKey, CloneTable>,
    /// ID-based references held outside the tree
    weak_refs: SlotMap<WeakInstanceRef, WeakEntry>,
    /// Next position in the scene-wide init sequence
    init_counter: u64,
}

impl Scene {
    /// Create an empty scene with the default naming rules
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            entities: SlotMap::with_key(),
            components: SlotMap::with_key(),
            instances_by_id: FxHashMap::default(),
            root_entities: Vec::new(),
            cloned_components: FxHashMap::default(),
            weak_refs: SlotMap::with_key(),
            init_counter: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ===== SPAWN =====

    /// Spawn one root entity with its instance property overrides.
    ///
    /// # Arguments
    ///
    /// * `resources` - Resource manager holding the entity, its subtree and the component types
    /// * `root_id` - ID of the entity resource to spawn
    /// * `overrides` - Property values replacing the resource values for this spawn only
    ///
    /// # Errors
    ///
    /// Fails with the first error of the pipeline (unknown resources,
    /// [`Error::CycleDetected`], [`Error::CloneValidationFailed`],
    /// [`Error::PathResolutionFailed`], [`Error::ComponentInitFailed`]).
    /// On failure the scene is left exactly as it was.
    pub fn spawn(
        &mut self,
        resources: &ResourceManager,
        root_id: &str,
        overrides: &[InstanceProperty],
    ) -> Result<EntityInstanceKey> {
        let root = overrides.iter()
            .cloned()
            .fold(RootEntity::new(root_id), RootEntity::with_override);

        let roots = self.spawn_roots(resources, std::slice::from_ref(&root))?;
        roots.into_iter().next().ok_or_else(|| {
            Error::BackendError(format!("spawn of '{}' produced no root entity", root_id))
        })
    }

    /// Spawn several root entities in one all-or-nothing pass.
    ///
    /// Returns the root entity keys in the order of `roots`. Pointers may
    /// reference instances of any root of the batch as well as instances
    /// already in the scene.
    pub fn spawn_roots(&mut self, resources: &ResourceManager, roots: &[RootEntity]) -> Result<Vec<EntityInstanceKey>> {
        crate::engine_debug!("galaxy3d::Scene", "Spawning {} root entities", roots.len());

        // Resources reachable from every root
        let mut objects = Vec::new();
        let mut seen = FxHashSet::default();
        for root in roots {
            for id in resources.collect_objects(root.entity())? {
                if seen.insert(id.clone()) {
                    objects.push(id);
                }
            }
        }

        // Private clones for the overrides of each root
        let mut taken_ids = self.clone_ids();
        let cloner = InstanceCloner::new(resources, &self.config);
        let tables = roots.iter()
            .map(|root| cloner.clone_overrides(root, &mut taken_ids))
            .collect::<Result<Vec<CloneTable>>>()?;

        // Overridden pointers may reach resources outside every root's subtree
        for clone in tables.iter().flat_map(|table| table.iter()) {
            objects.extend(resources.collect_pointer_targets(clone, &mut seen)?);
        }

        let mut pending = PendingSpawn::default();
        let result = {
            let context = EntityGraphContext::new(resources, &tables, &objects);
            let clone_ids: Vec<String> = tables.iter()
                .flat_map(|table| table.iter().map(|c| c.id().to_string()))
                .collect();
            let graph = ObjectGraph::<EntityObjectGraphItem>::build(
                objects.iter().chain(clone_ids.iter()),
                |id| EntityObjectGraphItem::create(id, &context),
                &context,
            )?;

            self.instantiate(resources, roots, &tables, &mut pending)
                .and_then(|_| self.resolve_links(&pending))
                .and_then(|_| self.init_components(&graph, &context, &pending))
        };

        match result {
            Ok(()) => {
                let keys = pending.roots.clone();
                self.commit(pending, tables);
                Ok(keys)
            }
            Err(error) => {
                crate::engine_warn!("galaxy3d::Scene",
                    "Spawn failed, discarding {} instances: {}", pending.ids.len(), error);
                self.rollback(pending);
                Err(error)
            }
        }
    }

    /// Clone IDs owned by live root entities
    fn clone_ids(&self) -> FxHashSet<String> {
        self.cloned_components.values()
            .flat_map(|table| table.iter().map(|c| c.id().to_string()))
            .collect()
    }

    fn generate_id(&self, resource_id: &str, pending: &PendingSpawn) -> String {
        let base = self.config.instance_id(resource_id);
        unique_id(&base, |id| self.instances_by_id.contains_key(id) || pending.id_set.contains(id))
    }

    /// Create the instance tree of every root, following the declared hierarchy
    fn instantiate(
        &mut self,
        resources: &ResourceManager,
        roots: &[RootEntity],
        tables: &[CloneTable],
        pending: &mut PendingSpawn,
    ) -> Result<()> {
        for (root, table) in roots.iter().zip(tables) {
            let mut path = Vec::new();
            let key = self.instantiate_entity(resources, root.entity(), None, &mut path, table, pending)?;
            pending.roots.push(key);
        }
        Ok(())
    }

    fn instantiate_entity(
        &mut self,
        resources: &ResourceManager,
        resource_id: &str,
        parent: Option<EntityInstanceKey>,
        path: &mut Vec<usize>,
        table: &CloneTable,
        pending: &mut PendingSpawn,
    ) -> Result<EntityInstanceKey> {
        let resource = resources.entity(resource_id).ok_or_else(|| {
            engine_err!("galaxy3d::Scene", "Entity '{}' not found", resource_id)
        })?;

        let id = self.generate_id(resource_id, pending);
        let key = self.entities.insert(EntityInstance::new(id.clone(), resource_id.to_string(), parent));
        pending.add(id, InstanceKey::Entity(key));
        pending.entities.push(key);
        if let Some(parent) = parent.and_then(|p| self.entities.get_mut(p)) {
            parent.add_child(key);
        }

        for component_id in resource.components() {
            let occurrence = ComponentResourcePath::new(path.clone(), component_id.as_str());
            let component = table.find(&occurrence)
                .or_else(|| resources.component(component_id))
                .ok_or_else(|| engine_err!("galaxy3d::Scene",
                    "Component '{}' of entity '{}' not found", component_id, resource_id))?;

            let instance = resources.component_factory().create(component)?;
            let component_key = self.add_component(key, component, instance, pending);
            crate::engine_trace!("galaxy3d::Scene", "Created component instance '{}'",
                self.components[component_key].id());
        }

        for (index, child_id) in resource.children().iter().enumerate() {
            path.push(index);
            let child = self.instantiate_entity(resources, child_id, Some(key), path, table, pending);
            path.pop();
            child?;
        }

        Ok(key)
    }

    fn add_component(
        &mut self,
        entity: EntityInstanceKey,
        resource: &ComponentResource,
        instance: Box<dyn ComponentInstance>,
        pending: &mut PendingSpawn,
    ) -> ComponentInstanceKey {
        let id = self.generate_id(resource.id(), pending);
        let key = self.components.insert(ComponentSlot::new(id.clone(), entity, resource, instance));
        pending.add(id, InstanceKey::Component(key));
        pending.components.push((key, resource.id().to_string()));
        if let Some(entity) = self.entities.get_mut(entity) {
            entity.add_component(key);
        }
        key
    }

    /// Resolve the pointer links of every new component.
    ///
    /// Resolution runs against live and in-flight instances; results are
    /// written back once every link of the spawn has resolved.
    fn resolve_links(&mut self, pending: &PendingSpawn) -> Result<()> {
        let roots: Vec<EntityInstanceKey> = self.root_entities.iter()
            .chain(pending.roots.iter())
            .copied()
            .collect();

        let mut resolved = Vec::new();
        {
            let resolver = PathResolver::new(&self.entities, &self.components, &roots);
            for (key, _) in &pending.components {
                let slot = &self.components[*key];
                for (index, link) in slot.links().iter().enumerate() {
                    let target = resolver.resolve(slot.entity(), link.path(), link.kind())
                        .map_err(|error| {
                            crate::engine_error!("galaxy3d::Scene",
                                "Pointer '{}' of '{}': {}", link.property(), slot.id(), error);
                            error
                        })?;
                    resolved.push((*key, index, target));
                }
            }
        }

        for (key, index, target) in resolved {
            if let Some(link) = self.components.get_mut(key).and_then(|s| s.links_mut().get_mut(index)) {
                link.set_resolved(target);
            }
        }
        Ok(())
    }

    /// Run the init hook of every new component in ascending graph depth
    fn init_components(
        &mut self,
        graph: &ObjectGraph<EntityObjectGraphItem>,
        context: &EntityGraphContext<'_>,
        pending: &PendingSpawn,
    ) -> Result<()> {
        let mut by_resource: FxHashMap<&str, Vec<ComponentInstanceKey>> = FxHashMap::default();
        for (key, resource_id) in &pending.components {
            by_resource.entry(resource_id.as_str()).or_default().push(*key);
        }

        for node in graph.sorted_nodes() {
            if node.item().kind() != ResourceKind::Component {
                continue;
            }
            let keys = match by_resource.get(node.id()) {
                Some(keys) => keys,
                None => continue,
            };
            let resource = context.component(node.id()).ok_or_else(|| {
                engine_err!("galaxy3d::Scene", "Component '{}' not found", node.id())
            })?;

            for key in keys {
                let order = self.init_counter;
                let slot = &mut self.components[*key];
                slot.initialize(resource, order).map_err(|error| {
                    crate::engine_error!("galaxy3d::Scene",
                        "Init of component '{}' failed: {}", slot.id(), error);
                    Error::ComponentInitFailed {
                        component: slot.id().to_string(),
                        source: Box::new(error),
                    }
                })?;
                self.init_counter += 1;
            }
        }
        Ok(())
    }

    /// Make the instances of a successful spawn visible
    fn commit(&mut self, pending: PendingSpawn, tables: Vec<CloneTable>) {
        for (id, key) in pending.ids {
            self.instances_by_id.insert(id, key);
        }

        for (root, table) in pending.roots.iter().zip(tables) {
            if !table.is_empty() {
                self.cloned_components.insert(*root, table);
            }
        }
        self.root_entities.extend(pending.roots.iter().copied());

        self.patch_weak_refs();

        for root in &pending.roots {
            crate::engine_debug!("galaxy3d::Scene", "Spawned '{}'", self.entities[*root].id());
        }
    }

    /// Discard the instances of a failed spawn
    fn rollback(&mut self, pending: PendingSpawn) {
        let components: Vec<ComponentInstanceKey> = pending.components.iter().map(|(k, _)| *k).collect();
        self.shutdown_components(&components);

        for key in components {
            self.components.remove(key);
        }
        for key in pending.entities {
            self.entities.remove(key);
        }
    }

    /// Point unresolved weak references at committed instances with their ID
    fn patch_weak_refs(&mut self) {
        for entry in self.weak_refs.values_mut() {
            if entry.target.is_none() {
                entry.target = self.instances_by_id.get(&entry.id).copied();
            }
        }
    }

    // ===== DESTROY =====

    /// Destroy an entity instance and everything below it.
    ///
    /// Component shutdown hooks run in reverse init order. Returns false if
    /// the key is invalid.
    pub fn destroy(&mut self, key: EntityInstanceKey) -> bool {
        let parent = match self.entities.get(key) {
            Some(entity) => entity.parent(),
            None => return false,
        };

        match parent.and_then(|p| self.entities.get_mut(p)) {
            Some(parent) => parent.remove_child(key),
            None => self.root_entities.retain(|root| *root != key),
        }

        let mut entities = Vec::new();
        let mut components = Vec::new();
        self.collect_subtree(key, &mut entities, &mut components);

        let mut destroyed = FxHashSet::default();
        for entity in &entities {
            self.instances_by_id.remove(self.entities[*entity].id());
            destroyed.insert(InstanceKey::Entity(*entity));
        }
        for component in &components {
            self.instances_by_id.remove(self.components[*component].id());
            destroyed.insert(InstanceKey::Component(*component));
        }

        self.shutdown_components(&components);

        for entry in self.weak_refs.values_mut() {
            if entry.target.map(|t| destroyed.contains(&t)).unwrap_or(false) {
                entry.target = None;
            }
        }

        for entity in &entities {
            self.cloned_components.remove(entity);
        }

        crate::engine_debug!("galaxy3d::Scene", "Destroyed '{}' ({} entities, {} components)",
            self.entities[key].id(), entities.len(), components.len());

        for component in components {
            self.components.remove(component);
        }
        for entity in entities {
            self.entities.remove(entity);
        }
        true
    }

    /// Entity keys (parents first) and component keys of a subtree
    fn collect_subtree(
        &self,
        key: EntityInstanceKey,
        entities: &mut Vec<EntityInstanceKey>,
        components: &mut Vec<ComponentInstanceKey>,
    ) {
        if let Some(entity) = self.entities.get(key) {
            entities.push(key);
            components.extend_from_slice(entity.components());
            for child in entity.children() {
                self.collect_subtree(*child, entities, components);
            }
        }
    }

    /// Call the shutdown hook of initialized components, last initialized first
    fn shutdown_components(&mut self, keys: &[ComponentInstanceKey]) {
        let mut initialized: Vec<(u64, ComponentInstanceKey)> = keys.iter()
            .filter_map(|key| {
                self.components.get(*key)
                    .and_then(|slot| slot.init_order())
                    .map(|order| (order, *key))
            })
            .collect();
        initialized.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, key) in initialized {
            if let Some(slot) = self.components.get_mut(key) {
                slot.instance_mut().shutdown();
            }
        }
    }

    /// Destroy every root entity, newest first
    pub fn clear(&mut self) {
        while let Some(root) = self.root_entities.last().copied() {
            if !self.destroy(root) {
                self.root_entities.pop();
            }
        }
        self.cloned_components.clear();
    }

    // ===== UPDATE =====

    /// Call the update hook of every component, walking root entities in
    /// spawn order and parents before children
    pub fn update(&mut self, delta_time: f64) {
        let mut order = Vec::with_capacity(self.components.len());
        for root in &self.root_entities {
            let mut entities = Vec::new();
            self.collect_subtree(*root, &mut entities, &mut order);
        }

        for key in order {
            if let Some(slot) = self.components.get_mut(key) {
                slot.instance_mut().update(delta_time);
            }
        }
    }

    // ===== LOOKUP =====

    /// Committed instance with the given ID
    pub fn find_instance(&self, id: &str) -> Option<InstanceKey> {
        self.instances_by_id.get(id).copied()
    }

    /// Entity instance spawned from `resource_id` under its base instance ID
    pub fn find_entity(&self, resource_id: &str) -> Option<EntityInstanceKey> {
        self.find_instance(&self.config.instance_id(resource_id))
            .and_then(InstanceKey::as_entity)
    }

    /// Root entities, in spawn order
    pub fn root_entities(&self) -> &[EntityInstanceKey] {
        &self.root_entities
    }

    /// Get an EntityInstance by key
    pub fn entity(&self, key: EntityInstanceKey) -> Option<&EntityInstance> {
        self.entities.get(key)
    }

    /// Get a component instance by key
    pub fn component(&self, key: ComponentInstanceKey) -> Option<&ComponentSlot> {
        self.components.get(key)
    }

    pub fn component_mut(&mut self, key: ComponentInstanceKey) -> Option<&mut ComponentSlot> {
        self.components.get_mut(key)
    }

    /// First component of `entity` whose behavior is a `T`
    pub fn find_component<T: ComponentInstance>(&self, entity: EntityInstanceKey) -> Option<&T> {
        self.entities.get(entity)?
            .components()
            .iter()
            .find_map(|key| self.components.get(*key).and_then(|slot| slot.get::<T>()))
    }

    pub fn find_component_mut<T: ComponentInstance>(&mut self, entity: EntityInstanceKey) -> Option<&mut T> {
        let key = self.entities.get(entity)?
            .components()
            .iter()
            .copied()
            .find(|key| {
                self.components.get(*key)
                    .map(|slot| slot.get::<T>().is_some())
                    .unwrap_or(false)
            })?;
        self.components.get_mut(key)?.get_mut::<T>()
    }

    /// Clones owned by a root entity
    pub fn clone_table(&self, root: EntityInstanceKey) -> Option<&CloneTable> {
        self.cloned_components.get(&root)
    }

    /// Resolve an entity path from `source` against the live tree
    pub fn resolve_entity(&self, source: EntityInstanceKey, path: &str) -> Result<EntityInstanceKey> {
        PathResolver::new(&self.entities, &self.components, &self.root_entities).resolve_entity(source, path)
    }

    /// Resolve a component path from `source` against the live tree
    pub fn resolve_component(&self, source: EntityInstanceKey, path: &str) -> Result<ComponentInstanceKey> {
        PathResolver::new(&self.entities, &self.components, &self.root_entities).resolve_component(source, path)
    }

    /// Iterate over all entity instances (key, instance)
    pub fn entities(&self) -> impl Iterator<Item = (EntityInstanceKey, &EntityInstance)> {
        self.entities.iter()
    }

    /// Iterate over all component instances (key, slot)
    pub fn components(&self) -> impl Iterator<Item = (ComponentInstanceKey, &ComponentSlot)> {
        self.components.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of IDs in the instance registry
    pub fn instance_count(&self) -> usize {
        self.instances_by_id.len()
    }

    // ===== WEAK REFERENCES =====

    /// Track an instance by ID.
    ///
    /// The reference resolves immediately if the ID is live, otherwise at the
    /// commit of the spawn that creates it.
    pub fn track(&mut self, id: &str) -> WeakInstanceRef {
        let target = self.find_instance(id);
        self.weak_refs.insert(WeakEntry { id: id.to_string(), target })
    }

    /// Current target of a weak reference
    pub fn resolve_ref(&self, weak: WeakInstanceRef) -> Option<InstanceKey> {
        self.weak_refs.get(weak).and_then(|entry| entry.target)
    }

    /// Stop tracking. Returns false if the handle is invalid.
    pub fn untrack(&mut self, weak: WeakInstanceRef) -> bool {
        self.weak_refs.remove(weak).is_some()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
