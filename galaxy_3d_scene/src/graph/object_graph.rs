//! Dependency graph over identified objects.
//!
//! Each node wraps a [`GraphItem`]; edges go from an item to the items it
//! points at (its pointees). A node's depth is one more than the deepest of
//! its pointees, so sorting by depth yields an order in which every object
//! comes after everything it depends on.
//!
//! The graph is generic over the item strategy: services use their declared
//! dependencies, entities and components use the resource hierarchy.

use rustc_hash::FxHashMap;
use crate::error::{Error, Result};

/// Strategy describing how an object takes part in an [`ObjectGraph`]
pub trait GraphItem {
    /// Extra data needed to compute pointees (lookup tables, registries)
    type Context<'c>;

    /// Unique ID of the object within the graph
    fn id(&self) -> &str;

    /// IDs of the objects this one depends on
    ///
    /// Every returned ID must belong to an item of the same graph.
    fn pointees(&self, context: &Self::Context<'_>) -> Result<Vec<String>>;
}

/// Node of an [`ObjectGraph`]
pub struct Node<I> {
    item: I,
    depth: usize,
    outgoing: Vec<usize>,
    incoming: Vec<usize>,
}

impl<I: GraphItem> Node<I> {
    pub fn item(&self) -> &I {
        &self.item
    }

    pub fn id(&self) -> &str {
        self.item.id()
    }

    /// Longest pointee chain below this node (0 for leaves)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InProgress,
    Done,
}

/// Directed acyclic graph of objects and the objects they point at
pub struct ObjectGraph<I: GraphItem> {
    nodes: Vec<Node<I>>,
    index: FxHashMap<String, usize>,
}

impl<I: GraphItem> ObjectGraph<I> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Build a graph from a list of objects
    ///
    /// `create_item` turns each object into its graph item; edges and depths
    /// are then computed with [`ObjectGraph::rebuild`].
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate IDs, pointees outside the object set, or
    /// cycles ([`Error::CycleDetected`]).
    pub fn build<O, F>(objects: impl IntoIterator<Item = O>, mut create_item: F, context: &I::Context<'_>) -> Result<Self>
    where
        F: FnMut(O) -> Result<I>,
    {
        let mut graph = Self::new();
        for object in objects {
            graph.add_item(create_item(object)?)?;
        }
        graph.rebuild(context)?;
        Ok(graph)
    }

    /// Add an item without edges; call [`ObjectGraph::rebuild`] afterwards
    pub fn add_item(&mut self, item: I) -> Result<()> {
        let id = item.id().to_string();
        if self.index.contains_key(&id) {
            crate::engine_bail!("galaxy3d::ObjectGraph",
                "Object '{}' added to the graph twice", id);
        }

        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node {
            item,
            depth: 0,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        Ok(())
    }

    /// Recompute all edges and depths from scratch
    pub fn rebuild(&mut self, context: &I::Context<'_>) -> Result<()> {
        for node in &mut self.nodes {
            node.outgoing.clear();
            node.incoming.clear();
            node.depth = 0;
        }

        for source in 0..self.nodes.len() {
            let pointees = self.nodes[source].item.pointees(context)?;
            for pointee in pointees {
                let target = match self.index.get(&pointee) {
                    Some(&target) => target,
                    None => crate::engine_bail!("galaxy3d::ObjectGraph",
                        "Object '{}' points to '{}', which is not part of the graph",
                        self.nodes[source].id(), pointee),
                };

                if !self.nodes[source].outgoing.contains(&target) {
                    self.nodes[source].outgoing.push(target);
                    self.nodes[target].incoming.push(source);
                }
            }
        }

        self.compute_depths()
    }

    fn compute_depths(&mut self) -> Result<()> {
        let mut state = vec![Visit::New; self.nodes.len()];
        let mut stack = Vec::new();

        for start in 0..self.nodes.len() {
            self.visit(start, &mut state, &mut stack)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: usize, state: &mut [Visit], stack: &mut Vec<usize>) -> Result<()> {
        match state[node] {
            Visit::Done => return Ok(()),
            Visit::InProgress => {
                let start = stack.iter().position(|&n| n == node).unwrap_or(0);
                let mut chain: Vec<String> = stack[start..].iter()
                    .map(|&n| self.nodes[n].id().to_string())
                    .collect();
                chain.push(self.nodes[node].id().to_string());

                crate::engine_error!("galaxy3d::ObjectGraph",
                    "Cycle detected: {}", chain.join(" -> "));
                return Err(Error::CycleDetected(chain));
            }
            Visit::New => {}
        }

        state[node] = Visit::InProgress;
        stack.push(node);

        let mut depth = 0;
        for i in 0..self.nodes[node].outgoing.len() {
            let target = self.nodes[node].outgoing[i];
            self.visit(target, state, stack)?;
            depth = depth.max(self.nodes[target].depth + 1);
        }

        self.nodes[node].depth = depth;
        stack.pop();
        state[node] = Visit::Done;
        Ok(())
    }

    /// Nodes ordered so that every node comes after all of its pointees.
    ///
    /// Nodes of equal depth keep their insertion order.
    pub fn sorted_nodes(&self) -> Vec<&Node<I>> {
        let mut sorted: Vec<&Node<I>> = self.nodes.iter().collect();
        sorted.sort_by_key(|node| node.depth);
        sorted
    }

    /// Get a node by object ID
    pub fn node(&self, id: &str) -> Option<&Node<I>> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// IDs of the objects `id` points at
    pub fn pointees(&self, id: &str) -> Vec<&str> {
        self.index.get(id)
            .map(|&i| self.nodes[i].outgoing.iter().map(|&t| self.nodes[t].id()).collect())
            .unwrap_or_default()
    }

    /// IDs of the objects pointing at `id`
    pub fn pointers_to(&self, id: &str) -> Vec<&str> {
        self.index.get(id)
            .map(|&i| self.nodes[i].incoming.iter().map(|&s| self.nodes[s].id()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<I: GraphItem> Default for ObjectGraph<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "object_graph_tests.rs"]
mod tests;
