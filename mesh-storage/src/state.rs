//! In-memory record set shared by all store backends
//!
//! Nodes are kept in a map plus an insertion-order list; edges are kept in
//! insertion order, which downstream consumers rely on for deterministic
//! traversal.

use crate::{Error, Result};
use mesh_core::{Attributes, Edge, EdgeKey, Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Current on-disk snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable image of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Node and edge records with referential integrity enforced on every write
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: Vec<Edge>,
    edge_keys: HashSet<EdgeKey>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update a node; an update keeps `created_at`
    pub fn upsert_node(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        attributes: Attributes,
    ) -> Result<Node> {
        if id.is_blank() {
            return Err(Error::InvalidArgument("node id must not be empty".to_string()));
        }
        check_attributes(&format!("node {}", id), &attributes)?;

        if let Some(existing) = self.nodes.get_mut(&id) {
            existing.kind = kind;
            existing.attributes = attributes;
            existing.touch();
            return Ok(existing.clone());
        }

        let node = Node::new(id.clone(), kind, attributes);
        self.node_order.push(id.clone());
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    /// Create an edge, or refresh it if the same (source, target, transformation) exists
    pub fn upsert_edge(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Result<Edge> {
        let key = EdgeKey::new(source_id, target_id, transformation);
        if key.is_self_loop() {
            return Err(Error::InvalidEdge(format!(
                "self-loop on node {}",
                key.source_id
            )));
        }
        for id in [&key.source_id, &key.target_id] {
            if !self.nodes.contains_key(id) {
                return Err(Error::NotFound(format!("node {}", id)));
            }
        }
        check_attributes(&format!("edge {}", key), &attributes)?;

        if self.edge_keys.contains(&key) {
            if let Some(existing) = self.edges.iter_mut().find(|e| e.matches(&key)) {
                existing.attributes = attributes;
                existing.touch();
                return Ok(existing.clone());
            }
        }

        let edge = Edge::new(
            key.source_id.clone(),
            key.target_id.clone(),
            key.transformation.clone(),
            attributes,
        );
        self.edge_keys.insert(key);
        self.edges.push(edge.clone());
        Ok(edge)
    }

    pub fn node(&self, id: &NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("node {}", id)))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Edges leaving `id`, in insertion order
    pub fn edges_from(&self, id: &NodeId) -> Result<Vec<Edge>> {
        self.node(id)?;
        Ok(self
            .edges
            .iter()
            .filter(|e| &e.source_id == id)
            .cloned()
            .collect())
    }

    /// Edges arriving at `id`, in insertion order
    pub fn edges_to(&self, id: &NodeId) -> Result<Vec<Edge>> {
        self.node(id)?;
        Ok(self
            .edges
            .iter()
            .filter(|e| &e.target_id == id)
            .cloned()
            .collect())
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> Vec<Node> {
        self.node_order
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Remove a node that no edge references
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        self.node(id)?;

        let incident = self.edges.iter().filter(|e| e.touches(id)).count();
        if incident > 0 {
            return Err(Error::Conflict(format!(
                "node {} is referenced by {} edge(s)",
                id, incident
            )));
        }

        self.node_order.retain(|n| n != id);
        self.nodes
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("node {}", id)))
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Result<Edge> {
        let position = self
            .edges
            .iter()
            .position(|e| e.matches(key))
            .ok_or_else(|| Error::NotFound(format!("edge {}", key)))?;

        self.edge_keys.remove(key);
        Ok(self.edges.remove(position))
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            nodes: self.nodes(),
            edges: self.edges.clone(),
        }
    }

    /// Rebuild a record set from a snapshot, re-checking every invariant
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::CorruptSnapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut state = Self::new();
        for node in snapshot.nodes {
            if node.id.is_blank() {
                return Err(Error::CorruptSnapshot("node with empty id".to_string()));
            }
            if state.nodes.contains_key(&node.id) {
                return Err(Error::CorruptSnapshot(format!("duplicate node {}", node.id)));
            }
            state.node_order.push(node.id.clone());
            state.nodes.insert(node.id.clone(), node);
        }

        for edge in snapshot.edges {
            let key = edge.key();
            if !state.nodes.contains_key(&key.source_id)
                || !state.nodes.contains_key(&key.target_id)
            {
                return Err(Error::CorruptSnapshot(format!("dangling edge {}", key)));
            }
            if key.is_self_loop() {
                return Err(Error::CorruptSnapshot(format!("self-loop edge {}", key)));
            }
            if !state.edge_keys.insert(key.clone()) {
                return Err(Error::CorruptSnapshot(format!("duplicate edge {}", key)));
            }
            state.edges.push(edge);
        }

        Ok(state)
    }
}

/// Reject attribute values that cannot be written to a snapshot
fn check_attributes(owner: &str, attributes: &Attributes) -> Result<()> {
    match attributes.iter().find(|(_, value)| !value.is_finite()) {
        Some((key, value)) => Err(Error::InvalidArgument(format!(
            "{} attribute {} must be a finite number, got {}",
            owner, key, value
        ))),
        None => Ok(()),
    }
}
