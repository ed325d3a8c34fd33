//! In-memory lineage graph index
//!
//! Forward and reverse adjacency derived from the store. The index is a
//! cache: it is updated after every successful store write and can always
//! be rebuilt from the store.

use crate::{Error, Result};
use mesh_core::{Edge, EdgeKey, Node, NodeId, NodeKind};
use mesh_storage::LineageStore;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Node in the lineage graph index
#[derive(Debug, Clone)]
pub struct IndexedNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// Edge in the lineage graph index
#[derive(Debug, Clone)]
pub struct IndexedEdge {
    /// Insertion sequence, used to iterate adjacency in insertion order
    pub seq: u64,
    pub transformation: Option<String>,
}

/// Adjacency index over the lineage graph
#[derive(Debug, Default)]
pub struct GraphIndex {
    graph: StableDiGraph<IndexedNode, IndexedEdge>,
    node_lookup: HashMap<NodeId, NodeIndex>,
    edge_lookup: HashMap<EdgeKey, EdgeIndex>,
    next_seq: u64,
}

impl GraphIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from every node and edge in the store
    pub fn build(store: &dyn LineageStore) -> Result<Self> {
        let mut index = Self::new();
        for node in store.list_nodes()? {
            index.on_node_added(&node);
        }
        for edge in store.list_edges()? {
            index.on_edge_added(&edge)?;
        }
        Ok(index)
    }

    /// Replace the contents of this index with a fresh build from the store.
    ///
    /// The current contents are kept if the build fails.
    pub fn rebuild_from(&mut self, store: &dyn LineageStore) -> Result<()> {
        *self = Self::build(store)?;
        Ok(())
    }

    /// Incorporate a node that was just written to the store
    pub fn on_node_added(&mut self, node: &Node) {
        match self.node_lookup.get(&node.id) {
            Some(&idx) => self.graph[idx].kind = node.kind.clone(),
            None => {
                let idx = self.graph.add_node(IndexedNode {
                    id: node.id.clone(),
                    kind: node.kind.clone(),
                });
                self.node_lookup.insert(node.id.clone(), idx);
            }
        }
    }

    /// Incorporate an edge that was just written to the store.
    ///
    /// Re-adding a known edge is a no-op. Fails if either endpoint is missing
    /// from the index, which means the index no longer mirrors the store.
    pub fn on_edge_added(&mut self, edge: &Edge) -> Result<()> {
        let key = edge.key();
        if self.edge_lookup.contains_key(&key) {
            return Ok(());
        }

        let source = self.require(&edge.source_id)?;
        let target = self.require(&edge.target_id)?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self.graph.add_edge(
            source,
            target,
            IndexedEdge {
                seq,
                transformation: edge.transformation.clone(),
            },
        );
        self.edge_lookup.insert(key, idx);
        Ok(())
    }

    /// Drop an edge that was just removed from the store
    pub fn on_edge_removed(&mut self, key: &EdgeKey) -> Result<()> {
        let idx = self
            .edge_lookup
            .remove(key)
            .ok_or_else(|| Error::Consistency(format!("edge {} missing from index", key)))?;
        self.graph.remove_edge(idx);
        Ok(())
    }

    /// Drop a node that was just removed from the store
    pub fn on_node_removed(&mut self, id: &NodeId) -> Result<()> {
        let idx = self.require(id)?;
        let incident = self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count();
        if incident > 0 {
            return Err(Error::Consistency(format!(
                "node {} removed from store but still has {} indexed edge(s)",
                id, incident
            )));
        }

        self.graph.remove_node(idx);
        self.node_lookup.remove(id);
        Ok(())
    }

    /// Distinct nodes with an edge from `id`, in edge insertion order
    pub fn neighbors_out(&self, id: &str) -> Result<Vec<NodeId>> {
        let idx = self.resolve(id)?;
        Ok(self.ids(self.adjacent(idx, Direction::Outgoing)))
    }

    /// Distinct nodes with an edge into `id`, in edge insertion order
    pub fn neighbors_in(&self, id: &str) -> Result<Vec<NodeId>> {
        let idx = self.resolve(id)?;
        Ok(self.ids(self.adjacent(idx, Direction::Incoming)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<&NodeKind> {
        self.node_lookup.get(id).map(|&idx| &self.graph[idx].kind)
    }

    /// Get the total number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Iterate over every indexed node
    pub fn nodes(&self) -> impl Iterator<Item = &IndexedNode> + '_ {
        self.graph.node_weights()
    }

    /// Resolve a node id to its graph index, failing with `NotFound`
    pub(crate) fn resolve(&self, id: &str) -> Result<NodeIndex> {
        self.node_lookup
            .get(id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("node {}", id)))
    }

    pub(crate) fn id_of(&self, idx: NodeIndex) -> &NodeId {
        &self.graph[idx].id
    }

    /// Distinct neighbours of `idx`, ordered by their first connecting edge
    pub(crate) fn adjacent(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<(u64, NodeIndex)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                // Self-loops are rejected upstream, so exactly one endpoint is `idx`
                let other = if e.source() == idx { e.target() } else { e.source() };
                (e.weight().seq, other)
            })
            .collect();
        edges.sort_by_key(|(seq, _)| *seq);

        let mut seen = HashSet::new();
        edges
            .into_iter()
            .filter_map(|(_, other)| seen.insert(other).then_some(other))
            .collect()
    }

    /// Earliest-inserted edge from `source` to `target`
    pub(crate) fn first_edge_between(
        &self,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<&IndexedEdge> {
        self.graph
            .edges_directed(source, Direction::Outgoing)
            .filter(|e| e.source() == source && e.target() == target)
            .map(|e| e.weight())
            .min_by_key(|w| w.seq)
    }

    pub(crate) fn has_edges(&self, idx: NodeIndex, direction: Direction) -> bool {
        self.graph.edges_directed(idx, direction).next().is_some()
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    fn require(&self, id: &NodeId) -> Result<NodeIndex> {
        self.node_lookup
            .get(id)
            .copied()
            .ok_or_else(|| Error::Consistency(format!("node {} missing from index", id)))
    }

    fn ids(&self, indices: Vec<NodeIndex>) -> Vec<NodeId> {
        indices.into_iter().map(|idx| self.id_of(idx).clone()).collect()
    }
}
