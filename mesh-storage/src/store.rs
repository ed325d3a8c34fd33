//! Persistence interface consumed by the lineage service

use crate::Result;
use mesh_core::{Attributes, Edge, EdgeKey, Node, NodeId, NodeKind};

/// Durable record of lineage nodes and edges.
///
/// Every call is atomic: it either succeeds or fails outright, leaving no
/// partial write behind. Calls are blocking; a remote implementation is
/// expected to apply its own timeout and retry policy behind this trait.
pub trait LineageStore: Send + Sync {
    /// Create or update a node. Idempotent on `id`.
    fn add_node(&self, id: NodeId, kind: NodeKind, attributes: Attributes) -> Result<Node>;

    /// Create an edge, or refresh an identical (source, target, transformation) edge.
    ///
    /// Fails with `NotFound` when an endpoint is absent and `InvalidEdge`
    /// for self-loops.
    fn add_edge(
        &self,
        source_id: NodeId,
        target_id: NodeId,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Result<Edge>;

    fn get_node(&self, id: &NodeId) -> Result<Node>;

    /// Edges leaving `id`, in insertion order
    fn list_edges_from(&self, id: &NodeId) -> Result<Vec<Edge>>;

    /// Edges arriving at `id`, in insertion order
    fn list_edges_to(&self, id: &NodeId) -> Result<Vec<Edge>>;

    /// All nodes, in insertion order
    fn list_nodes(&self) -> Result<Vec<Node>>;

    /// All edges, in insertion order
    fn list_edges(&self) -> Result<Vec<Edge>>;

    fn node_count(&self) -> Result<usize>;

    fn edge_count(&self) -> Result<usize>;

    /// Remove a node. Fails with `Conflict` while any edge references it.
    fn remove_node(&self, id: &NodeId) -> Result<Node>;

    fn remove_edge(&self, key: &EdgeKey) -> Result<Edge>;
}
