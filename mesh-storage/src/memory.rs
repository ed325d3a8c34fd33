//! In-process store backend

use crate::state::StoreState;
use crate::store::LineageStore;
use crate::{Error, Result};
use mesh_core::{Attributes, Edge, EdgeKey, Node, NodeId, NodeKind};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Store that keeps all records in process memory.
///
/// Cloning yields another handle onto the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given records
    pub fn from_state(state: StoreState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.inner.read().map_err(|_| Error::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.inner.write().map_err(|_| Error::LockPoisoned)
    }
}

impl LineageStore for MemoryStore {
    fn add_node(&self, id: NodeId, kind: NodeKind, attributes: Attributes) -> Result<Node> {
        self.write()?.upsert_node(id, kind, attributes)
    }

    fn add_edge(
        &self,
        source_id: NodeId,
        target_id: NodeId,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Result<Edge> {
        self.write()?
            .upsert_edge(source_id, target_id, transformation, attributes)
    }

    fn get_node(&self, id: &NodeId) -> Result<Node> {
        self.read()?.node(id).cloned()
    }

    fn list_edges_from(&self, id: &NodeId) -> Result<Vec<Edge>> {
        self.read()?.edges_from(id)
    }

    fn list_edges_to(&self, id: &NodeId) -> Result<Vec<Edge>> {
        self.read()?.edges_to(id)
    }

    fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.read()?.nodes())
    }

    fn list_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.read()?.edges().to_vec())
    }

    fn node_count(&self) -> Result<usize> {
        Ok(self.read()?.node_count())
    }

    fn edge_count(&self) -> Result<usize> {
        Ok(self.read()?.edge_count())
    }

    fn remove_node(&self, id: &NodeId) -> Result<Node> {
        self.write()?.remove_node(id)
    }

    fn remove_edge(&self, key: &EdgeKey) -> Result<Edge> {
        self.write()?.remove_edge(key)
    }
}
