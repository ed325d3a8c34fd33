//! JSON snapshot store backend
//!
//! Every mutation is applied to a copy of the records, written to a
//! temporary file next to the snapshot and renamed over it. Only after the
//! rename succeeds does the copy replace the in-memory records, so a failed
//! write leaves both the file and the store unchanged.
//!
//! Each write clones the records and rewrites the whole snapshot, so a write
//! costs O(nodes + edges) and loading n records one at a time is O(n²).
//! Suited to graphs of up to a few thousand records.

use crate::state::{Snapshot, StoreState};
use crate::store::LineageStore;
use crate::{Error, Result};
use mesh_core::{Attributes, Edge, EdgeKey, Node, NodeId, NodeKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

/// Store persisted as a single pretty-printed JSON snapshot
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open the snapshot at `path`, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&raw)?;
            let state = StoreState::from_snapshot(snapshot)?;
            info!(
                path = %path.display(),
                nodes = state.node_count(),
                edges = state.edge_count(),
                "Loaded lineage snapshot"
            );
            state
        } else {
            debug!(path = %path.display(), "No lineage snapshot yet, starting empty");
            StoreState::new()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| Error::LockPoisoned)
    }

    /// Apply `f` to a copy of the records, persist it, then swap it in
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().map_err(|_| Error::LockPoisoned)?;

        let mut next = state.clone();
        let value = f(&mut next)?;
        self.persist(&next)?;
        *state = next;

        Ok(value)
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&state.to_snapshot())?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "Failed to remove temporary snapshot"
                );
            }
            return Err(err.into());
        }

        debug!(
            path = %self.path.display(),
            nodes = state.node_count(),
            edges = state.edge_count(),
            "Persisted lineage snapshot"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "lineage.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LineageStore for JsonFileStore {
    fn add_node(&self, id: NodeId, kind: NodeKind, attributes: Attributes) -> Result<Node> {
        self.mutate(|state| state.upsert_node(id, kind, attributes))
    }

    fn add_edge(
        &self,
        source_id: NodeId,
        target_id: NodeId,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Result<Edge> {
        self.mutate(|state| state.upsert_edge(source_id, target_id, transformation, attributes))
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
        self.mutate(|state| state.remove_node(id))
    }

    fn remove_edge(&self, key: &EdgeKey) -> Result<Edge> {
        self.mutate(|state| state.remove_edge(key))
    }
}
