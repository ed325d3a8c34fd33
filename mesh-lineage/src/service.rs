//! Lineage service
//!
//! Public entry point of the engine. Mutations go to the store first and are
//! then applied to the graph index under the same write lock, so queries
//! never observe a half-applied change. Queries validate their arguments and
//! run against the index under a shared read lock.
//!
//! If a store write succeeds but the index cannot absorb it, the index has
//! diverged from the store. The service rebuilds the index from the store
//! before releasing the lock and reports [`Error::Consistency`] to the caller.

use crate::config::LineageConfig;
use crate::context::LineageContext;
use crate::impact::{ChangeImpact, ImpactAnalysis};
use crate::index::GraphIndex;
use crate::queries::{GraphSummary, LineageInfo, LineagePath, LineageQuery, Reached};
use crate::{Error, Result};
use mesh_core::{Attributes, Edge, EdgeKey, Node, NodeId, NodeKind};
use mesh_storage::LineageStore;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, instrument, warn};

/// Orchestrates the store and the graph index
pub struct LineageService {
    store: Arc<dyn LineageStore>,
    index: RwLock<GraphIndex>,
    config: LineageConfig,
}

impl LineageService {
    /// Create a service over `store`, building the index from its contents
    pub fn new(store: Arc<dyn LineageStore>, config: LineageConfig) -> Result<Self> {
        config.validate()?;
        let index = GraphIndex::build(store.as_ref())?;
        info!(
            nodes = index.node_count(),
            edges = index.edge_count(),
            "Lineage index built"
        );

        Ok(Self {
            store,
            index: RwLock::new(index),
            config,
        })
    }

    pub fn from_context(ctx: LineageContext) -> Result<Self> {
        Self::new(ctx.store, ctx.config)
    }

    pub fn config(&self) -> &LineageConfig {
        &self.config
    }

    /// Create or update a node
    #[instrument(skip(self, id, attributes), fields(node_id = %id.as_ref()))]
    pub fn add_node(
        &self,
        id: impl Into<NodeId> + AsRef<str>,
        kind: NodeKind,
        attributes: Attributes,
    ) -> Result<Node> {
        let id = id.into();
        if id.is_blank() {
            return Err(Error::InvalidArgument("node id must not be empty".to_string()));
        }

        let mut index = self.write_index()?;
        let node = self.store.add_node(id, kind, attributes)?;
        index.on_node_added(&node);

        debug!(kind = %node.kind, "Node stored");
        Ok(node)
    }

    /// Create an edge, or refresh an identical one
    #[instrument(
        skip(self, source_id, target_id, attributes),
        fields(source = %source_id.as_ref(), target = %target_id.as_ref())
    )]
    pub fn add_edge(
        &self,
        source_id: impl Into<NodeId> + AsRef<str>,
        target_id: impl Into<NodeId> + AsRef<str>,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Result<Edge> {
        let source_id = source_id.into();
        let target_id = target_id.into();
        if source_id == target_id {
            return Err(Error::InvalidEdge(format!("self-loop on node {}", source_id)));
        }

        let mut index = self.write_index()?;
        let edge = self
            .store
            .add_edge(source_id, target_id, transformation, attributes)?;
        self.sync_index(&mut index, |index| index.on_edge_added(&edge))?;

        debug!(edge = %edge.key(), "Edge stored");
        Ok(edge)
    }

    pub fn get_node(&self, id: &str) -> Result<Node> {
        Ok(self.store.get_node(&NodeId::from(id))?)
    }

    /// Remove a node; rejected with `Conflict` while edges reference it
    #[instrument(skip(self))]
    pub fn remove_node(&self, id: &str) -> Result<Node> {
        let id = NodeId::from(id);
        let mut index = self.write_index()?;
        let node = self.store.remove_node(&id)?;
        self.sync_index(&mut index, |index| index.on_node_removed(&id))?;

        info!("Node removed");
        Ok(node)
    }

    #[instrument(skip(self))]
    pub fn remove_edge(
        &self,
        source_id: &str,
        target_id: &str,
        transformation: Option<&str>,
    ) -> Result<Edge> {
        let key = EdgeKey::new(source_id, target_id, transformation.map(str::to_string));
        let mut index = self.write_index()?;
        let edge = self.store.remove_edge(&key)?;
        self.sync_index(&mut index, |index| index.on_edge_removed(&key))?;

        info!(edge = %key, "Edge removed");
        Ok(edge)
    }

    /// Nodes feeding `id`, closest first
    #[instrument(skip(self))]
    pub fn get_upstream(&self, id: &str, max_depth: Option<i64>) -> Result<Vec<Reached>> {
        let max_depth = self.depth_or_default(max_depth)?;
        let index = self.read_index()?;
        LineageQuery::new(&index).upstream(id, max_depth)
    }

    /// Nodes consuming `id`, closest first
    #[instrument(skip(self))]
    pub fn get_downstream(&self, id: &str, max_depth: Option<i64>) -> Result<Vec<Reached>> {
        let max_depth = self.depth_or_default(max_depth)?;
        let index = self.read_index()?;
        LineageQuery::new(&index).downstream(id, max_depth)
    }

    /// One shortest path from `source_id` to `target_id`, if any
    #[instrument(skip(self))]
    pub fn get_path(&self, source_id: &str, target_id: &str) -> Result<Option<LineagePath>> {
        let index = self.read_index()?;
        LineageQuery::new(&index).path(source_id, target_id)
    }

    /// Every node affected by a change to `id`, with its distance
    #[instrument(skip(self))]
    pub fn get_impact(&self, id: &str) -> Result<Vec<Reached>> {
        let index = self.read_index()?;
        self.impact(&index).affected(id)
    }

    /// Impact report including direct upstream and downstream counts
    #[instrument(skip(self))]
    pub fn analyze_impact(&self, id: &str) -> Result<ChangeImpact> {
        let index = self.read_index()?;
        self.impact(&index).analyze_change(id)
    }

    #[instrument(skip(self))]
    pub fn get_full_lineage(&self, id: &str) -> Result<LineageInfo> {
        let index = self.read_index()?;
        LineageQuery::new(&index).full_lineage(id)
    }

    pub fn get_summary(&self) -> Result<GraphSummary> {
        let index = self.read_index()?;
        Ok(LineageQuery::new(&index).summary())
    }

    /// Discard the index and rebuild it from the store.
    ///
    /// Holds the write lock for the whole rebuild.
    #[instrument(skip(self))]
    pub fn rebuild_index(&self) -> Result<()> {
        let mut index = self.write_index()?;
        index.rebuild_from(self.store.as_ref())?;
        info!(
            nodes = index.node_count(),
            edges = index.edge_count(),
            "Lineage index rebuilt"
        );
        Ok(())
    }

    /// Compare index and store counts, rebuilding the index on divergence
    #[instrument(skip(self))]
    pub fn verify_consistency(&self) -> Result<()> {
        let mut index = self.write_index()?;
        let store_nodes = self.store.node_count()?;
        let store_edges = self.store.edge_count()?;

        if store_nodes == index.node_count() && store_edges == index.edge_count() {
            return Ok(());
        }

        let message = format!(
            "store has {} nodes/{} edges, index has {}/{}",
            store_nodes,
            store_edges,
            index.node_count(),
            index.edge_count()
        );
        error!(%message, "Lineage index diverged from store");
        self.recover(&mut index);
        Err(Error::Consistency(message))
    }

    fn impact<'a>(&self, index: &'a GraphIndex) -> ImpactAnalysis<'a> {
        ImpactAnalysis::new(index).with_max_depth(self.config.impact_max_depth)
    }

    /// Apply an index update for a store write that already succeeded
    fn sync_index(
        &self,
        index: &mut GraphIndex,
        update: impl FnOnce(&mut GraphIndex) -> Result<()>,
    ) -> Result<()> {
        if let Err(err) = update(index) {
            error!(error = %err, "Index update failed after store write");
            self.recover(index);
            return Err(match err {
                Error::Consistency(msg) => Error::Consistency(msg),
                other => Error::Consistency(other.to_string()),
            });
        }
        Ok(())
    }

    fn recover(&self, index: &mut GraphIndex) {
        match index.rebuild_from(self.store.as_ref()) {
            Ok(()) => warn!(
                nodes = index.node_count(),
                edges = index.edge_count(),
                "Lineage index rebuilt from store"
            ),
            Err(err) => error!(error = %err, "Lineage index rebuild failed"),
        }
    }

    fn depth_or_default(&self, max_depth: Option<i64>) -> Result<Option<usize>> {
        match max_depth {
            None => Ok(self.config.default_max_depth),
            Some(depth) => usize::try_from(depth).map(Some).map_err(|_| {
                Error::InvalidArgument(format!("max_depth must be non-negative, got {}", depth))
            }),
        }
    }

    fn read_index(&self) -> Result<RwLockReadGuard<'_, GraphIndex>> {
        self.index.read().map_err(|_| Error::LockPoisoned)
    }

    fn write_index(&self) -> Result<RwLockWriteGuard<'_, GraphIndex>> {
        self.index.write().map_err(|_| Error::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_storage::MemoryStore;

    fn service() -> LineageService {
        LineageService::from_context(LineageContext::in_memory()).unwrap()
    }

    fn cycle_service() -> LineageService {
        let service = service();
        for id in ["A", "B", "C"] {
            service.add_node(id, NodeKind::Table, Attributes::new()).unwrap();
        }
        service.add_edge("A", "B", None, Attributes::new()).unwrap();
        service.add_edge("B", "C", None, Attributes::new()).unwrap();
        service.add_edge("C", "A", None, Attributes::new()).unwrap();
        service
    }

    #[test]
    fn test_add_node_rejects_empty_id() {
        let service = service();
        assert!(matches!(
            service.add_node("", NodeKind::Table, Attributes::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            service.add_node("  ", NodeKind::Table, Attributes::new()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_edge_unknown_endpoint() {
        let service = service();
        service.add_node("Y", NodeKind::Table, Attributes::new()).unwrap();

        let result = service.add_edge("X", "Y", None, Attributes::new());
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(service.get_summary().unwrap().edge_count, 0);
    }

    #[test]
    fn test_self_loop_rejected() {
        let service = service();
        service.add_node("A", NodeKind::Table, Attributes::new()).unwrap();
        assert!(matches!(
            service.add_edge("A", "A", None, Attributes::new()),
            Err(Error::InvalidEdge(_))
        ));
    }

    #[test]
    fn test_cycle_scenario() {
        let service = cycle_service();

        assert_eq!(
            service.get_downstream("A", None).unwrap(),
            vec![Reached::new("B", 1), Reached::new("C", 2)]
        );
        let path = service.get_path("A", "C").unwrap().unwrap();
        assert_eq!(
            path.nodes,
            vec![NodeId::from("A"), NodeId::from("B"), NodeId::from("C")]
        );
        assert_eq!(
            service.get_impact("B").unwrap(),
            vec![Reached::new("C", 1), Reached::new("A", 2)]
        );
    }

    #[test]
    fn test_negative_depth_is_invalid() {
        let service = cycle_service();
        assert!(matches!(
            service.get_downstream("A", Some(-1)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            service.get_upstream("A", Some(-5)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(service.get_downstream("A", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_node_queries() {
        let service = cycle_service();
        assert!(matches!(service.get_downstream("Q", None), Err(Error::NotFound(_))));
        assert!(matches!(service.get_impact("Q"), Err(Error::NotFound(_))));
        assert!(matches!(service.get_path("Q", "A"), Err(Error::NotFound(_))));
        assert!(matches!(service.get_node("Q"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_default_depth_from_config() {
        let store = Arc::new(MemoryStore::new());
        let config = LineageConfig::default().with_default_max_depth(Some(1));
        let service = LineageService::new(store, config).unwrap();
        for id in ["a", "b", "c"] {
            service.add_node(id, NodeKind::Job, Attributes::new()).unwrap();
        }
        service.add_edge("a", "b", None, Attributes::new()).unwrap();
        service.add_edge("b", "c", None, Attributes::new()).unwrap();

        assert_eq!(service.get_downstream("a", None).unwrap().len(), 1);
        assert_eq!(service.get_downstream("a", Some(5)).unwrap().len(), 2);
        // Impact is governed by its own cap
        assert_eq!(service.get_impact("a").unwrap().len(), 2);
    }

    #[test]
    fn test_remove_node_conflict() {
        let service = cycle_service();

        assert!(matches!(service.remove_node("B"), Err(Error::Conflict(_))));
        assert!(service.get_node("B").is_ok());

        service.remove_edge("A", "B", None).unwrap();
        service.remove_edge("B", "C", None).unwrap();
        service.remove_node("B").unwrap();

        assert!(matches!(service.get_downstream("B", None), Err(Error::NotFound(_))));
        assert_eq!(
            service.get_downstream("C", None).unwrap(),
            vec![Reached::new("A", 1)]
        );
        assert!(matches!(
            service.remove_edge("A", "B", None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_index_divergence_triggers_rebuild() {
        let store = MemoryStore::new();
        let service =
            LineageService::new(Arc::new(store.clone()), LineageConfig::default()).unwrap();
        service.add_node("a", NodeKind::Table, Attributes::new()).unwrap();

        // Written behind the service's back: the store knows "b", the index does not
        store
            .add_node(NodeId::from("b"), NodeKind::Table, Attributes::new())
            .unwrap();

        let result = service.add_edge("a", "b", None, Attributes::new());
        assert!(matches!(result, Err(Error::Consistency(_))));
        assert!(result.unwrap_err().is_fatal());

        // The rebuild picked up both the node and the edge from the store
        assert_eq!(
            service.get_downstream("a", None).unwrap(),
            vec![Reached::new("b", 1)]
        );
    }

    #[test]
    fn test_verify_consistency_rebuilds() {
        let store = MemoryStore::new();
        let service =
            LineageService::new(Arc::new(store.clone()), LineageConfig::default()).unwrap();
        assert!(service.verify_consistency().is_ok());

        store
            .add_node(NodeId::from("ghost"), NodeKind::Report, Attributes::new())
            .unwrap();

        assert!(matches!(
            service.verify_consistency(),
            Err(Error::Consistency(_))
        ));
        assert!(service.verify_consistency().is_ok());
        assert_eq!(service.get_summary().unwrap().node_count, 1);
    }

    #[test]
    fn test_analyze_impact_report() {
        let service = cycle_service();
        let impact = service.analyze_impact("A").unwrap();
        assert_eq!(impact.affected_count, 2);
        assert_eq!(impact.direct_downstream, 1);
        assert_eq!(impact.direct_upstream, 1);
    }

    #[test]
    fn test_rebuild_index_preserves_answers() {
        let service = cycle_service();
        let before = service.get_path("B", "A").unwrap();
        service.rebuild_index().unwrap();
        assert_eq!(service.get_path("B", "A").unwrap(), before);
        assert_eq!(service.get_summary().unwrap().edge_count, 3);
    }
}
