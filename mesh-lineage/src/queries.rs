//! Lineage query operations
//!
//! This module provides query capabilities for traversing and analyzing the lineage graph.
//! It supports:
//! - Finding ancestors (upstream) and descendants (downstream), optionally depth-limited
//! - Shortest path finding between nodes
//! - Graph-wide summaries (counts by kind, sources, sinks)
//!
//! The graph may contain cycles. Every traversal tracks a visited set seeded
//! with its starting node, so each reachable node is reported exactly once
//! and walks terminate even without a depth bound.

use crate::index::GraphIndex;
use crate::Result;
use mesh_core::NodeId;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// A node reached by a traversal, with its shortest hop distance from the start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reached {
    pub node_id: NodeId,
    pub depth: usize,
}

impl Reached {
    pub fn new(node_id: impl Into<NodeId>, depth: usize) -> Self {
        Self {
            node_id: node_id.into(),
            depth,
        }
    }
}

/// One hop along a lineage path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHop {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// Transformation of the earliest-added edge between the two nodes
    pub transformation: Option<String>,
}

/// Shortest path between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineagePath {
    /// Node ids from source to target, inclusive
    pub nodes: Vec<NodeId>,
    pub hops: Vec<PathHop>,
}

impl LineagePath {
    /// Number of edges traversed
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }
}

/// Aggregate counts over the whole graph
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub by_kind: BTreeMap<String, usize>,
    /// Nodes with no incoming edges
    pub source_count: usize,
    /// Nodes with no outgoing edges
    pub sink_count: usize,
}

/// Query builder for lineage operations
pub struct LineageQuery<'a> {
    index: &'a GraphIndex,
}

impl<'a> LineageQuery<'a> {
    /// Create a new query for the given index
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    /// Find all direct ancestors (upstream dependencies) of a node
    pub fn ancestors(&self, id: &str) -> Result<Vec<NodeId>> {
        self.index.neighbors_in(id)
    }

    /// Find all direct descendants (downstream consumers) of a node
    pub fn descendants(&self, id: &str) -> Result<Vec<NodeId>> {
        self.index.neighbors_out(id)
    }

    /// Find all upstream nodes up to a maximum depth
    ///
    /// A depth of 0 returns nothing, a depth of 1 returns direct ancestors,
    /// depth of 2 includes ancestors of ancestors, etc.
    ///
    /// # Arguments
    /// * `id` - The starting node, excluded from the result
    /// * `max_depth` - Maximum traversal depth (None for unlimited)
    ///
    /// # Returns
    /// Reached nodes in discovery order, which is also closest-first
    pub fn upstream(&self, id: &str, max_depth: Option<usize>) -> Result<Vec<Reached>> {
        self.traverse(id, Direction::Incoming, max_depth)
    }

    /// Find all downstream nodes up to a maximum depth
    ///
    /// # Arguments
    /// * `id` - The starting node, excluded from the result
    /// * `max_depth` - Maximum traversal depth (None for unlimited)
    ///
    /// # Returns
    /// Reached nodes in discovery order, which is also closest-first
    pub fn downstream(&self, id: &str, max_depth: Option<usize>) -> Result<Vec<Reached>> {
        self.traverse(id, Direction::Outgoing, max_depth)
    }

    /// Get full lineage information for a node
    ///
    /// Returns both upstream and downstream nodes with their depths
    pub fn full_lineage(&self, id: &str) -> Result<LineageInfo> {
        let upstream = self.upstream(id, None)?;
        let downstream = self.downstream(id, None)?;

        let max_upstream_depth = upstream.iter().map(|r| r.depth).max().unwrap_or(0);
        let max_downstream_depth = downstream.iter().map(|r| r.depth).max().unwrap_or(0);

        Ok(LineageInfo {
            node_id: NodeId::from(id),
            upstream_count: upstream.len(),
            downstream_count: downstream.len(),
            upstream,
            downstream,
            max_upstream_depth,
            max_downstream_depth,
        })
    }

    /// Find the shortest path between two nodes
    ///
    /// Returns `Ok(None)` if no path exists. Among several shortest paths the
    /// one discovered first wins, expanding neighbours in edge insertion
    /// order, so the result is reproducible for a given graph state.
    pub fn path(&self, from: &str, to: &str) -> Result<Option<LineagePath>> {
        let from_idx = self.index.resolve(from)?;
        let to_idx = self.index.resolve(to)?;

        // Use BFS to find shortest path
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        queue.push_back(from_idx);
        visited.insert(from_idx);

        while let Some(current) = queue.pop_front() {
            if current == to_idx {
                return Ok(Some(self.reconstruct(&parent, to_idx)));
            }

            for neighbor in self.index.adjacent(current, Direction::Outgoing) {
                if visited.insert(neighbor) {
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(None)
    }

    /// Check if there is any path from one node to another
    pub fn is_reachable(&self, from: &str, to: &str) -> Result<bool> {
        Ok(self.path(from, to)?.is_some())
    }

    /// Calculate the distance (shortest path length) between two nodes
    ///
    /// Returns None if no path exists
    pub fn distance(&self, from: &str, to: &str) -> Result<Option<usize>> {
        Ok(self.path(from, to)?.map(|p| p.hop_count()))
    }

    /// Get all root nodes (nodes with no incoming edges)
    pub fn roots(&self) -> Vec<NodeId> {
        self.without_edges(Direction::Incoming)
    }

    /// Get all leaf nodes (nodes with no outgoing edges)
    pub fn leaves(&self) -> Vec<NodeId> {
        self.without_edges(Direction::Outgoing)
    }

    /// Aggregate counts over the whole graph
    pub fn summary(&self) -> GraphSummary {
        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for node in self.index.nodes() {
            *by_kind.entry(node.kind.to_string()).or_insert(0) += 1;
        }

        GraphSummary {
            node_count: self.index.node_count(),
            edge_count: self.index.edge_count(),
            by_kind,
            source_count: self.roots().len(),
            sink_count: self.leaves().len(),
        }
    }

    /// Internal helper for depth-limited breadth-first traversal
    fn traverse(
        &self,
        start: &str,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> Result<Vec<Reached>> {
        let start_idx = self.index.resolve(start)?;

        let mut result = Vec::new();
        let mut visited = HashSet::from([start_idx]);
        let mut queue = VecDeque::from([(start_idx, 0usize)]);

        while let Some((node_idx, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            for neighbor in self.index.adjacent(node_idx, direction) {
                if visited.insert(neighbor) {
                    result.push(Reached {
                        node_id: self.index.id_of(neighbor).clone(),
                        depth: depth + 1,
                    });
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        Ok(result)
    }

    fn reconstruct(&self, parent: &HashMap<NodeIndex, NodeIndex>, to: NodeIndex) -> LineagePath {
        let mut indices = vec![to];
        let mut curr = to;
        while let Some(&prev) = parent.get(&curr) {
            indices.push(prev);
            curr = prev;
        }
        indices.reverse();

        let hops = indices
            .windows(2)
            .map(|pair| PathHop {
                source_id: self.index.id_of(pair[0]).clone(),
                target_id: self.index.id_of(pair[1]).clone(),
                transformation: self
                    .index
                    .first_edge_between(pair[0], pair[1])
                    .and_then(|e| e.transformation.clone()),
            })
            .collect();

        LineagePath {
            nodes: indices
                .into_iter()
                .map(|idx| self.index.id_of(idx).clone())
                .collect(),
            hops,
        }
    }

    fn without_edges(&self, direction: Direction) -> Vec<NodeId> {
        self.index
            .node_indices()
            .filter(|&idx| !self.index.has_edges(idx, direction))
            .map(|idx| self.index.id_of(idx).clone())
            .collect()
    }
}

/// Full lineage information for a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageInfo {
    /// The node being queried
    pub node_id: NodeId,

    /// Total count of upstream nodes
    pub upstream_count: usize,

    /// Total count of downstream nodes
    pub downstream_count: usize,

    /// Upstream nodes with their depth from the queried node
    pub upstream: Vec<Reached>,

    /// Downstream nodes with their depth from the queried node
    pub downstream: Vec<Reached>,

    /// Maximum depth in the upstream direction
    pub max_upstream_depth: usize,

    /// Maximum depth in the downstream direction
    pub max_downstream_depth: usize,
}
