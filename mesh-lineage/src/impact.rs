//! Impact analysis for lineage changes
//!
//! Answers "which consumers are affected if this node changes": every node
//! reachable downstream, each with its shortest hop distance so callers can
//! rank severity by proximity.

use crate::index::GraphIndex;
use crate::queries::{LineageQuery, Reached};
use crate::Result;
use mesh_core::NodeId;
use serde::{Deserialize, Serialize};

/// Impact analysis for lineage changes
pub struct ImpactAnalysis<'a> {
    index: &'a GraphIndex,
    max_depth: Option<usize>,
}

impl<'a> ImpactAnalysis<'a> {
    /// Create a new, depth-unbounded impact analysis for the given index
    pub fn new(index: &'a GraphIndex) -> Self {
        Self {
            index,
            max_depth: None,
        }
    }

    /// Cap the analysis at `max_depth` hops (None for unlimited)
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Every node affected by a change to `id`, closest first
    pub fn affected(&self, id: &str) -> Result<Vec<Reached>> {
        LineageQuery::new(self.index).downstream(id, self.max_depth)
    }

    /// Analyze the impact of changing a node
    pub fn analyze_change(&self, id: &str) -> Result<ChangeImpact> {
        let query = LineageQuery::new(self.index);
        let affected = self.affected(id)?;
        let direct_downstream = affected.iter().filter(|r| r.depth == 1).count();
        let direct_upstream = query.ancestors(id)?.len();
        let max_depth = affected.iter().map(|r| r.depth).max().unwrap_or(0);

        Ok(ChangeImpact {
            source_node: NodeId::from(id),
            affected_count: affected.len(),
            direct_downstream,
            direct_upstream,
            max_depth,
            affected,
        })
    }
}

/// Result of an impact analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeImpact {
    /// The node that was changed
    pub source_node: NodeId,

    /// Number of affected nodes
    pub affected_count: usize,

    /// Consumers reading directly from the changed node
    pub direct_downstream: usize,

    /// Nodes the changed node reads from directly
    pub direct_upstream: usize,

    /// Distance to the farthest affected node
    pub max_depth: usize,

    /// Affected nodes with their shortest distance, closest first
    pub affected: Vec<Reached>,
}

impl ChangeImpact {
    /// Affected nodes no more than `depth` hops away
    pub fn within(&self, depth: usize) -> impl Iterator<Item = &Reached> + '_ {
        self.affected.iter().filter(move |r| r.depth <= depth)
    }
}
