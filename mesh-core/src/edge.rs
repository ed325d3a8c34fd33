//! Edge definitions
//!
//! An edge is a directed data-flow relationship: data leaves `source_id`
//! and arrives at `target_id`, optionally through a named transformation.

use crate::node::{Attributes, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an edge
///
/// Two edges with the same source, target and transformation are the same
/// edge; re-adding one refreshes it instead of creating a second entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub transformation: Option<String>,
}

impl EdgeKey {
    pub fn new(
        source_id: impl Into<NodeId>,
        target_id: impl Into<NodeId>,
        transformation: Option<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            transformation,
        }
    }

    /// Whether the edge points back at its own source
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transformation {
            Some(t) => write!(f, "{} -[{}]-> {}", self.source_id, t, self.target_id),
            None => write!(f, "{} -> {}", self.source_id, self.target_id),
        }
    }
}

/// Directed data-flow relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Node the data flows from
    pub source_id: NodeId,

    /// Node the data flows into
    pub target_id: NodeId,

    /// Description of the transformation (e.g. "cleansing", "aggregation")
    pub transformation: Option<String>,

    /// Free-form metadata (frequency, tool, ...)
    #[serde(default)]
    pub attributes: Attributes,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed whenever the same edge is added again
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge stamped with the current time
    pub fn new(
        source_id: impl Into<NodeId>,
        target_id: impl Into<NodeId>,
        transformation: Option<String>,
        attributes: Attributes,
    ) -> Self {
        let now = Utc::now();
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            transformation,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity of this edge
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source_id: self.source_id.clone(),
            target_id: self.target_id.clone(),
            transformation: self.transformation.clone(),
        }
    }

    /// Whether this edge matches the given key
    pub fn matches(&self, key: &EdgeKey) -> bool {
        self.source_id == key.source_id
            && self.target_id == key.target_id
            && self.transformation == key.transformation
    }

    /// Whether the node is either endpoint of this edge
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source_id == id || &self.target_id == id
    }

    /// Update the edge's updated_at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
