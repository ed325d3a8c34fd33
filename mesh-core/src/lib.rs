//! # Mesh Core
//!
//! Data model for the data mesh lineage engine: nodes (data products,
//! tables, jobs, reports), directed edges between them, and the typed
//! attribute bags both carry.

pub mod edge;
pub mod node;

// Re-export commonly used types
pub use edge::{Edge, EdgeKey};
pub use node::{AttributeValue, Attributes, Node, NodeBuilder, NodeId, NodeKind};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid node id: {0:?}")]
    InvalidNodeId(String),
}
