//! # Mesh Lineage
//!
//! Lineage graph operations for tracking data dependencies and impact analysis.
//!
//! The [`LineageService`] owns the canonical graph through a
//! [`mesh_storage::LineageStore`] and keeps a derived [`GraphIndex`] in step
//! with every write. Queries run against the index through [`LineageQuery`]
//! and [`ImpactAnalysis`].

pub mod config;
pub mod context;
pub mod impact;
pub mod index;
pub mod queries;
pub mod service;

// Re-export commonly used types
pub use config::{LineageConfig, StoreBackend};
pub use context::LineageContext;
pub use impact::{ChangeImpact, ImpactAnalysis};
pub use index::GraphIndex;
pub use queries::{GraphSummary, LineageInfo, LineagePath, LineageQuery, PathHop, Reached};
pub use service::LineageService;

/// Result type for lineage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lineage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Index diverged from store: {0}")]
    Consistency(String),

    #[error("Storage error: {0}")]
    Storage(#[source] mesh_storage::Error),

    #[error("Lineage index lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Whether the caller should treat this as a server-side failure rather
    /// than a problem with its request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Consistency(_) | Self::Storage(_) | Self::LockPoisoned
        )
    }
}

impl From<mesh_storage::Error> for Error {
    fn from(err: mesh_storage::Error) -> Self {
        match err {
            mesh_storage::Error::NotFound(msg) => Self::NotFound(msg),
            mesh_storage::Error::InvalidEdge(msg) => Self::InvalidEdge(msg),
            mesh_storage::Error::InvalidArgument(msg) => Self::InvalidArgument(msg),
            mesh_storage::Error::Conflict(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}
