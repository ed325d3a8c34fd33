//! # Mesh Storage
//!
//! Durable record of lineage nodes and edges. The store is the single
//! source of truth for the lineage graph; any in-memory index is derived
//! from it and can be rebuilt from it.
//!
//! Two backends share one in-memory record set ([`StoreState`]):
//! - [`MemoryStore`] keeps everything in process memory
//! - [`JsonFileStore`] additionally snapshots every mutation to a JSON file

pub mod file;
pub mod memory;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::{Snapshot, StoreState};
pub use store::LineageStore;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for storage operations
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

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}
