//! Process-wide lineage context
//!
//! Built once at process start and handed to the [`crate::LineageService`];
//! nothing in the engine reaches for global state.

use crate::config::{LineageConfig, StoreBackend};
use crate::Result;
use mesh_storage::{JsonFileStore, LineageStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

/// Configuration plus the store it selects
#[derive(Clone)]
pub struct LineageContext {
    pub config: LineageConfig,
    pub store: Arc<dyn LineageStore>,
}

impl LineageContext {
    pub fn new(config: LineageConfig, store: Arc<dyn LineageStore>) -> Self {
        Self { config, store }
    }

    /// Open the store backend named by the configuration
    pub fn from_config(config: LineageConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn LineageStore> = match &config.store {
            StoreBackend::Memory => {
                info!("Using in-memory lineage store");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::File(path) => {
                info!(path = %path.display(), "Using JSON file lineage store");
                Arc::new(JsonFileStore::open(path)?)
            }
        };

        Ok(Self::new(config, store))
    }

    /// Context with default configuration over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(LineageConfig::default(), Arc::new(MemoryStore::new()))
    }
}
