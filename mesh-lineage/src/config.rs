//! Lineage engine configuration
//!
//! Loaded from environment variables:
//! - `MESH_STORE_PATH`: JSON snapshot file backing the store (default: in-memory store)
//! - `MESH_DEFAULT_MAX_DEPTH`: depth applied to upstream/downstream queries that
//!   give none (default: unbounded)
//! - `MESH_IMPACT_MAX_DEPTH`: cap on impact analysis depth (default: unbounded)
//!
//! Depth variables accept a non-negative integer, or `none`/`unbounded`.

use crate::{Error, Result};
use std::path::PathBuf;

/// Where the lineage store keeps its records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process memory only; lost on exit
    #[default]
    Memory,

    /// JSON snapshot file at the given path
    File(PathBuf),
}

/// Configuration for the lineage engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineageConfig {
    pub store: StoreBackend,
    pub default_max_depth: Option<usize>,
    pub impact_max_depth: Option<usize>,
}

impl LineageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store = match lookup("MESH_STORE_PATH") {
            Some(path) if !path.trim().is_empty() => StoreBackend::File(PathBuf::from(path)),
            _ => StoreBackend::Memory,
        };

        let config = Self {
            store,
            default_max_depth: parse_depth(
                "MESH_DEFAULT_MAX_DEPTH",
                lookup("MESH_DEFAULT_MAX_DEPTH"),
            )?,
            impact_max_depth: parse_depth(
                "MESH_IMPACT_MAX_DEPTH",
                lookup("MESH_IMPACT_MAX_DEPTH"),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Use a JSON snapshot file as the store
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = StoreBackend::File(path.into());
        self
    }

    pub fn with_impact_max_depth(mut self, depth: Option<usize>) -> Self {
        self.impact_max_depth = depth;
        self
    }

    pub fn with_default_max_depth(mut self, depth: Option<usize>) -> Self {
        self.default_max_depth = depth;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.impact_max_depth == Some(0) {
            return Err(Error::InvalidArgument(
                "impact_max_depth must be at least 1 when set".to_string(),
            ));
        }
        if let StoreBackend::File(path) = &self.store {
            if path.is_dir() {
                return Err(Error::InvalidArgument(format!(
                    "store path {} is a directory",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn parse_depth(key: &str, raw: Option<String>) -> Result<Option<usize>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "unbounded" => Ok(None),
        value => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| {
                Error::InvalidArgument(format!(
                    "{} must be a non-negative integer, got {:?}",
                    key, raw
                ))
            }),
    }
}
