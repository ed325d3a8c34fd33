//! CLI configuration management

use anyhow::{Context, Result};
use mesh_lineage::{LineageConfig, LineageContext, LineageService};
use std::path::PathBuf;

/// CLI configuration: the engine settings from the environment, with the
/// store path taken from the command line
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub lineage: LineageConfig,
}

impl CliConfig {
    /// Load configuration from environment variables and the `--store` argument
    pub fn load(store: PathBuf) -> Result<Self> {
        let lineage = LineageConfig::from_env()
            .context("Invalid lineage configuration in environment")?
            .with_store_path(store);

        Ok(Self { lineage })
    }

    /// Open the configured store and build the lineage service over it
    pub fn open_service(self) -> Result<LineageService> {
        let description = format!("{:?}", self.lineage.store);
        tracing::debug!(store = %description, "Opening lineage store");
        let ctx = LineageContext::from_config(self.lineage)
            .with_context(|| format!("Failed to open lineage store {}", description))?;

        LineageService::from_context(ctx).context("Failed to build lineage index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::{Attributes, NodeKind};
    use mesh_lineage::StoreBackend;

    #[test]
    fn test_store_argument_selects_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");

        let config = CliConfig {
            lineage: LineageConfig::default().with_store_path(&path),
        };
        assert_eq!(config.lineage.store, StoreBackend::File(path.clone()));

        let service = config.clone().open_service().unwrap();
        service
            .add_node("orders", NodeKind::Table, Attributes::new())
            .unwrap();
        drop(service);

        let reopened = config.open_service().unwrap();
        assert_eq!(reopened.get_node("orders").unwrap().kind, NodeKind::Table);
    }

    #[test]
    fn test_directory_store_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            lineage: LineageConfig::default().with_store_path(dir.path()),
        };
        assert!(config.open_service().is_err());
    }
}
