//! Mesh lineage CLI

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "mesh")]
#[command(author, version, about = "Data mesh lineage CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Lineage store file
    #[arg(long, global = true, env = "MESH_STORE_PATH", default_value = "./lineage.json")]
    store: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update a node
    AddNode {
        /// Node identifier
        #[arg(required_unless_present = "generate_id")]
        id: Option<String>,

        /// Node kind (data_product, table, job, report, ...)
        #[arg(long, default_value = "unknown")]
        kind: String,

        /// Attribute as key=value; repeatable
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,

        /// Generate a random identifier instead of passing one
        #[arg(long, conflicts_with = "id")]
        generate_id: bool,
    },

    /// Record that data flows from source to target
    AddEdge {
        source: String,
        target: String,

        /// Transformation applied along the edge
        #[arg(long)]
        transformation: Option<String>,

        /// Attribute as key=value; repeatable
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },

    /// Show a node
    GetNode { id: String },

    /// Show nodes feeding a node
    Upstream {
        id: String,

        /// Maximum hops to follow (default: unbounded)
        #[arg(long)]
        max_depth: Option<i64>,
    },

    /// Show nodes consuming a node
    Downstream {
        id: String,

        /// Maximum hops to follow (default: unbounded)
        #[arg(long)]
        max_depth: Option<i64>,
    },

    /// Find a shortest lineage path
    Path { source: String, target: String },

    /// Show everything affected by a change to a node
    Impact { id: String },

    /// Show full upstream and downstream lineage of a node
    Lineage { id: String },

    /// Show graph-wide statistics
    Summary,

    /// Remove a node without edges
    RemoveNode { id: String },

    /// Remove an edge
    RemoveEdge {
        source: String,
        target: String,

        #[arg(long)]
        transformation: Option<String>,
    },

    /// Rebuild the lineage index from the store
    Rebuild,
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let log_level = default_log_level(cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::CliConfig::load(cli.store)?;
    let service = config.open_service()?;
    let format = output::Format::from_json_flag(cli.json);

    match cli.command {
        Commands::AddNode {
            id,
            kind,
            attrs,
            generate_id,
        } => {
            commands::node::add(&service, id, generate_id, &kind, &attrs, format)?;
        }
        Commands::AddEdge {
            source,
            target,
            transformation,
            attrs,
        } => {
            commands::edge::add(&service, &source, &target, transformation, &attrs, format)?;
        }
        Commands::GetNode { id } => {
            commands::node::get(&service, &id, format)?;
        }
        Commands::Upstream { id, max_depth } => {
            commands::lineage::upstream(&service, &id, max_depth, format)?;
        }
        Commands::Downstream { id, max_depth } => {
            commands::lineage::downstream(&service, &id, max_depth, format)?;
        }
        Commands::Path { source, target } => {
            commands::lineage::path(&service, &source, &target, format)?;
        }
        Commands::Impact { id } => {
            commands::lineage::impact(&service, &id, format)?;
        }
        Commands::Lineage { id } => {
            commands::lineage::full(&service, &id, format)?;
        }
        Commands::Summary => {
            commands::summary::execute(&service, format)?;
        }
        Commands::RemoveNode { id } => {
            commands::node::remove(&service, &id, format)?;
        }
        Commands::RemoveEdge {
            source,
            target,
            transformation,
        } => {
            commands::edge::remove(
                &service,
                &source,
                &target,
                transformation.as_deref(),
                format,
            )?;
        }
        Commands::Rebuild => {
            commands::summary::rebuild(&service, format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(false), "info");
        assert_eq!(default_log_level(true), "debug");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
