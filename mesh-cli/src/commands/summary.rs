//! Graph summary and maintenance commands

use crate::output::Format;
use anyhow::{Context, Result};
use mesh_lineage::LineageService;

pub fn execute(service: &LineageService, format: Format) -> Result<()> {
    let summary = service.get_summary().context("Failed to summarize graph")?;

    format.emit(&summary, |summary| {
        println!("Nodes:   {}", summary.node_count);
        println!("Edges:   {}", summary.edge_count);
        println!("Sources: {}", summary.source_count);
        println!("Sinks:   {}", summary.sink_count);
        for (kind, count) in &summary.by_kind {
            println!("  {}: {}", kind, count);
        }
    })
}

pub fn rebuild(service: &LineageService, format: Format) -> Result<()> {
    service.rebuild_index().context("Failed to rebuild index")?;
    service
        .verify_consistency()
        .context("Index still inconsistent after rebuild")?;
    let summary = service.get_summary()?;

    format.emit(&summary, |summary| {
        println!(
            "Index rebuilt: {} nodes, {} edges",
            summary.node_count, summary.edge_count
        );
    })
}
