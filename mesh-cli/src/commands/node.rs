//! Node commands

use super::parse_attributes;
use crate::output::Format;
use anyhow::{Context, Result};
use mesh_core::{Node, NodeId, NodeKind};
use mesh_lineage::LineageService;

pub fn add(
    service: &LineageService,
    id: Option<String>,
    generate_id: bool,
    kind: &str,
    attrs: &[String],
    format: Format,
) -> Result<()> {
    let id = match id {
        Some(id) => NodeId::parse(id).context("Invalid node id")?,
        None if generate_id => NodeId::generate(),
        None => anyhow::bail!("Node id is required unless --generate-id is given"),
    };
    let attributes = parse_attributes(attrs)?;

    let node = service
        .add_node(id.clone(), NodeKind::from(kind), attributes)
        .with_context(|| format!("Failed to add node {}", id))?;

    format.emit(&node, |node| println!("Stored {} ({})", node.id, node.kind))
}

pub fn get(service: &LineageService, id: &str, format: Format) -> Result<()> {
    let node = service
        .get_node(id)
        .with_context(|| format!("Failed to get node {}", id))?;

    format.emit(&node, print_node)
}

pub fn remove(service: &LineageService, id: &str, format: Format) -> Result<()> {
    let node = service
        .remove_node(id)
        .with_context(|| format!("Failed to remove node {}", id))?;

    format.emit(&node, |node| println!("Removed {}", node.id))
}

fn print_node(node: &Node) {
    println!("{}", node.id);
    println!("  kind:    {}", node.kind);
    println!("  created: {}", node.created_at.to_rfc3339());
    println!("  updated: {}", node.updated_at.to_rfc3339());
    for (key, value) in &node.attributes {
        println!("  {} = {}", key, value);
    }
}
