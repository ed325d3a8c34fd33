//! Edge commands

use super::parse_attributes;
use crate::output::Format;
use anyhow::{Context, Result};
use mesh_lineage::LineageService;

pub fn add(
    service: &LineageService,
    source: &str,
    target: &str,
    transformation: Option<String>,
    attrs: &[String],
    format: Format,
) -> Result<()> {
    let attributes = parse_attributes(attrs)?;
    let edge = service
        .add_edge(source, target, transformation, attributes)
        .with_context(|| format!("Failed to add edge {} -> {}", source, target))?;

    format.emit(&edge, |edge| println!("Stored {}", edge.key()))
}

pub fn remove(
    service: &LineageService,
    source: &str,
    target: &str,
    transformation: Option<&str>,
    format: Format,
) -> Result<()> {
    let edge = service
        .remove_edge(source, target, transformation)
        .with_context(|| format!("Failed to remove edge {} -> {}", source, target))?;

    format.emit(&edge, |edge| println!("Removed {}", edge.key()))
}
