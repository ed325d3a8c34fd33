//! Lineage query commands

use crate::output::Format;
use anyhow::{Context, Result};
use mesh_lineage::{LineageService, Reached};

pub fn upstream(
    service: &LineageService,
    id: &str,
    max_depth: Option<i64>,
    format: Format,
) -> Result<()> {
    let reached = service
        .get_upstream(id, max_depth)
        .with_context(|| format!("Failed to query upstream of {}", id))?;

    format.emit(&reached, |reached| print_reached("Upstream", id, reached))
}

pub fn downstream(
    service: &LineageService,
    id: &str,
    max_depth: Option<i64>,
    format: Format,
) -> Result<()> {
    let reached = service
        .get_downstream(id, max_depth)
        .with_context(|| format!("Failed to query downstream of {}", id))?;

    format.emit(&reached, |reached| print_reached("Downstream", id, reached))
}

pub fn path(service: &LineageService, source: &str, target: &str, format: Format) -> Result<()> {
    let path = service
        .get_path(source, target)
        .with_context(|| format!("Failed to find path {} -> {}", source, target))?;

    format.emit(&path, |path| match path {
        Some(path) => {
            println!("Path ({} hops):", path.hop_count());
            for hop in &path.hops {
                match &hop.transformation {
                    Some(t) => println!("  {} -[{}]-> {}", hop.source_id, t, hop.target_id),
                    None => println!("  {} -> {}", hop.source_id, hop.target_id),
                }
            }
            if path.hops.is_empty() {
                println!("  {}", source);
            }
        }
        None => println!("No path from {} to {}", source, target),
    })
}

pub fn impact(service: &LineageService, id: &str, format: Format) -> Result<()> {
    let impact = service
        .analyze_impact(id)
        .with_context(|| format!("Failed to analyze impact of {}", id))?;

    format.emit(&impact, |impact| {
        println!(
            "Changing {} affects {} node(s), {} directly",
            impact.source_node, impact.affected_count, impact.direct_downstream
        );
        for reached in &impact.affected {
            println!("  [{}] {}", reached.depth, reached.node_id);
        }
    })
}

pub fn full(service: &LineageService, id: &str, format: Format) -> Result<()> {
    let info = service
        .get_full_lineage(id)
        .with_context(|| format!("Failed to query lineage of {}", id))?;

    format.emit(&info, |info| {
        print_reached("Upstream", id, &info.upstream);
        print_reached("Downstream", id, &info.downstream);
    })
}

fn print_reached(direction: &str, id: &str, reached: &[Reached]) {
    println!("{} of {} ({} node(s)):", direction, id, reached.len());
    for r in reached {
        println!("  [{}] {}", r.depth, r.node_id);
    }
}
