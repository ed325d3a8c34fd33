//! Ready-made lineage graphs
//!
//! Every fixture returns a service over a fresh in-memory store.

use crate::builders::GraphBuilder;
use mesh_lineage::{LineageContext, LineageService};

/// Empty service with default configuration
pub fn empty() -> LineageService {
    LineageService::from_context(LineageContext::in_memory())
        .unwrap_or_else(|e| panic!("failed to build in-memory service: {}", e))
}

/// A -> B -> C -> A
pub fn cycle() -> LineageService {
    GraphBuilder::new().chain(&["A", "B", "C", "A"]).build()
}

/// n0 -> n1 -> ... -> n(len-1)
pub fn chain(len: usize) -> LineageService {
    let ids: Vec<String> = (0..len).map(chain_id).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let builder = match refs.as_slice() {
        [only] => GraphBuilder::new().node(only),
        _ => GraphBuilder::new().chain(&refs),
    };
    builder.build()
}

/// Id of the `i`th node in a [`chain`]
pub fn chain_id(i: usize) -> String {
    format!("n{}", i)
}

/// src -> left -> sink, src -> right -> sink
pub fn diamond() -> LineageService {
    GraphBuilder::new()
        .edge("src", "left")
        .edge("src", "right")
        .edge("left", "sink")
        .edge("right", "sink")
        .build()
}

/// One source feeding `width` targets named t0..t(width-1)
pub fn fan_out(width: usize) -> LineageService {
    (0..width)
        .fold(GraphBuilder::new().node("source"), |builder, i| {
            builder.edge("source", &format!("t{}", i))
        })
        .build()
}

/// A -> B -> C -> A plus an isolated node D
pub fn cycle_with_isolated() -> LineageService {
    GraphBuilder::on(cycle()).node("D").build()
}
