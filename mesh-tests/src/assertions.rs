//! Custom assertions for lineage results
//!
//! Compare by id and depth so failures print readable pairs instead of
//! whole structs.

use mesh_core::NodeId;
use mesh_lineage::{LineagePath, Reached};

/// Assert traversal output equals `expected` (id, depth) pairs, in order
pub fn assert_reached(actual: &[Reached], expected: &[(&str, usize)]) {
    let actual: Vec<(&str, usize)> = actual
        .iter()
        .map(|r| (r.node_id.as_str(), r.depth))
        .collect();
    assert_eq!(actual, expected, "unexpected traversal result");
}

/// Assert traversal output contains exactly `expected` ids, ignoring order
pub fn assert_reached_ids(actual: &[Reached], expected: &[&str]) {
    let mut actual: Vec<&str> = actual.iter().map(|r| r.node_id.as_str()).collect();
    let mut expected = expected.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected, "unexpected set of reached nodes");
}

/// Assert no node appears twice in a traversal result
pub fn assert_unique(actual: &[Reached]) {
    let mut seen = std::collections::HashSet::new();
    for r in actual {
        assert!(seen.insert(&r.node_id), "node {} reached twice", r.node_id);
    }
}

/// Assert a path exists and visits exactly `expected`
pub fn assert_path(actual: &Option<LineagePath>, expected: &[&str]) {
    let path = actual
        .as_ref()
        .unwrap_or_else(|| panic!("expected path {:?}, found none", expected));
    let nodes: Vec<&str> = path.nodes.iter().map(NodeId::as_str).collect();
    assert_eq!(nodes, expected, "unexpected path");
    assert_eq!(path.hop_count() + 1, path.nodes.len(), "hops do not match nodes");
}
