//! Property-based tests for lineage traversal using proptest

use mesh_core::{Attributes, NodeKind};
use mesh_lineage::{Error, LineageService};
use mesh_tests::fixtures;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Node count plus arbitrary edges between them, self-loops included
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..10).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..30);
        (Just(n), edges)
    })
}

fn id(i: usize) -> String {
    format!("node{}", i)
}

/// Build the graph; self-loops must be rejected and are left out
fn build(n: usize, edges: &[(usize, usize)]) -> LineageService {
    let service = fixtures::empty();
    for i in 0..n {
        service
            .add_node(id(i).as_str(), NodeKind::Table, Attributes::new())
            .unwrap();
    }
    for &(s, t) in edges {
        let result = service.add_edge(id(s).as_str(), id(t).as_str(), None, Attributes::new());
        if s == t {
            assert!(matches!(result, Err(Error::InvalidEdge(_))));
        } else {
            result.unwrap();
        }
    }
    service
}

/// Reference shortest distances from `start` following `edges` forwards
fn reference_distances(
    n: usize,
    edges: &[(usize, usize)],
    start: usize,
) -> BTreeMap<String, usize> {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(s, t) in edges {
        if s != t {
            adjacency.entry(s).or_default().push(t);
        }
    }

    let mut dist = vec![None; n];
    dist[start] = Some(0usize);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let d = dist[current].unwrap_or(0);
        for &next in adjacency.get(&current).into_iter().flatten() {
            if dist[next].is_none() {
                dist[next] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }

    dist.iter()
        .enumerate()
        .filter(|(i, _)| *i != start)
        .filter_map(|(i, d)| d.map(|d| (id(i), d)))
        .collect()
}

proptest! {
    #[test]
    fn prop_downstream_matches_bfs_distances((n, edges) in graph_strategy(), start in 0usize..10) {
        let start = start % n;
        let service = build(n, &edges);

        let reached = service.get_downstream(&id(start), None).unwrap();
        let actual: BTreeMap<String, usize> = reached
            .iter()
            .map(|r| (r.node_id.to_string(), r.depth))
            .collect();

        // Each node at most once, start excluded, closest first
        prop_assert_eq!(actual.len(), reached.len());
        prop_assert!(!actual.contains_key(&id(start)));
        prop_assert!(reached.windows(2).all(|w| w[0].depth <= w[1].depth));
        prop_assert_eq!(actual, reference_distances(n, &edges, start));
    }

    #[test]
    fn prop_path_length_is_distance_and_stable(
        (n, edges) in graph_strategy(),
        from in 0usize..10,
        to in 0usize..10,
    ) {
        let (from, to) = (from % n, to % n);
        let service = build(n, &edges);
        let distances = reference_distances(n, &edges, from);

        let path = service.get_path(&id(from), &id(to)).unwrap();
        if from == to {
            let path = path.clone().unwrap();
            prop_assert_eq!(path.nodes.len(), 1);
            prop_assert_eq!(path.hop_count(), 0);
        } else {
            match distances.get(&id(to)) {
                Some(&d) => {
                    let path = path.clone().unwrap();
                    prop_assert_eq!(path.hop_count(), d);
                    prop_assert_eq!(path.nodes.first().map(|x| x.to_string()), Some(id(from)));
                    prop_assert_eq!(path.nodes.last().map(|x| x.to_string()), Some(id(to)));
                    for hop in &path.hops {
                        let hop_edge = edges.iter().any(|&(s, t)| {
                            id(s) == hop.source_id.as_str() && id(t) == hop.target_id.as_str()
                        });
                        prop_assert!(hop_edge);
                    }
                }
                None => {
                    prop_assert!(path.is_none());
                }
            }
        }

        for _ in 0..3 {
            prop_assert_eq!(&service.get_path(&id(from), &id(to)).unwrap(), &path);
        }
    }

    #[test]
    fn prop_upstream_is_reverse_of_downstream((n, edges) in graph_strategy(), node in 0usize..10) {
        let node = node % n;
        let service = build(n, &edges);

        let upstream: BTreeSet<String> = service
            .get_upstream(&id(node), None)
            .unwrap()
            .into_iter()
            .map(|r| r.node_id.to_string())
            .collect();

        for other in (0..n).filter(|&o| o != node) {
            let reaches = reference_distances(n, &edges, other).contains_key(&id(node));
            prop_assert_eq!(upstream.contains(&id(other)), reaches);
        }
    }

    #[test]
    fn prop_impact_contains_direct_downstream((n, edges) in graph_strategy(), node in 0usize..10) {
        let node = node % n;
        let service = build(n, &edges);

        let impact: BTreeSet<String> = service
            .get_impact(&id(node))
            .unwrap()
            .into_iter()
            .map(|r| r.node_id.to_string())
            .collect();
        let direct = service.get_downstream(&id(node), Some(1)).unwrap();

        prop_assert!(direct.iter().all(|r| impact.contains(r.node_id.as_str())));
        prop_assert_eq!(impact.is_empty(), direct.is_empty());
    }

    #[test]
    fn prop_summary_consistent_with_graph((n, edges) in graph_strategy()) {
        let service = build(n, &edges);
        let summary = service.get_summary().unwrap();

        let distinct: BTreeSet<(usize, usize)> =
            edges.iter().copied().filter(|(s, t)| s != t).collect();
        let with_incoming: BTreeSet<usize> = distinct.iter().map(|&(_, t)| t).collect();
        let with_outgoing: BTreeSet<usize> = distinct.iter().map(|&(s, _)| s).collect();

        prop_assert_eq!(summary.node_count, n);
        prop_assert_eq!(summary.edge_count, distinct.len());
        prop_assert_eq!(summary.source_count, n - with_incoming.len());
        prop_assert_eq!(summary.sink_count, n - with_outgoing.len());
        prop_assert_eq!(summary.by_kind.get("table").copied(), Some(n));
        service.verify_consistency().unwrap();
    }

    #[test]
    fn prop_add_node_is_idempotent((n, edges) in graph_strategy(), repeat in 0usize..10) {
        let repeat = repeat % n;
        let service = build(n, &edges);
        let before = service.get_summary().unwrap();

        service
            .add_node(id(repeat).as_str(), NodeKind::Table, Attributes::new())
            .unwrap();

        prop_assert_eq!(service.get_summary().unwrap(), before);
    }
}
