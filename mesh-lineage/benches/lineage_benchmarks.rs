//! Benchmarks for lineage graph operations
//!
//! Run with: cargo bench -p mesh-lineage

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_core::{Attributes, Edge, Node, NodeKind};
use mesh_lineage::{GraphIndex, ImpactAnalysis, LineageQuery};

fn add_node(index: &mut GraphIndex, id: &str) {
    index.on_node_added(&Node::new(id, NodeKind::Table, Attributes::new()));
}

fn add_edge(index: &mut GraphIndex, source: &str, target: &str) {
    index
        .on_edge_added(&Edge::new(source, target, None, Attributes::new()))
        .unwrap();
}

/// Create a linear chain: n0 -> n1 -> ... -> n(size-1)
fn create_chain_graph(size: usize) -> (GraphIndex, Vec<String>) {
    let mut index = GraphIndex::new();
    let ids: Vec<String> = (0..size).map(|i| format!("n{}", i)).collect();

    for id in &ids {
        add_node(&mut index, id);
    }
    for pair in ids.windows(2) {
        add_edge(&mut index, &pair[0], &pair[1]);
    }

    (index, ids)
}

/// Create a fan-out graph: one source with N targets
fn create_fan_out_graph(fan_out: usize) -> (GraphIndex, String, Vec<String>) {
    let mut index = GraphIndex::new();
    let source = "source".to_string();
    add_node(&mut index, &source);

    let targets: Vec<String> = (0..fan_out).map(|i| format!("target_{}", i)).collect();
    for target in &targets {
        add_node(&mut index, target);
        add_edge(&mut index, &source, target);
    }

    (index, source, targets)
}

/// Create a layered diamond: every node in a layer feeds every node in the next
fn create_diamond_graph(layers: usize, width: usize) -> (GraphIndex, String, String) {
    let mut index = GraphIndex::new();
    let source = "source".to_string();
    add_node(&mut index, &source);

    let mut prev_layer = vec![source.clone()];
    for layer in 1..layers {
        let current: Vec<String> = (0..width).map(|i| format!("layer{}_{}", layer, i)).collect();
        for id in &current {
            add_node(&mut index, id);
            for prev in &prev_layer {
                add_edge(&mut index, prev, id);
            }
        }
        prev_layer = current;
    }

    let sink = "sink".to_string();
    add_node(&mut index, &sink);
    for prev in &prev_layer {
        add_edge(&mut index, prev, &sink);
    }

    (index, source, sink)
}

/// Create a single cycle of `size` nodes
fn create_cycle_graph(size: usize) -> (GraphIndex, Vec<String>) {
    let (mut index, ids) = create_chain_graph(size);
    if size > 1 {
        add_edge(&mut index, &ids[size - 1], &ids[0]);
    }
    (index, ids)
}

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("chain", size), size, |b, &size| {
            b.iter(|| {
                let (index, _) = create_chain_graph(size);
                black_box(index)
            });
        });

        group.bench_with_input(BenchmarkId::new("fan_out", size), size, |b, &size| {
            b.iter(|| {
                let (index, _, _) = create_fan_out_graph(size);
                black_box(index)
            });
        });
    }

    group.finish();
}

fn bench_upstream_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("upstream_queries");

    for size in [10, 100, 500].iter() {
        let (index, ids) = create_chain_graph(*size);
        let query = LineageQuery::new(&index);
        let last = ids[size - 1].clone();

        group.bench_with_input(BenchmarkId::new("chain_last_node", size), &last, |b, id| {
            b.iter(|| black_box(query.upstream(black_box(id), None)));
        });

        let mid = ids[size / 2].clone();
        group.bench_with_input(BenchmarkId::new("chain_mid_node", size), &mid, |b, id| {
            b.iter(|| black_box(query.upstream(black_box(id), None)));
        });
    }

    group.finish();
}

fn bench_downstream_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("downstream_queries");

    for fan_size in [10, 100, 500].iter() {
        let (index, source, _) = create_fan_out_graph(*fan_size);
        let query = LineageQuery::new(&index);

        group.bench_with_input(BenchmarkId::new("fan_out", fan_size), &source, |b, id| {
            b.iter(|| black_box(query.downstream(black_box(id), None)));
        });
    }

    for size in [10, 100, 500].iter() {
        let (index, ids) = create_chain_graph(*size);
        let query = LineageQuery::new(&index);

        group.bench_with_input(BenchmarkId::new("chain_depth_3", size), &ids[0], |b, id| {
            b.iter(|| black_box(query.downstream(black_box(id), Some(3))));
        });
    }

    for size in [10, 100, 500].iter() {
        let (index, ids) = create_cycle_graph(*size);
        let query = LineageQuery::new(&index);

        group.bench_with_input(BenchmarkId::new("cycle", size), &ids[0], |b, id| {
            b.iter(|| black_box(query.downstream(black_box(id), None)));
        });
    }

    group.finish();
}

fn bench_path_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_queries");

    for size in [10, 100, 500].iter() {
        let (index, ids) = create_chain_graph(*size);
        let query = LineageQuery::new(&index);
        let (first, last) = (ids[0].clone(), ids[size - 1].clone());

        group.bench_function(BenchmarkId::new("chain_end_to_end", size), |b| {
            b.iter(|| black_box(query.path(black_box(&first), black_box(&last))));
        });
    }

    for layers in [3, 5, 7].iter() {
        let (index, source, sink) = create_diamond_graph(*layers, 10);
        let query = LineageQuery::new(&index);

        group.bench_function(BenchmarkId::new("diamond_source_to_sink", layers), |b| {
            b.iter(|| black_box(query.path(black_box(&source), black_box(&sink))));
        });
    }

    group.finish();
}

fn bench_impact_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("impact_analysis");

    for fan_size in [10, 100, 500].iter() {
        let (index, source, _) = create_fan_out_graph(*fan_size);
        let analysis = ImpactAnalysis::new(&index);

        group.bench_with_input(
            BenchmarkId::new("fan_out_source", fan_size),
            &source,
            |b, id| {
                b.iter(|| black_box(analysis.analyze_change(black_box(id))));
            },
        );
    }

    for layers in [3, 5, 7].iter() {
        let (index, source, _) = create_diamond_graph(*layers, 10);
        let analysis = ImpactAnalysis::new(&index);

        group.bench_with_input(
            BenchmarkId::new("diamond_source", layers),
            &source,
            |b, id| {
                b.iter(|| black_box(analysis.analyze_change(black_box(id))));
            },
        );
    }

    group.finish();
}

fn bench_index_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_operations");

    group.bench_function("add_edge", |b| {
        b.iter_batched(
            || {
                let mut index = GraphIndex::new();
                add_node(&mut index, "source");
                add_node(&mut index, "target");
                index
            },
            |mut index| {
                add_edge(&mut index, "source", "target");
                black_box(index)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    for size in [100, 1000].iter() {
        let (index, _) = create_chain_graph(*size);

        group.bench_with_input(BenchmarkId::new("summary", size), &index, |b, index| {
            b.iter(|| black_box(LineageQuery::new(index).summary()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_construction,
    bench_upstream_queries,
    bench_downstream_queries,
    bench_path_queries,
    bench_impact_analysis,
    bench_index_operations,
);

criterion_main!(benches);
