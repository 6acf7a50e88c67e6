// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_attach::{ElementFlags, ElementId, Graph};
use understory_paths::{PathTracker, PathWalker, TrackerConfig, TrackerSet};

/// A ladder of `depth` diamonds: `2^depth` paths from one mounted root to the target.
fn gen_diamond_ladder(depth: usize) -> (Graph, ElementId, Vec<ElementId>) {
    let mut graph = Graph::new();
    let window = graph.create_root();
    let mut top = graph.insert();
    graph.mount(top, window);
    let mut rungs = Vec::with_capacity(depth * 2);
    for _ in 0..depth {
        let left = graph.insert();
        let right = graph.insert();
        let join = graph.insert();
        graph.add_parent(left, top).unwrap();
        graph.add_parent(right, top).unwrap();
        graph.add_parent(join, left).unwrap();
        graph.add_parent(join, right).unwrap();
        rungs.push(left);
        rungs.push(right);
        top = join;
    }
    (graph, top, rungs)
}

/// A target under `n` parents, each mounted on its own root host.
fn gen_wide_fan(n: usize) -> (Graph, ElementId, Vec<ElementId>) {
    let mut graph = Graph::new();
    let target = graph.insert();
    let mut parents = Vec::with_capacity(n);
    for _ in 0..n {
        let root = graph.create_root();
        let parent = graph.insert();
        graph.mount(parent, root);
        graph.add_parent(target, parent).unwrap();
        parents.push(parent);
    }
    (graph, target, parents)
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    for &depth in &[4usize, 8, 12] {
        let (graph, target, _) = gen_diamond_ladder(depth);
        let config = TrackerConfig::new();
        group.throughput(Throughput::Elements(1 << depth));
        group.bench_function(format!("diamond_ladder_d{}", depth), |b| {
            let mut walker = PathWalker::new();
            b.iter(|| {
                walker.walk(&graph, target, &config);
                black_box(walker.paths().len());
            })
        });
    }
    for &n in &[16usize, 256, 1024] {
        let (graph, target, _) = gen_wide_fan(n);
        let config = TrackerConfig::new();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("wide_fan_n{}", n), |b| {
            let mut walker = PathWalker::new();
            b.iter(|| {
                walker.walk(&graph, target, &config);
                black_box(walker.paths().len());
            })
        });
    }
    group.finish();
}

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker");
    for &depth in &[4usize, 8] {
        group.bench_function(format!("create_dispose_d{}", depth), |b| {
            b.iter_batched(
                || gen_diamond_ladder(depth),
                |(mut graph, target, _)| {
                    let mut tracker =
                        PathTracker::new(&mut graph, target, TrackerConfig::new().enforce_visible());
                    black_box(tracker.paths().len());
                    tracker.dispose(&mut graph);
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("toggle_visible_d{}", depth), |b| {
            let (mut graph, target, rungs) = gen_diamond_ladder(depth);
            let mut set = TrackerSet::new();
            let key = set.insert(&mut graph, target, TrackerConfig::new().enforce_visible());
            let rung = rungs[0];
            let mut visible = true;
            b.iter(|| {
                visible = !visible;
                graph.set_flag(rung, ElementFlags::VISIBLE, visible);
                let changed = set.flush(&mut graph);
                black_box((changed.len(), set.paths(key).map(|p| p.len())));
            })
        });
    }
    group.finish();
}

fn bench_many_trackers(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_set");
    for &n in &[64usize, 512] {
        let (mut graph, _, parents) = gen_wide_fan(n);
        let mut set = TrackerSet::new();
        let mut leaves = Vec::with_capacity(n);
        for &parent in &parents {
            let leaf = graph.insert();
            graph.add_parent(leaf, parent).unwrap();
            leaves.push(leaf);
        }
        for &leaf in &leaves {
            set.insert(&mut graph, leaf, TrackerConfig::new().enforce_enabled());
        }
        let parent = parents[n / 2];
        let mut enabled = true;
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("flush_one_of_n{}", n), |b| {
            b.iter(|| {
                enabled = !enabled;
                graph.set_flag(parent, ElementFlags::ENABLED, enabled);
                black_box(set.flush(&mut graph).len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_walk, bench_tracker, bench_many_trackers);
criterion_main!(benches);
