//! Benchmarks for the per-node pipeline and fleet snapshots.
//!
//! One tick applies a probe result per node under the fleet lock; this
//! measures that cost as the fleet grows.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use guardian::config::{GuardianSettings, NodeRole};
use guardian::fleet::{FleetGuard, GuardianRuntime, Node, NodeState};
use guardian::probe::ProbeResult;

fn create_runtime(node_count: usize) -> (GuardianRuntime, Vec<String>) {
    let names: Vec<String> = (0..node_count).map(|i| format!("node-{}", i)).collect();
    let nodes = names
        .iter()
        .map(|name| {
            Node::new(
                name.as_str(),
                format!("http://{}:8080", name),
                NodeRole::Primary,
                name.as_str(),
            )
        })
        .collect();
    let settings = GuardianSettings {
        // Never restart so the loop stays in the failure cycle
        max_restarts: 0,
        ..GuardianSettings::default()
    };
    (GuardianRuntime::from_nodes(nodes, &settings), names)
}

fn bench_apply_probe_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_probe_tick");

    for node_count in [2, 8, 32, 128] {
        let (runtime, names) = create_runtime(node_count);
        let results = [
            ProbeResult::healthy(3),
            ProbeResult::soft_failure(5000),
            ProbeResult::hard_failure(1),
        ];

        group.bench_with_input(
            BenchmarkId::from_parameter(node_count),
            &node_count,
            |b, _| {
                let mut round = 0usize;
                b.iter(|| {
                    let now = Utc::now();
                    for (i, name) in names.iter().enumerate() {
                        let result = &results[(i + round) % results.len()];
                        black_box(runtime.apply_probe(name, result, now));
                    }
                    round += 1;
                });
            },
        );
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet_snapshot");

    for node_count in [2, 32, 128] {
        let (runtime, _) = create_runtime(node_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(node_count),
            &node_count,
            |b, _| b.iter(|| black_box(runtime.snapshot())),
        );
    }

    group.finish();
}

fn bench_fleet_guard(c: &mut Criterion) {
    let guard = FleetGuard::new(1);
    let states: Vec<NodeState> = (0..128)
        .map(|i| {
            if i % 7 == 0 {
                NodeState::Crashed
            } else {
                NodeState::Healthy
            }
        })
        .collect();

    c.bench_function("fleet_guard_may_crash_128", |b| {
        b.iter(|| black_box(guard.may_crash(states.iter().copied())))
    });
}

criterion_group!(
    benches,
    bench_apply_probe_tick,
    bench_snapshot,
    bench_fleet_guard
);
criterion_main!(benches);
