use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tick_fsm_bench::fixtures::UNKNOWN;
use tick_fsm_bench::{NEXT, ring_machine, trigger_mix};
use tick_fsm_core::{FmtSink, GrowthPolicy};

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    // Pure transition overhead - machine created once outside the loop
    group.bench_function("fire_hit", |b| {
        let mut machine = ring_machine(2, 4, GrowthPolicy::default());
        b.iter(|| machine.fire(black_box(NEXT)));
    });

    group.bench_function("fire_miss", |b| {
        let mut machine = ring_machine(2, 4, GrowthPolicy::default());
        b.iter(|| machine.fire(black_box(UNKNOWN)));
    });

    // Each state asks to leave on its first loop, so every tick transitions
    group.bench_function("tick_transition", |b| {
        let mut machine = ring_machine(2, 4, GrowthPolicy::default());
        b.iter(|| machine.tick());
    });

    // Transition with a diagnostic sink formatting into a reused buffer
    group.bench_function("fire_hit_fmt_sink", |b| {
        let mut machine =
            ring_machine(2, 4, GrowthPolicy::default()).with_sink(FmtSink::new(String::new()));
        b.iter(|| {
            machine.sink_mut().writer_mut().clear();
            machine.fire(black_box(NEXT))
        });
    });

    group.finish();
}

pub fn bench_lookup_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_depth");

    // Lookup is a linear scan, so cost follows the table length
    for states in [2usize, 4, 8, 16] {
        let workload = trigger_mix(1_000);
        group.throughput(Throughput::Elements(workload.len() as u64));
        group.bench_with_input(BenchmarkId::new("ring", states), &states, |b, &states| {
            let mut machine = ring_machine(states, 2 * states, GrowthPolicy::default());
            b.iter(|| {
                for &trigger in &workload {
                    black_box(machine.fire(trigger));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_dispatch, bench_lookup_depth
);

criterion_main!(benches);
