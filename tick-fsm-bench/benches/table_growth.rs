use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tick_fsm_bench::BenchState;
use tick_fsm_core::{Edge, GrowthPolicy, ManualClock, StateMachine, TransitionTable, Trigger};

const EDGES: usize = 64;

fn codes() -> impl Iterator<Item = Trigger> {
    (1..=EDGES).map(|code| Trigger::from_code(i32::try_from(code).unwrap()))
}

fn bench_growth_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_build");

    let policies = [
        ("increment_1", GrowthPolicy::Increment(NonZeroUsize::MIN)),
        ("increment_4", GrowthPolicy::default()),
        ("double", GrowthPolicy::Double),
    ];
    for (name, policy) in policies {
        group.bench_with_input(BenchmarkId::new("growable", name), &policy, |b, &policy| {
            b.iter(|| {
                let mut machine = StateMachine::with_growth(ManualClock::new(), 1, policy);
                let s = machine.add_state(BenchState::new("s", 1));
                for trigger in codes() {
                    machine.add_transition(s, trigger, s);
                }
                black_box(machine.transitions().capacity())
            });
        });
    }

    group.bench_function("presized", |b| {
        b.iter(|| {
            let mut machine = StateMachine::with_capacity(ManualClock::new(), EDGES);
            let s = machine.add_state(BenchState::new("s", 1));
            for trigger in codes() {
                machine.add_transition(s, trigger, s);
            }
            black_box(machine.transitions().capacity())
        });
    });

    group.bench_function("fixed_heapless", |b| {
        b.iter(|| {
            let mut machine: StateMachine<BenchState, ManualClock, _, heapless::Vec<Edge, EDGES>> =
                StateMachine::with_table(ManualClock::new(), TransitionTable::fixed());
            let s = machine.add_state(BenchState::new("s", 1));
            for trigger in codes() {
                machine.add_transition(s, trigger, s);
            }
            black_box(machine.transitions().len())
        });
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_growth_policies
);

criterion_main!(benches);
