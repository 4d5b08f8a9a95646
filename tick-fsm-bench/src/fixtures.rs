//! Benchmark fixtures: ring-shaped machines and trigger workloads

use tick_fsm_core::{
    Context, GrowthPolicy, ManualClock, State, StateId, StateMachine, Trigger,
};

/// Moves every state to the next one around the ring.
pub const NEXT: Trigger = Trigger::from_code(1);
/// Sends every state except the first back to the first.
pub const RESET: Trigger = Trigger::from_code(2);
/// Registered nowhere, so it always misses.
pub const UNKNOWN: Trigger = Trigger::from_code(99);

const LABELS: [&str; 16] = [
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "s12", "s13",
    "s14", "s15",
];

/// A state that fires `NEXT` after `dwell` loop calls.
#[derive(Debug, Clone)]
pub struct BenchState {
    label: &'static str,
    dwell: u32,
    loops: u32,
}

impl BenchState {
    #[must_use]
    pub fn new(label: &'static str, dwell: u32) -> Self {
        Self {
            label,
            dwell,
            loops: 0,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl State for BenchState {
    fn name(&self) -> &str {
        self.label
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.loops = 0;
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        self.loops += 1;
        (self.loops >= self.dwell).then_some(NEXT)
    }
}

/// A started ring of `states` states (at most 16): `NEXT` steps around it and `RESET` goes
/// home. Edges are added in ring order, so later states sit further down the table.
///
/// # Panics
///
/// Panics if `states` is zero or larger than 16.
#[must_use]
pub fn ring_machine(
    states: usize,
    capacity: usize,
    policy: GrowthPolicy,
) -> StateMachine<BenchState, ManualClock> {
    assert!((1..=LABELS.len()).contains(&states), "ring size {states}");
    let mut machine = StateMachine::with_growth(ManualClock::new(), capacity, policy);
    let ids: Vec<StateId> = LABELS[..states]
        .iter()
        .map(|&label| machine.add_state(BenchState::new(label, 1)))
        .collect();

    for (i, &id) in ids.iter().enumerate() {
        machine.add_transition(id, NEXT, ids[(i + 1) % states]);
    }
    for &id in &ids[1..] {
        machine.add_transition(id, RESET, ids[0]);
    }
    machine.start(ids[0]);
    machine
}

/// A repeatable workload: nine `NEXT` for every `RESET`.
#[must_use]
pub fn trigger_mix(count: usize) -> Vec<Trigger> {
    (0..count)
        .map(|i| if i % 10 == 9 { RESET } else { NEXT })
        .collect()
}
