//! Integration scenarios across clocks, sinks and storage choices

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{Result, ensure};
use tick_fsm_core::test_utils::{Hook, ProbeLog, RecordingSink};
use tick_fsm_core::{
    Clock, Context, DiagnosticSink, Edge, FnClock, GrowthPolicy, ManualClock, State,
    StateMachine, StdClock, TracingSink, TransitionTable, Trigger, triggers,
};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{self, Layer, SubscriberExt};

use crate::common::*;

triggers! {
    enum Door {
        Open = 1,
        Close = 2,
        Lock = 3,
        Unlock = 4,
    }
}

fn door_machine<K: DiagnosticSink>(sink: K) -> StateMachine<Named, ManualClock, K> {
    let mut m = StateMachine::new(ManualClock::new()).with_sink(sink);
    let closed = m.add_state(Named("Closed"));
    let open = m.add_state(Named("Open"));
    let locked = m.add_state(Named("Locked"));
    m.add_transition(closed, Door::Open, open);
    m.add_transition(open, Door::Close, closed);
    m.add_transition(closed, Door::Lock, locked);
    m.add_transition(locked, Door::Unlock, closed);
    m.start(closed);
    m
}

#[test]
fn door_scenario_with_recorded_diagnostics() -> Result<()> {
    let mut m = door_machine(RecordingSink::new());
    m.sink_mut().take();

    ensure!(m.fire(Door::Lock), "closed door should lock");
    ensure!(!m.fire(Door::Open), "locked door must not open");
    ensure!(m.fire(Door::Unlock));
    ensure!(m.fire(Door::Open));

    assert_eq!(
        m.sink().lines(),
        [
            "Closed(3) -> Locked",
            "Failed to find edge for trigger: Locked1",
            "Locked(4) -> Closed",
            "Closed(1) -> Open",
        ]
    );
    assert_eq!(m.current().map(|s| s.name()), Some("Open"));
    Ok(())
}

type Fields = BTreeMap<&'static str, String>;

/// Keeps every event's level and fields.
#[derive(Clone, Default)]
struct CaptureLayer(Arc<Mutex<Vec<(Level, Fields)>>>);

impl CaptureLayer {
    fn take(&self) -> Vec<(Level, Fields)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct FieldMap<'a>(&'a mut Fields);

impl Visit for FieldMap<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
        let mut fields = Fields::new();
        event.record(&mut FieldMap(&mut fields));
        self.0.lock().unwrap().push((*event.metadata().level(), fields));
    }
}

fn fields(pairs: &[(&'static str, &str)]) -> Fields {
    pairs.iter().map(|&(k, v)| (k, v.to_string())).collect()
}

#[test]
fn tracing_sink_emits_structured_events() {
    let capture = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut m = door_machine(TracingSink);
        assert!(m.fire(Door::Open));
        assert!(!m.fire(Door::Lock));
        assert_eq!(m.current().map(|s| s.name()), Some("Open"));
    });

    assert_eq!(
        capture.take(),
        [
            (
                Level::INFO,
                fields(&[
                    ("message", "Growing transition table from 1 to 5 edges"),
                    ("from", "1"),
                    ("to", "5"),
                ])
            ),
            (
                Level::DEBUG,
                fields(&[
                    ("message", "State change: Closed(1) -> Open"),
                    ("from", "Closed"),
                    ("trigger", "1"),
                    ("to", "Open"),
                ])
            ),
            (
                Level::DEBUG,
                fields(&[
                    ("message", "Failed to find edge for trigger: Open3"),
                    ("from", "Open"),
                    ("trigger", "3"),
                ])
            ),
        ]
    );
}

#[test]
fn tracing_sink_runs_under_the_test_subscriber() {
    setup_tracing();
    let mut m = door_machine(TracingSink);

    assert!(m.fire(Door::Open));
    assert_eq!(m.current().map(|s| s.name()), Some("Open"));
}

#[test]
fn growth_is_reported_once_per_step() {
    let mut m = StateMachine::with_growth(ManualClock::new(), 2, GrowthPolicy::Double)
        .with_sink(RecordingSink::new());
    let a = m.add_state(Named("A"));
    for code in 1..=9 {
        m.add_transition(a, Trigger::from_code(code), a);
    }

    assert_eq!(
        m.sink().lines(),
        [
            "Growing transition table from 2 to 4 edges",
            "Growing transition table from 4 to 8 edges",
            "Growing transition table from 8 to 16 edges",
        ]
    );
    assert_eq!(m.transitions().len(), 9);
}

/// Counts down from a preset and asks to leave when it reaches zero.
struct Countdown {
    remaining: u32,
    entries: Rc<Cell<u32>>,
}

impl State for Countdown {
    fn name(&self) -> &str {
        "Countdown"
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.remaining = 3;
        self.entries.set(self.entries.get() + 1);
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        self.remaining -= 1;
        (self.remaining == 0).then(|| Door::Close.into())
    }
}

#[test]
fn self_loop_reenters_a_stateful_state() {
    let entries = Rc::new(Cell::new(0));
    let mut m = StateMachine::new(ManualClock::new());
    let countdown = m.add_state(Countdown {
        remaining: 0,
        entries: Rc::clone(&entries),
    });
    m.add_transition(countdown, Door::Close, countdown);
    m.start(countdown);

    let transitions = (0..9).filter(|_| m.tick()).count();

    assert_eq!(transitions, 3);
    assert_eq!(entries.get(), 4);
}

#[test]
fn fn_clock_drives_state_time() {
    let now = Rc::new(Cell::new(1_000u64));
    let clock = {
        let now = Rc::clone(&now);
        FnClock(move || now.get())
    };
    let log = ProbeLog::new();
    let mut m = StateMachine::new(clock);
    let idle = m.add_state(log.state("Idle"));
    m.start(idle);

    now.set(1_250);
    m.tick();
    assert_eq!(m.state_time_ms(), Some(250));
    assert_eq!(
        log.take_timed(),
        [(Hook::Enter("Idle"), 0), (Hook::Loop("Idle"), 250)]
    );
}

#[test]
fn clock_wraparound_keeps_elapsed_time_small() {
    let now = Rc::new(Cell::new(u64::MAX - 10));
    let clock = {
        let now = Rc::clone(&now);
        FnClock(move || now.get())
    };
    let mut m = StateMachine::new(clock);
    let a = m.add_state(Named("A"));
    m.start(a);

    // A free-running counter that rolled over.
    now.set(9);
    assert_eq!(m.state_time_ms(), Some(20));
}

#[test]
fn std_clock_is_monotonic() {
    let clock = StdClock::new();
    let first = clock.now_ms();
    let second = clock.now_ms();
    assert!(second >= first);
}

#[test]
fn fixed_and_growable_tables_agree() {
    let mut fixed: StateMachine<Named, ManualClock, _, heapless::Vec<Edge, 4>> =
        StateMachine::with_table(ManualClock::new(), TransitionTable::fixed());
    let mut growable = StateMachine::new(ManualClock::new());

    let closed = fixed.add_state(Named("Closed"));
    let open = fixed.add_state(Named("Open"));
    fixed.add_transition(closed, Door::Open, open);
    fixed.add_transition(open, Door::Close, closed);
    fixed.start(closed);

    let closed = growable.add_state(Named("Closed"));
    let open = growable.add_state(Named("Open"));
    growable.add_transition(closed, Door::Open, open);
    growable.add_transition(open, Door::Close, closed);
    growable.start(closed);

    for door in [Door::Open, Door::Open, Door::Close, Door::Lock, Door::Open] {
        assert_eq!(fixed.fire(door), growable.fire(door));
        assert_eq!(fixed.current_state(), growable.current_state());
    }
}

#[test]
fn trigger_enums_round_trip_through_codes() {
    for &door in Door::ALL {
        let trigger: Trigger = door.into();
        assert_eq!(Door::try_from(trigger), Ok(door));
    }
    assert_eq!(Door::try_from(Trigger::from_code(9)), Err(Trigger::from_code(9)));
}
