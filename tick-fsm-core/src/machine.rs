//! The polled state machine.
//!
//! A [`StateMachine`] owns its states, its [`TransitionTable`], a [`Clock`] and a
//! [`DiagnosticSink`]. Setup code registers states and edges, calls [`StateMachine::start`]
//! once, and then the control loop calls [`StateMachine::tick`] every iteration:
//!
//! ```text
//! tick() ──► current.on_loop(cx) ──► None            ──► stay
//!                                └──► Some(trigger) ──► fire(trigger)
//!
//! fire(trigger) ──► first edge (current, trigger) ──► none ──► stay, log "no edge"
//!                                                 └──► edge ──► current.on_exit(cx)
//!                                                               current = edge.target
//!                                                               stamp entry time
//!                                                               current.on_enter(cx)
//! ```
//!
//! Everything runs synchronously on the caller's thread. `&mut self` on `tick` and `fire`
//! rules out overlapping dispatch, and states never see the machine, so a transition can
//! only be requested through the loop hook's return value or an external `fire` call made
//! between ticks.

use alloc::vec::Vec;

use crate::clock::Clock;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Silent};
use crate::error::FsmError;
use crate::state::{Context, State, StateId};
use crate::table::{Edge, EdgeStore, GrowableEdges, Growth, GrowthPolicy, TransitionTable};
use crate::trigger::Trigger;

struct Slot<S> {
    state: S,
    entered_at_ms: u64,
}

impl<S> Slot<S> {
    fn context(&self, now_ms: u64) -> Context {
        Context::new(now_ms, self.entered_at_ms)
    }
}

/// A finite-state machine driven by one [`tick`](Self::tick) per control-loop iteration.
///
/// - `S`: the state type. Use an enum or `Box<dyn State>` for heterogeneous states.
/// - `C`: the millisecond [`Clock`].
/// - `K`: the [`DiagnosticSink`], [`Silent`] by default.
/// - `E`: the [`EdgeStore`] behind the transition table, heap-backed by default.
pub struct StateMachine<S, C, K = Silent, E = GrowableEdges> {
    states: Vec<Slot<S>>,
    table: TransitionTable<E>,
    current: Option<StateId>,
    clock: C,
    sink: K,
}

impl<S: State, C: Clock> StateMachine<S, C> {
    /// A machine with a one-slot transition table and the default growth policy.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self::with_table(clock, TransitionTable::new())
    }

    /// A machine whose table is pre-sized for `capacity` edges.
    #[must_use]
    pub fn with_capacity(clock: C, capacity: usize) -> Self {
        Self::with_table(clock, TransitionTable::with_capacity(capacity))
    }

    /// A machine whose table starts at `capacity` edges and grows by `policy`.
    #[must_use]
    pub fn with_growth(clock: C, capacity: usize, policy: GrowthPolicy) -> Self {
        Self::with_table(clock, TransitionTable::with_policy(capacity, policy))
    }
}

impl<S: State, C: Clock, E: EdgeStore> StateMachine<S, C, Silent, E> {
    /// A machine over an existing (usually empty) table, e.g. [`TransitionTable::fixed`].
    #[must_use]
    pub fn with_table(clock: C, table: TransitionTable<E>) -> Self {
        Self {
            states: Vec::new(),
            table,
            current: None,
            clock,
            sink: Silent,
        }
    }
}

impl<S, C, K, E> StateMachine<S, C, K, E> {
    /// Replaces the diagnostic sink, keeping everything else.
    #[must_use]
    pub fn with_sink<K2: DiagnosticSink>(self, sink: K2) -> StateMachine<S, C, K2, E> {
        StateMachine {
            states: self.states,
            table: self.table,
            current: self.current,
            clock: self.clock,
            sink,
        }
    }
}

impl<S, C, K, E> StateMachine<S, C, K, E>
where
    S: State,
    C: Clock,
    K: DiagnosticSink,
    E: EdgeStore,
{
    /// Registers a state and returns its handle.
    pub fn add_state(&mut self, state: S) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(Slot {
            state,
            entered_at_ms: 0,
        });
        id
    }

    /// Appends the edge `(source, trigger) -> target`.
    ///
    /// Duplicates are not detected: only the first edge added for a `(source, trigger)` pair
    /// is ever taken.
    ///
    /// # Panics
    /// Panics if either state is not registered with this machine, or if a fixed-capacity
    /// table is full. Use [`try_add_transition`](Self::try_add_transition) to handle those.
    pub fn add_transition(&mut self, source: StateId, trigger: impl Into<Trigger>, target: StateId) {
        if let Err(err) = self.try_add_transition(source, trigger, target) {
            panic!("cannot add transition {source} -> {target}: {err}");
        }
    }

    /// Fallible form of [`add_transition`](Self::add_transition).
    ///
    /// # Errors
    /// [`FsmError::UnknownState`] if either handle's index is past the last registered state,
    /// [`FsmError::TableFull`] if a fixed-capacity table has no free slot.
    ///
    /// Handles are checked by index only. A handle issued by another machine whose index is
    /// in range is accepted and names this machine's state at that position.
    pub fn try_add_transition(
        &mut self,
        source: StateId,
        trigger: impl Into<Trigger>,
        target: StateId,
    ) -> Result<(), FsmError> {
        self.check(source)?;
        self.check(target)?;
        if let Some(Growth { from, to }) = self.table.push(Edge::new(source, trigger.into(), target))? {
            self.sink.record(&Diagnostic::Grew { from, to });
        }
        Ok(())
    }

    /// Makes `initial` current and runs its `on_enter`.
    ///
    /// Calling this again later forces the machine into `initial` *without* running
    /// `on_exit` on the state it leaves.
    ///
    /// # Panics
    /// Panics if `initial` is not registered with this machine.
    pub fn start(&mut self, initial: StateId) {
        if let Err(err) = self.check(initial) {
            panic!("cannot start: {err}");
        }
        let now = self.clock.now_ms();
        self.enter(initial, now);
    }

    /// Runs the current state's loop hook once and dispatches any trigger it returns.
    ///
    /// Returns `true` if a transition happened. Does nothing before `start`.
    pub fn tick(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let now = self.clock.now_ms();
        let slot = &mut self.states[current.index()];
        let cx = slot.context(now);
        let requested = slot.state.on_loop(&cx);
        match requested {
            Some(trigger) => self.fire(trigger),
            None => false,
        }
    }

    /// Takes the first edge matching the current state and `trigger`, if any.
    ///
    /// Returns `true` if a transition happened. An unmatched trigger is not an error: the
    /// machine stays put and the sink receives a "no edge" record. Does nothing before
    /// `start`.
    pub fn fire(&mut self, trigger: impl Into<Trigger>) -> bool {
        let trigger = trigger.into();
        let Some(current) = self.current else {
            return false;
        };

        let Some(target) = self.table.find(current, trigger).map(Edge::target) else {
            self.sink.record(&Diagnostic::NoEdge {
                from: self.states[current.index()].state.name(),
                trigger,
            });
            return false;
        };

        self.sink.record(&Diagnostic::Transition {
            from: self.states[current.index()].state.name(),
            trigger,
            to: self.states[target.index()].state.name(),
        });

        let now = self.clock.now_ms();
        let leaving = &mut self.states[current.index()];
        let cx = leaving.context(now);
        leaving.state.on_exit(&cx);
        self.enter(target, now);
        true
    }

    fn enter(&mut self, id: StateId, now: u64) {
        self.current = Some(id);
        let slot = &mut self.states[id.index()];
        slot.entered_at_ms = now;
        let cx = slot.context(now);
        slot.state.on_enter(&cx);
    }

    fn check(&self, id: StateId) -> Result<(), FsmError> {
        if id.index() < self.states.len() {
            Ok(())
        } else {
            Err(FsmError::UnknownState(id))
        }
    }
}

impl<S: State, C: Clock, K, E: EdgeStore> StateMachine<S, C, K, E> {
    /// Handle of the active state, `None` before `start`.
    #[must_use]
    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    /// The active state, `None` before `start`.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current.and_then(|id| self.state(id))
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&S> {
        self.states.get(id.index()).map(|slot| &slot.state)
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut S> {
        self.states.get_mut(id.index()).map(|slot| &mut slot.state)
    }

    #[must_use]
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.state(id).map(|state| state.name())
    }

    /// Number of registered states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Milliseconds since the active state was entered.
    #[must_use]
    pub fn state_time_ms(&self) -> Option<u64> {
        self.current_context().map(|cx| cx.elapsed_ms())
    }

    /// Clock reading at which the active state was entered.
    #[must_use]
    pub fn state_entered_at_ms(&self) -> Option<u64> {
        self.current_context().map(|cx| cx.entered_at_ms())
    }

    fn current_context(&self) -> Option<Context> {
        let id = self.current?;
        Some(self.states[id.index()].context(self.clock.now_ms()))
    }

    #[must_use]
    pub fn transitions(&self) -> &TransitionTable<E> {
        &self.table
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::diagnostics::FmtSink;
    use crate::test_utils::{Hook, ProbeLog, ProbeState};
    use alloc::string::String;

    const T1: Trigger = Trigger::from_code(1);
    const T2: Trigger = Trigger::from_code(2);

    fn machine() -> (StateMachine<ProbeState, ManualClock>, ProbeLog) {
        (StateMachine::new(ManualClock::new()), ProbeLog::new())
    }

    #[test]
    fn start_enters_the_initial_state_once() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        m.add_transition(a, T1, b);

        assert!(!m.is_started());
        m.start(a);

        assert_eq!(m.current_state(), Some(a));
        assert_eq!(log.take(), [Hook::Enter("A")]);
    }

    #[test]
    fn unmatched_trigger_changes_nothing() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        m.add_transition(a, T1, b);
        m.start(a);
        log.take();

        assert!(!m.fire(T2));
        assert_eq!(m.current_state(), Some(a));
        assert!(log.take().is_empty());
    }

    #[test]
    fn matched_trigger_exits_then_enters() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        let c = m.add_state(log.state("C"));
        m.add_transition(a, T1, b);
        m.add_transition(b, T1, c);
        m.start(a);
        log.take();

        assert!(m.fire(T1));
        assert_eq!(m.current_state(), Some(b));
        assert_eq!(log.take(), [Hook::Exit("A"), Hook::Enter("B")]);
    }

    #[test]
    fn self_transition_runs_exit_and_enter() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        m.add_transition(a, T1, a);
        m.start(a);
        log.take();

        assert!(m.fire(T1));
        assert_eq!(log.take(), [Hook::Exit("A"), Hook::Enter("A")]);
    }

    #[test]
    fn first_registered_duplicate_wins() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        let c = m.add_state(log.state("C"));
        m.add_transition(a, T1, b);
        m.add_transition(a, T1, c);

        for _ in 0..3 {
            m.start(a);
            m.fire(T1);
            assert_eq!(m.current_state(), Some(b));
        }
    }

    #[test]
    fn tick_without_trigger_stays() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        m.add_transition(a, T1, b);
        m.start(a);
        log.take();

        assert!(!m.tick());
        assert_eq!(m.current_state(), Some(a));
        assert_eq!(log.take(), [Hook::Loop("A")]);
    }

    #[test]
    fn tick_dispatches_the_returned_trigger() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A").firing([None, Some(T1)]));
        let b = m.add_state(log.state("B"));
        m.add_transition(a, T1, b);
        m.start(a);
        log.take();

        assert!(!m.tick());
        assert!(m.tick());
        assert_eq!(m.current_state(), Some(b));
        assert_eq!(
            log.take(),
            [
                Hook::Loop("A"),
                Hook::Loop("A"),
                Hook::Exit("A"),
                Hook::Enter("B")
            ]
        );
    }

    #[test]
    fn unstarted_machine_ignores_tick_and_fire() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        m.add_transition(a, T1, a);

        assert!(!m.tick());
        assert!(!m.fire(T1));
        assert_eq!(m.current_state(), None);
        assert!(m.current().is_none());
        assert_eq!(m.state_time_ms(), None);
        assert!(log.take().is_empty());
    }

    #[test]
    fn restarting_skips_exit_of_the_previous_state() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        m.start(a);
        m.start(b);

        assert_eq!(m.current_state(), Some(b));
        assert_eq!(log.take(), [Hook::Enter("A"), Hook::Enter("B")]);
    }

    #[test]
    fn state_time_is_measured_from_the_latest_entry() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));
        m.add_transition(a, T1, b);

        m.clock().set(100);
        m.start(a);
        assert_eq!(m.state_time_ms(), Some(0));
        assert_eq!(m.state_entered_at_ms(), Some(100));

        m.clock().advance(40);
        m.tick();
        assert_eq!(m.state_time_ms(), Some(40));

        m.fire(T1);
        assert_eq!(m.state_time_ms(), Some(0));
        m.clock().advance(5);
        assert_eq!(m.state_time_ms(), Some(5));
    }

    #[test]
    fn foreign_state_ids_are_rejected() {
        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let stranger = StateId::from_index(9);

        assert_eq!(
            m.try_add_transition(a, T1, stranger),
            Err(FsmError::UnknownState(stranger))
        );
        assert!(m.transitions().is_empty());
    }

    #[test]
    fn in_range_handles_from_another_machine_resolve_by_index() {
        let (mut other, other_log) = machine();
        let _ = other.add_state(other_log.state("X"));
        let borrowed = other.add_state(other_log.state("Y"));

        let (mut m, log) = machine();
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));

        assert_eq!(m.try_add_transition(a, T1, borrowed), Ok(()));
        m.start(a);
        assert!(m.fire(T1));
        assert_eq!(m.current_state(), Some(b));
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn starting_from_a_foreign_state_panics() {
        let (mut m, _log) = machine();
        m.start(StateId::from_index(0));
    }

    #[test]
    fn fixed_table_surfaces_table_full() {
        let log = ProbeLog::new();
        let mut m: StateMachine<ProbeState, ManualClock, Silent, heapless::Vec<Edge, 1>> =
            StateMachine::with_table(ManualClock::new(), TransitionTable::fixed());
        let a = m.add_state(log.state("A"));
        let b = m.add_state(log.state("B"));

        assert_eq!(m.try_add_transition(a, T1, b), Ok(()));
        assert_eq!(
            m.try_add_transition(b, T1, a),
            Err(FsmError::TableFull { capacity: 1 })
        );
    }

    #[test]
    fn diagnostics_reach_the_sink() {
        let log = ProbeLog::new();
        let mut m = StateMachine::new(ManualClock::new())
            .with_sink(FmtSink::with_transition_prefix(String::new(), "State change: "));
        let init = m.add_state(log.state("Init"));
        let go = m.add_state(log.state("NorthSouth Go"));
        m.add_transition(init, T1, go);
        m.add_transition(go, T2, init);
        m.start(init);

        m.fire(T1);
        m.fire(T2);
        m.fire(T2);

        assert_eq!(
            m.sink().writer(),
            "Growing transition table from 1 to 5 edges\n\
             State change: Init(1) -> NorthSouth Go\n\
             State change: NorthSouth Go(2) -> Init\n\
             Failed to find edge for trigger: Init2\n"
        );
    }
}
