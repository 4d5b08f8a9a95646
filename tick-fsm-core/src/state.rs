//! The `State` trait and the handles the machine uses to refer to states.

use alloc::boxed::Box;
use core::fmt;

use crate::trigger::Trigger;

/// Handle to a state registered with [`StateMachine::add_state`](crate::StateMachine::add_state).
///
/// Edges and the current-state slot refer to states through these handles; the machine owns
/// the states themselves. Handles are only meaningful for the machine that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Registration order, starting at 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Timing view handed to every state hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    now_ms: u64,
    entered_at_ms: u64,
}

impl Context {
    #[must_use]
    pub const fn new(now_ms: u64, entered_at_ms: u64) -> Self {
        Self {
            now_ms,
            entered_at_ms,
        }
    }

    /// Clock reading when the hook was invoked.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Clock reading at the state's most recent entry.
    #[must_use]
    pub const fn entered_at_ms(&self) -> u64 {
        self.entered_at_ms
    }

    /// Milliseconds since the state's most recent entry.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.now_ms.wrapping_sub(self.entered_at_ms)
    }
}

/// A unit of behavior with enter/loop/exit lifecycle hooks.
///
/// The machine guarantees that `on_enter` runs before any `on_loop` call, that `on_loop`
/// runs once per tick while the state is current, and that `on_exit` completes before the
/// next state's `on_enter` begins. The entry timestamp behind [`Context::elapsed_ms`] is
/// recorded by the machine itself, so overriding `on_enter` never disturbs it.
///
/// Hooks only see `&mut self`; a state requests a transition by returning a trigger from
/// `on_loop`, never by reaching back into the machine.
#[allow(unused_variables)]
pub trait State {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str {
        "noname"
    }

    /// Called each time the machine enters this state, including `start`.
    fn on_enter(&mut self, cx: &Context) {}

    /// Called once per tick while this state is current.
    ///
    /// Return `None` to stay, or `Some(trigger)` to request a transition.
    fn on_loop(&mut self, cx: &Context) -> Option<Trigger>;

    /// Called when the machine leaves this state, before the next state is entered.
    fn on_exit(&mut self, cx: &Context) {}
}

impl<T: State + ?Sized> State for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter(&mut self, cx: &Context) {
        (**self).on_enter(cx);
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        (**self).on_loop(cx)
    }

    fn on_exit(&mut self, cx: &Context) {
        (**self).on_exit(cx);
    }
}

/// Lets boards keep states in `static` storage and lend them to the machine.
impl<T: State + ?Sized> State for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter(&mut self, cx: &Context) {
        (**self).on_enter(cx);
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        (**self).on_loop(cx)
    }

    fn on_exit(&mut self, cx: &Context) {
        (**self).on_exit(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;

    impl State for Idle {
        fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
            None
        }
    }

    #[test]
    fn unnamed_states_fall_back_to_noname() {
        assert_eq!(Idle.name(), "noname");
    }

    #[test]
    fn elapsed_is_measured_from_entry() {
        let cx = Context::new(1_500, 1_000);
        assert_eq!(cx.elapsed_ms(), 500);
        assert_eq!(cx.entered_at_ms(), 1_000);
        assert_eq!(Context::new(7, 7).elapsed_ms(), 0);
    }

    #[test]
    fn elapsed_survives_counter_wrap() {
        let cx = Context::new(5, u64::MAX - 4);
        assert_eq!(cx.elapsed_ms(), 10);
    }

    #[test]
    fn boxed_and_borrowed_states_forward_hooks() {
        let mut boxed: Box<dyn State> = Box::new(Idle);
        assert_eq!(boxed.name(), "noname");
        assert_eq!(boxed.on_loop(&Context::new(0, 0)), None);

        let mut idle = Idle;
        let mut borrowed = &mut idle;
        assert_eq!(State::on_loop(&mut borrowed, &Context::new(0, 0)), None);
    }

    #[test]
    fn ids_display_their_index() {
        use alloc::string::ToString;
        assert_eq!(StateId::from_index(2).to_string(), "#2");
        assert_eq!(StateId::from_index(2).index(), 2);
    }
}
