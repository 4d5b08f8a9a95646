//! Hook probes for deterministic testing of lifecycle ordering
//!
//! A [`ProbeLog`] is a cheaply clonable handle to one shared event list. Every
//! [`Instrumented`](super::Instrumented) state created from it appends a [`Hook`] (plus the
//! elapsed time the hook observed) whenever the machine calls into it, so a test can assert
//! the exact exit/enter interleaving across several states.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use super::instrumented_state::{Instrumented, ProbeState, Scripted};
use crate::state::State;

/// A lifecycle hook invocation, labelled with the state's probe label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Enter(&'static str),
    Loop(&'static str),
    Exit(&'static str),
}

impl Hook {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Enter(label) | Self::Loop(label) | Self::Exit(label) => label,
        }
    }
}

/// Shared, single-threaded record of hook invocations.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog {
    events: Rc<RefCell<Vec<(Hook, u64)>>>,
}

impl ProbeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe state named `label` that stays put on every tick.
    #[must_use]
    pub fn state(&self, label: &'static str) -> ProbeState {
        self.instrument(label, Scripted::new(label))
    }

    /// Wraps `inner` so its hooks are recorded under `label`.
    #[must_use]
    pub fn instrument<S: State>(&self, label: &'static str, inner: S) -> Instrumented<S> {
        Instrumented::new(label, inner, self.clone())
    }

    pub(crate) fn push(&self, hook: Hook, elapsed_ms: u64) {
        self.events.borrow_mut().push((hook, elapsed_ms));
    }

    /// Drains the recorded hooks.
    pub fn take(&self) -> Vec<Hook> {
        self.take_timed().into_iter().map(|(hook, _)| hook).collect()
    }

    /// Drains the recorded hooks together with the elapsed time each one observed.
    pub fn take_timed(&self) -> Vec<(Hook, u64)> {
        core::mem::take(&mut *self.events.borrow_mut())
    }

    /// Copies the recorded hooks without draining them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Hook> {
        self.events.borrow().iter().map(|(hook, _)| *hook).collect()
    }

    /// How often `hook` has been recorded since the last drain.
    #[must_use]
    pub fn count(&self, hook: Hook) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(seen, _)| *seen == hook)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let log = ProbeLog::new();
        let other = log.clone();

        log.push(Hook::Enter("A"), 0);
        other.push(Hook::Loop("A"), 3);

        assert_eq!(log.count(Hook::Enter("A")), 1);
        assert_eq!(other.snapshot(), [Hook::Enter("A"), Hook::Loop("A")]);
        assert_eq!(
            log.take_timed(),
            [(Hook::Enter("A"), 0), (Hook::Loop("A"), 3)]
        );
        assert!(other.is_empty());
    }

    #[test]
    fn hooks_expose_their_label() {
        assert_eq!(Hook::Exit("Off").label(), "Off");
    }
}
