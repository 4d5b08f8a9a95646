//! Instrumented state wrapper for probe integration
//!
//! [`Instrumented`] adds probe recording to any state without changing its behavior: every
//! hook is forwarded to the inner state and then logged. [`Scripted`] is a tiny state that
//! replays a fixed sequence of loop results, which is all most engine tests need.

use alloc::collections::VecDeque;

use super::probes::{Hook, ProbeLog};
use crate::state::{Context, State};
use crate::trigger::Trigger;

/// A probe state: a [`Scripted`] state with hook recording.
pub type ProbeState = Instrumented<Scripted>;

/// Wrapper that records hook invocations into a [`ProbeLog`].
pub struct Instrumented<S> {
    label: &'static str,
    inner: S,
    log: ProbeLog,
}

impl<S> Instrumented<S> {
    pub(crate) fn new(label: &'static str, inner: S, log: ProbeLog) -> Self {
        Self { label, inner, log }
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl Instrumented<Scripted> {
    /// Queues loop results; once they run out the state stays put.
    #[must_use]
    pub fn firing(mut self, script: impl IntoIterator<Item = Option<Trigger>>) -> Self {
        self.inner.script.extend(script);
        self
    }

    /// Fires `trigger` from every loop call.
    #[must_use]
    pub fn always(mut self, trigger: Trigger) -> Self {
        self.inner.fallback = Some(trigger);
        self
    }
}

impl<S: State> State for Instrumented<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn on_enter(&mut self, cx: &Context) {
        self.inner.on_enter(cx);
        self.log.push(Hook::Enter(self.label), cx.elapsed_ms());
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        let trigger = self.inner.on_loop(cx);
        self.log.push(Hook::Loop(self.label), cx.elapsed_ms());
        trigger
    }

    fn on_exit(&mut self, cx: &Context) {
        self.inner.on_exit(cx);
        self.log.push(Hook::Exit(self.label), cx.elapsed_ms());
    }
}

/// Replays queued loop results, then returns `fallback` forever.
#[derive(Debug, Clone)]
pub struct Scripted {
    name: &'static str,
    script: VecDeque<Option<Trigger>>,
    fallback: Option<Trigger>,
}

impl Scripted {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            script: VecDeque::new(),
            fallback: None,
        }
    }
}

impl State for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
