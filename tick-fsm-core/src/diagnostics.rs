//! Diagnostic records and the sinks that consume them.
//!
//! The machine reports three things: table growth, taken transitions and triggers that
//! found no edge. Which sink receives them is a type parameter of the machine, so the
//! default [`Silent`] sink inlines to nothing and costs nothing at runtime.
//!
//! | Sink | Availability | Output |
//! |------|--------------|--------|
//! | [`Silent`] | always | none |
//! | [`FmtSink`] | always | one line per record into any `core::fmt::Write` (a UART, a `String`) |
//! | [`LogSink`] | `debug-log` feature | `log::debug!` / `log::info!` |
//! | [`TracingSink`] | `std` feature | `tracing::debug!` with structured fields |

use core::fmt;

use crate::trigger::Trigger;

/// A single diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// The edge store was enlarged while adding a transition.
    Grew { from: usize, to: usize },
    /// `fire` found an edge and moved the machine.
    Transition {
        from: &'a str,
        trigger: Trigger,
        to: &'a str,
    },
    /// `fire` found no edge for the current state and trigger.
    NoEdge { from: &'a str, trigger: Trigger },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grew { from, to } => {
                write!(f, "Growing transition table from {from} to {to} edges")
            }
            Self::Transition { from, trigger, to } => write!(f, "{from}({trigger}) -> {to}"),
            Self::NoEdge { from, trigger } => {
                write!(f, "Failed to find edge for trigger: {from}{trigger}")
            }
        }
    }
}

/// Receiver for diagnostic records.
pub trait DiagnosticSink {
    fn record(&mut self, diagnostic: &Diagnostic<'_>);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Silent;

impl DiagnosticSink for Silent {
    #[inline(always)]
    fn record(&mut self, _diagnostic: &Diagnostic<'_>) {}
}

impl<K: DiagnosticSink + ?Sized> DiagnosticSink for &mut K {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        (**self).record(diagnostic);
    }
}

/// `None` disables an otherwise configured sink at runtime.
impl<K: DiagnosticSink> DiagnosticSink for Option<K> {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        if let Some(sink) = self {
            sink.record(diagnostic);
        }
    }
}

/// Writes each record as a line into a [`fmt::Write`] target, like a serial port.
#[derive(Debug, Default, Clone)]
pub struct FmtSink<W> {
    writer: W,
    prefix: &'static str,
}

impl<W: fmt::Write> FmtSink<W> {
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer, prefix: "" }
    }

    /// Prepends `prefix` to transition lines, e.g. `"State change: "`.
    #[must_use]
    pub const fn with_transition_prefix(writer: W, prefix: &'static str) -> Self {
        Self { writer, prefix }
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: fmt::Write> DiagnosticSink for FmtSink<W> {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        let prefix = match diagnostic {
            Diagnostic::Transition { .. } => self.prefix,
            _ => "",
        };
        // A diagnostic line that cannot be written is dropped; the machine keeps running.
        let _ = writeln!(self.writer, "{prefix}{diagnostic}");
    }
}

/// Forwards records to the `log` facade.
#[cfg(feature = "debug-log")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSink;

#[cfg(feature = "debug-log")]
impl DiagnosticSink for LogSink {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::Grew { .. } => log::info!("{diagnostic}"),
            Diagnostic::Transition { .. } => log::debug!("State change: {diagnostic}"),
            Diagnostic::NoEdge { .. } => log::debug!("{diagnostic}"),
        }
    }
}

/// Forwards records to `tracing` with structured fields.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingSink;

#[cfg(feature = "std")]
impl DiagnosticSink for TracingSink {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        match *diagnostic {
            Diagnostic::Grew { from, to } => {
                tracing::info!(from, to, "{diagnostic}");
            }
            Diagnostic::Transition { from, trigger, to } => {
                tracing::debug!(from, trigger = trigger.code(), to, "State change: {diagnostic}");
            }
            Diagnostic::NoEdge { from, trigger } => {
                tracing::debug!(from, trigger = trigger.code(), "{diagnostic}");
            }
        }
    }
}
