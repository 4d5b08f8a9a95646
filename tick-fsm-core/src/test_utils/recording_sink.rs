//! A diagnostic sink that keeps every rendered record for later assertions.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Captures each diagnostic as its rendered line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    lines: Vec<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drains the captured lines.
    pub fn take(&mut self) -> Vec<String> {
        core::mem::take(&mut self.lines)
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&mut self, diagnostic: &Diagnostic<'_>) {
        self.lines.push(diagnostic.to_string());
    }
}
