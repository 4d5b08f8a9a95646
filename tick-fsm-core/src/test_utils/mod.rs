//! Test utilities for observing machines from the outside
//!
//! This module provides probe states that record every lifecycle hook into a shared log,
//! and a sink that captures rendered diagnostics. Only available with `test` or the
//! `test-probes` feature to ensure zero cost in production builds.

#[cfg(any(test, feature = "test-probes"))]
pub mod instrumented_state;
#[cfg(any(test, feature = "test-probes"))]
pub mod probes;
#[cfg(any(test, feature = "test-probes"))]
pub mod recording_sink;

// Re-exports for convenient usage
#[cfg(any(test, feature = "test-probes"))]
pub use instrumented_state::{Instrumented, ProbeState, Scripted};
#[cfg(any(test, feature = "test-probes"))]
pub use probes::{Hook, ProbeLog};
#[cfg(any(test, feature = "test-probes"))]
pub use recording_sink::RecordingSink;
