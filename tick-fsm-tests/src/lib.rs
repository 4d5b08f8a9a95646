//! Integration and property tests for tick-fsm
//!
//! This crate holds the tests that want std and heavy dependencies (proptest, a tracing
//! subscriber) which must stay out of the core `no_std` build.

#![cfg(test)]

pub mod integration;

/// Common test utilities and fixtures
pub mod common {
    use tick_fsm_core::{Context, State, Trigger};

    /// Setup tracing for tests
    pub fn setup_tracing() {
        use tracing_subscriber::{EnvFilter, fmt};

        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// A state that does nothing but carry a name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Named(pub &'static str);

    impl State for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
            None
        }
    }

    /// Names for generated machines, indexed by state position.
    pub const NAMES: [&str; 6] = ["S0", "S1", "S2", "S3", "S4", "S5"];
}
