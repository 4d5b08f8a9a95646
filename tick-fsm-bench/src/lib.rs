//! Performance benchmarks for tick-fsm
//!
//! This crate contains Criterion.rs benchmarks for the dispatch path (`tick`/`fire`) and for
//! building transition tables under the different storage and growth choices.

pub mod fixtures;

pub use fixtures::{BenchState, NEXT, RESET, ring_machine, trigger_mix};
