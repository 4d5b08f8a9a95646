//! Host-side simulator for `tick-fsm` machines.
//!
//! A [`board::Board`] stands in for the microcontroller: digital pins, a millisecond clock
//! that only moves when the sketch delays or the runner steps, and a serial port collecting
//! text lines. [`sketch::Simulation`] runs a [`sketch::Sketch`] against a fresh board and
//! presses buttons on a [`schedule::Press`] schedule.

pub mod board;
pub mod error;
pub mod schedule;
pub mod sketch;
pub mod sketches;

pub use board::{Board, PinMode};
pub use error::SimError;
pub use schedule::{Press, parse_presses};
pub use sketch::{SimConfig, SimReport, Simulation, Sketch};
