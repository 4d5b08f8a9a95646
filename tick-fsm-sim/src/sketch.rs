//! Arduino-style sketches and the loop that runs them against a simulated [`Board`].

use serde::Serialize;
use tick_fsm_core::{FmtSink, State, StateMachine};

use crate::board::{Board, SerialPort};
use crate::error::SimError;
use crate::schedule::Press;

/// Machine type shared by every sketch: boxed states, board time, optional serial log.
pub type SketchMachine = StateMachine<Box<dyn State>, Board, Option<FmtSink<SerialPort>>>;

/// Builds a sketch machine whose diagnostics go to the board's serial port when enabled.
#[must_use]
pub fn sketch_machine(board: &Board, capacity: Option<usize>, diagnostics: bool) -> SketchMachine {
    let machine = match capacity {
        Some(capacity) => StateMachine::with_capacity(board.clone(), capacity),
        None => StateMachine::new(board.clone()),
    };
    machine.with_sink(
        diagnostics
            .then(|| FmtSink::with_transition_prefix(board.serial(), "State change: ")),
    )
}

/// A named push button wired to a GPIO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub name: &'static str,
    pub pin: u8,
}

/// The `setup()`/`loop()` pair of a sketch.
pub trait Sketch {
    const NAME: &'static str;

    /// Buttons that `--press` can operate.
    const BUTTONS: &'static [Button] = &[];

    /// Configures pins, builds the machine and starts it.
    fn setup(board: Board, diagnostics: bool) -> Self;

    /// One iteration of the sketch's main loop.
    fn loop_once(&mut self);

    fn machine(&self) -> &SketchMachine;
}

/// Run configuration shared by all sketches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Simulated time added after every loop iteration.
    pub step_ms: u64,
    /// Whether transition diagnostics are written to serial.
    pub diagnostics: bool,
    pub presses: Vec<Press>,
    /// Keep every serial line for the report. Off, lines are gone once drained.
    pub record_serial: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_ms: 1,
            diagnostics: true,
            presses: Vec::new(),
            record_serial: true,
        }
    }
}

/// Outcome of a run, serializable for `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub sketch: &'static str,
    pub elapsed_ms: u64,
    pub final_state: Option<String>,
    pub state_time_ms: Option<u64>,
    pub serial: Vec<String>,
}

/// A sketch running on its own board.
pub struct Simulation<S> {
    board: Board,
    sketch: S,
    presses: Vec<(Press, Button)>,
    step_ms: u64,
}

impl<S: Sketch> Simulation<S> {
    /// Powers up a fresh board and runs the sketch's `setup`.
    ///
    /// # Errors
    /// Fails if a press names a button the sketch does not have, or if `step_ms` is zero.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        if config.step_ms == 0 {
            return Err(SimError::ZeroStep);
        }
        let presses = config
            .presses
            .iter()
            .map(|press| Ok((press.clone(), button_named::<S>(&press.button)?)))
            .collect::<Result<Vec<_>, SimError>>()?;

        let board = if config.record_serial {
            Board::new()
        } else {
            Board::streaming()
        };
        let sketch = S::setup(board.clone(), config.diagnostics);
        tracing::debug!(sketch = S::NAME, presses = presses.len(), "sketch set up");
        Ok(Self {
            board,
            sketch,
            presses,
            step_ms: config.step_ms,
        })
    }

    /// Applies button levels for the current time, runs one loop, then lets time pass.
    pub fn step(&mut self) {
        self.apply_inputs();
        self.sketch.loop_once();
        self.board.delay(self.step_ms);
    }

    /// Steps until the board clock reaches `until_ms`.
    pub fn run_until(&mut self, until_ms: u64) {
        while self.board.millis() < until_ms {
            self.step();
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    #[must_use]
    pub fn current_state_name(&self) -> Option<String> {
        self.sketch.machine().current().map(|state| state.name().to_string())
    }

    #[must_use]
    pub fn report(&self) -> SimReport {
        SimReport {
            sketch: S::NAME,
            elapsed_ms: self.board.millis(),
            final_state: self.current_state_name(),
            state_time_ms: self.sketch.machine().state_time_ms(),
            serial: self.board.serial_lines(),
        }
    }

    fn apply_inputs(&self) {
        let now = self.board.millis();
        for button in S::BUTTONS {
            let held = self
                .presses
                .iter()
                .any(|(press, pressed)| pressed == button && press.is_held(now));
            let level = held.then(|| self.board.mode(button.pin).active_level());
            self.board.drive(button.pin, level);
        }
    }
}

fn button_named<S: Sketch>(name: &str) -> Result<Button, SimError> {
    S::BUTTONS
        .iter()
        .find(|button| button.name == name)
        .copied()
        .ok_or_else(|| SimError::UnknownButton {
            sketch: S::NAME,
            button: name.to_string(),
            available: if S::BUTTONS.is_empty() {
                "none".to_string()
            } else {
                S::BUTTONS
                    .iter()
                    .map(|button| button.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
}
