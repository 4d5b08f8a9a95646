//! Latch: two push buttons set and clear an LED.
//!
//! `High` owns the LED: it drives it on entry and releases it on exit, so `Low` has nothing
//! to do. The machine is built with the default table size, so adding the second edge
//! prints the growth message.

use tick_fsm_core::{Context, State, Trigger, triggers};

use crate::board::{Board, HIGH, LOW, PinMode};
use crate::sketch::{Button, Sketch, SketchMachine, sketch_machine};

pub const LED: u8 = 13;
pub const PIN_SET: u8 = 11;
pub const PIN_RESET: u8 = 12;

/// Pause after handling a button, long enough to ride out contact bounce.
pub const SETTLE_MS: u64 = 100;

triggers! {
    pub enum LatchTrigger {
        Set = 1,
        Reset = 2,
    }
}

struct High {
    board: Board,
}

impl State for High {
    fn name(&self) -> &str {
        "StateHigh"
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.board.digital_write(LED, HIGH);
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        None
    }

    fn on_exit(&mut self, _cx: &Context) {
        self.board.digital_write(LED, LOW);
    }
}

struct Low;

impl State for Low {
    fn name(&self) -> &str {
        "StateLow"
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        None
    }
}

pub struct LatchSketch {
    board: Board,
    machine: SketchMachine,
}

impl Sketch for LatchSketch {
    const NAME: &'static str = "latch";
    const BUTTONS: &'static [Button] = &[
        Button {
            name: "set",
            pin: PIN_SET,
        },
        Button {
            name: "reset",
            pin: PIN_RESET,
        },
    ];

    fn setup(board: Board, diagnostics: bool) -> Self {
        board.pin_mode(LED, PinMode::Output);
        board.pin_mode(PIN_SET, PinMode::InputPullup);
        board.pin_mode(PIN_RESET, PinMode::InputPullup);

        let mut machine = sketch_machine(&board, None, diagnostics);
        let high = machine.add_state(Box::new(High {
            board: board.clone(),
        }));
        let low = machine.add_state(Box::new(Low));

        machine.add_transition(low, LatchTrigger::Set, high);
        machine.add_transition(high, LatchTrigger::Reset, low);
        machine.start(low);

        Self { board, machine }
    }

    fn loop_once(&mut self) {
        self.machine.tick();

        // Buttons short to ground; set wins if both are held.
        if self.board.digital_read(PIN_SET) == LOW {
            self.machine.fire(LatchTrigger::Set);
            self.board.delay(SETTLE_MS);
        } else if self.board.digital_read(PIN_RESET) == LOW {
            self.machine.fire(LatchTrigger::Reset);
            self.board.delay(SETTLE_MS);
        }
    }

    fn machine(&self) -> &SketchMachine {
        &self.machine
    }
}
