//! Blink: the smallest useful machine.
//!
//! `Init` configures the LED and leaves immediately; `Blink` flashes the LED for two
//! seconds; `Off` keeps it dark for two seconds; then back to `Blink`, forever. A single
//! trigger, `Timeout`, drives every edge.

use tick_fsm_core::{Context, State, Trigger, triggers};

use crate::board::{Board, LOW, PinMode};
use crate::serial_println;
use crate::sketch::{Sketch, SketchMachine, sketch_machine};

pub const LED: u8 = 2;

/// Time spent in each of `Blink` and `Off`.
pub const PHASE_MS: u64 = 2_000;

triggers! {
    pub enum BlinkTrigger {
        Timeout = 1,
    }
}

struct Init {
    board: Board,
}

impl State for Init {
    fn name(&self) -> &str {
        "Init"
    }

    fn on_enter(&mut self, _cx: &Context) {
        serial_println!(self.board, "Starting!");
        self.board.pin_mode(LED, PinMode::Output);
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        Some(BlinkTrigger::Timeout.into())
    }
}

struct Blink {
    board: Board,
}

impl State for Blink {
    fn name(&self) -> &str {
        "Blink"
    }

    // Toggle every 100 ms.
    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        let on = (cx.elapsed_ms() / 100) & 1 == 1;
        self.board.digital_write(LED, on);

        (cx.elapsed_ms() > PHASE_MS).then(|| BlinkTrigger::Timeout.into())
    }
}

struct Off {
    board: Board,
}

impl State for Off {
    fn name(&self) -> &str {
        "Off"
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.board.digital_write(LED, LOW);
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        (cx.elapsed_ms() > PHASE_MS).then(|| BlinkTrigger::Timeout.into())
    }
}

pub struct BlinkSketch {
    machine: SketchMachine,
}

impl Sketch for BlinkSketch {
    const NAME: &'static str = "blink";

    fn setup(board: Board, diagnostics: bool) -> Self {
        let mut machine = sketch_machine(&board, None, diagnostics);
        let init = machine.add_state(Box::new(Init {
            board: board.clone(),
        }));
        let blink = machine.add_state(Box::new(Blink {
            board: board.clone(),
        }));
        let off = machine.add_state(Box::new(Off { board }));

        machine.add_transition(init, BlinkTrigger::Timeout, blink);
        machine.add_transition(blink, BlinkTrigger::Timeout, off);
        machine.add_transition(off, BlinkTrigger::Timeout, blink);

        machine.start(init);
        Self { machine }
    }

    fn loop_once(&mut self) {
        self.machine.tick();
    }

    fn machine(&self) -> &SketchMachine {
        &self.machine
    }
}
