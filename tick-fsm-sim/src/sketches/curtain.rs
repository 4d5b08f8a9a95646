//! Curtain controller: three buttons and a simulated motor.
//!
//! ```text
//! Init ──Continue──► WaitForInput ──Open──► Opening ──Stop/at 1.0──► WaitForInput
//!                         │                 │    ▲
//!                         │               Close Open
//!                         │                 ▼    │
//!                         └─────Close────► Closing ──Stop/at 0.0──► WaitForInput
//! ```
//!
//! The moving states start the motor on entry and stop it on exit, so every way out of
//! `Opening` or `Closing` leaves the motor idle.

use std::cell::RefCell;
use std::rc::Rc;

use tick_fsm_core::{Context, State, Trigger, triggers};

use crate::board::{Board, PinMode};
use crate::serial_println;
use crate::sketch::{Button, Sketch, SketchMachine, sketch_machine};

pub const LED: u8 = 2;
pub const BUTTON_STOP: u8 = 16;
pub const BUTTON_OPEN: u8 = 17;
pub const BUTTON_CLOSE: u8 = 18;

/// Full travel time of the curtain.
pub const TRAVEL_MS: u64 = 5_000;

/// Minimum time between two accepted level changes on a button.
pub const DEBOUNCE_MS: u64 = 100;

/// Interval between position reports while the motor runs.
pub const REPORT_MS: u64 = 250;

triggers! {
    pub enum CurtainTrigger {
        /// Leaves `Init`.
        Continue = 1,
        Open = 2,
        Close = 3,
        Stop = 4,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Opening,
    Closing,
}

impl Motion {
    fn direction(self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Opening => 1.0,
            Self::Closing => -1.0,
        }
    }
}

#[derive(Debug)]
struct Motor {
    motion: Motion,
    position: f64,
    updated_at_ms: u64,
}

/// A curtain motor with a position sensor. Cloning shares the motor.
#[derive(Debug, Clone)]
pub struct CurtainMotor {
    board: Board,
    motor: Rc<RefCell<Motor>>,
}

impl CurtainMotor {
    /// A stopped motor with the curtain half open.
    #[must_use]
    pub fn new(board: Board) -> Self {
        let updated_at_ms = board.millis();
        Self {
            board,
            motor: Rc::new(RefCell::new(Motor {
                motion: Motion::Idle,
                position: 0.5,
                updated_at_ms,
            })),
        }
    }

    pub fn start(&self, motion: Motion) {
        let position = self.position();
        let code = motion.direction() as i32;
        serial_println!(self.board, "Starting motor: {code} from position: {position:.6}");
        self.motor.borrow_mut().motion = motion;
        self.board.digital_write(LED, true);
    }

    pub fn stop(&self) {
        // Settle the position reached so far before the motion is cleared.
        let _ = self.position();
        serial_println!(self.board, "Stopping motor");
        self.motor.borrow_mut().motion = Motion::Idle;
        self.board.digital_write(LED, false);
    }

    #[must_use]
    pub fn motion(&self) -> Motion {
        self.motor.borrow().motion
    }

    /// Reads the sensor, first moving the curtain for the time passed since the last read.
    /// The position stays within `0.0..=1.0`.
    #[must_use]
    pub fn position(&self) -> f64 {
        let now = self.board.millis();
        let mut motor = self.motor.borrow_mut();
        let elapsed = now.saturating_sub(motor.updated_at_ms) as f64;
        motor.position = (motor.position + motor.motion.direction() * elapsed / TRAVEL_MS as f64)
            .clamp(0.0, 1.0);
        motor.updated_at_ms = now;
        motor.position
    }
}

/// Reports rising edges of a button, ignoring level changes closer than [`DEBOUNCE_MS`].
#[derive(Debug, Clone)]
pub struct EdgeDetect {
    pin: u8,
    trigger: CurtainTrigger,
    level: bool,
    changed_at_ms: u64,
}

impl EdgeDetect {
    #[must_use]
    pub fn new(pin: u8, trigger: CurtainTrigger, now_ms: u64) -> Self {
        Self {
            pin,
            trigger,
            level: false,
            changed_at_ms: now_ms,
        }
    }

    /// Samples the pin; `true` only on an accepted low-to-high change.
    pub fn read(&mut self, board: &Board) -> bool {
        let now = board.millis();
        if now.saturating_sub(self.changed_at_ms) < DEBOUNCE_MS {
            return false;
        }
        let level = board.digital_read(self.pin);
        if level == self.level {
            return false;
        }
        self.level = level;
        self.changed_at_ms = now;
        level
    }

    #[must_use]
    pub fn trigger(&self) -> CurtainTrigger {
        self.trigger
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
        for pin in [BUTTON_STOP, BUTTON_OPEN, BUTTON_CLOSE] {
            self.board.pin_mode(pin, PinMode::InputPulldown);
        }
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        Some(CurtainTrigger::Continue.into())
    }
}

struct WaitForInput {
    board: Board,
}

impl State for WaitForInput {
    fn name(&self) -> &str {
        "WaitForInput"
    }

    fn on_enter(&mut self, _cx: &Context) {
        serial_println!(self.board, "Waiting for input...");
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        None
    }
}

/// Runs the motor in one direction until the end stop.
struct Moving {
    motor: CurtainMotor,
    motion: Motion,
}

impl Moving {
    fn at_end_stop(&self, position: f64) -> bool {
        match self.motion {
            Motion::Opening => position >= 1.0,
            Motion::Closing => position <= 0.0,
            Motion::Idle => true,
        }
    }
}

impl State for Moving {
    fn name(&self) -> &str {
        match self.motion {
            Motion::Opening => "Opening",
            Motion::Closing => "Closing",
            Motion::Idle => "Idle",
        }
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.motor.start(self.motion);
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        let position = self.motor.position();
        self.at_end_stop(position).then(|| CurtainTrigger::Stop.into())
    }

    fn on_exit(&mut self, _cx: &Context) {
        self.motor.stop();
    }
}

pub struct CurtainSketch {
    board: Board,
    machine: SketchMachine,
    motor: CurtainMotor,
    inputs: [EdgeDetect; 3],
    reported_at_ms: u64,
}

impl CurtainSketch {
    #[must_use]
    pub fn motor(&self) -> &CurtainMotor {
        &self.motor
    }
}

impl Sketch for CurtainSketch {
    const NAME: &'static str = "curtain";
    const BUTTONS: &'static [Button] = &[
        Button {
            name: "stop",
            pin: BUTTON_STOP,
        },
        Button {
            name: "open",
            pin: BUTTON_OPEN,
        },
        Button {
            name: "close",
            pin: BUTTON_CLOSE,
        },
    ];

    fn setup(board: Board, diagnostics: bool) -> Self {
        let motor = CurtainMotor::new(board.clone());

        let mut machine = sketch_machine(&board, None, diagnostics);
        let init = machine.add_state(Box::new(Init {
            board: board.clone(),
        }));
        let waiting = machine.add_state(Box::new(WaitForInput {
            board: board.clone(),
        }));
        let opening = machine.add_state(Box::new(Moving {
            motor: motor.clone(),
            motion: Motion::Opening,
        }));
        let closing = machine.add_state(Box::new(Moving {
            motor: motor.clone(),
            motion: Motion::Closing,
        }));

        machine.add_transition(init, CurtainTrigger::Continue, waiting);

        machine.add_transition(waiting, CurtainTrigger::Open, opening);
        machine.add_transition(waiting, CurtainTrigger::Close, closing);

        machine.add_transition(opening, CurtainTrigger::Stop, waiting);
        machine.add_transition(opening, CurtainTrigger::Close, closing);

        machine.add_transition(closing, CurtainTrigger::Stop, waiting);
        machine.add_transition(closing, CurtainTrigger::Open, opening);

        machine.start(init);

        let now = board.millis();
        let inputs = [
            EdgeDetect::new(BUTTON_STOP, CurtainTrigger::Stop, now),
            EdgeDetect::new(BUTTON_OPEN, CurtainTrigger::Open, now),
            EdgeDetect::new(BUTTON_CLOSE, CurtainTrigger::Close, now),
        ];

        Self {
            board,
            machine,
            motor,
            inputs,
            reported_at_ms: now,
        }
    }

    fn loop_once(&mut self) {
        self.machine.tick();

        let now = self.board.millis();
        if now - self.reported_at_ms > REPORT_MS {
            if self.motor.motion() != Motion::Idle {
                let position = self.motor.position();
                serial_println!(self.board, "Curtain motor position: {position:.6}");
            }
            self.reported_at_ms = now;
        }

        // One button per iteration; earlier entries take precedence.
        if let Some(input) = self.inputs.iter_mut().find_map(|input| {
            input.read(&self.board).then_some(input.trigger())
        }) {
            self.machine.fire(input);
        }
    }

    fn machine(&self) -> &SketchMachine {
        &self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HIGH;
    use crate::schedule::Press;
    use crate::sketch::{SimConfig, Simulation};

    fn sim(presses: Vec<Press>) -> Simulation<CurtainSketch> {
        let config = SimConfig {
            presses,
            ..SimConfig::default()
        };
        Simulation::new(&config).unwrap()
    }

    #[test]
    fn motor_moves_a_fifth_per_second_and_clamps() {
        let board = Board::new();
        let motor = CurtainMotor::new(board.clone());

        motor.start(Motion::Opening);
        board.delay(1_000);
        assert!((motor.position() - 0.7).abs() < 1e-9);

        board.delay(10_000);
        assert_eq!(motor.position(), 1.0);

        motor.stop();
        board.delay(1_000);
        assert_eq!(motor.position(), 1.0);
        assert_eq!(motor.motion(), Motion::Idle);
    }

    #[test]
    fn edge_detect_debounces_and_reports_rising_edges_only() {
        let board = Board::new();
        board.pin_mode(BUTTON_OPEN, PinMode::InputPulldown);
        let mut open = EdgeDetect::new(BUTTON_OPEN, CurtainTrigger::Open, 0);

        board.drive(BUTTON_OPEN, Some(HIGH));
        assert!(!open.read(&board), "inside the first debounce window");

        board.delay(DEBOUNCE_MS);
        assert!(open.read(&board));
        assert!(!open.read(&board), "level unchanged");

        board.drive(BUTTON_OPEN, None);
        board.delay(50);
        assert!(!open.read(&board), "release too soon");
        board.delay(50);
        assert!(!open.read(&board), "falling edge");

        board.delay(DEBOUNCE_MS);
        board.drive(BUTTON_OPEN, Some(HIGH));
        assert!(open.read(&board));
    }

    #[test]
    fn waits_for_input_after_start() {
        let mut sim = sim(Vec::new());
        sim.run_until(10);
        assert_eq!(sim.current_state_name().as_deref(), Some("WaitForInput"));
        assert_eq!(
            sim.board().serial_lines(),
            [
                "Growing transition table from 1 to 5 edges",
                "Growing transition table from 5 to 9 edges",
                "Starting!",
                "State change: Init(1) -> WaitForInput",
                "Waiting for input...",
            ]
        );
    }

    #[test]
    fn open_runs_to_the_end_stop() {
        let mut sim = sim(vec![Press::new("open", 500)]);

        sim.run_until(1_000);
        assert_eq!(sim.current_state_name().as_deref(), Some("Opening"));
        assert!(sim.board().digital_read(LED));

        sim.run_until(3_500);
        assert_eq!(sim.current_state_name().as_deref(), Some("WaitForInput"));
        assert_eq!(sim.sketch().motor().position(), 1.0);
        assert!(!sim.board().digital_read(LED));
        assert!(
            sim.board()
                .serial_lines()
                .iter()
                .any(|line| line.starts_with("Curtain motor position: "))
        );
    }

    #[test]
    fn close_then_stop_halts_midway() {
        let mut sim = sim(vec![Press::new("close", 500), Press::new("stop", 1_500)]);
        sim.run_until(2_000);

        assert_eq!(sim.current_state_name().as_deref(), Some("WaitForInput"));
        let position = sim.sketch().motor().position();
        assert!((position - 0.3).abs() < 0.01, "position {position}");
        assert_eq!(sim.sketch().motor().motion(), Motion::Idle);
    }

    #[test]
    fn reversing_passes_through_exit_and_enter() {
        let mut sim = sim(vec![Press::new("open", 500), Press::new("close", 1_000)]);
        sim.run_until(1_100);

        assert_eq!(sim.current_state_name().as_deref(), Some("Closing"));
        let lines = sim.board().serial_lines();
        let stop = lines.iter().position(|l| l == "Stopping motor").unwrap();
        assert!(lines[stop + 1].starts_with("Starting motor: -1 from position: 0.6"));
    }
}
