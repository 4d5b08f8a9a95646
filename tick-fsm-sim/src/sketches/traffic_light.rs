//! Traffic light: one reusable state type parameterised by lamp pattern and timeout.
//!
//! ```text
//! Init ──5 s──► NorthSouth Go ──5 s──► NorthSouth Warn ──1 s──► NorthSouth Stop ──0.5 s──┐
//!                     ▲                                                                   │
//!                     └──0.5 s── EastWest Stop ◄──1 s── EastWest Warn ◄──5 s── EastWest Go ◄┘
//! ```
//!
//! Holding the reset pin low sends every running phase back to `Init`. `Init` itself has
//! no reset edge, so a held button logs "no edge" until it is released.

use tick_fsm_core::{Context, State, Trigger, triggers};

use crate::board::{Board, PinMode};
use crate::sketch::{Button, Sketch, SketchMachine, sketch_machine};

pub const RESET_PIN: u8 = 5;

pub const LED_EW_RED: u8 = 8;
pub const LED_EW_AMBER: u8 = 9;
pub const LED_EW_GREEN: u8 = 10;
pub const LED_NS_GREEN: u8 = 11;
pub const LED_NS_AMBER: u8 = 12;
pub const LED_NS_RED: u8 = 13;

pub const LEDS: [u8; 6] = [
    LED_EW_RED,
    LED_EW_AMBER,
    LED_EW_GREEN,
    LED_NS_RED,
    LED_NS_AMBER,
    LED_NS_GREEN,
];

/// Edges registered by `setup`: seven timeouts plus six resets, with one slot to spare.
pub const TABLE_CAPACITY: usize = 14;

/// Time `Init` flashes before the first green.
pub const INIT_MS: u64 = 5_000;
const FLASH_MS: u64 = 500;

/// Pause at the end of every loop iteration.
pub const LOOP_DELAY_MS: u64 = 100;

triggers! {
    pub enum TrafficTrigger {
        Timeout = 1,
        Reset = 2,
    }
}

/// A set of lit lamps, one bit per GPIO number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lamps(u64);

impl Lamps {
    pub const OFF: Self = Self(0);
    pub const NS_GREEN_EW_RED: Self = Self::of(&[LED_NS_GREEN, LED_EW_RED]);
    pub const NS_AMBER_EW_RED: Self = Self::of(&[LED_NS_AMBER, LED_EW_RED]);
    pub const ALL_RED: Self = Self::of(&[LED_NS_RED, LED_EW_RED]);
    pub const NS_RED_EW_GREEN: Self = Self::of(&[LED_NS_RED, LED_EW_GREEN]);
    pub const NS_RED_EW_AMBER: Self = Self::of(&[LED_NS_RED, LED_EW_AMBER]);

    const fn of(pins: &[u8]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < pins.len() {
            bits |= 1 << pins[i];
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub fn contains(self, pin: u8) -> bool {
        self.0 & (1 << pin) != 0
    }

    /// Drives every traffic LED to match this pattern.
    pub fn show(self, board: &Board) {
        for pin in LEDS {
            board.digital_write(pin, self.contains(pin));
        }
    }

    /// The pattern currently visible on the board.
    #[must_use]
    pub fn read(board: &Board) -> Self {
        let lit: Vec<u8> = LEDS
            .into_iter()
            .filter(|&pin| board.digital_read(pin))
            .collect();
        Self::of(&lit)
    }
}

/// Flashes north-south red with east-west amber until the start-up period is over.
struct Init {
    board: Board,
}

impl State for Init {
    fn name(&self) -> &str {
        "Init"
    }

    fn on_enter(&mut self, _cx: &Context) {
        Lamps::OFF.show(&self.board);
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        let on = (cx.elapsed_ms() / FLASH_MS) & 1 == 1;
        let lamps = if on { Lamps::NS_RED_EW_AMBER } else { Lamps::OFF };
        lamps.show(&self.board);

        (cx.elapsed_ms() > INIT_MS).then(|| TrafficTrigger::Timeout.into())
    }
}

/// Shows a fixed pattern and times out after `timeout_ms`.
struct Phase {
    name: &'static str,
    lamps: Lamps,
    timeout_ms: u64,
    board: Board,
}

impl State for Phase {
    fn name(&self) -> &str {
        self.name
    }

    fn on_enter(&mut self, _cx: &Context) {
        self.lamps.show(&self.board);
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        (cx.elapsed_ms() > self.timeout_ms).then(|| TrafficTrigger::Timeout.into())
    }
}

/// Phase table: name, lamps, timeout.
pub const PHASES: [(&str, Lamps, u64); 6] = [
    ("NorthSouth Go", Lamps::NS_GREEN_EW_RED, 5_000),
    ("NorthSouth Warn", Lamps::NS_AMBER_EW_RED, 1_000),
    ("NorthSouth Stop", Lamps::ALL_RED, 500),
    ("EastWest Go", Lamps::NS_RED_EW_GREEN, 5_000),
    ("EastWest Warn", Lamps::NS_RED_EW_AMBER, 1_000),
    ("EastWest Stop", Lamps::ALL_RED, 500),
];

pub struct TrafficLightSketch {
    board: Board,
    machine: SketchMachine,
}

impl Sketch for TrafficLightSketch {
    const NAME: &'static str = "traffic-light";
    const BUTTONS: &'static [Button] = &[Button {
        name: "reset",
        pin: RESET_PIN,
    }];

    fn setup(board: Board, diagnostics: bool) -> Self {
        for pin in LEDS {
            board.pin_mode(pin, PinMode::Output);
        }
        board.pin_mode(RESET_PIN, PinMode::InputPullup);

        let mut machine = sketch_machine(&board, Some(TABLE_CAPACITY), diagnostics);
        let init = machine.add_state(Box::new(Init {
            board: board.clone(),
        }));
        let phases: Vec<_> = PHASES
            .iter()
            .map(|&(name, lamps, timeout_ms)| {
                machine.add_state(Box::new(Phase {
                    name,
                    lamps,
                    timeout_ms,
                    board: board.clone(),
                }))
            })
            .collect();

        machine.add_transition(init, TrafficTrigger::Timeout, phases[0]);
        for (i, &phase) in phases.iter().enumerate() {
            let next = phases[(i + 1) % phases.len()];
            machine.add_transition(phase, TrafficTrigger::Timeout, next);
        }
        for &phase in &phases {
            machine.add_transition(phase, TrafficTrigger::Reset, init);
        }

        machine.start(init);
        Self { board, machine }
    }

    fn loop_once(&mut self) {
        self.machine.tick();
        self.board.delay(LOOP_DELAY_MS);

        if !self.board.digital_read(RESET_PIN) {
            self.machine.fire(TrafficTrigger::Reset);
        }
    }

    fn machine(&self) -> &SketchMachine {
        &self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::{SimConfig, Simulation};

    #[test]
    fn lamp_patterns_light_the_right_pins() {
        assert!(Lamps::ALL_RED.contains(LED_NS_RED));
        assert!(Lamps::ALL_RED.contains(LED_EW_RED));
        assert!(!Lamps::ALL_RED.contains(LED_NS_GREEN));
        assert!(!Lamps::OFF.contains(LED_EW_RED));
    }

    #[test]
    fn setup_fits_the_preallocated_table() {
        let sim = Simulation::<TrafficLightSketch>::new(&SimConfig::default()).unwrap();
        let table = sim.sketch().machine().transitions();
        assert_eq!(table.len(), 13);
        assert_eq!(table.capacity(), TABLE_CAPACITY);
        assert!(sim.board().serial_lines().is_empty());
    }

    #[test]
    fn init_flashes_before_going_green() {
        let mut sim = Simulation::<TrafficLightSketch>::new(&SimConfig::default()).unwrap();

        sim.run_until(200);
        assert_eq!(Lamps::read(sim.board()), Lamps::OFF);
        sim.run_until(700);
        assert_eq!(Lamps::read(sim.board()), Lamps::NS_RED_EW_AMBER);

        sim.run_until(5_500);
        assert_eq!(sim.current_state_name().as_deref(), Some("NorthSouth Go"));
        assert_eq!(Lamps::read(sim.board()), Lamps::NS_GREEN_EW_RED);
    }
}
