//! A simulated microcontroller board: digital pins, a millisecond clock and a serial port.
//!
//! [`Board`] is a cheap handle (`Rc` inside) so every state of a sketch can hold one, the
//! same way Arduino sketches reach for global `digitalWrite`/`millis`/`Serial`. It is also
//! the machine's [`Clock`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tick_fsm_core::{Clock, ManualClock};

/// GPIO numbers available on the simulated board.
pub const PIN_COUNT: usize = 40;

pub const HIGH: bool = true;
pub const LOW: bool = false;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinMode {
    /// Floating input; reads low unless driven.
    #[default]
    Input,
    /// Input pulled high; a pressed button pulls it low.
    InputPullup,
    /// Input pulled low; a pressed button drives it high.
    InputPulldown,
    Output,
}

impl PinMode {
    /// Level a pressed button produces on a pin in this mode.
    #[must_use]
    pub fn active_level(self) -> bool {
        !matches!(self, Self::InputPullup)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Pin {
    mode: PinMode,
    output: bool,
    driven: Option<bool>,
}

impl Pin {
    fn read(&self) -> bool {
        match self.mode {
            PinMode::Output => self.output,
            PinMode::InputPullup => self.driven.unwrap_or(HIGH),
            PinMode::Input | PinMode::InputPulldown => self.driven.unwrap_or(LOW),
        }
    }
}

#[derive(Debug, Default)]
struct Serial {
    lines: Vec<String>,
    partial: String,
    drained: usize,
    /// Keep drained lines in `lines` instead of dropping them.
    record: bool,
}

impl Serial {
    fn write(&mut self, text: &str) {
        for chunk in text.split_inclusive('\n') {
            match chunk.strip_suffix('\n') {
                Some(line) => {
                    self.partial.push_str(line);
                    self.lines.push(std::mem::take(&mut self.partial));
                }
                None => self.partial.push_str(chunk),
            }
        }
    }
}

#[derive(Debug)]
struct Inner {
    clock: ManualClock,
    pins: RefCell<[Pin; PIN_COUNT]>,
    serial: RefCell<Serial>,
}

/// Shared handle to one simulated board.
#[derive(Debug, Clone)]
pub struct Board {
    inner: Rc<Inner>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board that keeps every serial line for [`serial_lines`](Self::serial_lines).
    #[must_use]
    pub fn new() -> Self {
        Self::with_serial_history(true)
    }

    /// A board whose serial port forgets lines once they are drained.
    #[must_use]
    pub fn streaming() -> Self {
        Self::with_serial_history(false)
    }

    fn with_serial_history(record: bool) -> Self {
        Self {
            inner: Rc::new(Inner {
                clock: ManualClock::new(),
                pins: RefCell::new([Pin::default(); PIN_COUNT]),
                serial: RefCell::new(Serial {
                    record,
                    ..Serial::default()
                }),
            }),
        }
    }

    /// Milliseconds since power-on.
    #[must_use]
    pub fn millis(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    /// Busy-waits by moving simulated time forward.
    pub fn delay(&self, ms: u64) {
        self.inner.clock.advance(ms);
    }

    pub fn pin_mode(&self, pin: u8, mode: PinMode) {
        self.with_pin(pin, |p| p.mode = mode);
    }

    #[must_use]
    pub fn mode(&self, pin: u8) -> PinMode {
        self.with_pin(pin, |p| p.mode)
    }

    /// Sets an output level. Writes to pins not in output mode are remembered but not read
    /// back until the pin becomes an output, as on real hardware with a floating latch.
    pub fn digital_write(&self, pin: u8, level: bool) {
        self.with_pin(pin, |p| p.output = level);
    }

    #[must_use]
    pub fn digital_read(&self, pin: u8) -> bool {
        self.with_pin(pin, |p| p.read())
    }

    /// Drives an input from outside the board (a button or jumper), `None` releases it.
    pub fn drive(&self, pin: u8, level: Option<bool>) {
        self.with_pin(pin, |p| p.driven = level);
    }

    /// Writable handle to the serial port.
    #[must_use]
    pub fn serial(&self) -> SerialPort {
        SerialPort {
            board: self.clone(),
        }
    }

    /// Every complete line written so far. On a [`streaming`](Self::streaming) board only
    /// the lines not yet drained.
    #[must_use]
    pub fn serial_lines(&self) -> Vec<String> {
        self.inner.serial.borrow().lines.clone()
    }

    /// Whether drained lines stay available through [`serial_lines`](Self::serial_lines).
    #[must_use]
    pub fn records_serial(&self) -> bool {
        self.inner.serial.borrow().record
    }

    /// Complete lines written since the previous call.
    pub fn drain_serial(&self) -> Vec<String> {
        let mut serial = self.inner.serial.borrow_mut();
        if serial.record {
            let fresh = serial.lines[serial.drained..].to_vec();
            serial.drained = serial.lines.len();
            fresh
        } else {
            std::mem::take(&mut serial.lines)
        }
    }

    fn with_pin<R>(&self, pin: u8, f: impl FnOnce(&mut Pin) -> R) -> R {
        let mut pins = self.inner.pins.borrow_mut();
        let slot = pins
            .get_mut(usize::from(pin))
            .unwrap_or_else(|| panic!("GPIO{pin} does not exist on this board"));
        f(slot)
    }
}

impl Clock for Board {
    fn now_ms(&self) -> u64 {
        self.millis()
    }
}

/// The board's serial port as a [`fmt::Write`] target.
#[derive(Debug, Clone)]
pub struct SerialPort {
    board: Board,
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.board.inner.serial.borrow_mut().write(s);
        Ok(())
    }
}

/// `Serial.printf`-style helper writing to the board's serial port.
#[macro_export]
macro_rules! serial_println {
    ($board:expr, $($arg:tt)*) => {{
        let mut port = $board.serial();
        let _ = ::std::fmt::Write::write_fmt(&mut port, format_args!("{}\n", format_args!($($arg)*)));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_follow_their_pull_resistors() {
        let board = Board::new();
        board.pin_mode(11, PinMode::InputPullup);
        board.pin_mode(16, PinMode::InputPulldown);

        assert_eq!(board.digital_read(11), HIGH);
        assert_eq!(board.digital_read(16), LOW);

        board.drive(11, Some(LOW));
        board.drive(16, Some(HIGH));
        assert_eq!(board.digital_read(11), LOW);
        assert_eq!(board.digital_read(16), HIGH);

        board.drive(11, None);
        assert_eq!(board.digital_read(11), HIGH);
    }

    #[test]
    fn outputs_read_back_what_was_written() {
        let board = Board::new();
        board.pin_mode(2, PinMode::Output);
        board.digital_write(2, HIGH);
        assert!(board.digital_read(2));
    }

    #[test]
    fn delay_moves_the_clock() {
        let board = Board::new();
        board.delay(100);
        assert_eq!(board.millis(), 100);
        assert_eq!(board.clone().now_ms(), 100);
    }

    #[test]
    fn serial_collects_complete_lines() {
        let board = Board::new();
        serial_println!(board, "Starting!");
        {
            use std::fmt::Write;
            let mut port = board.serial();
            write!(port, "half ").unwrap();
            assert_eq!(board.serial_lines(), ["Starting!"]);
            writeln!(port, "line").unwrap();
        }

        assert_eq!(board.drain_serial(), ["Starting!", "half line"]);
        assert!(board.drain_serial().is_empty());
        serial_println!(board, "{} {}", "more", 1);
        assert_eq!(board.drain_serial(), ["more 1"]);
    }

    #[test]
    fn streaming_serial_forgets_drained_lines() {
        let board = Board::streaming();
        assert!(!board.records_serial());

        for i in 0..10_000 {
            serial_println!(board, "line {i}");
            assert_eq!(board.drain_serial(), [format!("line {i}")]);
        }
        assert!(board.serial_lines().is_empty());
        assert!(board.inner.serial.borrow().lines.is_empty());

        serial_println!(board, "pending");
        assert_eq!(board.serial_lines(), ["pending"]);
    }

    #[test]
    #[should_panic(expected = "GPIO99")]
    fn unknown_pins_panic() {
        Board::new().digital_write(99, HIGH);
    }
}
