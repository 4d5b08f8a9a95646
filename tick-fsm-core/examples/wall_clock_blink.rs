//! Blinks a pretend LED on the host's monotonic clock for a few seconds.
//!
//! Run with `cargo run -p tick-fsm-core --example wall_clock_blink --features std`.

use std::fmt;
use std::thread;
use std::time::Duration;

use tick_fsm_core::prelude::*;
use tick_fsm_core::{FmtSink, StdClock, triggers};

triggers! {
    enum Blink {
        Timeout = 1,
    }
}

/// Writes diagnostics straight to stdout.
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{s}");
        Ok(())
    }
}

/// States as a plain enum: no boxing, one match per hook.
enum Led {
    On,
    Off,
}

impl State for Led {
    fn name(&self) -> &str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
        }
    }

    fn on_enter(&mut self, cx: &Context) {
        println!("{:>5} ms  led {}", cx.now_ms(), self.name());
    }

    fn on_loop(&mut self, cx: &Context) -> Option<Trigger> {
        let period = match self {
            Self::On => 200,
            Self::Off => 600,
        };
        (cx.elapsed_ms() >= period).then(|| Blink::Timeout.into())
    }
}

fn main() {
    let mut machine =
        StateMachine::with_capacity(StdClock::new(), 2).with_sink(FmtSink::new(Stdout));
    let on = machine.add_state(Led::On);
    let off = machine.add_state(Led::Off);
    machine.add_transition(on, Blink::Timeout, off);
    machine.add_transition(off, Blink::Timeout, on);
    machine.start(off);

    while machine.clock().now_ms() < 3_000 {
        machine.tick();
        thread::sleep(Duration::from_millis(10));
    }
}
