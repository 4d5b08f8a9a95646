// Basic facade tests
use tick_fsm::prelude::*;

triggers! {
    enum Latch {
        Set = 1,
        Reset = 2,
    }
}

struct Hold(&'static str);

impl State for Hold {
    fn name(&self) -> &str {
        self.0
    }

    fn on_loop(&mut self, _cx: &Context) -> Option<Trigger> {
        None
    }
}

#[test]
fn prelude_is_enough_to_drive_a_machine() {
    let mut machine = StateMachine::new(ManualClock::new());
    let low = machine.add_state(Hold("StateLow"));
    let high = machine.add_state(Hold("StateHigh"));
    machine.add_transition(low, Latch::Set, high);
    machine.add_transition(high, Latch::Reset, low);

    machine.start(low);
    assert!(machine.fire(Latch::Set));
    assert_eq!(machine.current().map(|s| s.name()), Some("StateHigh"));
    assert!(!machine.fire(Latch::Set));
    assert!(machine.fire(Latch::Reset));
    assert_eq!(machine.current_state(), Some(low));
}
