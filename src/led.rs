//! The armed-indicator LED task (spec.md §4.7), polled at 2 Hz: blink red
//! while disarmed, solid green (red off) while armed. Derives its state
//! purely from `shared.setpoint().mode()` — the original's arming sequence
//! and `led_manager` thread both write the LEDs directly; collapsing both
//! writers into this one periodic reader removes the race without changing
//! the indicator's observable behavior.

use std::thread;
use std::time::Duration;

use crate::hal::StatusLeds;
use crate::lifecycle::Lifecycle;
use crate::state::{CoreMode, SharedState};

const POLL_PERIOD: Duration = Duration::from_millis(500);

pub fn run<L: StatusLeds>(mut leds: L, shared: SharedState, lifecycle: Lifecycle) {
    let mut blink_on = false;
    while !lifecycle.is_exiting() {
        if shared.setpoint().mode() == CoreMode::Disarmed {
            blink_on = !blink_on;
            leds.set_red(blink_on);
            leds.set_green(false);
        } else {
            blink_on = false;
            leds.set_red(false);
            leds.set_green(true);
        }
        thread::sleep(POLL_PERIOD);
    }
}
