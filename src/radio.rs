//! The radio watcher (spec.md §4.6): decodes receiver channels into
//! [`crate::state::UserInterface`] and enforces the two-stage
//! loss-of-signal ladder (emergency land → disarm).

use std::thread;
use std::time::{Duration, Instant};

use crate::control::constants::{DSM2_DISARM_TIMEOUT_S, DSM2_LAND_TIMEOUT_S};
use crate::hal::ReceiverDriver;
use crate::lifecycle::Lifecycle;
use crate::state::{CoreMode, FlightMode, SharedState};

const POLL_PERIOD: Duration = Duration::from_millis(10);

/// Decode one frame's six channels into `shared.user()`. Channel 5 is the
/// kill switch (`< 0` ⇒ engaged); channels 1–4 are throttle/roll/pitch/yaw
/// with the sign flips the original `DSM2_watcher` applies; channel 6 is
/// the mode switch, which both positions map to `UserAttitude` (spec.md
/// §4.6 / §9 Open Question — preserved pending a downstream decision on
/// the alternate mode).
pub fn decode_frame<R: ReceiverDriver>(receiver: &R, shared: &SharedState) {
    if receiver.channel_normalized(5) < 0.0 {
        shared.user().set_kill_switch(true);
        shared.setpoint().disarm();
        return;
    }

    shared.user().set_kill_switch(false);
    shared.user().set_throttle_stick(receiver.channel_normalized(1));
    shared.user().set_roll_stick(-receiver.channel_normalized(2));
    shared.user().set_pitch_stick(-receiver.channel_normalized(3));
    shared.user().set_yaw_stick(receiver.channel_normalized(4));

    let _channel_6 = receiver.channel_normalized(6);
    shared.user().set_flight_mode(FlightMode::UserAttitude);
}

/// Apply the loss-of-signal ladder given `elapsed` seconds since the last
/// decoded frame. Split out from [`run`] so the timeout thresholds are
/// exercised directly in tests without a real clock.
pub fn apply_timeout(elapsed_s: f32, shared: &SharedState) {
    if shared.setpoint().mode() != CoreMode::Disarmed && elapsed_s > DSM2_DISARM_TIMEOUT_S {
        tracing::warn!(elapsed_s, "lost radio communication, disarming");
        shared.setpoint().disarm();
    } else if shared.user().flight_mode() != FlightMode::EmergencyLand && elapsed_s > DSM2_LAND_TIMEOUT_S {
        tracing::warn!(elapsed_s, "lost radio communication, emergency landing");
        shared.user().set_flight_mode(FlightMode::EmergencyLand);
        shared.user().set_throttle_stick(-1.0);
        shared.user().set_roll_stick(0.0);
        shared.user().set_pitch_stick(0.0);
        shared.user().set_yaw_stick(0.0);
    }
}

/// Runs until `lifecycle` signals exit, polling `receiver` at ~100 Hz.
pub fn run<R: ReceiverDriver>(mut receiver: R, shared: SharedState, lifecycle: Lifecycle) {
    let mut using_radio = false;
    let mut last_frame = Instant::now();

    while !lifecycle.is_exiting() {
        if receiver.is_new_frame() {
            using_radio = true;
            last_frame = Instant::now();
            decode_frame(&receiver, &shared);
        } else if using_radio {
            apply_timeout(last_frame.elapsed().as_secs_f32(), &shared);
        }
        thread::sleep(POLL_PERIOD);
    }
}
