//! The flight-mode supervisor (spec.md §4.4): mode translation and the
//! arming sequence, run as a single cooperative task at ~100 Hz.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::control::constants::{ARM_TIP_THRESHOLD, EMERGENCY_LAND_THR};
use crate::hal::PwmDriver;
use crate::lifecycle::Lifecycle;
use crate::state::{CoreMode, FlightMode, SharedState};

const SUPERVISOR_PERIOD: Duration = Duration::from_millis(10);
const ARMING_POLL_PERIOD: Duration = Duration::from_millis(100);
const WAKE_PULSE_PERIOD: Duration = Duration::from_millis(5);
const WAKE_PULSE_COUNT: u32 = 10;

/// Explicit state enumeration for the arming sequence (spec.md §9's
/// redesign note: the original's `goto START` on mid-sequence tip-over
/// becomes a transition back to `WaitLevel`, not non-local control flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArmingStep {
    WaitLevel,
    WaitKillReleased,
    WaitThrottleDown1,
    WaitThrottleUp,
    WaitThrottleDown2,
}

fn is_level(shared: &SharedState) -> bool {
    shared.measured().roll().abs() <= ARM_TIP_THRESHOLD && shared.measured().pitch().abs() <= ARM_TIP_THRESHOLD
}

/// Advance one step of the arming state machine. Returns `Some(next)` to
/// continue, or `None` once all six ordered observations (spec.md §4.4.1)
/// have been made. Tip-over is checked by the caller on every poll, not
/// here, so it applies uniformly regardless of which step is active.
fn advance(step: ArmingStep, shared: &SharedState) -> Option<ArmingStep> {
    match step {
        ArmingStep::WaitLevel => {
            if is_level(shared) {
                Some(ArmingStep::WaitKillReleased)
            } else {
                Some(step)
            }
        }
        ArmingStep::WaitKillReleased => {
            if !shared.user().kill_switch() {
                Some(ArmingStep::WaitThrottleDown1)
            } else {
                Some(step)
            }
        }
        ArmingStep::WaitThrottleDown1 => {
            if shared.user().throttle_stick() < -0.9 {
                Some(ArmingStep::WaitThrottleUp)
            } else {
                Some(step)
            }
        }
        ArmingStep::WaitThrottleUp => {
            if shared.user().throttle_stick() > 0.9 {
                Some(ArmingStep::WaitThrottleDown2)
            } else {
                Some(step)
            }
        }
        ArmingStep::WaitThrottleDown2 => {
            if shared.user().throttle_stick() < -0.9 {
                None
            } else {
                Some(step)
            }
        }
    }
}

/// Blocking state machine over the kill switch, throttle stick, and
/// vehicle attitude (spec.md §4.4.1). Returns `true` once every ordered
/// condition has been observed without an intervening tip-over, `false`
/// if `lifecycle` signaled exit first.
fn wait_for_arming_sequence(shared: &SharedState, lifecycle: &Lifecycle) -> bool {
    let mut step = ArmingStep::WaitLevel;
    loop {
        if lifecycle.is_exiting() {
            return false;
        }

        if step != ArmingStep::WaitLevel && !is_level(shared) {
            tracing::warn!("restarting arming sequence: MAV tipped mid-sequence");
            step = ArmingStep::WaitLevel;
        } else {
            match advance(step, shared) {
                Some(next) => step = next,
                None => return true,
            }
        }

        thread::sleep(ARMING_POLL_PERIOD);
    }
}

/// Wake the ESCs past their calibration window with ten minimum pulses at
/// 200 Hz (spec.md §4.4.1), then reload configuration from disk and signal
/// the attitude core to rebuild its PID filters from the new gains.
fn complete_arming<P: PwmDriver>(
    shared: &SharedState,
    config: &RwLock<Config>,
    config_path: &Path,
    pwm: &Mutex<P>,
) {
    {
        let mut pwm = pwm.lock();
        for _ in 0..WAKE_PULSE_COUNT {
            for channel in 1..=4u8 {
                pwm.send_pulse(channel, 0.0);
            }
            thread::sleep(WAKE_PULSE_PERIOD);
        }
    }

    match Config::load_or_create(config_path) {
        Ok(reloaded) => *config.write() = reloaded,
        Err(err) => tracing::warn!(%err, "failed to reload configuration on arming, keeping previous gains"),
    }
    shared.setpoint().request_filter_reload();
    shared.setpoint().set_mode(CoreMode::Attitude);
    tracing::info!("armed");
}

/// Translate the pilot's requested [`FlightMode`] into [`crate::state::CoreSetpoint`]
/// fields (spec.md §4.4 step 4). Only `UserAttitude` and `EmergencyLand`
/// are implemented; every other mode is accepted but left a no-op.
pub fn translate(shared: &SharedState, config: &Config) {
    match shared.user().flight_mode() {
        FlightMode::UserAttitude => {
            shared.setpoint().set_mode(CoreMode::Attitude);
            shared.setpoint().set_throttle((shared.user().throttle_stick() + 1.0) / 2.0);
            shared.setpoint().set_roll(shared.user().roll_stick() * config.max_roll_setpoint);
            shared.setpoint().set_pitch(shared.user().pitch_stick() * config.max_pitch_setpoint);
            shared.setpoint().set_yaw_rate(shared.user().yaw_stick() * config.max_yaw_rate);
        }
        FlightMode::EmergencyLand => {
            shared.setpoint().set_mode(CoreMode::Attitude);
            shared.setpoint().set_throttle(EMERGENCY_LAND_THR);
            shared.setpoint().set_roll(0.0);
            shared.setpoint().set_pitch(0.0);
            shared.setpoint().set_yaw_rate(0.0);
        }
        FlightMode::EmergencyKill
        | FlightMode::UserLoiter
        | FlightMode::UserPositionCartesian
        | FlightMode::UserPositionRadial
        | FlightMode::TargetHold => {
            // Reserved: accepted from the radio watcher, no setpoint effect.
        }
    }
}

/// Runs the supervisor until `lifecycle` signals exit, at ~100 Hz.
pub fn run<P: PwmDriver>(
    shared: SharedState,
    lifecycle: Lifecycle,
    config: Arc<RwLock<Config>>,
    config_path: PathBuf,
    pwm: Arc<Mutex<P>>,
) {
    let mut previous_flight_mode = shared.user().flight_mode();

    while !lifecycle.is_exiting() {
        let flight_mode = shared.user().flight_mode();
        if flight_mode != previous_flight_mode {
            tracing::info!(?flight_mode, "flight mode changed");
        }

        if flight_mode == FlightMode::EmergencyKill || shared.user().kill_switch() {
            shared.setpoint().disarm();
        }

        if shared.setpoint().mode() == CoreMode::Disarmed {
            if wait_for_arming_sequence(&shared, &lifecycle) {
                complete_arming(&shared, &config, &config_path, &pwm);
            }
        } else {
            translate(&shared, &config.read());
        }

        previous_flight_mode = flight_mode;
        thread::sleep(SUPERVISOR_PERIOD);
    }
}
