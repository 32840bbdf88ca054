//! The safety watchdog (spec.md §4.5): tip-over detection, polled at
//! ~20 Hz. The only extension point spec.md names (battery under-voltage)
//! is left unimplemented — `CoreState::battery_voltage` is already read by
//! the printer and logger, but nothing populates it from real hardware
//! (the battery ADC is one of the out-of-scope collaborators in §1) — and
//! is carried here only as a reserved, never-set [`SafetyFault`] bit.

use std::thread;
use std::time::Duration;

use bitflags::bitflags;

use crate::control::constants::TIP_THRESHOLD;
use crate::lifecycle::Lifecycle;
use crate::state::{CoreMode, SharedState};

const POLL_PERIOD: Duration = Duration::from_millis(50);

bitflags! {
    /// Safety conditions the watchdog checks, mirroring the teacher's
    /// per-domain error-flag types (`PowerError`, `MotionError`, ...):
    /// every set bit here forces a disarm, there is no "warn only" flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SafetyFault: u8 {
        /// `|measured.roll| > TIP_THRESHOLD`.
        const TIP_ROLL = 0x01;
        /// `|measured.pitch| > TIP_THRESHOLD`.
        const TIP_PITCH = 0x02;
        /// Reserved extension point (spec.md §4.5); no writer ever sets
        /// this bit in this crate, since the battery ADC is out of scope.
        const BATTERY_LOW = 0x04;
    }
}

impl Default for SafetyFault {
    fn default() -> Self {
        Self::empty()
    }
}

/// Evaluate the tip-over condition against `shared.measured()`. Pure so
/// the fault logic is testable without a thread or a sleep.
fn detect(shared: &SharedState) -> SafetyFault {
    let mut faults = SafetyFault::empty();
    if shared.measured().roll().abs() > TIP_THRESHOLD {
        faults |= SafetyFault::TIP_ROLL;
    }
    if shared.measured().pitch().abs() > TIP_THRESHOLD {
        faults |= SafetyFault::TIP_PITCH;
    }
    faults
}

/// Runs until `lifecycle` signals exit. Disarms immediately on tip-over,
/// matching the original's `safety_thread_func`.
pub fn run(shared: SharedState, lifecycle: Lifecycle) {
    while !lifecycle.is_exiting() {
        if shared.setpoint().mode() != CoreMode::Disarmed {
            let faults = detect(&shared);
            if !faults.is_empty() {
                tracing::warn!(?faults, "tip-over detected, disarming");
                shared.setpoint().disarm();
            }
        }
        thread::sleep(POLL_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_flight_is_untouched() {
        let shared = SharedState::new();
        shared.setpoint().set_mode(CoreMode::Attitude);
        shared.measured().set_roll(0.1);
        shared.measured().set_pitch(-0.1);

        assert!(detect(&shared).is_empty());
        assert_eq!(shared.setpoint().mode(), CoreMode::Attitude);
    }

    #[test]
    fn tip_over_disarms() {
        let shared = SharedState::new();
        shared.setpoint().set_mode(CoreMode::Attitude);
        shared.measured().set_roll(1.6);

        let faults = detect(&shared);
        assert!(faults.contains(SafetyFault::TIP_ROLL));
        assert!(!faults.contains(SafetyFault::TIP_PITCH));
        if !faults.is_empty() {
            shared.setpoint().disarm();
        }
        assert_eq!(shared.setpoint().mode(), CoreMode::Disarmed);
    }

    #[test]
    fn pitch_tip_over_is_detected_independently() {
        let shared = SharedState::new();
        shared.measured().set_pitch(-2.0);
        assert_eq!(detect(&shared), SafetyFault::TIP_PITCH);
    }

    #[test]
    fn disarmed_is_never_reevaluated() {
        let shared = SharedState::new();
        shared.measured().set_roll(3.0);
        assert_eq!(shared.setpoint().mode(), CoreMode::Disarmed);
    }
}
