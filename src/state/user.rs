//! The radio-watcher-owned `UserInterface` record.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use super::setpoint::{load_f32, store_f32, FlightMode};

/// Decoded stick positions and the pilot's requested flight mode, written
/// only by the radio watcher (§5).
#[derive(Debug, Default)]
pub struct UserInterface {
    flight_mode: AtomicU8,
    throttle_stick: AtomicU32,
    yaw_stick: AtomicU32,
    roll_stick: AtomicU32,
    pitch_stick: AtomicU32,
    kill_switch: AtomicBool,
}

impl UserInterface {
    pub fn flight_mode(&self) -> FlightMode {
        FlightMode::from_u8(self.flight_mode.load(Ordering::SeqCst))
    }

    pub fn set_flight_mode(&self, mode: FlightMode) {
        self.flight_mode.store(mode as u8, Ordering::SeqCst);
    }

    pub fn throttle_stick(&self) -> f32 {
        load_f32(&self.throttle_stick)
    }

    pub fn set_throttle_stick(&self, value: f32) {
        store_f32(&self.throttle_stick, value);
    }

    pub fn yaw_stick(&self) -> f32 {
        load_f32(&self.yaw_stick)
    }

    pub fn set_yaw_stick(&self, value: f32) {
        store_f32(&self.yaw_stick, value);
    }

    pub fn roll_stick(&self) -> f32 {
        load_f32(&self.roll_stick)
    }

    pub fn set_roll_stick(&self, value: f32) {
        store_f32(&self.roll_stick, value);
    }

    pub fn pitch_stick(&self) -> f32 {
        load_f32(&self.pitch_stick)
    }

    pub fn set_pitch_stick(&self, value: f32) {
        store_f32(&self.pitch_stick, value);
    }

    /// `false` = armed, `true` = force disarm (spec.md §3: non-zero forces
    /// disarm; modeled as a bool since no third state exists).
    pub fn kill_switch(&self) -> bool {
        self.kill_switch.load(Ordering::SeqCst)
    }

    pub fn set_kill_switch(&self, engaged: bool) {
        self.kill_switch.store(engaged, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_emergency_kill_and_unarmed_sticks() {
        let ui = UserInterface::default();
        assert_eq!(ui.flight_mode(), FlightMode::EmergencyKill);
        assert!(!ui.kill_switch());
        assert_eq!(ui.throttle_stick(), 0.0);
    }

    #[test]
    fn stick_values_round_trip() {
        let ui = UserInterface::default();
        ui.set_roll_stick(0.5);
        ui.set_pitch_stick(-0.25);
        ui.set_kill_switch(true);
        assert_eq!(ui.roll_stick(), 0.5);
        assert_eq!(ui.pitch_stick(), -0.25);
        assert!(ui.kill_switch());
    }
}
