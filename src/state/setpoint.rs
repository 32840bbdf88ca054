//! `FlightMode`, `CoreMode`, and the supervisor-owned `CoreSetpoint` record.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// What the pilot wants the vehicle to do.
///
/// Only [`FlightMode::EmergencyKill`], [`FlightMode::EmergencyLand`], and
/// [`FlightMode::UserAttitude`] are fully implemented; the remaining
/// variants are accepted from the radio watcher but translate to a no-op
/// in the supervisor (§4.4).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    EmergencyKill = 0,
    EmergencyLand = 1,
    UserAttitude = 2,
    UserLoiter = 3,
    UserPositionCartesian = 4,
    UserPositionRadial = 5,
    TargetHold = 6,
}

impl FlightMode {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => FlightMode::EmergencyKill,
            1 => FlightMode::EmergencyLand,
            2 => FlightMode::UserAttitude,
            3 => FlightMode::UserLoiter,
            4 => FlightMode::UserPositionCartesian,
            5 => FlightMode::UserPositionRadial,
            _ => FlightMode::TargetHold,
        }
    }
}

impl Default for FlightMode {
    fn default() -> Self {
        FlightMode::EmergencyKill
    }
}

/// What the attitude core is actually doing.
///
/// Initial and terminal state is always [`CoreMode::Disarmed`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreMode {
    Disarmed = 0,
    Attitude = 1,
    Position = 2,
}

impl CoreMode {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => CoreMode::Attitude,
            2 => CoreMode::Position,
            _ => CoreMode::Disarmed,
        }
    }
}

impl Default for CoreMode {
    fn default() -> Self {
        CoreMode::Disarmed
    }
}

/// The supervisor's command to the attitude core.
///
/// Single-writer per field with one documented exception: any component may
/// force `mode = Disarmed` (supervisor, safety watchdog, radio watcher,
/// pause-button handler — §4.2), and the attitude core itself writes `yaw`
/// while flying in `Attitude` mode (§4.3 step 3: `setpoint.yaw += DT *
/// setpoint.yaw_rate`) and resets it to zero on disarm. Every field is a
/// plain atomic rather than a lock: the design tolerates up to one cycle of
/// per-field staleness and `mode` is the only field that must be
/// immediately (`SeqCst`) visible.
#[derive(Debug, Default)]
pub struct CoreSetpoint {
    mode: AtomicU8,
    throttle: AtomicU32,
    roll: AtomicU32,
    pitch: AtomicU32,
    yaw: AtomicU32,
    yaw_rate: AtomicU32,
    altitude: AtomicU32,
    position_x: AtomicU32,
    position_y: AtomicU32,
    reload_filters: AtomicBool,
}

impl CoreSetpoint {
    pub fn mode(&self) -> CoreMode {
        CoreMode::from_u8(self.mode.load(Ordering::SeqCst))
    }

    /// Force the core into `Disarmed`. Callable by any writer role.
    pub fn disarm(&self) {
        self.mode.store(CoreMode::Disarmed as u8, Ordering::SeqCst);
    }

    /// Supervisor-only: set the core mode (arming or mode-switch).
    pub fn set_mode(&self, mode: CoreMode) {
        self.mode.store(mode as u8, Ordering::SeqCst);
    }

    pub fn throttle(&self) -> f32 {
        load_f32(&self.throttle)
    }

    pub fn set_throttle(&self, value: f32) {
        store_f32(&self.throttle, value);
    }

    pub fn roll(&self) -> f32 {
        load_f32(&self.roll)
    }

    pub fn set_roll(&self, value: f32) {
        store_f32(&self.roll, value);
    }

    pub fn pitch(&self) -> f32 {
        load_f32(&self.pitch)
    }

    pub fn set_pitch(&self, value: f32) {
        store_f32(&self.pitch, value);
    }

    pub fn yaw(&self) -> f32 {
        load_f32(&self.yaw)
    }

    /// Written by the supervisor on mode switch and by the attitude core
    /// while integrating stick yaw-rate during flight (§4.3).
    pub fn set_yaw(&self, value: f32) {
        store_f32(&self.yaw, value);
    }

    pub fn yaw_rate(&self) -> f32 {
        load_f32(&self.yaw_rate)
    }

    pub fn set_yaw_rate(&self, value: f32) {
        store_f32(&self.yaw_rate, value);
    }

    pub fn altitude(&self) -> f32 {
        load_f32(&self.altitude)
    }

    pub fn set_altitude(&self, value: f32) {
        store_f32(&self.altitude, value);
    }

    pub fn position_x(&self) -> f32 {
        load_f32(&self.position_x)
    }

    pub fn set_position_x(&self, value: f32) {
        store_f32(&self.position_x, value);
    }

    pub fn position_y(&self) -> f32 {
        load_f32(&self.position_y)
    }

    pub fn set_position_y(&self, value: f32) {
        store_f32(&self.position_y, value);
    }

    /// Supervisor-only: request that the attitude core rebuild its PID
    /// filters from freshly reloaded gains (§4.4.1, on successful arming).
    /// One-shot, analogous to [`crate::hal::sim::SimReceiver`]'s
    /// `is_new_frame` flag: the core consumes and clears it itself, so no
    /// lock is needed even though two different threads touch the bit.
    pub fn request_filter_reload(&self) {
        self.reload_filters.store(true, Ordering::SeqCst);
    }

    /// Attitude-core-only: consume the pending reload request, if any.
    pub fn take_filter_reload_request(&self) -> bool {
        self.reload_filters.swap(false, Ordering::SeqCst)
    }
}

pub(crate) fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

pub(crate) fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_disarmed() {
        let setpoint = CoreSetpoint::default();
        assert_eq!(setpoint.mode(), CoreMode::Disarmed);
    }

    #[test]
    fn disarm_overrides_any_writer() {
        let setpoint = CoreSetpoint::default();
        setpoint.set_mode(CoreMode::Attitude);
        assert_eq!(setpoint.mode(), CoreMode::Attitude);
        setpoint.disarm();
        assert_eq!(setpoint.mode(), CoreMode::Disarmed);
    }

    #[test]
    fn scalar_fields_round_trip() {
        let setpoint = CoreSetpoint::default();
        setpoint.set_roll(0.1);
        setpoint.set_pitch(-0.2);
        setpoint.set_yaw(1.5707);
        assert_eq!(setpoint.roll(), 0.1);
        assert_eq!(setpoint.pitch(), -0.2);
        assert_eq!(setpoint.yaw(), 1.5707);
    }
}
