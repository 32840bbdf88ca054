//! The attitude-core-owned `CoreState` record: the subset of measured
//! state that other threads (supervisor, safety watchdog, telemetry,
//! printer) need to read.
//!
//! The PID filter instances, error integrators, pre-mix channel outputs
//! `u[0..3]`, spin counter, takeoff-yaw snapshot, and IMU trims named in
//! spec.md §3 are *not* here: §5 classifies them single-writer/single-reader
//! (the attitude core reads what it just wrote, one thread, one cycle) and
//! they live as plain fields on `control::core::AttitudeCore` instead, with
//! no synchronization at all.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::setpoint::{load_f32, store_f32};

/// Measured attitude, rates, ESC outputs, and battery voltage, written only
/// by the attitude core.
#[derive(Debug, Default)]
pub struct CoreState {
    loop_count: AtomicU64,
    roll: AtomicU32,
    pitch: AtomicU32,
    yaw: AtomicU32,
    d_roll: AtomicU32,
    d_pitch: AtomicU32,
    d_yaw: AtomicU32,
    battery_voltage: AtomicU32,
    esc_out: [AtomicU32; 4],
    altitude: AtomicU32,
    d_altitude: AtomicU32,
    position_x: AtomicU32,
    position_y: AtomicU32,
}

impl CoreState {
    pub fn loop_count(&self) -> u64 {
        self.loop_count.load(Ordering::Relaxed)
    }

    pub fn increment_loop_count(&self) {
        self.loop_count.fetch_add(1, Ordering::Relaxed);
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

    pub fn set_yaw(&self, value: f32) {
        store_f32(&self.yaw, value);
    }

    pub fn d_roll(&self) -> f32 {
        load_f32(&self.d_roll)
    }

    pub fn set_d_roll(&self, value: f32) {
        store_f32(&self.d_roll, value);
    }

    pub fn d_pitch(&self) -> f32 {
        load_f32(&self.d_pitch)
    }

    pub fn set_d_pitch(&self, value: f32) {
        store_f32(&self.d_pitch, value);
    }

    pub fn d_yaw(&self) -> f32 {
        load_f32(&self.d_yaw)
    }

    pub fn set_d_yaw(&self, value: f32) {
        store_f32(&self.d_yaw, value);
    }

    pub fn battery_voltage(&self) -> f32 {
        load_f32(&self.battery_voltage)
    }

    pub fn set_battery_voltage(&self, value: f32) {
        store_f32(&self.battery_voltage, value);
    }

    pub fn esc_out(&self) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (slot, cell) in out.iter_mut().zip(self.esc_out.iter()) {
            *slot = load_f32(cell);
        }
        out
    }

    pub fn set_esc_out(&self, values: [f32; 4]) {
        for (cell, value) in self.esc_out.iter().zip(values.iter()) {
            store_f32(cell, *value);
        }
    }

    pub fn altitude(&self) -> f32 {
        load_f32(&self.altitude)
    }

    pub fn set_altitude(&self, value: f32) {
        store_f32(&self.altitude, value);
    }

    pub fn d_altitude(&self) -> f32 {
        load_f32(&self.d_altitude)
    }

    pub fn set_d_altitude(&self, value: f32) {
        store_f32(&self.d_altitude, value);
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
}
