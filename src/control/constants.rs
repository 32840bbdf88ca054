//! Fixed control-loop constants carried verbatim from the original program
//! (spec.md §4.3–§4.4; exact values from
//! `original_source/examples/fly/fly.c`). These are not configuration —
//! they describe the shape of the control law itself, not a tunable gain.

/// Control period: 200 Hz.
pub const DT: f32 = 0.005;

/// Stick-rate yaw integration is only active above this throttle.
pub const YAW_CUTOFF_TH: f32 = 0.1;

/// Maximum normalized thrust the throttle channel can command.
pub const MAX_THRUST: f32 = 0.8;

/// Saturation window applied to roll/pitch/yaw while landed
/// (`setpoint.throttle < 0.1`). Deliberately tighter than the mid-air
/// window; see DESIGN.md for the preserved-as-is disagreement with
/// `INT_CUTOFF_TH` noted in spec.md §9.
pub const LAND_SATURATION: f32 = 0.05;

/// Mid-air saturation window for the roll and pitch channels.
pub const MAX_ROLL_COMPONENT: f32 = 0.2;

/// Mid-air saturation window for the yaw channel.
pub const MAX_YAW_COMPONENT: f32 = 0.21;

/// Error integrators update only while `u[0]` (throttle channel output)
/// exceeds this — a coarse "airborne" proxy (spec.md §9).
pub const INT_CUTOFF_TH: f32 = 0.3;

/// Vehicle must be within this many radians of level, both to begin and to
/// remain inside, the arming sequence.
pub const ARM_TIP_THRESHOLD: f32 = 0.2;

/// Safety watchdog disarms if measured roll or pitch exceeds this.
pub const TIP_THRESHOLD: f32 = 1.5;

/// Fixed throttle commanded during `EmergencyLand`.
pub const EMERGENCY_LAND_THR: f32 = 0.15;

/// Seconds of silence before the radio watcher forces `EmergencyLand`.
pub const DSM2_LAND_TIMEOUT_S: f32 = 0.3;

/// Seconds of silence before the radio watcher forces `Disarmed`.
pub const DSM2_DISARM_TIMEOUT_S: f32 = 5.0;
