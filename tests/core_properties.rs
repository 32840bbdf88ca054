//! Property tests over the attitude core's invariants (spec.md §8):
//! ESC outputs always land in `[0,1]`, `Disarmed` zeroes everything, and
//! the integrator gate actually gates. Grounded in the teacher's
//! `evo_shared_memory` `proptest` dev-dependency, exercised here end to
//! end through the public `AttitudeCore` API rather than the internal
//! functions the teacher's own workspace happens to cover.

use proptest::prelude::*;

use flight_core::config::Config;
use flight_core::control::{mix_x_configuration, AttitudeCore, ImuTrims};
use flight_core::hal::sim::{SimImu, SimPwm};
use flight_core::hal::ImuSample;
use flight_core::state::{CoreMode, SharedState};

fn config_with_gains(kp: f32, ki: f32) -> Config {
    let mut config = Config::default();
    config.roll_rate_gains.kp = kp;
    config.roll_rate_gains.ki = ki;
    config.pitch_rate_gains.kp = kp;
    config.pitch_rate_gains.ki = ki;
    config.yaw_gains.kp = kp;
    config.yaw_gains.ki = ki;
    config
}

proptest! {
    /// For all setpoints and measured states, the attitude core produces
    /// `esc[i] in [0,1]` (spec.md §8).
    #[test]
    fn esc_outputs_always_in_unit_range(
        throttle in 0.0f32..=1.0,
        setpoint_roll in -0.4f32..=0.4,
        setpoint_pitch in -0.4f32..=0.4,
        measured_roll in -0.5f32..=0.5,
        measured_pitch in -0.5f32..=0.5,
        kp in 0.1f32..=8.0,
        ki in 0.0f32..=2.0,
    ) {
        let config = config_with_gains(kp, ki);
        let mut core = AttitudeCore::new(&config, ImuTrims::default());

        let shared = SharedState::new();
        shared.setpoint().set_mode(CoreMode::Attitude);
        shared.setpoint().set_throttle(throttle);
        shared.setpoint().set_roll(setpoint_roll);
        shared.setpoint().set_pitch(setpoint_pitch);

        let mut pwm = SimPwm::default();

        // The first cycle after a Disarmed->armed transition forces a
        // zero PWM pulse regardless of the mix (spec.md §4.3 step 9, to
        // avoid re-entering ESC calibration); run one throwaway cycle so
        // the assertion below exercises the steady-state mixer output.
        let mut imu = SimImu::with_samples(vec![ImuSample {
            roll: measured_roll,
            pitch: measured_pitch,
            ..Default::default()
        }]);
        core.run_cycle(&shared, &config, &mut imu, &mut pwm);

        let mut imu = SimImu::with_samples(vec![ImuSample {
            roll: measured_roll,
            pitch: measured_pitch,
            ..Default::default()
        }]);
        let log = core.run_cycle(&shared, &config, &mut imu, &mut pwm).unwrap();
        for esc in log.esc {
            prop_assert!((0.0..=1.0).contains(&esc), "esc out of range: {esc}");
        }
    }

    /// When `CoreMode::Disarmed`, `esc_out` is all zero and the yaw
    /// setpoint is reset, for any prior setpoint values (spec.md §8).
    #[test]
    fn disarmed_always_zeroes_esc_out(
        stale_roll in -0.4f32..=0.4,
        stale_pitch in -0.4f32..=0.4,
        stale_yaw in -3.0f32..=3.0,
    ) {
        let config = Config::default();
        let mut core = AttitudeCore::new(&config, ImuTrims::default());

        let shared = SharedState::new();
        shared.setpoint().set_roll(stale_roll);
        shared.setpoint().set_pitch(stale_pitch);
        shared.setpoint().set_yaw(stale_yaw);

        let mut imu = SimImu::with_samples(vec![ImuSample::default()]);
        let mut pwm = SimPwm::default();

        let log = core.run_cycle(&shared, &config, &mut imu, &mut pwm).unwrap();
        prop_assert_eq!(log.esc, [0.0; 4]);
        prop_assert_eq!(shared.setpoint().yaw(), 0.0);
        prop_assert_eq!(pwm.pulse_count, [0; 4]);
    }

    /// Headroom preservation (spec.md §8): after mixing, the largest
    /// channel is brought to at most 1.0 and every pairwise difference
    /// among `esc[i]` survives the uniform subtraction.
    #[test]
    fn headroom_step_preserves_differential_torque(
        u in prop::array::uniform4(-1.0f32..=1.0),
    ) {
        let raw = [
            u[0] - u[1] + u[2] - u[3],
            u[0] + u[1] - u[2] - u[3],
            u[0] + u[1] + u[2] + u[3],
            u[0] - u[1] - u[2] + u[3],
        ];
        let mixed = mix_x_configuration(u);

        let max_mixed = mixed.iter().cloned().fold(f32::MIN, f32::max);
        prop_assert!(max_mixed <= 1.0 + 1e-5);

        for i in 0..4 {
            for j in 0..4 {
                prop_assert!((((mixed[i] - mixed[j]) - (raw[i] - raw[j])).abs()) < 1e-4);
            }
        }
    }

    /// `setpoint.throttle <= INT_CUTOFF_TH` must never let the roll-rate
    /// integrator grow across repeated cycles (spec.md §8).
    #[test]
    fn low_throttle_never_grows_the_integrator(
        // Kept below INT_CUTOFF_TH once run through u[0]'s idle/MAX_THRUST
        // mapping with the default config (idle=0.1, MAX_THRUST=0.8), so
        // the airborne gate is reliably off for every sample drawn here.
        throttle in 0.0f32..=0.28,
        roll_error in -0.4f32..=0.4,
        ki in 0.1f32..=3.0,
    ) {
        let config = config_with_gains(1.0, ki);
        let mut core = AttitudeCore::new(&config, ImuTrims::default());

        let shared = SharedState::new();
        shared.setpoint().set_mode(CoreMode::Attitude);
        shared.setpoint().set_throttle(throttle);
        shared.setpoint().set_roll(roll_error);

        let mut pwm = SimPwm::default();
        let mut previous_u1 = None;
        for _ in 0..20 {
            let mut imu = SimImu::with_samples(vec![ImuSample::default()]);
            let log = core.run_cycle(&shared, &config, &mut imu, &mut pwm).unwrap();
            if let Some(prev) = previous_u1 {
                // u[1] is the PID's output; with the integrator gated off
                // it must track the (constant) proportional term exactly,
                // not drift cycle over cycle.
                prop_assert!((log.u[1] - prev).abs() < 1e-5);
            }
            previous_u1 = Some(log.u[1]);
        }
    }
}
