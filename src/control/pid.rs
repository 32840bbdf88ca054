//! The discrete PID filter (spec.md §4.1).
//!
//! A fixed-timestep realization of P + I + D with a first-order low-pass on
//! the derivative term and anti-windup by integrator freeze. The numerical
//! derivative is taken as `(e[n] - e[n-1]) / DT` and passed through a
//! one-pole filter at time constant `tau` before being scaled by `kd`
//! (otherwise a bare finite difference amplifies sensor noise).
//!
//! The attitude core hardcodes `DERIVATIVE_TAU` at every `generate` call
//! site — roll-rate, pitch-rate, and yaw all use the same cutoff.
pub const DERIVATIVE_TAU: f32 = 0.015;

/// One instance per controlled axis. `march`/`saturate` are called once per
/// control period; `zero`/`prefill` are called on arming transitions.
#[derive(Debug, Clone, Copy)]
pub struct DiscreteFilter {
    kp: f32,
    ki: f32,
    kd: f32,
    tau: f32,
    dt: f32,

    last_error: f32,
    integrator: f32,
    integrator_before_march: f32,
    filtered_derivative: f32,

    /// Output of the most recent `march`/`saturate` call.
    pub current_output: f32,
}

impl DiscreteFilter {
    /// Build a filter with cleared history (spec.md §4.1 `generate`).
    pub fn generate(kp: f32, ki: f32, kd: f32, tau: f32, dt: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            tau,
            dt,
            last_error: 0.0,
            integrator: 0.0,
            integrator_before_march: 0.0,
            filtered_derivative: 0.0,
            current_output: 0.0,
        }
    }

    /// Advance one timestep and store the new output in `current_output`.
    /// Equivalent to `march_gated(error, true)`.
    pub fn march(&mut self, error: f32) {
        self.march_gated(error, true);
    }

    /// Advance one timestep with the integrator update conditional on
    /// `integrate`. The proportional and derivative terms always advance;
    /// only the integrator is gated, matching spec.md §4.3's "integrators
    /// update only while `u[0] > INT_CUTOFF_TH`" — a narrower gate than
    /// freezing the whole filter.
    pub fn march_gated(&mut self, error: f32, integrate: bool) {
        let raw_derivative = (error - self.last_error) / self.dt;
        let alpha = self.dt / (self.tau + self.dt);
        self.filtered_derivative += alpha * (raw_derivative - self.filtered_derivative);

        self.integrator_before_march = self.integrator;
        if integrate {
            self.integrator += error * self.dt;
        }
        self.last_error = error;

        self.current_output =
            self.kp * error + self.ki * self.integrator + self.kd * self.filtered_derivative;
    }

    /// Clamp `current_output` to `[lo, hi]`. If the clamp was active,
    /// freezes the integrator at its pre-`march` value (anti-windup).
    pub fn saturate(&mut self, lo: f32, hi: f32) {
        if self.current_output > hi {
            self.current_output = hi;
            self.integrator = self.integrator_before_march;
        } else if self.current_output < lo {
            self.current_output = lo;
            self.integrator = self.integrator_before_march;
        }
    }

    /// Clear all history, including `current_output`.
    pub fn zero(&mut self) {
        self.last_error = 0.0;
        self.integrator = 0.0;
        self.integrator_before_march = 0.0;
        self.filtered_derivative = 0.0;
        self.current_output = 0.0;
    }

    /// Seed history from a steady-state error so the next `march` produces
    /// no derivative kick.
    pub fn prefill(&mut self, error: f32) {
        self.last_error = error;
        self.filtered_derivative = 0.0;
        self.current_output = self.kp * error + self.ki * self.integrator;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.005;

    #[test]
    fn pure_p_passes_error_through() {
        let mut filter = DiscreteFilter::generate(1.0, 0.0, 0.0, DERIVATIVE_TAU, DT);
        filter.march(0.4);
        assert!((filter.current_output - 0.4).abs() < 1e-6);
    }

    #[test]
    fn zeroed_filter_is_deterministic_across_instances() {
        let mut a = DiscreteFilter::generate(2.0, 0.5, 0.1, DERIVATIVE_TAU, DT);
        let mut b = DiscreteFilter::generate(2.0, 0.5, 0.1, DERIVATIVE_TAU, DT);
        a.march(0.2);
        b.march(0.2);
        assert_eq!(a.current_output, b.current_output);
        a.march(0.2);
        b.march(0.2);
        assert_eq!(a.current_output, b.current_output);
    }

    #[test]
    fn saturate_clamps_and_freezes_integrator() {
        let mut filter = DiscreteFilter::generate(1.0, 1.0, 0.0, DERIVATIVE_TAU, DT);
        filter.march(10.0);
        let integrator_after_march = filter.integrator;
        filter.saturate(-0.2, 0.2);
        assert_eq!(filter.current_output, 0.2);
        assert_ne!(filter.integrator, integrator_after_march);
        assert_eq!(filter.integrator, filter.integrator_before_march);
    }

    #[test]
    fn zero_clears_all_history() {
        let mut filter = DiscreteFilter::generate(1.0, 1.0, 1.0, DERIVATIVE_TAU, DT);
        filter.march(1.0);
        filter.march(1.0);
        filter.zero();
        assert_eq!(filter.current_output, 0.0);
        assert_eq!(filter.integrator, 0.0);
        assert_eq!(filter.filtered_derivative, 0.0);
    }

    #[test]
    fn gated_march_does_not_grow_the_integrator() {
        let mut filter = DiscreteFilter::generate(0.0, 1.0, 0.0, DERIVATIVE_TAU, DT);
        filter.march_gated(1.0, false);
        filter.march_gated(1.0, false);
        assert_eq!(filter.integrator, 0.0);
    }

    #[test]
    fn prefill_avoids_a_derivative_kick() {
        let mut filter = DiscreteFilter::generate(1.0, 0.0, 5.0, DERIVATIVE_TAU, DT);
        filter.prefill(0.3);
        filter.march(0.3);
        assert!((filter.filtered_derivative).abs() < 1e-6);
    }
}
