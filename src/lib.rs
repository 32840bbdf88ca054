//! # flight_core
//!
//! Attitude control core and flight-mode supervisor for an X-configuration
//! quadrotor. A single interrupt-rate task (the "core") fuses inertial data,
//! advances three cascaded feedback controllers, mixes their outputs, and
//! commands four ESCs within one 5 ms period. A handful of cooperatively
//! scheduled tasks (the "stack") govern arming, disarming, mode switching,
//! and emergency landing around it.
//!
//! ## Architecture
//!
//! 1. **state** — the shared, cross-thread state model (setpoint, measured
//!    state, user inputs) plus the discrete PID filter.
//! 2. **control** — the attitude core control loop.
//! 3. **command** — the flight-mode supervisor and arming sequence.
//! 4. **safety** — the tip-over watchdog.
//! 5. **radio** — the receiver decoder and loss-of-signal ladder.
//! 6. **hal** — trait boundaries to the IMU, PWM, receiver, LEDs, and pause
//!    button, plus in-memory fakes for tests and benches.
//! 7. **lifecycle**, **led**, **telemetry**, **logging** — the ambient
//!    process-wide plumbing: run/exit signal, armed indicator, UDP uplink,
//!    and the bounded log queue.

pub mod cli;
pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod hal;
pub mod led;
pub mod lifecycle;
pub mod logging;
pub mod radio;
pub mod rt;
pub mod safety;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::CoreError;
pub use state::{CoreMode, FlightMode, SharedState};
