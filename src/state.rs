//! The shared, cross-thread state model (spec.md §3–§5): three records —
//! [`CoreSetpoint`] (supervisor-owned), [`CoreState`] (attitude-core-owned),
//! [`UserInterface`] (radio-watcher-owned) — accessed under a single-writer
//! discipline enforced by the accessor API rather than a lock.

mod measured;
mod setpoint;
mod store;
mod user;

pub use measured::CoreState;
pub use setpoint::{CoreMode, CoreSetpoint, FlightMode};
pub use store::SharedState;
pub use user::UserInterface;
