//! The attitude control core (spec.md §4.1, §4.3): the discrete PID filter
//! and the periodic control pipeline built from it.

pub mod constants;
mod core;
pub mod pid;

pub use core::{mix_x_configuration, AttitudeCore, CycleLog, ImuTrims};
pub use pid::DiscreteFilter;
