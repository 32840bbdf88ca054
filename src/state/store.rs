//! Bundles the three shared records behind one cloneable handle.

use std::sync::Arc;

use super::measured::CoreState;
use super::setpoint::CoreSetpoint;
use super::user::UserInterface;

/// The shared-state store: three independent records, each with its own
/// writer discipline (§4.2). Cloning a `SharedState` clones the `Arc`, not
/// the records — every clone refers to the same three records, so handing
/// one to each thread is how the bulletin board is actually shared.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    setpoint: Arc<CoreSetpoint>,
    measured: Arc<CoreState>,
    user: Arc<UserInterface>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setpoint(&self) -> &CoreSetpoint {
        &self.setpoint
    }

    pub fn measured(&self) -> &CoreState {
        &self.measured
    }

    pub fn user(&self) -> &UserInterface {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CoreMode;

    #[test]
    fn clones_share_the_same_records() {
        let a = SharedState::new();
        let b = a.clone();

        a.setpoint().set_mode(CoreMode::Attitude);
        assert_eq!(b.setpoint().mode(), CoreMode::Attitude);
    }
}
