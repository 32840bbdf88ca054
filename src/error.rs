//! Error module root.
//!
//! Per the error taxonomy: init failures abort startup with a non-zero exit
//! code; everything encountered once the process is running (missing
//! config, tip-over, loss-of-signal, per-cycle sensor misses, log overflow)
//! is recoverable and is handled in place rather than propagated as an
//! `Err`. Nothing inside the attitude core's hot path returns a `Result`.

use thiserror::Error;

/// Fatal startup error. Returned from `main` and mapped to a non-zero exit
/// code; never produced once the control loop has started.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The IMU failed to initialize (bad orientation matrix, bus error, ...).
    #[error("IMU initialization failed: {0}")]
    ImuInit(String),

    /// The PWM driver failed to initialize.
    #[error("PWM driver initialization failed: {0}")]
    PwmInit(String),

    /// The radio receiver failed to initialize.
    #[error("receiver initialization failed: {0}")]
    ReceiverInit(String),

    /// Configuration could not be loaded or persisted.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The real-time setup sequence (page locking, affinity, scheduler)
    /// failed.
    #[error(transparent)]
    RtSetup(#[from] crate::rt::RtSetupError),

    /// Command-line arguments were invalid.
    #[error("argument error: {0}")]
    Args(String),
}
