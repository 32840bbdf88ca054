//! TOML configuration loader with defaults.
//!
//! Loads [`Config`] from a TOML file on disk. A missing file is not fatal:
//! the compiled-in default is used and persisted back to disk so the next
//! run (and the next arming) finds it. Reloaded on every successful arming
//! (§4.4.1) so edits made while disarmed take effect without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading/persisting error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read for a reason other than "not found".
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed as TOML.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The default config could not be serialized or written back to disk.
    #[error("failed to write default config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// PID gains and cascade scaling for one control axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Flight-core configuration: gains, limits, and telemetry destination.
///
/// Mirrors the gain set the original program keeps in `core_config_t`, plus
/// the ground-station address carried over from `options_t.ground_ip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Inner-loop roll-rate PID gains.
    pub roll_rate_gains: AxisGains,
    /// Inner-loop pitch-rate PID gains.
    pub pitch_rate_gains: AxisGains,
    /// Absolute-yaw PID gains.
    pub yaw_gains: AxisGains,

    /// Normalized throttle held at idle (motors spinning, no lift).
    pub idle_throttle: f32,
    /// Maximum commanded roll setpoint magnitude \[rad\].
    pub max_roll_setpoint: f32,
    /// Maximum commanded pitch setpoint magnitude \[rad\].
    pub max_pitch_setpoint: f32,
    /// Maximum commanded yaw rate \[rad/s\].
    pub max_yaw_rate: f32,

    /// Outer-to-inner cascade gain: roll angle error → roll-rate setpoint.
    pub roll_rate_per_rad: f32,
    /// Outer-to-inner cascade gain: pitch angle error → pitch-rate setpoint.
    pub pitch_rate_per_rad: f32,

    /// Ground station host:port for the telemetry UDP uplink.
    pub ground_station_ip: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roll_rate_gains: AxisGains {
                kp: 1.0,
                ki: 0.0,
                kd: 0.0,
            },
            pitch_rate_gains: AxisGains {
                kp: 1.0,
                ki: 0.0,
                kd: 0.0,
            },
            yaw_gains: AxisGains {
                kp: 1.0,
                ki: 0.0,
                kd: 0.0,
            },
            idle_throttle: 0.1,
            max_roll_setpoint: 0.4,
            max_pitch_setpoint: 0.4,
            max_yaw_rate: 2.0,
            roll_rate_per_rad: 4.0,
            pitch_rate_per_rad: 4.0,
            ground_station_ip: "192.168.1.255:14550".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// If the file does not exist, the default configuration is used and
    /// written to `path` so future runs (and the next arming) find it.
    /// Any other I/O or parse failure is returned as an error.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no configuration file found, using defaults");
                let config = Config::default();
                config.persist(path)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Serialize and write this configuration to `path`.
    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).expect("Config always serializes");
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
