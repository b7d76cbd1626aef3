//! # Configuration Management

//! This module handles the configuration loading and management for the sliding door controller.
//! It leverages the `config` crate to provide a flexible and structured way to define and access configuration settings from various sources, including:

//! * YAML configuration files (default.yaml, development.yaml, production.yaml)
//! * Environment variables

//! The core of this module is the `Settings` struct, which encapsulates all the configuration settings required by the application.

use serde::{Deserialize, Serialize};
use config::{Config, Environment, File};
use std::env;
use std::path::PathBuf;
use log::debug;
use crate::animation::EasingCurve;
use crate::errors::{DoorError, DoorResult};
use crate::models::{LeafPose, OperationMode, Vec3};

/// Represents the complete set of configuration settings for the sliding door controller.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Behaviour of the door itself
    pub door: DoorSettings,
    /// Settings for application logging
    pub logging: LoggingSettings,
    /// Settings for the headless demo driver
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Configuration of one sliding door
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DoorSettings {
    /// Name used in logs and events
    pub name: String,
    /// How far the left leaf travels from its closed position when opening
    pub left_open_offset: Vec3,
    /// How far the right leaf travels from its closed position when opening
    pub right_open_offset: Vec3,
    /// Seconds a full open or close takes; must be positive
    pub transition_duration: f32,
    /// Which requests may open a closed door
    pub operation_mode: OperationMode,
    /// Whether the lock flag is honoured at all
    pub locking_enabled: bool,
    /// Initial value of the lock flag
    pub door_locked: bool,
    /// Play the close cue backwards instead of forwards
    pub play_close_cue_reversed: bool,
    /// Curve applied to the leaves' travel
    pub easing_curve: EasingCurve,
    /// Seconds to wait after the region empties before closing
    pub delayed_close_grace: f32,
    /// Length of the open/close cue clip in seconds
    pub cue_clip_length: f32,
    /// Seconds between occupancy re-queries; 0 disables reconciliation
    pub reconcile_interval: f32,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self {
            name: "sliding-door".to_string(),
            left_open_offset: Vec3::new(-1.0, 0.0, 0.0),
            right_open_offset: Vec3::new(1.0, 0.0, 0.0),
            transition_duration: 1.0,
            operation_mode: OperationMode::Normal,
            locking_enabled: false,
            door_locked: false,
            play_close_cue_reversed: false,
            easing_curve: EasingCurve::SmoothStep,
            delayed_close_grace: 0.3,
            cue_clip_length: 1.0,
            reconcile_interval: 0.0,
        }
    }
}

impl DoorSettings {
    /// Checks the values a controller cannot run with.
    ///
    /// # Returns
    ///
    /// * `Err(DoorError::InvalidDuration)` for a non-positive or non-finite transition duration
    /// * `Err(DoorError::ConfigError)` for any other unusable value
    pub fn validate(&self) -> DoorResult<()> {
        if !self.transition_duration.is_finite() || self.transition_duration <= 0.0 {
            return Err(DoorError::InvalidDuration(self.transition_duration));
        }
        if !self.delayed_close_grace.is_finite() || self.delayed_close_grace < 0.0 {
            return Err(DoorError::ConfigError(format!(
                "delayed_close_grace must be >= 0, got {}",
                self.delayed_close_grace
            )));
        }
        if !self.cue_clip_length.is_finite() || self.cue_clip_length <= 0.0 {
            return Err(DoorError::ConfigError(format!(
                "cue_clip_length must be > 0, got {}",
                self.cue_clip_length
            )));
        }
        if !self.reconcile_interval.is_finite() || self.reconcile_interval < 0.0 {
            return Err(DoorError::ConfigError(format!(
                "reconcile_interval must be >= 0, got {}",
                self.reconcile_interval
            )));
        }
        Ok(())
    }
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error")
    pub level: String,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}

/// Holds the configuration for the demo driver
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// JSON scenario to replay (optional; a built-in walk-through is used otherwise)
    pub scenario_path: Option<PathBuf>,
    /// Closed position of the left leaf in the simulated scene
    pub left_closed_position: Vec3,
    /// Closed position of the right leaf in the simulated scene
    pub right_closed_position: Vec3,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            scenario_path: None,
            left_closed_position: Vec3::new(-0.5, 0.0, 0.0),
            right_closed_position: Vec3::new(0.5, 0.0, 0.0),
        }
    }
}

impl SimulationSettings {
    pub fn closed_pose(&self) -> LeafPose {
        LeafPose::new(self.left_closed_position, self.right_closed_position)
    }
}


/// # Settings Initialization
///
/// The `Settings` implementation provides a `new` function to load and construct the configuration settings.
impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// This function reads configuration settings from the following sources, in order of precedence:
    ///
    /// 1. `default.yaml`: Contains default settings for the application
    /// 2. Environment-specific YAML file (e.g., `development.yaml` or `production.yaml`) based on the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g., `APP__DOOR__TRANSITION_DURATION`)
    ///
    /// The `CONFIG_DIR` environment variable can be used to specify the directory where the YAML configuration files are located (defaults to "src/config").
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)`: If the settings were loaded, constructed and validated successfully
    /// * `Err(DoorError)`: If there was an error during the loading or construction process
    pub fn new() -> Result<Self, DoorError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_config(s)
    }

    /// Deserializes and validates settings from an already built `Config`.
    pub fn from_config(s: Config) -> Result<Self, DoorError> {
        debug!("{:#?}", s);
        let mut s: Self = s.try_deserialize::<Settings>()
            .map_err(DoorError::from)?;

        if let Some(ref mut path) = s.logging.path {
            *path = env::current_dir()?.join(path.clone());
        }

        s.door.validate()?;
        Ok(s)
    }
}
