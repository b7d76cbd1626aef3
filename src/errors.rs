/// # Sliding Door Errors
/// This module defines the `DoorError` enum, which encapsulates the errors that can surface while setting up or driving a sliding door.
/// Guard rejections and no-op requests are not errors; they are reported through `DoorEvent`s instead.
/// Only initialisation (configuration, rig wiring, scenario loading) and the surrounding plumbing can fail.


use thiserror::Error;
use std::io;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Error, Debug)]
pub enum DoorError {
    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The host rig could not provide the leaf transforms needed for the closed-pose snapshot.
    #[error("Missing leaf transform: {0}")]
    MissingLeafTransform(String),

    /// A duration that must be strictly positive was zero, negative or not finite.
    #[error("Invalid duration: {0}")]
    InvalidDuration(f32),

    /// Represents errors while loading or parsing a simulation scenario.
    #[error("Scenario error: {0}")]
    ScenarioError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents errors that occur during serialization or deserialization of data.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Represents errors when sending data over a channel.
    #[error("Channel send error: {0}")]
    ChannelSendError(String),
}

impl<T> From<TrySendError<T>> for DoorError {
    fn from(err: TrySendError<T>) -> Self {
        DoorError::ChannelSendError(err.to_string())
    }
}

impl From<config::ConfigError> for DoorError {
    fn from(err: config::ConfigError) -> Self {
        DoorError::ConfigError(err.to_string())
    }
}

pub type DoorResult<T> = Result<T, DoorError>;
