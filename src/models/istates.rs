//! # Sliding Door State Enums

//! This module defines the enums describing where a sliding door is in its open/close cycle and how it decides to open.
//! They are plain tagged enums so they can be matched exhaustively, logged and read from configuration.

use serde::{Deserialize, Serialize};
use derive_more::{Display, FromStr};

/// Represents the four phases of the door cycle.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Serialize, Deserialize, Display, FromStr)]
pub enum DoorState {
    /// Both leaves rest at the closed pose.
    #[default]
    Closed,
    /// The leaves are moving towards the open pose.
    Opening,
    /// Both leaves rest at the open pose.
    Open,
    /// The leaves are moving towards the closed pose.
    Closing,
}

impl DoorState {
    /// Whether an animation is in flight.
    pub fn is_moving(self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }

    /// The direction of travel, if the door is moving.
    pub fn direction(self) -> Option<Direction> {
        match self {
            DoorState::Opening => Some(Direction::Opening),
            DoorState::Closing => Some(Direction::Closing),
            DoorState::Open | DoorState::Closed => None,
        }
    }
}

/// Selects which requests may open a closed door.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Manual and sensor requests may both open the door.
    #[default]
    Normal,
    /// Only occupancy-driven requests open the door.
    ProximitySensor,
}

/// Direction of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Display)]
pub enum Direction {
    Opening,
    Closing,
}

impl Direction {
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Opening => Direction::Closing,
            Direction::Closing => Direction::Opening,
        }
    }

    /// The moving state for this direction.
    pub fn moving_state(self) -> DoorState {
        match self {
            Direction::Opening => DoorState::Opening,
            Direction::Closing => DoorState::Closing,
        }
    }

    /// The state committed once the transition completes.
    pub fn terminal_state(self) -> DoorState {
        match self {
            Direction::Opening => DoorState::Open,
            Direction::Closing => DoorState::Closed,
        }
    }
}
