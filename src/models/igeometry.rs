//! # Leaf Geometry

//! This module defines the small geometric vocabulary shared by the animator and the host rig:
//! `Vec3` for local-space positions and offsets, `LeafPose` for the pair of door leaves, and
//! `EntityId` for occupants reported by a proximity sensor.

use derive_more::{Add, Display, From, Mul, Sub};
use serde::{Deserialize, Serialize};

/// A three component vector in the door's local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Add, Sub, Mul)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation from `self` to `target`; `t` is not clamped.
    pub fn lerp(self, target: Vec3, t: f32) -> Vec3 {
        self + (target - self) * t
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let d = other - self;
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }
}

/// Positions of the left and right leaves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeafPose {
    pub left: Vec3,
    pub right: Vec3,
}

impl LeafPose {
    pub const fn new(left: Vec3, right: Vec3) -> Self {
        Self { left, right }
    }

    /// Offsets both leaves by their own vectors.
    pub fn offset_by(self, left: Vec3, right: Vec3) -> LeafPose {
        LeafPose {
            left: self.left + left,
            right: self.right + right,
        }
    }

    /// Interpolates both leaves with the same parameter so they stay in step.
    pub fn lerp(self, target: LeafPose, t: f32) -> LeafPose {
        LeafPose {
            left: self.left.lerp(target.left, t),
            right: self.right.lerp(target.right, t),
        }
    }

    /// The larger of the two per-leaf distances.
    pub fn max_distance(self, other: LeafPose) -> f32 {
        self.left.distance(other.left).max(self.right.distance(other.right))
    }
}

/// Identity of an occupant as reported by a sensor adapter. Only used to pair enters with exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[display("entity#{_0}")]
pub struct EntityId(pub u64);
