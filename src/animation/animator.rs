//! Timer-driven leaf animator.
//!
//! The animator owns the normalised progress of the current transition and the elapsed-time
//! accumulator behind it. Progress advances by `dt / duration` per tick. Positions are derived
//! from the *open fraction* (how far along the closed→open axis the leaves are in time), which
//! equals `progress` while opening and `1 − progress` while closing. Reversing a transition
//! re-derives progress as `1 − progress`, which leaves the open fraction, and therefore the leaf
//! positions, untouched at the instant of reversal.

use tracing::debug;
use crate::animation::EasingCurve;
use crate::errors::{DoorError, DoorResult};
use crate::models::{Direction, LeafPose, Vec3};

/// Progress this close to 1 is treated as complete.
pub const COMPLETION_EPSILON: f32 = 1e-6;

/// Result of advancing the animator by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorStep {
    /// No transition is running.
    Idle,
    /// The leaves moved to a new intermediate pose.
    Moved(LeafPose),
    /// The transition finished; the pose is exactly the target pose.
    Completed { direction: Direction, pose: LeafPose },
}

#[derive(Debug, Clone)]
pub struct DoorAnimator {
    duration: f32,
    easing: EasingCurve,
    closed: LeafPose,
    open: LeafPose,
    direction: Direction,
    progress: f32,
    elapsed: f32,
    running: bool,
}

impl DoorAnimator {
    /// Creates an animator resting at the closed pose.
    ///
    /// # Arguments
    ///
    /// * `duration`: Seconds a full transition takes; must be finite and strictly positive
    /// * `easing`: Curve applied to the open fraction
    /// * `closed`: Snapshot of the leaves' closed positions
    /// * `left_open_offset` / `right_open_offset`: How far each leaf travels when opening
    ///
    /// # Returns
    ///
    /// * `Err(DoorError::InvalidDuration)` if `duration` is not usable as a divisor
    pub fn new(
        duration: f32,
        easing: EasingCurve,
        closed: LeafPose,
        left_open_offset: Vec3,
        right_open_offset: Vec3,
    ) -> DoorResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DoorError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            easing,
            closed,
            open: closed.offset_by(left_open_offset, right_open_offset),
            direction: Direction::Closing,
            progress: 1.0,
            elapsed: duration,
            running: false,
        })
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn closed_pose(&self) -> LeafPose {
        self.closed
    }

    pub fn open_pose(&self) -> LeafPose {
        self.open
    }

    /// Progress along the closed→open axis, before easing.
    pub fn open_fraction(&self) -> f32 {
        Self::fraction_for(self.direction, self.progress)
    }

    /// Current leaf positions.
    pub fn pose(&self) -> LeafPose {
        self.pose_at(self.direction, self.progress)
    }

    /// Leaf positions for an arbitrary direction and progress. The extremes return the stored
    /// poses verbatim so completed transitions carry no interpolation error.
    pub fn pose_at(&self, direction: Direction, progress: f32) -> LeafPose {
        let fraction = Self::fraction_for(direction, progress.clamp(0.0, 1.0));
        if fraction <= 0.0 {
            self.closed
        } else if fraction >= 1.0 {
            self.open
        } else {
            self.closed.lerp(self.open, self.easing.apply(fraction))
        }
    }

    /// Starts a fresh transition from progress 0.
    pub fn start(&mut self, direction: Direction) {
        self.direction = direction;
        self.progress = 0.0;
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Reverses the running transition in place and returns the new direction.
    ///
    /// Progress becomes `1 − progress` and the elapsed time is rebuilt from it, so the next
    /// tick continues from the current leaf positions.
    pub fn reverse(&mut self) -> Direction {
        self.direction = self.direction.reversed();
        self.progress = (1.0 - self.progress).clamp(0.0, 1.0);
        self.elapsed = self.progress * self.duration;
        self.running = true;
        debug!("Animator reversed to {} at progress {:.4}", self.direction, self.progress);
        self.direction
    }

    /// Advances the running transition by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> AnimatorStep {
        if !self.running {
            return AnimatorStep::Idle;
        }
        self.elapsed += dt.max(0.0);
        self.progress = (self.elapsed / self.duration).min(1.0);

        if self.progress >= 1.0 - COMPLETION_EPSILON {
            self.progress = 1.0;
            self.elapsed = self.duration;
            self.running = false;
            return AnimatorStep::Completed { direction: self.direction, pose: self.pose() };
        }
        AnimatorStep::Moved(self.pose())
    }

    /// Stops any transition and rests at the closed pose.
    pub fn snap_closed(&mut self) -> LeafPose {
        self.direction = Direction::Closing;
        self.progress = 1.0;
        self.elapsed = self.duration;
        self.running = false;
        self.closed
    }

    fn fraction_for(direction: Direction, progress: f32) -> f32 {
        match direction {
            Direction::Opening => progress,
            Direction::Closing => 1.0 - progress,
        }
    }
}
