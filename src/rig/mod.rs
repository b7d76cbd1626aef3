//! # Door Rig

//! The rig is the host side of a sliding door: the two leaf transforms and the audio source that
//! plays the open/close cue. The controller never touches scene objects directly; it reads the
//! closed-pose snapshot from the rig once at start-up and pushes poses and cue playbacks back.

use tracing::{debug, info};
use crate::audio::CuePlayback;
use crate::models::LeafPose;

/// How a pose reached the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseMotion {
    /// An intermediate or final frame of an animated transition.
    Animated,
    /// A direct placement with no animation (start-up and forced clear).
    Snapped,
}

/// Host-side leaf transforms and cue audio.
pub trait DoorRig {
    /// Current local positions of both leaves, or `None` if a leaf transform is not wired up.
    fn current_pose(&self) -> Option<LeafPose>;

    fn apply_pose(&mut self, pose: LeafPose, motion: PoseMotion);

    fn play_cue(&mut self, playback: CuePlayback);

    fn stop_cue(&mut self);
}

/// A rig that stores everything it is told, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingRig {
    pose: Option<LeafPose>,
    /// Every pose applied, in order.
    pub frames: Vec<(LeafPose, PoseMotion)>,
    /// Every cue started, in order.
    pub cues: Vec<CuePlayback>,
    /// Number of `stop_cue` calls.
    pub cue_stops: usize,
}

impl RecordingRig {
    pub fn new(closed: LeafPose) -> Self {
        Self { pose: Some(closed), ..Self::default() }
    }

    /// A rig with no leaf transforms, which a controller must refuse.
    pub fn without_leaves() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Option<LeafPose> {
        self.pose
    }

    pub fn animated_frames(&self) -> usize {
        self.frames.iter().filter(|(_, motion)| *motion == PoseMotion::Animated).count()
    }

    pub fn last_cue(&self) -> Option<CuePlayback> {
        self.cues.last().copied()
    }

    pub fn clear_history(&mut self) {
        self.frames.clear();
        self.cues.clear();
        self.cue_stops = 0;
    }
}

impl DoorRig for RecordingRig {
    fn current_pose(&self) -> Option<LeafPose> {
        self.pose
    }

    fn apply_pose(&mut self, pose: LeafPose, motion: PoseMotion) {
        self.pose = Some(pose);
        self.frames.push((pose, motion));
    }

    fn play_cue(&mut self, playback: CuePlayback) {
        self.cues.push(playback);
    }

    fn stop_cue(&mut self) {
        self.cue_stops += 1;
    }
}

/// A rig that only logs, used by the demo binary.
#[derive(Debug, Clone)]
pub struct TracingRig {
    pose: LeafPose,
}

impl TracingRig {
    pub fn new(closed: LeafPose) -> Self {
        Self { pose: closed }
    }
}

impl DoorRig for TracingRig {
    fn current_pose(&self) -> Option<LeafPose> {
        Some(self.pose)
    }

    fn apply_pose(&mut self, pose: LeafPose, motion: PoseMotion) {
        self.pose = pose;
        debug!(
            "Leaves {:?}: left=({:.3}, {:.3}, {:.3}) right=({:.3}, {:.3}, {:.3})",
            motion, pose.left.x, pose.left.y, pose.left.z, pose.right.x, pose.right.y, pose.right.z
        );
    }

    fn play_cue(&mut self, playback: CuePlayback) {
        info!("Cue {} playing from {:.3}s at rate {}", playback.clip, playback.offset, playback.rate);
    }

    fn stop_cue(&mut self) {
        debug!("Cue stopped");
    }
}
