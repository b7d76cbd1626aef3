//! # Audio Cue Synchronisation

//! Maps the leaves' open fraction to a playback offset and rate for the open/close cue so that
//! a transition reversed mid-flight picks the sound up where the leaves are, rather than
//! restarting the clip from zero.

use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::errors::{DoorError, DoorResult};
use crate::models::Direction;

/// Which clip a playback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CueClip {
    Open,
    Close,
}

/// Where and how fast a cue should start playing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuePlayback {
    pub clip: CueClip,
    /// Seconds into the clip.
    pub offset: f32,
    /// `1.0` for forward playback, `-1.0` for reverse.
    pub rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueSynchronizer {
    clip_length: f32,
    play_close_reversed: bool,
}

impl CueSynchronizer {
    pub fn new(clip_length: f32, play_close_reversed: bool) -> DoorResult<Self> {
        if !clip_length.is_finite() || clip_length <= 0.0 {
            return Err(DoorError::ConfigError(format!(
                "cue clip length must be positive, got {}",
                clip_length
            )));
        }
        Ok(Self { clip_length, play_close_reversed })
    }

    pub fn clip_length(&self) -> f32 {
        self.clip_length
    }

    pub fn plays_close_reversed(&self) -> bool {
        self.play_close_reversed
    }

    /// Computes the playback for a transition in `direction` whose leaves currently sit at
    /// `open_fraction` along the closed→open axis.
    ///
    /// * Opening: `clip_length × f`, forward
    /// * Closing: `clip_length × (1 − f)`, forward
    /// * Closing with reversed playback: `clip_length × f`, backwards, so the clip runs down to 0 as the door shuts
    pub fn playback(&self, direction: Direction, open_fraction: f32) -> CuePlayback {
        let f = open_fraction.clamp(0.0, 1.0);
        let (clip, position, rate) = match direction {
            Direction::Opening => (CueClip::Open, f, 1.0),
            Direction::Closing if self.play_close_reversed => (CueClip::Close, f, -1.0),
            Direction::Closing => (CueClip::Close, 1.0 - f, 1.0),
        };
        CuePlayback {
            clip,
            offset: (self.clip_length * position).clamp(0.0, self.clip_length),
            rate,
        }
    }
}
