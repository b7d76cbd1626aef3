pub mod cue_synchronizer;

pub use cue_synchronizer::{CueClip, CuePlayback, CueSynchronizer};
