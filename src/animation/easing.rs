//! Easing curves applied to the open fraction before it positions the leaves.
//!
//! Every curve here is monotonic on `[0, 1]`, maps 0 to 0 and 1 to 1, and is point-symmetric
//! around the midpoint (`ease(1 - t) == 1 - ease(t)`), so a closing animation mirrors its opening one.

use std::f32::consts::PI;
use serde::{Deserialize, Serialize};
use derive_more::{Display, FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "snake_case")]
pub enum EasingCurve {
    Linear,
    /// `3t² − 2t³`
    #[default]
    SmoothStep,
    /// `6t⁵ − 15t⁴ + 10t³`
    SmootherStep,
    /// `(1 − cos πt) / 2`
    SineInOut,
}

impl EasingCurve {
    /// Evaluates the curve. Input outside `[0, 1]` is clamped first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => t,
            EasingCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
            EasingCurve::SmootherStep => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            EasingCurve::SineInOut => (1.0 - (PI * t).cos()) * 0.5,
        }
    }
}
