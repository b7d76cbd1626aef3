pub mod easing;
pub mod animator;

pub use easing::EasingCurve;
pub use animator::{AnimatorStep, DoorAnimator, COMPLETION_EPSILON};
