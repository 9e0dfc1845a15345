mod diff;
mod tween;

pub use diff::{AnimOp, AnimationPlan, DeleteTarget, diff_scenes};
pub use tween::{Frame, FrameValue, Timeline, Transform};
