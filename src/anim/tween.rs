use crate::layout::types::{ElementKey, Rect};

use super::diff::{AnimOp, AnimationPlan};

/// Global 2D affine transform of an element, expressed as the matrix mapping
/// the unit square onto its page-level rect: `[sx 0 0 sy tx ty]`. Tweens
/// interpolate the components linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub tx: f32,
    pub ty: f32,
    pub sx: f32,
    pub sy: f32,
}

impl Transform {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            tx: rect.x,
            ty: rect.y,
            sx: rect.width,
            sy: rect.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.tx, self.ty, self.sx, self.sy)
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            tx: a.tx + (b.tx - a.tx) * t,
            ty: a.ty + (b.ty - a.ty) * t,
            sx: a.sx + (b.sx - a.sx) * t,
            sy: a.sy + (b.sy - a.sy) * t,
        }
    }
}

/// One interpolated property value delivered on a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameValue {
    Transform(Transform),
    /// Fill interpolation is delegated to the renderer; the timeline hands
    /// out the endpoints and the progress.
    Fill { from: String, to: String, t: f32 },
    Opacity(f32),
    /// Whole-scene crossfade progress, 0 at the old scene, 1 at the new.
    SceneFade(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// `None` for whole-scene operations.
    pub key: Option<ElementKey>,
    pub value: FrameValue,
    /// Set on the tick that delivers the terminal value. The renderer applies
    /// the final local state exactly once when it sees this.
    pub completed: bool,
}

struct Entry {
    op: AnimOp,
    elapsed: f32,
    done: bool,
}

/// Time-stepped executor for one animation plan. Operations advance together
/// on each tick and complete independently; nothing here blocks on another
/// operation. Cancelling jumps every operation to its terminal state so the
/// scene is never left mid-tween.
pub struct Timeline {
    entries: Vec<Entry>,
}

impl Timeline {
    pub fn new(plan: AnimationPlan) -> Self {
        Self {
            entries: plan
                .ops
                .into_iter()
                .map(|op| Entry {
                    op,
                    elapsed: 0.0,
                    done: false,
                })
                .collect(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|entry| entry.done)
    }

    /// Advances every running operation by `dt` milliseconds and returns the
    /// property values for this tick.
    pub fn advance(&mut self, dt: f32) -> Vec<Frame> {
        let mut frames = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.done {
                continue;
            }
            entry.elapsed += dt.max(0.0);
            let duration = entry.op.duration().max(f32::EPSILON);
            let t = (entry.elapsed / duration).clamp(0.0, 1.0);
            let completed = entry.elapsed >= duration;
            entry.done = completed;
            frames.extend(sample(&entry.op, t, completed));
        }
        frames
    }

    /// Stops the plan, emitting the terminal value of every operation that
    /// has not finished yet.
    pub fn cancel(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.done {
                continue;
            }
            entry.done = true;
            frames.extend(sample(&entry.op, 1.0, true));
        }
        frames
    }
}

fn sample(op: &AnimOp, t: f32, completed: bool) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut push = |key: Option<ElementKey>, value: FrameValue| {
        frames.push(Frame {
            key,
            value,
            completed,
        });
    };
    match op {
        AnimOp::Insert { key, to, from, .. } => {
            let transform = match from {
                Some(origin) => Transform::lerp(*origin, *to, t),
                None => *to,
            };
            push(Some(key.clone()), FrameValue::Transform(transform));
            push(Some(key.clone()), FrameValue::Opacity(t));
        }
        AnimOp::Move { key, from, to, .. } => {
            push(
                Some(key.clone()),
                FrameValue::Transform(Transform::lerp(*from, *to, t)),
            );
        }
        AnimOp::Recolor { key, from, to, .. } => {
            push(
                Some(key.clone()),
                FrameValue::Fill {
                    from: from.clone(),
                    to: to.clone(),
                    t,
                },
            );
        }
        AnimOp::Delete {
            key, from, target, ..
        } => {
            match target {
                super::diff::DeleteTarget::FadeOut => {
                    push(Some(key.clone()), FrameValue::Opacity(1.0 - t));
                }
                super::diff::DeleteTarget::CollapseInto { to } => {
                    push(
                        Some(key.clone()),
                        FrameValue::Transform(Transform::lerp(*from, *to, t)),
                    );
                    push(Some(key.clone()), FrameValue::Opacity(1.0 - t));
                }
            }
        }
        AnimOp::FadeReplace { .. } => {
            push(None, FrameValue::SceneFade(t));
        }
    }
    frames
}
