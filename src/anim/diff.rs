use std::collections::HashMap;

use crate::config::AnimationConfig;
use crate::layout::types::{Element, ElementKey, Scene};

use super::tween::Transform;

/// Where a deleted element goes while it leaves the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    FadeOut,
    /// Fly toward and shrink into another element's bounds (a group bubble,
    /// an overflow slot, a cell center).
    CollapseInto { to: Transform },
}

/// One typed operation of an animation plan. Transforms are global
/// (page-level); nothing here references scene-graph parents.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimOp {
    Insert {
        key: ElementKey,
        /// Bounds to grow out of, e.g. the bubble a drawer expands from.
        from: Option<Transform>,
        to: Transform,
        duration: f32,
    },
    Move {
        key: ElementKey,
        from: Transform,
        to: Transform,
        duration: f32,
    },
    Recolor {
        key: ElementKey,
        from: String,
        to: String,
        duration: f32,
    },
    Delete {
        key: ElementKey,
        from: Transform,
        target: DeleteTarget,
        duration: f32,
    },
    /// Whole-scene crossfade; the fallback when element matching is not
    /// possible.
    FadeReplace { duration: f32 },
}

impl AnimOp {
    pub fn duration(&self) -> f32 {
        match self {
            AnimOp::Insert { duration, .. }
            | AnimOp::Move { duration, .. }
            | AnimOp::Recolor { duration, .. }
            | AnimOp::Delete { duration, .. }
            | AnimOp::FadeReplace { duration } => *duration,
        }
    }

    pub fn key(&self) -> Option<&ElementKey> {
        match self {
            AnimOp::Insert { key, .. }
            | AnimOp::Move { key, .. }
            | AnimOp::Recolor { key, .. }
            | AnimOp::Delete { key, .. } => Some(key),
            AnimOp::FadeReplace { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationPlan {
    pub ops: Vec<AnimOp>,
}

impl AnimationPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn fade_replace(duration: f32) -> Self {
        Self {
            ops: vec![AnimOp::FadeReplace { duration }],
        }
    }
}

/// Classification of every element across the two scenes. Total: each key of
/// either scene lands in exactly one bucket.
struct DiffBuckets<'a> {
    matched: Vec<(ElementKey, Element<'a>, Element<'a>)>,
    deleted: Vec<(ElementKey, Element<'a>)>,
    inserted: Vec<(ElementKey, Element<'a>)>,
}

fn classify<'a>(old: &'a Scene, new: &'a Scene) -> DiffBuckets<'a> {
    let mut old_by_key: HashMap<ElementKey, Element<'a>> = old
        .elements()
        .map(|element| (element.key(), element))
        .collect();

    let mut matched = Vec::new();
    let mut inserted = Vec::new();
    for element in new.elements() {
        let key = element.key();
        match old_by_key.remove(&key) {
            Some(previous) => matched.push((key, previous, element)),
            None => inserted.push((key, element)),
        }
    }
    let deleted: Vec<(ElementKey, Element<'a>)> = old_by_key.into_iter().collect();

    DiffBuckets {
        matched,
        deleted,
        inserted,
    }
}

/// Produces the animation plan carrying the old scene into the new one.
///
/// Scenes with different grid dimensions cannot be matched element-wise and
/// fall back to a whole-scene crossfade. `duration` comes from the spec's
/// `animationDuration`; a non-positive value yields an empty plan.
pub fn diff_scenes(
    old: &Scene,
    new: &Scene,
    duration: f32,
    config: &AnimationConfig,
) -> AnimationPlan {
    if duration <= 0.0 {
        return AnimationPlan::default();
    }
    if old.row_count != new.row_count || old.column_count != new.column_count {
        return AnimationPlan::fade_replace(config.fade_replace_duration);
    }

    let buckets = classify(old, new);
    let mut ops = Vec::new();

    for (key, previous, current) in &buckets.matched {
        let from = Transform::from_rect(previous.rect());
        let to = Transform::from_rect(current.rect());
        // Properties whose endpoints agree are skipped outright.
        if from != to {
            ops.push(AnimOp::Move {
                key: key.clone(),
                from,
                to,
                duration,
            });
        }
        if let (Some(old_fill), Some(new_fill)) = (previous.fill(), current.fill())
            && old_fill != new_fill
        {
            ops.push(AnimOp::Recolor {
                key: key.clone(),
                from: old_fill.to_string(),
                to: new_fill.to_string(),
                duration,
            });
        }
    }

    for (key, element) in &buckets.deleted {
        if let Some(op) = delete_op(key, *element, new, duration, config) {
            ops.push(op);
        }
    }

    for (key, element) in &buckets.inserted {
        ops.push(insert_op(key, *element, old, duration));
    }

    AnimationPlan { ops }
}

fn delete_op(
    key: &ElementKey,
    element: Element<'_>,
    new: &Scene,
    duration: f32,
    config: &AnimationConfig,
) -> Option<AnimOp> {
    let from = Transform::from_rect(element.rect());
    let target = match key {
        ElementKey::Node { id } => {
            if let Some(bubble) = new.bubble_containing(id) {
                // Merged into a bubble: fly into its center instead of
                // fading in place.
                let (cx, cy) = bubble.center;
                DeleteTarget::CollapseInto {
                    to: collapse_target(from, cx, cy, config.collapse_scale),
                }
            } else if let Some((row_id, column_id)) = new.unplaced_cell_of(id) {
                // Still in the data, no longer drawn: aim at the new cell's
                // overflow slot, or its center when no slot exists.
                let (cx, cy) = new
                    .find_overflow(row_id, column_id)
                    .map(|badge| badge.rect.center())
                    .or_else(|| new.find_cell(row_id, column_id).map(|cell| cell.rect.center()))?;
                DeleteTarget::CollapseInto {
                    to: collapse_target(from, cx, cy, config.collapse_scale),
                }
            } else {
                DeleteTarget::FadeOut
            }
        }
        ElementKey::Group { key: group_key, .. } => {
            // A bubble hidden by its own opened drawer does not animate; the
            // drawer's members are never diffed either (drawer nodes are not
            // scene elements).
            if new
                .drawer
                .as_ref()
                .is_some_and(|drawer| &drawer.subject == group_key)
            {
                return None;
            }
            DeleteTarget::FadeOut
        }
        ElementKey::Drawer { subject } => {
            // Closing: shrink back into the bubble it expanded from.
            match new.groups.iter().find(|bubble| &bubble.key == subject) {
                Some(bubble) => DeleteTarget::CollapseInto {
                    to: Transform::from_rect(bubble.rect()),
                },
                None => DeleteTarget::FadeOut,
            }
        }
        _ => DeleteTarget::FadeOut,
    };
    Some(AnimOp::Delete {
        key: key.clone(),
        from,
        target,
        duration,
    })
}

fn insert_op(key: &ElementKey, element: Element<'_>, old: &Scene, duration: f32) -> AnimOp {
    let to = Transform::from_rect(element.rect());
    let from = match key {
        // Opening drawer grows out of the bubble it expands.
        ElementKey::Drawer { subject } => old
            .groups
            .iter()
            .find(|bubble| &bubble.key == subject)
            .map(|bubble| Transform::from_rect(bubble.rect())),
        _ => None,
    };
    AnimOp::Insert {
        key: key.clone(),
        from,
        to,
        duration,
    }
}

/// Shrunken bounds centered on the fly-to point.
fn collapse_target(from: Transform, cx: f32, cy: f32, scale: f32) -> Transform {
    let sx = from.sx * scale;
    let sy = from.sy * scale;
    Transform {
        tx: cx - sx / 2.0,
        ty: cy - sy / 2.0,
        sx,
        sy,
    }
}
