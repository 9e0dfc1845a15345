use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::config::GroupConfig;
use crate::index::DataIndex;
use crate::ir::{ChartSpec, GroupBehavior};

use super::types::Rect;

pub(super) const OTHER_KEY: &str = "other";

/// One aggregated category within a scope, before any geometry.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct GroupAgg {
    pub key: String,
    pub is_other: bool,
    /// Scope cell indices for within-cell grouping; `None` when the scope is
    /// the whole canvas.
    pub cell: Option<(usize, usize)>,
    /// Node indices in input order.
    pub members: Vec<usize>,
    pub highlighted_count: usize,
}

/// Partitions the non-hidden nodes of every scope by group key and folds
/// undersized groups into the synthetic "other" bucket. Pure re-partition:
/// order independent, idempotent, and every node lands in exactly one group.
pub(super) fn aggregate(spec: &ChartSpec, index: &DataIndex) -> Vec<GroupAgg> {
    match spec.group_behavior {
        GroupBehavior::None => Vec::new(),
        GroupBehavior::WithinCell => {
            let mut groups = Vec::new();
            for cell in &index.cells {
                let members: Vec<usize> = cell
                    .node_indices
                    .iter()
                    .copied()
                    .filter(|&i| !index.nodes[i].hidden)
                    .collect();
                groups.extend(aggregate_scope(
                    spec,
                    index,
                    &members,
                    Some((cell.row, cell.column)),
                ));
            }
            groups
        }
        GroupBehavior::AcrossCells => {
            let members: Vec<usize> = (0..index.nodes.len())
                .filter(|&i| !index.nodes[i].hidden)
                .collect();
            aggregate_scope(spec, index, &members, None)
        }
    }
}

fn aggregate_scope(
    spec: &ChartSpec,
    index: &DataIndex,
    members: &[usize],
    cell: Option<(usize, usize)>,
) -> Vec<GroupAgg> {
    if members.is_empty() {
        return Vec::new();
    }

    // Partition by key, keys in first-appearance order.
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for &node_index in members {
        let key = index.nodes[node_index]
            .group_key
            .clone()
            .unwrap_or_else(|| OTHER_KEY.to_string());
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(node_index);
    }

    let threshold = spec.other_threshold * members.len() as f32;
    let merging = threshold > 1.0;

    let mut groups = Vec::new();
    let mut other: Vec<usize> = Vec::new();
    for key in order {
        let bucket = buckets.remove(&key).unwrap_or_default();
        let undersized = merging && (bucket.len() as f32) < threshold;
        if key == OTHER_KEY || undersized {
            other.extend(bucket);
            continue;
        }
        groups.push(make_group(index, key, false, cell, bucket));
    }
    if !other.is_empty() {
        other.sort_unstable();
        groups.push(make_group(index, OTHER_KEY.to_string(), true, cell, other));
    }
    groups
}

fn make_group(
    index: &DataIndex,
    key: String,
    is_other: bool,
    cell: Option<(usize, usize)>,
    members: Vec<usize>,
) -> GroupAgg {
    let highlighted_count = members
        .iter()
        .filter(|&&i| index.nodes[i].highlighted)
        .count();
    GroupAgg {
        key,
        is_other,
        cell,
        members,
        highlighted_count,
    }
}

/// Positions `sizes.len()` square bubbles in simulation space so that none
/// overlap, biased toward the aspect ratio of the eventual container.
///
/// Bubble `i` has side `sqrt(sizes[i])` in simulation units. Gravity runs at
/// full strength while the system is hot; repulsion takes over as it cools.
pub(super) fn simulate(sizes: &[f32], avail_w: f32, avail_h: f32, config: &GroupConfig) -> Vec<(f32, f32)> {
    let count = sizes.len();
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![(0.0, 0.0)];
    }

    // Spiral seed spreads the bubbles before any force applies.
    let theta = TAU / count as f32;
    let mut pos: Vec<(f32, f32)> = (0..count)
        .map(|i| {
            let i_f = i as f32;
            (i_f * (theta * i_f).cos(), i_f * (theta * i_f).sin())
        })
        .collect();

    // Gravity is anisotropic so the converged cloud matches the container
    // aspect: the compressed axis is the one the container is short on.
    let ratio = if avail_w > 0.0 && avail_h > 0.0 {
        (avail_h / avail_w).sqrt()
    } else {
        1.0
    };
    // Clamped so one step never overshoots the origin on a degenerate rect.
    let gravity_x = (config.gravity * ratio).min(0.5);
    let gravity_y = (config.gravity / ratio).min(0.5);

    let mut alpha = 1.0f32;
    while alpha >= config.alpha_min {
        for p in pos.iter_mut() {
            p.0 -= p.0 * gravity_x * alpha;
            p.1 -= p.1 * gravity_y * alpha;
        }

        let repulsion = 1.0 - alpha;
        for i in 0..count {
            for j in (i + 1)..count {
                let dx = pos[j].0 - pos[i].0;
                let dy = pos[j].1 - pos[i].1;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < 1e-6 {
                    // Coincident centers: nudge apart along the seed angle.
                    let angle = theta * j as f32;
                    pos[j].0 += 1e-3 * angle.cos();
                    pos[j].1 += 1e-3 * angle.sin();
                    continue;
                }
                let min_dist = min_center_distance(sizes[i], sizes[j], dx, dy, dist);
                if dist >= min_dist {
                    continue;
                }
                let push = (min_dist - dist) / dist * repulsion;
                // Larger bubbles move proportionally less.
                let total = sizes[i] + sizes[j];
                let weight_i = sizes[j] / total;
                let weight_j = sizes[i] / total;
                pos[i].0 -= dx * push * weight_i;
                pos[i].1 -= dy * push * weight_i;
                pos[j].0 += dx * push * weight_j;
                pos[j].1 += dy * push * weight_j;
            }
        }

        alpha *= config.alpha_decay;
    }
    pos
}

/// Minimum center-to-center distance for two square bubbles approaching at
/// the given vector. The half-sides add; the octant factor accounts for the
/// squares' corners being farther out than their edges.
fn min_center_distance(size_a: f32, size_b: f32, dx: f32, dy: f32, dist: f32) -> f32 {
    let half_sum = 0.5 * (size_a.sqrt() + size_b.sqrt());
    let axis = (dx / dist).abs().max((dy / dist).abs());
    half_sum / axis.max(1e-6)
}

#[derive(Debug, Clone, Copy)]
pub(super) struct PlacedBubble {
    pub center: (f32, f32),
    pub side: f32,
}

/// Runs the simulation and maps it into `rect`. One uniform scale per run;
/// every bubble shares the same pixel-per-unit density.
pub(super) fn pack_bubbles(sizes: &[f32], rect: Rect, config: &GroupConfig) -> Vec<PlacedBubble> {
    if sizes.is_empty() || rect.is_empty() {
        return Vec::new();
    }
    let pos = simulate(sizes, rect.width, rect.height, config);

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (i, p) in pos.iter().enumerate() {
        let half = 0.5 * sizes[i].sqrt();
        min_x = min_x.min(p.0 - half);
        max_x = max_x.max(p.0 + half);
        min_y = min_y.min(p.1 - half);
        max_y = max_y.max(p.1 + half);
    }
    let box_w = (max_x - min_x).max(1e-6);
    let box_h = (max_y - min_y).max(1e-6);
    let scale = (rect.width / box_w).min(rect.height / box_h);
    let box_cx = (min_x + max_x) / 2.0;
    let box_cy = (min_y + max_y) / 2.0;
    let (rect_cx, rect_cy) = rect.center();

    pos.iter()
        .enumerate()
        .map(|(i, p)| PlacedBubble {
            center: (
                rect_cx + (p.0 - box_cx) * scale,
                rect_cy + (p.1 - box_cy) * scale,
            ),
            side: (scale * sizes[i].sqrt() - config.bubble_gap).max(0.0),
        })
        .collect()
}

/// Across-cells placement: no physics. Centers come straight from the
/// averaged fractional member positions mapped onto the canvas; the shared
/// scale spends `across_fill_ratio` of the canvas area on bubbles.
pub(super) fn place_across(
    groups: &[GroupAgg],
    index: &DataIndex,
    content: Rect,
    config: &GroupConfig,
) -> Vec<PlacedBubble> {
    if groups.is_empty() || content.is_empty() {
        return Vec::new();
    }
    let rows = index.row_count() as f32;
    let columns = index.column_count() as f32;
    let total_members: usize = groups.iter().map(|group| group.members.len()).sum();
    let scale = (config.across_fill_ratio * content.width * content.height
        / (total_members.max(1)) as f32)
        .sqrt();

    groups
        .iter()
        .map(|group| {
            let mut fx = 0.0f32;
            let mut fy = 0.0f32;
            for &node_index in &group.members {
                let node = &index.nodes[node_index];
                fx += (node.column as f32 + 0.5) / columns;
                fy += (node.row as f32 + 0.5) / rows;
            }
            let n = group.members.len().max(1) as f32;
            fx /= n;
            fy /= n;
            PlacedBubble {
                center: (
                    content.x + fx * content.width,
                    // Row 0 sits at the bottom, so the fraction flips.
                    content.y + (1.0 - fy) * content.height,
                ),
                side: (scale * (group.members.len() as f32).sqrt() - config.bubble_gap).max(0.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColumnDef, NodeDef, RowDef};

    fn grouped_node(id: &str, row: &str, column: &str, group: Option<&str>) -> NodeDef {
        NodeDef {
            id: id.into(),
            row: row.into(),
            column: column.into(),
            label: None,
            secondary_label: None,
            color: None,
            categories: Vec::new(),
            group_category: group.map(str::to_string),
            group_dimension_values: Vec::new(),
            indicator_color: None,
            icon: None,
            indicator_icon: None,
            x_percentage: None,
            y_percentage: None,
        }
    }

    fn across_spec(nodes: Vec<NodeDef>, threshold: f32) -> ChartSpec {
        let mut spec = ChartSpec::new(
            vec![
                RowDef {
                    id: "r1".into(),
                    label: None,
                },
                RowDef {
                    id: "r2".into(),
                    label: None,
                },
            ],
            vec![
                ColumnDef {
                    id: "c1".into(),
                    label: None,
                },
                ColumnDef {
                    id: "c2".into(),
                    label: None,
                },
            ],
        );
        spec.nodes = nodes;
        spec.group_behavior = GroupBehavior::AcrossCells;
        spec.other_threshold = threshold;
        spec
    }

    #[test]
    fn undersized_groups_fold_into_other() {
        // Sizes [1, 1, 1, 1, 20], threshold 0.1 of 24 nodes = 2.4: the four
        // singletons merge, the big group stays.
        let mut nodes = Vec::new();
        for i in 0..4 {
            nodes.push(grouped_node(
                &format!("s{i}"),
                "r1",
                "c1",
                Some(&format!("tiny{i}")),
            ));
        }
        for i in 0..20 {
            nodes.push(grouped_node(&format!("b{i}"), "r2", "c2", Some("big")));
        }
        let spec = across_spec(nodes, 0.1);
        let (index, _) = DataIndex::build(&spec);
        let groups = aggregate(&spec, &index);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "big");
        assert_eq!(groups[0].members.len(), 20);
        assert!(groups[1].is_other);
        assert_eq!(groups[1].members.len(), 4);
    }

    #[test]
    fn aggregation_is_a_partition() {
        let nodes = vec![
            grouped_node("a", "r1", "c1", Some("x")),
            grouped_node("b", "r1", "c2", Some("y")),
            grouped_node("c", "r2", "c1", None),
            grouped_node("d", "r2", "c2", Some("x")),
        ];
        let spec = across_spec(nodes, 0.0);
        let (index, _) = DataIndex::build(&spec);
        let groups = aggregate(&spec, &index);
        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.members.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut nodes = Vec::new();
        for i in 0..4 {
            nodes.push(grouped_node(
                &format!("s{i}"),
                "r1",
                "c1",
                Some(&format!("tiny{i}")),
            ));
        }
        for i in 0..20 {
            nodes.push(grouped_node(&format!("b{i}"), "r2", "c2", Some("big")));
        }
        let spec = across_spec(nodes, 0.1);
        let (index, _) = DataIndex::build(&spec);
        let first = aggregate(&spec, &index);

        // Re-labeling every node with its aggregated key and aggregating
        // again must reproduce the same partition.
        let mut relabeled = spec.clone();
        for group in &first {
            for &member in &group.members {
                relabeled.nodes[member].group_category = Some(group.key.clone());
            }
        }
        let (index2, _) = DataIndex::build(&relabeled);
        let second = aggregate(&relabeled, &index2);
        assert_eq!(first.len(), second.len());
        for group in &first {
            let twin = second
                .iter()
                .find(|g| g.key == group.key)
                .expect("group should survive re-aggregation");
            assert_eq!(twin.members, group.members);
        }
    }

    #[test]
    fn threshold_at_or_below_one_keeps_singletons() {
        // 5 nodes at threshold 0.1: 0.5 <= 1, no merging happens.
        let nodes = (0..5)
            .map(|i| grouped_node(&format!("n{i}"), "r1", "c1", Some(&format!("g{i}"))))
            .collect();
        let spec = across_spec(nodes, 0.1);
        let (index, _) = DataIndex::build(&spec);
        let groups = aggregate(&spec, &index);
        assert_eq!(groups.len(), 5);
    }

    #[test]
    fn within_cell_scopes_do_not_mix() {
        let nodes = vec![
            grouped_node("a", "r1", "c1", Some("x")),
            grouped_node("b", "r2", "c2", Some("x")),
        ];
        let mut spec = across_spec(nodes, 0.0);
        spec.group_behavior = GroupBehavior::WithinCell;
        let (index, _) = DataIndex::build(&spec);
        let groups = aggregate(&spec, &index);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].cell, Some((0, 0)));
        assert_eq!(groups[1].cell, Some((1, 1)));
    }

    #[test]
    fn simulation_separates_bubbles() {
        let config = GroupConfig::default();
        let sizes = [4.0, 9.0, 1.0, 16.0, 2.0];
        let pos = simulate(&sizes, 400.0, 300.0, &config);
        for i in 0..sizes.len() {
            for j in (i + 1)..sizes.len() {
                let dx = pos[j].0 - pos[i].0;
                let dy = pos[j].1 - pos[i].1;
                let dist = (dx * dx + dy * dy).sqrt();
                let min_dist = min_center_distance(sizes[i], sizes[j], dx, dy, dist);
                assert!(
                    dist >= min_dist * 0.9,
                    "bubbles {i} and {j} too close: {dist} < {min_dist}"
                );
            }
        }
    }

    #[test]
    fn packed_bubbles_stay_inside_the_rect() {
        let config = GroupConfig::default();
        let rect = Rect::new(50.0, 20.0, 300.0, 200.0);
        let placed = pack_bubbles(&[5.0, 12.0, 3.0], rect, &config);
        assert_eq!(placed.len(), 3);
        for bubble in &placed {
            let half = bubble.side / 2.0;
            assert!(bubble.center.0 - half >= rect.x - 1.0);
            assert!(bubble.center.0 + half <= rect.x + rect.width + 1.0);
            assert!(bubble.center.1 - half >= rect.y - 1.0);
            assert!(bubble.center.1 + half <= rect.y + rect.height + 1.0);
        }
    }

    #[test]
    fn bubble_area_tracks_member_count() {
        let config = GroupConfig::default();
        let rect = Rect::new(0.0, 0.0, 400.0, 400.0);
        let placed = pack_bubbles(&[4.0, 16.0], rect, &config);
        let small = placed[0].side + config.bubble_gap;
        let large = placed[1].side + config.bubble_gap;
        // sqrt(16)/sqrt(4) = 2: sides before the gap subtraction scale by 2.
        assert!((large / small - 2.0).abs() < 0.05);
    }

    #[test]
    fn across_centers_average_member_positions() {
        let nodes = vec![
            grouped_node("a", "r2", "c2", Some("g")),
            grouped_node("b", "r2", "c2", Some("g")),
        ];
        let spec = across_spec(nodes, 0.0);
        let (index, _) = DataIndex::build(&spec);
        let groups = aggregate(&spec, &index);
        let content = Rect::new(0.0, 0.0, 400.0, 200.0);
        let placed = place_across(&groups, &index, content, &GroupConfig::default());
        assert_eq!(placed.len(), 1);
        // Both members sit in the top-right cell of a 2x2 grid: fractional
        // (0.75, 0.75) with the row axis flipped for screen space.
        assert!((placed[0].center.0 - 300.0).abs() < 1e-3);
        assert!((placed[0].center.1 - 50.0).abs() < 1e-3);
    }
}
