mod drawer;
mod grid;
mod group;
mod pack;
mod text;
pub(crate) mod types;

pub use types::*;

use crate::config::LayoutConfig;
use crate::events::ChartEvent;
use crate::index::{DataIndex, IndexedNode};
use crate::ir::{CellContent, ChartSpec, GroupBehavior};
use crate::theme::Theme;

use self::group::PlacedBubble;
use self::text::{measure_label, truncate_to_width};

/// Result of one layout pass: the scene plus the self-healing notifications
/// produced while normalizing the spec against its own data.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    pub scene: Scene,
    pub events: Vec<ChartEvent>,
}

/// Computes the full scene for one render cycle. Purely synchronous; nothing
/// here suspends or draws. Structural emptiness short-circuits to an empty
/// scene per the error-handling policy.
pub fn compute_layout(
    spec: &ChartSpec,
    canvas: Rect,
    theme: &Theme,
    config: &LayoutConfig,
) -> LayoutOutput {
    let (index, events) = DataIndex::build(spec);
    if index.is_empty() {
        return LayoutOutput {
            scene: Scene::empty(canvas),
            events,
        };
    }

    let (headers, content) = grid::compute_headers(spec, &index, canvas, theme, config);
    let cell_rects = grid::compute_grid(
        content,
        index.row_count(),
        index.column_count(),
        index.maximized_row,
        index.maximized_column,
        &config.grid,
    );
    let cell_contents: Vec<Rect> = cell_rects
        .iter()
        .map(|rect| rect.inset(config.grid.cell_padding))
        .collect();

    // Node size is derived once and shared by every cell and the drawer,
    // even when grouping replaces individual nodes.
    let plan = pack::compute_pack(spec, &index, &cell_contents, theme, config);

    let grouping = spec.group_behavior != GroupBehavior::None;
    let mut cells = Vec::with_capacity(index.cells.len());
    let mut nodes = Vec::new();
    let mut overflows = Vec::new();
    let mut unplaced = Vec::new();

    for (cell_idx, indexed) in index.cells.iter().enumerate() {
        let rect = cell_rects[cell_idx];
        let cell_content = cell_contents[cell_idx];
        let cell_pack = &plan.cells[cell_idx];
        let maximized = index.maximized_row == Some(indexed.row)
            || index.maximized_column == Some(indexed.column);

        let counts_only = !grouping
            && (spec.cell_content == CellContent::Counts
                || (indexed.visible_count > 0 && cell_pack.capacity() == 0));

        let def = indexed.def.as_ref();
        let label = def.and_then(|d| d.label.as_deref()).map(|raw| {
            let fitted = truncate_to_width(raw, cell_content.width, theme, config);
            measure_label(&fitted, theme, config)
        });
        let count_label = if counts_only || spec.cell_content == CellContent::Counts {
            Some(
                def.and_then(|d| d.count_label.clone())
                    .unwrap_or_else(|| indexed.visible_count.to_string()),
            )
        } else {
            None
        };

        cells.push(CellLayout {
            row: indexed.row,
            column: indexed.column,
            row_id: index.row_id(indexed.row).to_string(),
            column_id: index.column_id(indexed.column).to_string(),
            rect,
            content: cell_content,
            label,
            fill: def.and_then(|d| d.style.as_ref()).and_then(|s| s.fill.clone()),
            border: def
                .and_then(|d| d.style.as_ref())
                .and_then(|s| s.border.clone()),
            maximized,
            visible_count: indexed.visible_count,
            counts_only,
            count_label,
        });

        if grouping {
            continue;
        }
        if counts_only {
            for &node_index in &cell_pack.ordered {
                unplaced.push(UnplacedNode {
                    id: index.nodes[node_index].def.id.clone(),
                    row_id: index.row_id(indexed.row).to_string(),
                    column_id: index.column_id(indexed.column).to_string(),
                });
            }
            continue;
        }

        let visible = cell_pack.visible_slots();
        for (slot, &node_index) in cell_pack.ordered.iter().take(visible).enumerate() {
            let rect = pack::slot_rect(
                cell_content,
                cell_pack.columns,
                plan.node_width,
                plan.node_height,
                config.pack.node_gap,
                slot,
            );
            nodes.push(build_node_layout(
                &index.nodes[node_index],
                &index,
                rect,
                theme,
                config,
            ));
        }
        for &node_index in &cell_pack.positioned {
            let node = &index.nodes[node_index];
            let rect = positioned_rect(node, cell_content, plan.node_width, plan.node_height);
            let mut layout = build_node_layout(node, &index, rect, theme, config);
            layout.positioned = true;
            nodes.push(layout);
        }
        for &node_index in cell_pack.ordered.iter().skip(visible) {
            unplaced.push(UnplacedNode {
                id: index.nodes[node_index].def.id.clone(),
                row_id: index.row_id(indexed.row).to_string(),
                column_id: index.column_id(indexed.column).to_string(),
            });
        }
        if cell_pack.overflow && cell_pack.capacity() > 0 {
            let rect = pack::slot_rect(
                cell_content,
                cell_pack.columns,
                plan.node_width,
                plan.node_height,
                config.pack.node_gap,
                cell_pack.capacity() - 1,
            );
            overflows.push(OverflowBadge {
                row_id: index.row_id(indexed.row).to_string(),
                column_id: index.column_id(indexed.column).to_string(),
                rect,
                hidden_count: cell_pack.overflowed(),
            });
        }
    }

    let mut groups = if grouping {
        build_groups(spec, &index, content, &cell_contents, theme, config)
    } else {
        Vec::new()
    };

    let drawer = spec.drawer.as_ref().and_then(|wanted| {
        groups
            .iter()
            .find(|bubble| bubble.key == wanted.id)
            .map(|bubble| {
                drawer::compute_drawer(
                    bubble,
                    &index,
                    canvas,
                    plan.node_width,
                    plan.node_height,
                    theme,
                    config,
                )
            })
    });
    // The opened drawer hides its subject bubble; the bubble leaves the
    // scene for as long as the drawer is up.
    if let Some(open) = &drawer {
        groups.retain(|bubble| bubble.key != open.subject);
    }

    LayoutOutput {
        scene: Scene {
            canvas,
            content,
            row_count: index.row_count(),
            column_count: index.column_count(),
            headers,
            cells,
            nodes,
            groups,
            overflows,
            drawer,
            unplaced,
            node_size: Some((plan.node_width, plan.node_height)),
        },
        events,
    }
}

/// Shared node construction for packed cells and the drawer grid.
pub(crate) fn build_node_layout(
    node: &IndexedNode,
    index: &DataIndex,
    rect: Rect,
    theme: &Theme,
    config: &LayoutConfig,
) -> NodeLayout {
    let pack = &config.pack;
    let label_space =
        rect.width - pack.indicator_width - pack.icon_width - pack.label_padding * 2.0;
    let label = node.def.label.as_deref().map(|raw| {
        let fitted = truncate_to_width(raw, label_space.max(0.0), theme, config);
        measure_label(&fitted, theme, config)
    });
    let secondary_label = node.def.secondary_label.as_deref().map(|raw| {
        let fitted = truncate_to_width(raw, label_space.max(0.0), theme, config);
        measure_label(&fitted, theme, config)
    });
    NodeLayout {
        id: node.def.id.clone(),
        row_id: index.row_id(node.row).to_string(),
        column_id: index.column_id(node.column).to_string(),
        rect,
        color: node.def.color.clone(),
        indicator_color: node.def.indicator_color.clone(),
        icon: node.def.icon.clone(),
        indicator_icon: node.def.indicator_icon.clone(),
        label,
        secondary_label,
        highlighted: node.highlighted,
        selected: node.selected,
        positioned: false,
    }
}

/// Fractional placement inside the cell. The y fraction runs bottom-up,
/// matching the row axis direction.
fn positioned_rect(node: &IndexedNode, content: Rect, node_width: f32, node_height: f32) -> Rect {
    let fx = node.def.x_percentage.unwrap_or(0.5).clamp(0.0, 1.0);
    let fy = node.def.y_percentage.unwrap_or(0.5).clamp(0.0, 1.0);
    Rect::new(
        content.x + fx * (content.width - node_width).max(0.0),
        content.y + (1.0 - fy) * (content.height - node_height).max(0.0),
        node_width,
        node_height,
    )
}

fn build_groups(
    spec: &ChartSpec,
    index: &DataIndex,
    content: Rect,
    cell_contents: &[Rect],
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<GroupBubble> {
    let aggs = group::aggregate(spec, index);
    if aggs.is_empty() {
        return Vec::new();
    }

    let mut bubbles = Vec::with_capacity(aggs.len());
    match spec.group_behavior {
        GroupBehavior::AcrossCells => {
            let placed = group::place_across(&aggs, index, content, &config.group);
            for (ordinal, (agg, place)) in aggs.iter().zip(placed).enumerate() {
                bubbles.push(finish_bubble(spec, index, agg, place, ordinal, theme, config));
            }
        }
        GroupBehavior::WithinCell => {
            // One simulation per populated cell; bubbles in different cells
            // never interact.
            let mut cursor = 0;
            while cursor < aggs.len() {
                let cell = aggs[cursor].cell;
                let mut end = cursor + 1;
                while end < aggs.len() && aggs[end].cell == cell {
                    end += 1;
                }
                let scope = &aggs[cursor..end];
                let rect = cell
                    .map(|(row, column)| cell_contents[row * index.column_count() + column])
                    .unwrap_or(content);
                let sizes: Vec<f32> = scope
                    .iter()
                    .map(|agg| agg.members.len() as f32)
                    .collect();
                let placed = group::pack_bubbles(&sizes, rect, &config.group);
                for (offset, (agg, place)) in scope.iter().zip(placed).enumerate() {
                    bubbles.push(finish_bubble(
                        spec,
                        index,
                        agg,
                        place,
                        cursor + offset,
                        theme,
                        config,
                    ));
                }
                cursor = end;
            }
        }
        GroupBehavior::None => {}
    }
    bubbles
}

fn finish_bubble(
    spec: &ChartSpec,
    index: &DataIndex,
    agg: &group::GroupAgg,
    place: PlacedBubble,
    ordinal: usize,
    theme: &Theme,
    config: &LayoutConfig,
) -> GroupBubble {
    let color = if agg.is_other {
        spec.other_color
            .clone()
            .unwrap_or_else(|| theme.other_group_color.clone())
    } else {
        let explicit = agg
            .members
            .first()
            .and_then(|&i| index.nodes[i].def.color.as_deref());
        theme.group_color(explicit, ordinal, false)
    };
    let label = if place.side >= config.group.min_bubble_side {
        let fitted = truncate_to_width(&agg.key, place.side, theme, config);
        Some(measure_label(&fitted, theme, config))
    } else {
        None
    };
    GroupBubble {
        key: agg.key.clone(),
        is_other: agg.is_other,
        cell: agg
            .cell
            .map(|(row, column)| (index.row_id(row).to_string(), index.column_id(column).to_string())),
        center: place.center,
        side: place.side,
        color,
        member_ids: agg
            .members
            .iter()
            .map(|&i| index.nodes[i].def.id.clone())
            .collect(),
        highlighted_count: agg.highlighted_count,
        label,
    }
}
