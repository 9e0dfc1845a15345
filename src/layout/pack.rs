use crate::config::LayoutConfig;
use crate::index::{DataIndex, IndexedNode};
use crate::ir::{ChartSpec, LabelTruncation};
use crate::theme::Theme;

use super::text::text_width;
use super::types::Rect;

/// Packing decision for one cell, aligned row-major with the grid.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CellPack {
    pub rows: usize,
    pub columns: usize,
    pub overflow: bool,
    /// Visible, unpositioned node indices in render-priority order. Slots are
    /// assigned in this order; the tail past capacity is pushed into the
    /// overflow badge.
    pub ordered: Vec<usize>,
    /// Visible nodes carrying explicit fractional positions.
    pub positioned: Vec<usize>,
}

impl CellPack {
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }

    /// Slots that actually hold nodes; the last slot is reserved for the
    /// overflow indicator when the cell overflows.
    pub fn visible_slots(&self) -> usize {
        if self.overflow {
            self.capacity().saturating_sub(1)
        } else {
            self.capacity().min(self.ordered.len())
        }
    }

    pub fn overflowed(&self) -> usize {
        self.ordered.len().saturating_sub(self.visible_slots())
    }
}

#[derive(Debug, Clone)]
pub(super) struct PackPlan {
    pub node_width: f32,
    pub node_height: f32,
    pub label_width: f32,
    pub cells: Vec<CellPack>,
}

/// Derives the uniform node size once and the per-cell packing grids. The
/// first node's visual requirements stand in for all of them; node visuals
/// are assumed homogeneous across the chart.
pub(super) fn compute_pack(
    spec: &ChartSpec,
    index: &DataIndex,
    cell_contents: &[Rect],
    theme: &Theme,
    config: &LayoutConfig,
) -> PackPlan {
    let pack = &config.pack;
    let gap = pack.node_gap;

    let label_width = match spec.label_truncation {
        LabelTruncation::Fixed => fixed_label_width(spec, config),
        LabelTruncation::IfRequired => {
            required_label_width(spec, index, cell_contents, theme, config)
        }
    };

    let node_width = pack.indicator_width + pack.icon_width + label_width + pack.label_padding * 2.0;
    let node_height = pack
        .node_height
        .max(theme.font_size * config.label_line_height + 4.0);

    let mut cells = Vec::with_capacity(index.cells.len());
    for (cell, content) in index.cells.iter().zip(cell_contents) {
        let rows = grid_capacity(content.height, node_height, gap);
        let columns = grid_capacity(content.width, node_width, gap);

        let mut ordered: Vec<usize> = Vec::new();
        let mut positioned: Vec<usize> = Vec::new();
        for &node_index in &cell.node_indices {
            let node = &index.nodes[node_index];
            if node.hidden {
                continue;
            }
            if node.def.is_positioned() {
                positioned.push(node_index);
            } else {
                ordered.push(node_index);
            }
        }
        // Four render-priority passes; the sort is stable so original order
        // survives within each pass.
        ordered.sort_by_key(|&node_index| render_priority(&index.nodes[node_index]));

        let overflow = ordered.len() > rows * columns;
        cells.push(CellPack {
            rows,
            columns,
            overflow,
            ordered,
            positioned,
        });
    }

    PackPlan {
        node_width,
        node_height,
        label_width,
        cells,
    }
}

/// highlighted+selected, highlighted, selected, rest. Decides both draw
/// order and which nodes fall into overflow.
fn render_priority(node: &IndexedNode) -> u8 {
    match (node.highlighted, node.selected) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}

fn grid_capacity(extent: f32, item: f32, gap: f32) -> usize {
    if extent <= 0.0 || item <= 0.0 {
        return 0;
    }
    (((extent + gap) / (item + gap)).floor()).max(0.0) as usize
}

fn fixed_label_width(spec: &ChartSpec, config: &LayoutConfig) -> f32 {
    if spec.nodes.iter().all(|node| node.label.is_none()) {
        return 0.0;
    }
    config.pack.maximum_label_width
}

/// "Truncate only if required": measure the widest label across the most
/// populated cell (the maximized cell when one is maximized), then cap to
/// the space a single node can take in that cell.
fn required_label_width(
    spec: &ChartSpec,
    index: &DataIndex,
    cell_contents: &[Rect],
    theme: &Theme,
    config: &LayoutConfig,
) -> f32 {
    let pack = &config.pack;
    let target_cell = match (index.maximized_row, index.maximized_column) {
        (Some(row), Some(column)) => Some(row * index.column_count() + column),
        (Some(row), None) => busiest_in(index, |cell| cell.row == row),
        (None, Some(column)) => busiest_in(index, |cell| cell.column == column),
        (None, None) => busiest_in(index, |_| true),
    };
    let Some(cell_idx) = target_cell else {
        return 0.0;
    };

    let widest = index.cells[cell_idx]
        .node_indices
        .iter()
        .map(|&node_index| &index.nodes[node_index])
        .filter(|node| !node.hidden)
        .filter_map(|node| node.def.label.as_deref())
        .map(|label| text_width(label, theme, config))
        .fold(0.0, f32::max);

    let available = cell_contents
        .get(cell_idx)
        .map(|content| {
            content.width - pack.indicator_width - pack.icon_width - pack.label_padding * 2.0
        })
        .unwrap_or(pack.maximum_label_width);
    widest.min(available.max(0.0))
}

fn busiest_in(index: &DataIndex, keep: impl Fn(&crate::index::IndexedCell) -> bool) -> Option<usize> {
    index
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| keep(cell))
        .max_by_key(|(_, cell)| cell.visible_count)
        .map(|(idx, _)| idx)
}

/// Rect of packing slot `slot` inside `content`, slots running row-major
/// top-down.
pub(super) fn slot_rect(
    content: Rect,
    columns: usize,
    node_width: f32,
    node_height: f32,
    gap: f32,
    slot: usize,
) -> Rect {
    let columns = columns.max(1);
    let row = slot / columns;
    let column = slot % columns;
    Rect::new(
        content.x + column as f32 * (node_width + gap),
        content.y + row as f32 * (node_height + gap),
        node_width,
        node_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DataIndex;
    use crate::ir::{ColumnDef, NodeDef, RowDef};

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    fn node(id: &str) -> NodeDef {
        NodeDef {
            id: id.into(),
            row: "r".into(),
            column: "c".into(),
            label: Some(format!("Node {id}")),
            secondary_label: None,
            color: None,
            categories: Vec::new(),
            group_category: None,
            group_dimension_values: Vec::new(),
            indicator_color: None,
            icon: None,
            indicator_icon: None,
            x_percentage: None,
            y_percentage: None,
        }
    }

    fn one_cell_spec(node_count: usize) -> ChartSpec {
        let mut spec = ChartSpec::new(
            vec![RowDef {
                id: "r".into(),
                label: None,
            }],
            vec![ColumnDef {
                id: "c".into(),
                label: None,
            }],
        );
        spec.nodes = (0..node_count).map(|i| node(&i.to_string())).collect();
        spec
    }

    /// Cell content sized for an exact 3x3 grid with the default node size.
    fn three_by_three_content(config: &LayoutConfig) -> Rect {
        let pack = &config.pack;
        let node_width =
            pack.indicator_width + pack.icon_width + pack.maximum_label_width + pack.label_padding * 2.0;
        let node_height = pack.node_height;
        let gap = pack.node_gap;
        Rect::new(
            0.0,
            0.0,
            3.0 * node_width + 2.0 * gap,
            3.0 * node_height + 2.0 * gap,
        )
    }

    #[test]
    fn capacity_matches_cell_size() {
        let config = fast_config();
        let spec = one_cell_spec(4);
        let (index, _) = DataIndex::build(&spec);
        let content = three_by_three_content(&config);
        let plan = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        assert_eq!(plan.cells[0].rows, 3);
        assert_eq!(plan.cells[0].columns, 3);
        assert!(!plan.cells[0].overflow);
    }

    #[test]
    fn ten_nodes_in_three_by_three_overflow() {
        let config = fast_config();
        let spec = one_cell_spec(10);
        let (index, _) = DataIndex::build(&spec);
        let content = three_by_three_content(&config);
        let plan = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        let cell = &plan.cells[0];
        assert!(cell.overflow);
        assert_eq!(cell.visible_slots(), 8);
        assert_eq!(cell.overflowed(), 2);
    }

    #[test]
    fn overflow_iff_count_exceeds_capacity() {
        let config = fast_config();
        let content = three_by_three_content(&config);
        for count in [8, 9, 10] {
            let spec = one_cell_spec(count);
            let (index, _) = DataIndex::build(&spec);
            let plan = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
            assert_eq!(plan.cells[0].overflow, count > 9, "count {count}");
        }
    }

    #[test]
    fn packing_is_deterministic() {
        let config = fast_config();
        let spec = one_cell_spec(7);
        let (index, _) = DataIndex::build(&spec);
        let content = three_by_three_content(&config);
        let a = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        let b = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.node_width, b.node_width);
    }

    #[test]
    fn priority_passes_precede_original_order() {
        let config = fast_config();
        let mut spec = one_cell_spec(4);
        spec.selection = vec!["2".into()];
        spec.highlighted_categories = vec!["hot".into()];
        spec.nodes[3].categories = vec!["hot".into()];
        let (index, _) = DataIndex::build(&spec);
        let content = three_by_three_content(&config);
        let plan = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        let ids: Vec<&str> = plan.cells[0]
            .ordered
            .iter()
            .map(|&i| index.nodes[i].def.id.as_str())
            .collect();
        // highlighted ("3"), then selected ("2"), then the rest in input order.
        assert_eq!(ids, vec!["3", "2", "0", "1"]);
    }

    #[test]
    fn no_room_means_zero_capacity() {
        let config = fast_config();
        let spec = one_cell_spec(3);
        let (index, _) = DataIndex::build(&spec);
        let tiny = Rect::new(0.0, 0.0, 10.0, 6.0);
        let plan = compute_pack(&spec, &index, &[tiny], &Theme::light(), &config);
        assert_eq!(plan.cells[0].capacity(), 0);
        assert_eq!(plan.cells[0].visible_slots(), 0);
    }

    #[test]
    fn positioned_nodes_do_not_take_slots() {
        let config = fast_config();
        let mut spec = one_cell_spec(3);
        spec.nodes[0].x_percentage = Some(0.5);
        spec.nodes[0].y_percentage = Some(0.5);
        let (index, _) = DataIndex::build(&spec);
        let content = three_by_three_content(&config);
        let plan = compute_pack(&spec, &index, &[content], &Theme::light(), &config);
        assert_eq!(plan.cells[0].ordered.len(), 2);
        assert_eq!(plan.cells[0].positioned, vec![0]);
    }

    #[test]
    fn slot_rects_advance_row_major() {
        let content = Rect::new(10.0, 20.0, 300.0, 300.0);
        let r0 = slot_rect(content, 3, 50.0, 20.0, 4.0, 0);
        let r1 = slot_rect(content, 3, 50.0, 20.0, 4.0, 1);
        let r3 = slot_rect(content, 3, 50.0, 20.0, 4.0, 3);
        assert_eq!(r0.x, 10.0);
        assert_eq!(r1.x, 10.0 + 54.0);
        assert_eq!(r1.y, r0.y);
        assert_eq!(r3.x, 10.0);
        assert_eq!(r3.y, 20.0 + 24.0);
    }
}
