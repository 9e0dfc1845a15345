use crate::config::LayoutConfig;
use crate::index::DataIndex;
use crate::theme::Theme;

use super::pack::slot_rect;
use super::text::measure_label;
use super::types::{DrawerLayout, GroupBubble, Rect};

/// Lays out the overlay revealing one group's individual nodes. The drawer
/// is centered on the canvas; members pack into a scrollable grid reusing
/// the chart-wide node size.
pub(super) fn compute_drawer(
    subject: &GroupBubble,
    index: &DataIndex,
    canvas: Rect,
    node_width: f32,
    node_height: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> DrawerLayout {
    let drawer = &config.drawer;
    let rect = canvas.inset(drawer.margin);
    let header = Rect::new(rect.x, rect.y, rect.width, drawer.header_height.min(rect.height));
    let content = Rect::new(
        rect.x,
        rect.y + header.height,
        rect.width,
        (rect.height - header.height).max(0.0),
    )
    .inset(drawer.content_padding);

    let gap = config.pack.node_gap;
    let columns = if content.width > 0.0 && node_width > 0.0 {
        (((content.width + gap) / (node_width + gap)).floor() as usize).max(1)
    } else {
        1
    };

    let mut nodes = Vec::with_capacity(subject.member_ids.len());
    for (slot, member_id) in subject.member_ids.iter().enumerate() {
        let Some(node_index) = index.node_index(member_id) else {
            continue;
        };
        let rect = slot_rect(content, columns, node_width, node_height, gap, slot);
        nodes.push(super::build_node_layout(
            &index.nodes[node_index],
            index,
            rect,
            theme,
            config,
        ));
    }

    let rows_used = subject.member_ids.len().div_ceil(columns);
    let scroll_height = if rows_used == 0 {
        0.0
    } else {
        rows_used as f32 * (node_height + gap) - gap
    };

    DrawerLayout {
        subject: subject.key.clone(),
        rect,
        header,
        content,
        title: Some(measure_label(&subject.key, theme, config)),
        nodes,
        scroll_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ChartSpec, ColumnDef, NodeDef, RowDef};

    fn spec_with_members(count: usize) -> ChartSpec {
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
        spec.nodes = (0..count)
            .map(|i| NodeDef {
                id: format!("n{i}"),
                row: "r".into(),
                column: "c".into(),
                label: Some(format!("Member {i}")),
                secondary_label: None,
                color: None,
                categories: Vec::new(),
                group_category: Some("g".into()),
                group_dimension_values: Vec::new(),
                indicator_color: None,
                icon: None,
                indicator_icon: None,
                x_percentage: None,
                y_percentage: None,
            })
            .collect();
        spec
    }

    fn bubble(member_ids: Vec<String>) -> GroupBubble {
        GroupBubble {
            key: "g".into(),
            is_other: false,
            cell: None,
            center: (100.0, 100.0),
            side: 40.0,
            color: "#6366F1".into(),
            member_ids,
            highlighted_count: 0,
            label: None,
        }
    }

    #[test]
    fn drawer_fills_canvas_minus_margin() {
        let spec = spec_with_members(3);
        let (index, _) = DataIndex::build(&spec);
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
        let b = bubble(vec!["n0".into(), "n1".into(), "n2".into()]);
        let drawer = compute_drawer(&b, &index, canvas, 120.0, 24.0, &Theme::light(), &config);
        assert_eq!(drawer.rect.x, config.drawer.margin);
        assert_eq!(drawer.rect.width, 800.0 - config.drawer.margin * 2.0);
        assert_eq!(drawer.nodes.len(), 3);
        assert_eq!(drawer.subject, "g");
    }

    #[test]
    fn many_members_produce_scroll_extent() {
        let spec = spec_with_members(60);
        let (index, _) = DataIndex::build(&spec);
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        // Narrow canvas: one column of members, sixty rows.
        let canvas = Rect::new(0.0, 0.0, 260.0, 300.0);
        let member_ids: Vec<String> = (0..60).map(|i| format!("n{i}")).collect();
        let drawer = compute_drawer(
            &bubble(member_ids),
            &index,
            canvas,
            150.0,
            24.0,
            &Theme::light(),
            &config,
        );
        assert!(drawer.scroll_height > drawer.content.height);
        assert_eq!(drawer.nodes.len(), 60);
    }

    #[test]
    fn unknown_members_are_skipped() {
        let spec = spec_with_members(1);
        let (index, _) = DataIndex::build(&spec);
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let canvas = Rect::new(0.0, 0.0, 400.0, 400.0);
        let drawer = compute_drawer(
            &bubble(vec!["n0".into(), "ghost".into()]),
            &index,
            canvas,
            120.0,
            24.0,
            &Theme::light(),
            &config,
        );
        assert_eq!(drawer.nodes.len(), 1);
    }
}
