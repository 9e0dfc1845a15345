use crate::anim::{AnimOp, AnimationPlan, DeleteTarget};
use crate::layout::Scene;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub width: f32,
    pub height: f32,
    pub rows: usize,
    pub columns: usize,
    pub node_width: Option<f32>,
    pub node_height: Option<f32>,
    pub cells: Vec<CellDump>,
    pub nodes: Vec<NodeDump>,
    pub groups: Vec<GroupDump>,
    pub overflows: Vec<OverflowDump>,
    pub drawer: Option<DrawerDump>,
}

#[derive(Debug, Serialize)]
pub struct CellDump {
    pub row: String,
    pub column: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub maximized: bool,
    pub counts_only: bool,
    pub count_label: Option<String>,
    pub visible_count: usize,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub row: String,
    pub column: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: Option<String>,
    pub highlighted: bool,
    pub selected: bool,
    pub positioned: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
    pub key: String,
    pub other: bool,
    pub cell: Option<[String; 2]>,
    pub cx: f32,
    pub cy: f32,
    pub side: f32,
    pub color: String,
    pub members: Vec<String>,
    pub highlighted: usize,
}

#[derive(Debug, Serialize)]
pub struct OverflowDump {
    pub row: String,
    pub column: String,
    pub x: f32,
    pub y: f32,
    pub hidden: usize,
}

#[derive(Debug, Serialize)]
pub struct DrawerDump {
    pub subject: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub node_count: usize,
    pub scroll_height: f32,
}

impl SceneDump {
    pub fn from_scene(scene: &Scene) -> Self {
        SceneDump {
            width: scene.canvas.width,
            height: scene.canvas.height,
            rows: scene.row_count,
            columns: scene.column_count,
            node_width: scene.node_size.map(|(w, _)| w),
            node_height: scene.node_size.map(|(_, h)| h),
            cells: scene
                .cells
                .iter()
                .map(|cell| CellDump {
                    row: cell.row_id.clone(),
                    column: cell.column_id.clone(),
                    x: cell.rect.x,
                    y: cell.rect.y,
                    width: cell.rect.width,
                    height: cell.rect.height,
                    maximized: cell.maximized,
                    counts_only: cell.counts_only,
                    count_label: cell.count_label.clone(),
                    visible_count: cell.visible_count,
                })
                .collect(),
            nodes: scene
                .nodes
                .iter()
                .map(|node| NodeDump {
                    id: node.id.clone(),
                    row: node.row_id.clone(),
                    column: node.column_id.clone(),
                    x: node.rect.x,
                    y: node.rect.y,
                    width: node.rect.width,
                    height: node.rect.height,
                    label: node.label.as_ref().map(|block| block.lines.join("\n")),
                    highlighted: node.highlighted,
                    selected: node.selected,
                    positioned: node.positioned,
                })
                .collect(),
            groups: scene
                .groups
                .iter()
                .map(|group| GroupDump {
                    key: group.key.clone(),
                    other: group.is_other,
                    cell: group
                        .cell
                        .clone()
                        .map(|(row, column)| [row, column]),
                    cx: group.center.0,
                    cy: group.center.1,
                    side: group.side,
                    color: group.color.clone(),
                    members: group.member_ids.clone(),
                    highlighted: group.highlighted_count,
                })
                .collect(),
            overflows: scene
                .overflows
                .iter()
                .map(|badge| OverflowDump {
                    row: badge.row_id.clone(),
                    column: badge.column_id.clone(),
                    x: badge.rect.x,
                    y: badge.rect.y,
                    hidden: badge.hidden_count,
                })
                .collect(),
            drawer: scene.drawer.as_ref().map(|drawer| DrawerDump {
                subject: drawer.subject.clone(),
                x: drawer.rect.x,
                y: drawer.rect.y,
                width: drawer.rect.width,
                height: drawer.rect.height,
                node_count: drawer.nodes.len(),
                scroll_height: drawer.scroll_height,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanDump {
    pub ops: Vec<OpDump>,
}

#[derive(Debug, Serialize)]
pub struct OpDump {
    pub kind: String,
    pub key: Option<String>,
    pub duration: f32,
}

impl PlanDump {
    pub fn from_plan(plan: &AnimationPlan) -> Self {
        let ops = plan
            .ops
            .iter()
            .map(|op| OpDump {
                kind: match op {
                    AnimOp::Insert { .. } => "insert".to_string(),
                    AnimOp::Move { .. } => "move".to_string(),
                    AnimOp::Recolor { .. } => "recolor".to_string(),
                    AnimOp::Delete { target, .. } => match target {
                        DeleteTarget::FadeOut => "delete".to_string(),
                        DeleteTarget::CollapseInto { .. } => "delete-collapse".to_string(),
                    },
                    AnimOp::FadeReplace { .. } => "fade-replace".to_string(),
                },
                key: op.key().map(|key| format!("{key:?}")),
                duration: op.duration(),
            })
            .collect();
        PlanDump { ops }
    }
}

pub fn write_scene_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &SceneDump::from_scene(scene))?;
    Ok(())
}
