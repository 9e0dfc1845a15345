use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Misuse that is rejected synchronously at configuration time. Structural
/// emptiness (no rows, no columns) is not an error; the layout short-circuits
/// to an empty scene instead.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("duplicate row id `{0}`")]
    DuplicateRow(String),
    #[error("duplicate column id `{0}`")]
    DuplicateColumn(String),
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("otherThreshold must be within 0..=1, got {0}")]
    ThresholdOutOfRange(f32),
    #[error("animationDuration must be finite and non-negative, got {0}")]
    BadDuration(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDef {
    pub row: String,
    pub column: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub count_label: Option<String>,
    #[serde(default)]
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    pub id: String,
    pub row: String,
    pub column: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub secondary_label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub group_category: Option<String>,
    #[serde(default)]
    pub group_dimension_values: Vec<String>,
    #[serde(default)]
    pub indicator_color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub indicator_icon: Option<String>,
    /// Fractional position inside the owning cell. A node carrying both
    /// percentages bypasses the packing grid.
    #[serde(default)]
    pub x_percentage: Option<f32>,
    #[serde(default)]
    pub y_percentage: Option<f32>,
}

impl NodeDef {
    pub fn is_positioned(&self) -> bool {
        self.x_percentage.is_some() && self.y_percentage.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBehavior {
    #[default]
    None,
    WithinCell,
    AcrossCells,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    #[default]
    None,
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightMatch {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellMaximize {
    #[default]
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellContent {
    #[default]
    Auto,
    Counts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelTruncation {
    /// Clamp every label to the configured maximum width.
    #[default]
    Fixed,
    /// Measure the widest label of the most populated cell and only truncate
    /// when that width does not fit the per-node space.
    IfRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawerRef {
    pub id: String,
}

fn default_true() -> bool {
    true
}

fn default_duration() -> f32 {
    300.0
}

/// The full option surface consumed as one configuration object. Unspecified
/// keys take the documented defaults. The spec is immutable once built; every
/// layout pass derives fresh state from it instead of writing caches back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(default)]
    pub title: Option<String>,
    pub rows: Vec<RowDef>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub cells: Vec<CellDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,

    #[serde(default)]
    pub group_behavior: GroupBehavior,
    #[serde(default)]
    pub group_attributes: Vec<String>,
    #[serde(default)]
    pub other_color: Option<String>,
    #[serde(default)]
    pub other_threshold: f32,

    #[serde(default)]
    pub maximized_row: Option<String>,
    #[serde(default)]
    pub maximized_column: Option<String>,

    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default)]
    pub selection_mode: SelectionMode,
    #[serde(default)]
    pub highlighted_categories: Vec<String>,
    #[serde(default)]
    pub highlight_match: HighlightMatch,
    #[serde(default)]
    pub hidden_categories: Vec<String>,

    #[serde(default)]
    pub drawer: Option<DrawerRef>,

    #[serde(default)]
    pub cell_maximize: CellMaximize,
    #[serde(default)]
    pub cell_content: CellContent,
    #[serde(default)]
    pub label_truncation: LabelTruncation,

    #[serde(default = "default_true")]
    pub animation_on_display: bool,
    #[serde(default = "default_true")]
    pub animation_on_data_change: bool,
    #[serde(default = "default_duration")]
    pub animation_duration: f32,
}

impl ChartSpec {
    /// Minimal spec with empty structure, mainly for tests and incremental
    /// construction.
    pub fn new(rows: Vec<RowDef>, columns: Vec<ColumnDef>) -> Self {
        Self {
            title: None,
            rows,
            columns,
            cells: Vec::new(),
            nodes: Vec::new(),
            group_behavior: GroupBehavior::default(),
            group_attributes: Vec::new(),
            other_color: None,
            other_threshold: 0.0,
            maximized_row: None,
            maximized_column: None,
            selection: Vec::new(),
            selection_mode: SelectionMode::default(),
            highlighted_categories: Vec::new(),
            highlight_match: HighlightMatch::default(),
            hidden_categories: Vec::new(),
            drawer: None,
            cell_maximize: CellMaximize::default(),
            cell_content: CellContent::default(),
            label_truncation: LabelTruncation::default(),
            animation_on_display: true,
            animation_on_data_change: true,
            animation_duration: default_duration(),
        }
    }

    /// Rejects programmer-facing misuse. Referential inconsistencies (a node
    /// or maximize selection pointing at a missing row/column) are *not*
    /// rejected here; the index self-heals those per the error-handling
    /// policy.
    pub fn validate(&self) -> Result<(), SpecError> {
        let mut seen = HashSet::new();
        for row in &self.rows {
            if !seen.insert(row.id.as_str()) {
                return Err(SpecError::DuplicateRow(row.id.clone()));
            }
        }
        seen.clear();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) {
                return Err(SpecError::DuplicateColumn(column.id.clone()));
            }
        }
        seen.clear();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(SpecError::DuplicateNode(node.id.clone()));
            }
        }
        if !(0.0..=1.0).contains(&self.other_threshold) || !self.other_threshold.is_finite() {
            return Err(SpecError::ThresholdOutOfRange(self.other_threshold));
        }
        if !self.animation_duration.is_finite() || self.animation_duration < 0.0 {
            return Err(SpecError::BadDuration(self.animation_duration));
        }
        Ok(())
    }

    /// Group key of a node, if grouping would place it anywhere specific.
    /// Explicit category wins; otherwise the attribute-selected dimension
    /// values joined in order. Nodes with no key land in the "other" bucket.
    pub fn group_key_of(&self, node: &NodeDef) -> Option<String> {
        if let Some(category) = &node.group_category {
            return Some(category.clone());
        }
        if node.group_dimension_values.is_empty() {
            return None;
        }
        let take = if self.group_attributes.is_empty() {
            node.group_dimension_values.len()
        } else {
            self.group_attributes
                .len()
                .min(node.group_dimension_values.len())
        };
        Some(node.group_dimension_values[..take].join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_nodes(nodes: Vec<NodeDef>) -> ChartSpec {
        let mut spec = ChartSpec::new(
            vec![RowDef {
                id: "r1".into(),
                label: None,
            }],
            vec![ColumnDef {
                id: "c1".into(),
                label: None,
            }],
        );
        spec.nodes = nodes;
        spec
    }

    fn node(id: &str) -> NodeDef {
        NodeDef {
            id: id.into(),
            row: "r1".into(),
            column: "c1".into(),
            label: None,
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

    #[test]
    fn defaults_from_minimal_json() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{"rows": [{"id": "r1"}], "columns": [{"id": "c1"}, {"id": "c2"}]}"#,
        )
        .expect("minimal spec should deserialize");
        assert_eq!(spec.group_behavior, GroupBehavior::None);
        assert_eq!(spec.selection_mode, SelectionMode::None);
        assert_eq!(spec.cell_maximize, CellMaximize::On);
        assert!(spec.animation_on_display);
        assert_eq!(spec.animation_duration, 300.0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn camel_case_keys_roundtrip() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{
                "rows": [{"id": "r1"}],
                "columns": [{"id": "c1"}],
                "groupBehavior": "acrossCells",
                "otherThreshold": 0.1,
                "maximizedRow": "r1",
                "highlightMatch": "all"
            }"#,
        )
        .expect("camelCase spec should deserialize");
        assert_eq!(spec.group_behavior, GroupBehavior::AcrossCells);
        assert_eq!(spec.other_threshold, 0.1);
        assert_eq!(spec.maximized_row.as_deref(), Some("r1"));
        assert_eq!(spec.highlight_match, HighlightMatch::All);
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let spec = spec_with_nodes(vec![node("a"), node("a")]);
        assert!(matches!(
            spec.validate(),
            Err(SpecError::DuplicateNode(id)) if id == "a"
        ));
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let mut spec = spec_with_nodes(Vec::new());
        spec.other_threshold = 1.5;
        assert!(matches!(
            spec.validate(),
            Err(SpecError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn group_key_prefers_explicit_category() {
        let spec = spec_with_nodes(Vec::new());
        let mut n = node("a");
        n.group_category = Some("alpha".into());
        n.group_dimension_values = vec!["x".into(), "y".into()];
        assert_eq!(spec.group_key_of(&n).as_deref(), Some("alpha"));
    }

    #[test]
    fn group_key_joins_selected_dimensions() {
        let mut spec = spec_with_nodes(Vec::new());
        spec.group_attributes = vec!["region".into()];
        let mut n = node("a");
        n.group_dimension_values = vec!["emea".into(), "tier-2".into()];
        assert_eq!(spec.group_key_of(&n).as_deref(), Some("emea"));

        spec.group_attributes.clear();
        assert_eq!(spec.group_key_of(&n).as_deref(), Some("emea/tier-2"));
    }
}
