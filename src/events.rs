use serde::Serialize;
use serde_json::Value;

use crate::ir::{CellMaximize, ChartSpec, DrawerRef, SelectionMode};

/// Events raised back to the host. Layout failures never surface here; the
/// stream only carries state changes the host may want to persist or react
/// to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ChartEvent {
    #[serde(rename_all = "camelCase")]
    OptionChange { key: String, value: Value },
    #[serde(rename_all = "camelCase")]
    SelectionChange { selected: Vec<String> },
    RenderRequested,
}

impl ChartEvent {
    pub fn option_cleared(key: &str) -> Self {
        Self::OptionChange {
            key: key.to_string(),
            value: Value::Null,
        }
    }

    pub fn option_set(key: &str, value: impl Into<Value>) -> Self {
        Self::OptionChange {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Toggles row maximization. No-op (no events) when cell maximize is off or
/// the row id is unknown; grouping across cells clears instead of sets, since
/// that mode cannot keep a maximized axis.
pub fn toggle_row_maximize(spec: &mut ChartSpec, row_id: &str) -> Vec<ChartEvent> {
    toggle_maximize(spec, row_id, Axis::Row)
}

pub fn toggle_column_maximize(spec: &mut ChartSpec, column_id: &str) -> Vec<ChartEvent> {
    toggle_maximize(spec, column_id, Axis::Column)
}

enum Axis {
    Row,
    Column,
}

fn toggle_maximize(spec: &mut ChartSpec, id: &str, axis: Axis) -> Vec<ChartEvent> {
    if spec.cell_maximize == CellMaximize::Off {
        return Vec::new();
    }
    let known = match axis {
        Axis::Row => spec.rows.iter().any(|row| row.id == id),
        Axis::Column => spec.columns.iter().any(|column| column.id == id),
    };
    if !known {
        return Vec::new();
    }
    let (slot, key) = match axis {
        Axis::Row => (&mut spec.maximized_row, "maximizedRow"),
        Axis::Column => (&mut spec.maximized_column, "maximizedColumn"),
    };
    let event = if slot.as_deref() == Some(id) {
        *slot = None;
        ChartEvent::option_cleared(key)
    } else {
        *slot = Some(id.to_string());
        ChartEvent::option_set(key, id)
    };
    vec![event, ChartEvent::RenderRequested]
}

/// Opens the drawer on a group. Closes any other open drawer implicitly;
/// at most one is active at a time.
pub fn open_drawer(spec: &mut ChartSpec, group_id: &str) -> Vec<ChartEvent> {
    if spec
        .drawer
        .as_ref()
        .is_some_and(|drawer| drawer.id == group_id)
    {
        return Vec::new();
    }
    spec.drawer = Some(DrawerRef {
        id: group_id.to_string(),
    });
    vec![
        ChartEvent::option_set("drawer", group_id),
        ChartEvent::RenderRequested,
    ]
}

pub fn close_drawer(spec: &mut ChartSpec) -> Vec<ChartEvent> {
    if spec.drawer.take().is_none() {
        return Vec::new();
    }
    vec![
        ChartEvent::option_cleared("drawer"),
        ChartEvent::RenderRequested,
    ]
}

/// Applies a selection gesture under the configured selection mode and
/// reports the resulting selection.
pub fn select(spec: &mut ChartSpec, node_id: &str) -> Vec<ChartEvent> {
    match spec.selection_mode {
        SelectionMode::None => return Vec::new(),
        SelectionMode::Single => {
            if spec.selection.len() == 1 && spec.selection[0] == node_id {
                spec.selection.clear();
            } else {
                spec.selection = vec![node_id.to_string()];
            }
        }
        SelectionMode::Multiple => {
            if let Some(pos) = spec.selection.iter().position(|id| id == node_id) {
                spec.selection.remove(pos);
            } else {
                spec.selection.push(node_id.to_string());
            }
        }
    }
    vec![
        ChartEvent::SelectionChange {
            selected: spec.selection.clone(),
        },
        ChartEvent::RenderRequested,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColumnDef, RowDef};

    fn spec() -> ChartSpec {
        ChartSpec::new(
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
            vec![ColumnDef {
                id: "c1".into(),
                label: None,
            }],
        )
    }

    #[test]
    fn toggle_sets_then_clears() {
        let mut spec = spec();
        let events = toggle_row_maximize(&mut spec, "r1");
        assert_eq!(spec.maximized_row.as_deref(), Some("r1"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ChartEvent::RenderRequested);

        let events = toggle_row_maximize(&mut spec, "r1");
        assert_eq!(spec.maximized_row, None);
        assert_eq!(events[0], ChartEvent::option_cleared("maximizedRow"));
    }

    #[test]
    fn unknown_row_is_ignored() {
        let mut spec = spec();
        assert!(toggle_row_maximize(&mut spec, "nope").is_empty());
        assert_eq!(spec.maximized_row, None);
    }

    #[test]
    fn maximize_off_disables_toggle() {
        let mut spec = spec();
        spec.cell_maximize = CellMaximize::Off;
        assert!(toggle_row_maximize(&mut spec, "r1").is_empty());
    }

    #[test]
    fn single_selection_replaces() {
        let mut spec = spec();
        spec.selection_mode = SelectionMode::Single;
        select(&mut spec, "a");
        select(&mut spec, "b");
        assert_eq!(spec.selection, vec!["b".to_string()]);
    }

    #[test]
    fn multiple_selection_toggles_membership() {
        let mut spec = spec();
        spec.selection_mode = SelectionMode::Multiple;
        select(&mut spec, "a");
        select(&mut spec, "b");
        select(&mut spec, "a");
        assert_eq!(spec.selection, vec!["b".to_string()]);
    }

    #[test]
    fn drawer_open_is_idempotent() {
        let mut spec = spec();
        assert_eq!(open_drawer(&mut spec, "g1").len(), 2);
        assert!(open_drawer(&mut spec, "g1").is_empty());
        assert_eq!(close_drawer(&mut spec).len(), 2);
        assert!(close_drawer(&mut spec).is_empty());
    }
}
