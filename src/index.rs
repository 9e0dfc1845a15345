use std::collections::HashMap;

use crate::events::ChartEvent;
use crate::ir::{CellDef, ChartSpec, GroupBehavior, HighlightMatch, NodeDef};

/// One input node resolved against the row/column maps, with its per-render
/// flags precomputed. Hidden nodes keep their index identity but are excluded
/// from every layout count.
#[derive(Debug, Clone)]
pub struct IndexedNode {
    pub def: NodeDef,
    pub row: usize,
    pub column: usize,
    pub hidden: bool,
    pub highlighted: bool,
    pub selected: bool,
    pub group_key: Option<String>,
}

/// One grid slot. Exactly `rows * columns` of these exist per index; slots
/// without an input cell carry `def: None`.
#[derive(Debug, Clone)]
pub struct IndexedCell {
    pub row: usize,
    pub column: usize,
    pub def: Option<CellDef>,
    /// Indices into `DataIndex::nodes`, input order, hidden included.
    pub node_indices: Vec<usize>,
    pub visible_count: usize,
}

/// Fast lookups derived wholesale from a `ChartSpec`. Rebuilt on every option
/// replace; never patched in place.
#[derive(Debug, Clone)]
pub struct DataIndex {
    row_ids: Vec<String>,
    column_ids: Vec<String>,
    row_by_id: HashMap<String, usize>,
    column_by_id: HashMap<String, usize>,
    node_by_id: HashMap<String, usize>,
    pub nodes: Vec<IndexedNode>,
    /// Row-major: `row * column_count + column`.
    pub cells: Vec<IndexedCell>,
    /// Ids of nodes whose row or column did not resolve. Such nodes are
    /// dropped from layout instead of corrupting the cell index.
    pub dropped_nodes: Vec<String>,
    pub maximized_row: Option<usize>,
    pub maximized_column: Option<usize>,
    row_count: usize,
    column_count: usize,
}

impl DataIndex {
    /// Builds the index and self-heals invalid maximize selections. Each
    /// cleared selection produces an `OptionChange` notification for the
    /// host.
    pub fn build(spec: &ChartSpec) -> (Self, Vec<ChartEvent>) {
        let row_count = spec.rows.len();
        let column_count = spec.columns.len();

        let mut row_by_id = HashMap::with_capacity(row_count);
        for (idx, row) in spec.rows.iter().enumerate() {
            row_by_id.insert(row.id.clone(), idx);
        }
        let mut column_by_id = HashMap::with_capacity(column_count);
        for (idx, column) in spec.columns.iter().enumerate() {
            column_by_id.insert(column.id.clone(), idx);
        }

        let mut cells: Vec<IndexedCell> = Vec::with_capacity(row_count * column_count);
        for row in 0..row_count {
            for column in 0..column_count {
                cells.push(IndexedCell {
                    row,
                    column,
                    def: None,
                    node_indices: Vec::new(),
                    visible_count: 0,
                });
            }
        }
        for def in &spec.cells {
            if let (Some(&row), Some(&column)) =
                (row_by_id.get(&def.row), column_by_id.get(&def.column))
            {
                cells[row * column_count + column].def = Some(def.clone());
            }
        }

        let mut nodes = Vec::with_capacity(spec.nodes.len());
        let mut node_by_id = HashMap::with_capacity(spec.nodes.len());
        let mut dropped_nodes = Vec::new();
        for def in &spec.nodes {
            let (Some(&row), Some(&column)) =
                (row_by_id.get(&def.row), column_by_id.get(&def.column))
            else {
                dropped_nodes.push(def.id.clone());
                continue;
            };
            let hidden = !spec.hidden_categories.is_empty()
                && def
                    .categories
                    .iter()
                    .any(|category| spec.hidden_categories.contains(category));
            let highlighted = is_highlighted(spec, def);
            let selected = spec.selection.iter().any(|id| id == &def.id);
            let index = nodes.len();
            node_by_id.insert(def.id.clone(), index);
            cells[row * column_count + column].node_indices.push(index);
            if !hidden {
                cells[row * column_count + column].visible_count += 1;
            }
            nodes.push(IndexedNode {
                def: def.clone(),
                row,
                column,
                hidden,
                highlighted,
                selected,
                group_key: spec.group_key_of(def),
            });
        }

        let mut events = Vec::new();
        let across = spec.group_behavior == GroupBehavior::AcrossCells;
        let maximized_row = resolve_maximize(
            spec.maximized_row.as_deref(),
            &row_by_id,
            across,
            "maximizedRow",
            &mut events,
        );
        let maximized_column = resolve_maximize(
            spec.maximized_column.as_deref(),
            &column_by_id,
            across,
            "maximizedColumn",
            &mut events,
        );

        (
            Self {
                row_ids: spec.rows.iter().map(|row| row.id.clone()).collect(),
                column_ids: spec.columns.iter().map(|column| column.id.clone()).collect(),
                row_by_id,
                column_by_id,
                node_by_id,
                nodes,
                cells,
                dropped_nodes,
                maximized_row,
                maximized_column,
                row_count,
                column_count,
            },
            events,
        )
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }

    pub fn row_id(&self, index: usize) -> &str {
        &self.row_ids[index]
    }

    pub fn column_id(&self, index: usize) -> &str {
        &self.column_ids[index]
    }

    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.row_by_id.get(id).copied()
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.column_by_id.get(id).copied()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_by_id.get(id).copied()
    }

    pub fn cell(&self, row: usize, column: usize) -> &IndexedCell {
        &self.cells[row * self.column_count + column]
    }

    /// Visible node count of the fullest cell, used by the label-truncation
    /// search.
    pub fn max_cell_population(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.visible_count)
            .max()
            .unwrap_or(0)
    }
}

fn is_highlighted(spec: &ChartSpec, def: &NodeDef) -> bool {
    if spec.highlighted_categories.is_empty() {
        return false;
    }
    match spec.highlight_match {
        HighlightMatch::Any => spec
            .highlighted_categories
            .iter()
            .any(|category| def.categories.contains(category)),
        HighlightMatch::All => spec
            .highlighted_categories
            .iter()
            .all(|category| def.categories.contains(category)),
    }
}

fn resolve_maximize(
    requested: Option<&str>,
    map: &HashMap<String, usize>,
    across_cells: bool,
    key: &str,
    events: &mut Vec<ChartEvent>,
) -> Option<usize> {
    let id = requested?;
    if across_cells || !map.contains_key(id) {
        events.push(ChartEvent::option_cleared(key));
        return None;
    }
    map.get(id).copied()
}
