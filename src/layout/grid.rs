use crate::config::{GridConfig, LayoutConfig};
use crate::index::DataIndex;
use crate::ir::ChartSpec;
use crate::theme::Theme;

use super::text::{measure_label, truncate_to_width};
use super::types::{HeaderLayout, Rect};

/// Measures the header bands and returns them together with the remaining
/// grid content rect. A band that would take more than its configured share
/// of the canvas is omitted and its space reclaimed.
pub(super) fn compute_headers(
    spec: &ChartSpec,
    index: &DataIndex,
    canvas: Rect,
    theme: &Theme,
    config: &LayoutConfig,
) -> (HeaderLayout, Rect) {
    let grid = &config.grid;
    let mut headers = HeaderLayout::none(index.row_count(), index.column_count());

    if let Some(title) = spec.title.as_deref().filter(|t| !t.trim().is_empty()) {
        let block = measure_label(title, theme, config);
        let band = block.height + grid.title_padding * 2.0;
        if band <= canvas.height * grid.max_header_share {
            headers.title_height = band;
            headers.title = Some(block);
        }
    }

    let has_column_labels = spec.columns.iter().any(|column| column.label.is_some());
    if has_column_labels {
        let band = theme.font_size * config.label_line_height + grid.header_padding * 2.0;
        if band <= canvas.height * grid.max_header_share {
            headers.column_band_height = band;
        }
    }

    let has_row_labels = spec.rows.iter().any(|row| row.label.is_some());
    if has_row_labels {
        let max_band = canvas.width * grid.max_header_share;
        let widest = spec
            .rows
            .iter()
            .filter_map(|row| row.label.as_deref())
            .map(|label| measure_label(label, theme, config).width)
            .fold(0.0, f32::max);
        headers.row_band_width = (widest + grid.header_padding * 2.0).min(max_band);
    }

    let content = Rect::new(
        canvas.x + headers.row_band_width,
        canvas.y + headers.title_height + headers.column_band_height,
        (canvas.width - headers.row_band_width).max(0.0),
        (canvas.height - headers.title_height - headers.column_band_height).max(0.0),
    );

    // Labels are truncated against the band extents that survived.
    if headers.column_band_height > 0.0 && index.column_count() > 0 {
        let per_column = content.width / index.column_count() as f32;
        headers.column_labels = spec
            .columns
            .iter()
            .map(|column| {
                column.label.as_deref().map(|label| {
                    let fitted = truncate_to_width(
                        label,
                        per_column - grid.header_padding * 2.0,
                        theme,
                        config,
                    );
                    measure_label(&fitted, theme, config)
                })
            })
            .collect();
    }
    if headers.row_band_width > 0.0 {
        let max_width = headers.row_band_width - grid.header_padding * 2.0;
        headers.row_labels = spec
            .rows
            .iter()
            .map(|row| {
                row.label.as_deref().map(|label| {
                    let fitted = truncate_to_width(label, max_width, theme, config);
                    measure_label(&fitted, theme, config)
                })
            })
            .collect();
    }

    (headers, content)
}

/// Splits an axis extent among `count` tracks. With a maximized track, every
/// other track is compressed so they jointly take at most a third of the
/// axis; the maximized track receives the remainder.
fn axis_extents(total: f32, count: usize, maximized: Option<usize>, minimum: f32) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    let uniform = total / count as f32;
    let Some(max_index) = maximized.filter(|_| count > 1) else {
        return vec![uniform; count];
    };
    let minimized = (total / (3.0 * (count - 1) as f32)).min(minimum);
    let remainder = total - minimized * (count - 1) as f32;
    (0..count)
        .map(|idx| if idx == max_index { remainder } else { minimized })
        .collect()
}

/// Cumulative track edges snapped to whole units. Adjacent rects share the
/// rounded edge, so the tracks tile the span without seams.
fn rounded_edges(origin: f32, extents: &[f32]) -> Vec<f32> {
    let mut edges = Vec::with_capacity(extents.len() + 1);
    let mut cursor = origin;
    edges.push(cursor.round());
    for extent in extents {
        cursor += extent;
        edges.push(cursor.round());
    }
    edges
}

/// Row-major outer cell rects tiling `content`. Row 0 is the bottom row;
/// y-offsets run top-down from the last row index.
pub(super) fn compute_grid(
    content: Rect,
    row_count: usize,
    column_count: usize,
    maximized_row: Option<usize>,
    maximized_column: Option<usize>,
    config: &GridConfig,
) -> Vec<Rect> {
    if row_count == 0 || column_count == 0 {
        return Vec::new();
    }
    let row_extents = axis_extents(
        content.height,
        row_count,
        maximized_row,
        config.minimum_cell_size,
    );
    let column_extents = axis_extents(
        content.width,
        column_count,
        maximized_column,
        config.minimum_cell_size,
    );

    // Vertical edges run top-down, so reverse the bottom-to-top row extents
    // before accumulating.
    let reversed_rows: Vec<f32> = row_extents.iter().rev().copied().collect();
    let y_edges = rounded_edges(content.y, &reversed_rows);
    let x_edges = rounded_edges(content.x, &column_extents);

    let mut rects = Vec::with_capacity(row_count * column_count);
    for row in 0..row_count {
        // Row `row` is the `row_count - 1 - row`-th band from the top.
        let band = row_count - 1 - row;
        let y = y_edges[band];
        let height = y_edges[band + 1] - y;
        for column in 0..column_count {
            let x = x_edges[column];
            let width = x_edges[column + 1] - x;
            rects.push(Rect::new(x, y, width, height));
        }
    }
    rects
}
