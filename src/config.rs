use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Lower bound for a minimized row height / column width.
    pub minimum_cell_size: f32,
    /// Band reserved for the chart title when one is present.
    pub title_padding: f32,
    /// Padding between a header label and the grid content.
    pub header_padding: f32,
    /// Largest share of the content rect a header band may take before its
    /// label is dropped and the space reclaimed.
    pub max_header_share: f32,
    /// Inset applied to every cell rect before nodes are packed into it.
    pub cell_padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            minimum_cell_size: 48.0,
            title_padding: 8.0,
            header_padding: 6.0,
            max_header_share: 0.25,
            cell_padding: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    /// Status indicator strip at the leading edge of a node.
    pub indicator_width: f32,
    pub icon_width: f32,
    pub node_height: f32,
    /// Gap between packed nodes, both axes.
    pub node_gap: f32,
    /// Horizontal padding inside a node around its label.
    pub label_padding: f32,
    /// Label clamp for the fixed truncation policy.
    pub maximum_label_width: f32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            indicator_width: 4.0,
            icon_width: 16.0,
            node_height: 24.0,
            node_gap: 4.0,
            label_padding: 6.0,
            maximum_label_width: 104.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Gap subtracted from every bubble side after scaling.
    pub bubble_gap: f32,
    /// Base gravity strength per simulation step.
    pub gravity: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    /// Share of the canvas area the across-cells bubbles may cover in total.
    pub across_fill_ratio: f32,
    /// Smallest bubble side that still renders a count label.
    pub min_bubble_side: f32,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            bubble_gap: 6.0,
            gravity: 0.08,
            alpha_decay: 0.98,
            alpha_min: 0.005,
            across_fill_ratio: 0.22,
            min_bubble_side: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawerConfig {
    /// Margin between the drawer overlay and the canvas edge.
    pub margin: f32,
    pub header_height: f32,
    pub content_padding: f32,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            margin: 32.0,
            header_height: 36.0,
            content_padding: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Fallback duration when the spec does not carry one, milliseconds.
    pub default_duration: f32,
    /// Duration of the whole-scene fade used when element matching is not
    /// possible.
    pub fade_replace_duration: f32,
    /// Scale applied to a node flying into a bubble or overflow slot at the
    /// end of its delete tween.
    pub collapse_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_duration: 300.0,
            fade_replace_duration: 200.0,
            collapse_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub label_line_height: f32,
    /// When set, label widths come from the calibrated per-character table
    /// instead of the font database. Deterministic across machines, used by
    /// the test suite.
    pub fast_text_metrics: bool,
    pub grid: GridConfig,
    pub pack: PackConfig,
    pub group: GroupConfig,
    pub drawer: DrawerConfig,
    pub animation: AnimationConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_line_height: 1.4,
            fast_text_metrics: false,
            grid: GridConfig::default(),
            pack: PackConfig::default(),
            group: GroupConfig::default(),
            drawer: DrawerConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    minimum_cell_size: Option<f32>,
    node_gap: Option<f32>,
    maximum_label_width: Option<f32>,
    bubble_gap: Option<f32>,
    fast_text_metrics: Option<bool>,
}

/// Loads the tuning config, `Config::default()` when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(name) = parsed.theme.as_deref() {
        match name {
            "dark" => config.theme = Theme::dark(),
            _ => config.theme = Theme::light(),
        }
    }
    if let Some(family) = parsed.font_family {
        config.theme.font_family = family;
    }
    if let Some(size) = parsed.font_size {
        config.theme.font_size = size;
    }
    if let Some(overrides) = parsed.layout {
        if let Some(v) = overrides.minimum_cell_size {
            config.layout.grid.minimum_cell_size = v;
        }
        if let Some(v) = overrides.node_gap {
            config.layout.pack.node_gap = v;
        }
        if let Some(v) = overrides.maximum_label_width {
            config.layout.pack.maximum_label_width = v;
        }
        if let Some(v) = overrides.bubble_gap {
            config.layout.group.bubble_gap = v;
        }
        if let Some(v) = overrides.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = LayoutConfig::default();
        assert!(config.grid.minimum_cell_size > 0.0);
        assert!(config.group.alpha_decay < 1.0);
        assert!(config.group.alpha_min > 0.0);
        assert!(config.pack.node_height > 0.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).expect("no path should succeed");
        assert_eq!(
            config.layout.grid.minimum_cell_size,
            GridConfig::default().minimum_cell_size
        );
    }
}
