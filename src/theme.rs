use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_text_color: String,
    pub node_border_color: String,
    pub selection_color: String,
    pub highlight_color: String,
    pub header_text_color: String,
    pub overflow_color: String,
    pub other_group_color: String,
    pub drawer_background: String,
    pub drawer_scrim: String,
    pub group_palette: Vec<String>,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_text_color: "#1C2430".to_string(),
            node_border_color: "#C7D2E5".to_string(),
            selection_color: "#2563EB".to_string(),
            highlight_color: "#F59E0B".to_string(),
            header_text_color: "#47546A".to_string(),
            overflow_color: "#7A8AA6".to_string(),
            other_group_color: "#94A3B8".to_string(),
            drawer_background: "#FFFFFF".to_string(),
            drawer_scrim: "rgba(28, 36, 48, 0.35)".to_string(),
            group_palette: vec![
                "#6366F1".to_string(),
                "#F59E0B".to_string(),
                "#10B981".to_string(),
                "#EF4444".to_string(),
                "#8B5CF6".to_string(),
                "#06B6D4".to_string(),
                "#EC4899".to_string(),
                "#84CC16".to_string(),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#0F1520".to_string(),
            node_fill: "#1B2433".to_string(),
            node_text_color: "#E4EAF4".to_string(),
            node_border_color: "#32405A".to_string(),
            selection_color: "#60A5FA".to_string(),
            highlight_color: "#FBBF24".to_string(),
            header_text_color: "#9AA8C0".to_string(),
            overflow_color: "#8A97AE".to_string(),
            other_group_color: "#64748B".to_string(),
            drawer_background: "#141C2A".to_string(),
            drawer_scrim: "rgba(4, 8, 14, 0.55)".to_string(),
            group_palette: vec![
                "#818CF8".to_string(),
                "#FBBF24".to_string(),
                "#34D399".to_string(),
                "#F87171".to_string(),
                "#A78BFA".to_string(),
                "#22D3EE".to_string(),
                "#F472B6".to_string(),
                "#A3E635".to_string(),
            ],
        }
    }

    /// Color for a group bubble: explicit color wins, then the palette slot
    /// for its ordinal. The synthetic "other" bucket always takes the
    /// fallback color.
    pub fn group_color(&self, explicit: Option<&str>, ordinal: usize, is_other: bool) -> String {
        if is_other {
            return self.other_group_color.clone();
        }
        if let Some(color) = explicit {
            return color.to_string();
        }
        if self.group_palette.is_empty() {
            return self.other_group_color.clone();
        }
        self.group_palette[ordinal % self.group_palette.len()].clone()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
