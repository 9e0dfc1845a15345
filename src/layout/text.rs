use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::types::TextBlock;

pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| text_width(line, theme, config))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * theme.font_size * config.label_line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

/// Truncates `text` with a trailing ellipsis so it fits `max_width`. Returns
/// the text unchanged when it already fits.
pub(super) fn truncate_to_width(
    text: &str,
    max_width: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    if max_width <= 0.0 {
        return String::new();
    }
    if text_width(text, theme, config) <= max_width {
        return text.to_string();
    }
    let ellipsis = '\u{2026}';
    let mut kept = String::new();
    for ch in text.chars() {
        let mut candidate = kept.clone();
        candidate.push(ch);
        candidate.push(ellipsis);
        if text_width(&candidate, theme, config) > max_width {
            break;
        }
        kept.push(ch);
    }
    kept.push(ellipsis);
    kept
}

pub(super) fn text_width(text: &str, theme: &Theme, config: &LayoutConfig) -> f32 {
    if config.fast_text_metrics && text.is_ascii() {
        return fallback_text_width(text, theme.font_size);
    }
    text_metrics::measure_text_width(text, theme.font_size, &theme.font_family)
        .unwrap_or_else(|| fallback_text_width(text, theme.font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Coarse per-character widths, calibrated against a 13px sans-serif stack.
// Only exercised when no font database is available or fast metrics are
// forced.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 0.30,
        'i' | 'j' | 'l' | 'I' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' => 0.36,
        'm' | 'M' | 'W' | 'w' | '@' | '%' | '&' => 0.90,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.58,
        '\u{2026}' => 0.85,
        _ => 0.55,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn measure_label_counts_lines() {
        let theme = Theme::light();
        let config = fast_config();
        let block = measure_label("one\ntwo", &theme, &config);
        assert_eq!(block.lines, vec!["one", "two"]);
        assert!(
            (block.height - 2.0 * theme.font_size * config.label_line_height).abs() < 1e-3,
            "height should be two line heights"
        );
    }

    #[test]
    fn measure_label_empty_is_single_line() {
        let block = measure_label("", &Theme::light(), &fast_config());
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.width, 0.0);
    }

    #[test]
    fn truncate_keeps_short_text_intact() {
        let theme = Theme::light();
        let config = fast_config();
        assert_eq!(truncate_to_width("ok", 500.0, &theme, &config), "ok");
    }

    #[test]
    fn truncate_produces_narrower_text() {
        let theme = Theme::light();
        let config = fast_config();
        let long = "a rather long node label that cannot fit";
        let max = 60.0;
        let truncated = truncate_to_width(long, max, &theme, &config);
        assert!(truncated.ends_with('\u{2026}'));
        assert!(text_width(&truncated, &theme, &config) <= max);
    }

    #[test]
    fn truncate_zero_width_is_empty() {
        let theme = Theme::light();
        let config = fast_config();
        assert_eq!(truncate_to_width("abc", 0.0, &theme, &config), "");
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w1 = fallback_text_width("Hello", 13.0);
        let w2 = fallback_text_width("Hello", 26.0);
        assert!((w2 - w1 * 2.0).abs() < 1e-3);
    }
}
