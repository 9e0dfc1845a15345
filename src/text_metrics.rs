use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` at `font_size` using the first matching system font.
/// `None` when no face resolves; callers fall back to the calibrated table.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn average_char_width(font_family: &str, font_size: f32) -> Option<f32> {
    if font_size <= 0.0 {
        return None;
    }
    let sample = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let width = measure_text_width(sample, font_size, font_family)?;
    Some(width / sample.chars().count() as f32)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FaceMetrics>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = family_key(font_family);
        if !self.faces.contains_key(&key) {
            let metrics = self.load_metrics(font_family);
            self.faces.insert(key.clone(), metrics);
        }
        let metrics = self.faces.get(&key)?.as_ref()?;
        let normalized = text.replace('\t', "    ");
        Some(metrics.width_of(&normalized, font_size))
    }

    fn load_metrics(&mut self, font_family: &str) -> Option<FaceMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len().max(1));
        for name in &names {
            match name.to_ascii_lowercase().as_str() {
                "serif" => families.push(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    families.push(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => families.push(Family::Monospace),
                "cursive" => families.push(Family::Cursive),
                "fantasy" => families.push(Family::Fantasy),
                _ => families.push(Family::Name(name.as_str())),
            }
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut metrics = None;
        self.db.with_face_data(id, |data, face_index| {
            if let Ok(face) = Face::parse(data, face_index) {
                metrics = Some(FaceMetrics::from_face(&face));
            }
        });
        metrics
    }
}

/// Advance widths captured at load time. ASCII is tabulated exactly; anything
/// outside that range uses the face's average advance, which keeps the
/// measurer free of self-referential face storage.
struct FaceMetrics {
    units_per_em: f32,
    ascii_advances: [u16; 128],
    average_advance: f32,
}

impl FaceMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut ascii_advances = [0u16; 128];
        let mut total = 0u32;
        let mut counted = 0u32;
        for byte in 0x20u8..0x7f {
            let ch = byte as char;
            if let Some(glyph) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                ascii_advances[byte as usize] = advance;
                if advance > 0 {
                    total += u32::from(advance);
                    counted += 1;
                }
            }
        }
        let average_advance = if counted > 0 {
            total as f32 / counted as f32
        } else {
            units_per_em * 0.56
        };
        Self {
            units_per_em,
            ascii_advances,
            average_advance,
        }
    }

    fn width_of(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = self.average_advance * scale;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                0
            };
            if advance == 0 {
                width += fallback;
            } else {
                width += advance as f32 * scale;
            }
        }
        width.max(0.0)
    }
}

fn family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
