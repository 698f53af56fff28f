use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

// Advance used for characters outside the ASCII table, in em.
const NON_ASCII_ADVANCE_EM: f32 = 0.56;

/// Width of `text` in pixels using the first installed face of `font_family`.
///
/// Returns `None` when no matching face is installed.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, bool), Option<FaceMetrics>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = (normalize_family_key(font_family), bold);
        if !self.faces.contains_key(&key) {
            let metrics = self.load_metrics(font_family, bold);
            self.faces.insert(key.clone(), metrics);
        }
        let metrics = self.faces.get(&key)?.as_ref()?;
        Some(metrics.width(text, font_size))
    }

    fn load_metrics(&mut self, font_family: &str, bold: bool) -> Option<FaceMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(*name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|face| FaceMetrics::from_face(&face))
            })
            .flatten()
    }
}

/// Horizontal advances for the ASCII range of one face.
struct FaceMetrics {
    units_per_em: f32,
    ascii_advances: [u16; 128],
}

impl FaceMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Self {
            units_per_em: face.units_per_em().max(1) as f32,
            ascii_advances,
        }
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * NON_ASCII_ADVANCE_EM;
        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                let advance = if ch.is_ascii() {
                    self.ascii_advances[ch as usize]
                } else {
                    0
                };
                if advance == 0 {
                    fallback
                } else {
                    advance as f32 * scale
                }
            })
            .sum::<f32>()
            .max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif", false), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif", true), Some(0.0));
    }

    #[test]
    fn face_metrics_fall_back_for_missing_glyphs() {
        let metrics = FaceMetrics {
            units_per_em: 1000.0,
            ascii_advances: [500; 128],
        };
        assert!((metrics.width("ab", 20.0) - 20.0).abs() < 1e-4);
        assert!((metrics.width("\u{4e2d}", 20.0) - 20.0 * NON_ASCII_ADVANCE_EM).abs() < 1e-4);
        assert!((metrics.width("a\nb", 20.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn family_key_is_case_insensitive() {
        assert_eq!(normalize_family_key(" Arial "), "arial");
        assert_eq!(normalize_family_key(""), "sans-serif");
    }
}
