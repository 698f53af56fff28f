use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    pub plot_background: String,
    pub axis_color: String,
    pub grid_color: String,
    pub label_background: String,
    pub legend_background: String,
    pub legend_border: String,
}

impl Theme {
    /// White, print-friendly theme used by every figure.
    pub fn paper() -> Self {
        Self {
            font_family: "Arial, Helvetica, DejaVu Sans, sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#1f1f1f".to_string(),
            background: "#ffffff".to_string(),
            plot_background: "#ffffff".to_string(),
            axis_color: "#444444".to_string(),
            grid_color: "rgba(0,0,0,0.1)".to_string(),
            label_background: "#ffffff".to_string(),
            legend_background: "rgba(255,255,255,0.9)".to_string(),
            legend_border: "#000000".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::paper()
    }
}

pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut channels = hex.chars().map(|ch| ch.to_digit(16).map(|v| (v * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        _ => None,
    }
}

pub fn rgb_to_hex(rgb: (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
}

/// Channel-wise mean of the given colors, truncated to integers.
/// Unparseable colors are skipped; an empty set yields the default text color.
pub fn blend_colors(colors: &[&str]) -> String {
    let parsed: Vec<(u8, u8, u8)> = colors.iter().filter_map(|c| parse_hex_color(c)).collect();
    if parsed.is_empty() {
        return "#1f1f1f".to_string();
    }
    let n = parsed.len() as u32;
    let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
    for (pr, pg, pb) in &parsed {
        r += *pr as u32;
        g += *pg as u32;
        b += *pb as u32;
    }
    rgb_to_hex(((r / n) as u8, (g / n) as u8, (b / n) as u8))
}

/// Scale every channel by `factor` (clamped to [0, 1]).
pub fn darken_color(color: &str, factor: f32) -> String {
    let Some((r, g, b)) = parse_hex_color(color) else {
        return color.to_string();
    };
    let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 1.0 };
    let scale = |v: u8| (v as f32 * factor) as u8;
    rgb_to_hex((scale(r), scale(g), scale(b)))
}

// matplotlib RdYlGn, 11 evenly spaced stops.
const RDYLGN_STOPS: [(u8, u8, u8); 11] = [
    (0xa5, 0x00, 0x26),
    (0xd7, 0x30, 0x27),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xd9, 0xef, 0x8b),
    (0xa6, 0xd9, 0x6a),
    (0x66, 0xbd, 0x63),
    (0x1a, 0x98, 0x50),
    (0x00, 0x68, 0x37),
];

/// Red-yellow-green diverging scale; `t` is clamped to [0, 1].
pub fn rdylgn(t: f32) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (RDYLGN_STOPS.len() - 1) as f32;
    let idx = (scaled.floor() as usize).min(RDYLGN_STOPS.len() - 2);
    let frac = scaled - idx as f32;
    let (a, b) = (RDYLGN_STOPS[idx], RDYLGN_STOPS[idx + 1]);
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
    rgb_to_hex((lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2)))
}

/// Pick black or white text for a background color by relative luminance.
pub fn contrast_text_color(background: &str) -> &'static str {
    let Some((r, g, b)) = parse_hex_color(background) else {
        return "#000000";
    };
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 { "#000000" } else { "#ffffff" }
}
