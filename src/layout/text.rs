use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

// Bold faces run roughly this much wider than the regular width table.
const BOLD_WIDTH_FACTOR: f32 = 1.08;

pub fn measure_label(
    text: &str,
    font_size: f32,
    bold: bool,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextBlock {
    let mut lines = split_lines(text);
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| {
            text_width(
                line,
                font_size,
                bold,
                theme.font_family.as_str(),
                config.fast_text_metrics,
            )
        })
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock {
        lines,
        width,
        height,
        font_size,
        bold,
    }
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Per-character advances of a Helvetica-like sans face, in em.
    match ch {
        ' ' => 0.278,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.300,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 0.667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 0.722,
        'F' | 'T' | 'Z' => 0.611,
        'G' | 'O' | 'Q' => 0.778,
        'I' => 0.278,
        'J' => 0.500,
        'L' => 0.556,
        'M' => 0.833,
        'W' => 0.944,
        'f' | 't' => 0.278,
        'i' | 'j' | 'l' => 0.222,
        'm' => 0.833,
        'r' => 0.333,
        'w' => 0.722,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.500,
        'a'..='z' => 0.556,
        '0'..='9' => 0.556,
        '%' => 0.889,
        '@' => 1.015,
        '+' | '=' | '<' | '>' => 0.584,
        '-' => 0.333,
        _ => 0.568,
    }
}

/// Split on `<br>` tags and newlines, trimming each line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

pub(crate) fn text_width(
    text: &str,
    font_size: f32,
    bold: bool,
    font_family: &str,
    fast_metrics: bool,
) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size, bold);
    }
    text_metrics::measure_text_width(text, font_size, font_family, bold)
        .unwrap_or_else(|| fallback_text_width(text, font_size, bold))
}

fn fallback_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let width = text.chars().map(char_width_factor).sum::<f32>() * font_size;
    if bold { width * BOLD_WIDTH_FACTOR } else { width }
}
