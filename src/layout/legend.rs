use super::axis::text_mark;
use super::*;

const SWATCH_WIDTH: f32 = 24.0;
const SWATCH_LABEL_GAP: f32 = 6.0;
const ITEM_GAP: f32 = 18.0;
const ROW_GAP: f32 = 6.0;
const LEGEND_PADDING: f32 = 8.0;

/// Lay out legend rows at the origin; each row runs left to right.
/// Use [`translate_legend`] to move the finished box into place.
pub(crate) fn build_legend(
    rows: &[Vec<(Swatch, String)>],
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> LegendLayout {
    let mut entries = Vec::new();
    let mut width: f32 = 0.0;
    let mut y = LEGEND_PADDING;

    for row in rows {
        let mut x = LEGEND_PADDING;
        let mut row_height: f32 = font_size;
        let mut row_entries = Vec::new();
        for (swatch, text) in row {
            let mut label = text_mark(
                text,
                (0.0, 0.0),
                font_size,
                true,
                TextAnchor::Start,
                &theme.text_color,
                theme,
                config,
            );
            row_height = row_height.max(label.text.height);
            let swatch_width = match swatch {
                Swatch::None => 0.0,
                _ => SWATCH_WIDTH + SWATCH_LABEL_GAP,
            };
            label.x = x + swatch_width;
            let entry_width = swatch_width + label.text.width;
            row_entries.push(LegendEntry {
                x: x + SWATCH_WIDTH / 2.0,
                y: 0.0,
                swatch: swatch.clone(),
                label,
            });
            x += entry_width + ITEM_GAP;
        }
        let center = y + row_height / 2.0;
        for mut entry in row_entries {
            entry.y = center;
            entry.label.y = center;
            entries.push(entry);
        }
        width = width.max(x - ITEM_GAP + LEGEND_PADDING);
        y += row_height + ROW_GAP;
    }

    LegendLayout {
        x: 0.0,
        y: 0.0,
        width,
        height: y - ROW_GAP + LEGEND_PADDING,
        background: theme.legend_background.clone(),
        border: theme.legend_border.clone(),
        entries,
    }
}

pub(crate) fn translate_legend(legend: &mut LegendLayout, dx: f32, dy: f32) {
    legend.x += dx;
    legend.y += dy;
    for entry in &mut legend.entries {
        entry.x += dx;
        entry.y += dy;
        entry.label.x += dx;
        entry.label.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn rows_stack_vertically_and_entries_flow_right() {
        let rows = vec![
            vec![
                (Swatch::None, "Before".to_string()),
                (
                    Swatch::Rect {
                        fill: "blue".to_string(),
                        opacity: 1.0,
                    },
                    "Skill A".to_string(),
                ),
            ],
            vec![(
                Swatch::Marker {
                    fill: "red".to_string(),
                },
                "After".to_string(),
            )],
        ];
        let legend = build_legend(&rows, 12.0, &Theme::paper(), &fast());
        assert_eq!(legend.entries.len(), 3);
        assert!(legend.entries[1].label.x > legend.entries[0].label.x);
        assert!(legend.entries[2].y > legend.entries[0].y);
        assert!(legend.width > 0.0 && legend.height > 24.0);
    }

    #[test]
    fn translate_moves_every_entry() {
        let rows = vec![vec![(Swatch::None, "Only".to_string())]];
        let mut legend = build_legend(&rows, 12.0, &Theme::paper(), &fast());
        let before = legend.entries[0].label.x;
        translate_legend(&mut legend, 10.0, 5.0);
        assert_eq!(legend.x, 10.0);
        assert_eq!(legend.entries[0].label.x, before + 10.0);
    }
}
