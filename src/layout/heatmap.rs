use super::axis::{self, Margins};
use super::text::measure_label;
use super::*;
use crate::ir::Heatmap;
use crate::theme::{contrast_text_color, rdylgn};

const CELL_GAP: f32 = 2.0;
const COLORBAR_WIDTH: f32 = 20.0;
const COLORBAR_GAP: f32 = 24.0;
const COLORBAR_STOPS: usize = 11;

pub fn compute_heatmap_layout(heatmap: &Heatmap, theme: &Theme, config: &LayoutConfig) -> Layout {
    let font_size = theme.font_size;
    let tick_font = font_size * 0.9;
    let rows = heatmap.rows.len().max(1);
    let cols = heatmap.columns.len().max(1);

    let row_label_width = heatmap
        .rows
        .iter()
        .map(|row| measure_label(row, tick_font, true, theme, config).width)
        .fold(0.0, f32::max);
    let margins = Margins {
        left: row_label_width + 24.0,
        right: COLORBAR_GAP + COLORBAR_WIDTH + 56.0,
        top: font_size * 3.5,
        bottom: font_size * 5.0,
    };
    let plot = axis::plot_area(
        heatmap.width,
        heatmap.height,
        margins,
        (0.0, cols as f32),
        (0.0, rows as f32),
    );
    let mut layout = ChartLayout::new(plot, &theme.plot_background);
    layout.x_grid = false;
    layout.y_grid = false;
    layout.show_axes = false;

    let (lo, hi) = heatmap.value_range;
    let span = if (hi - lo).abs() > f32::EPSILON { hi - lo } else { 1.0 };
    for (r, row) in heatmap.values.iter().enumerate().take(rows) {
        // First row on top.
        let y_top = (rows - r) as f32;
        for (c, value) in row.iter().enumerate().take(cols) {
            let fill = rdylgn((value - lo) / span);
            let (x0, y0) = plot.point((c as f32, y_top));
            let (x1, y1) = plot.point((c as f32 + 1.0, y_top - 1.0));
            layout.marks.push(Mark::Rect {
                x: x0,
                y: y0,
                width: x1 - x0,
                height: y1 - y0,
                fill: fill.clone(),
                opacity: 1.0,
                stroke: Some((theme.background.clone(), CELL_GAP)),
                tooltip: Some(format!(
                    "{} / {}: {value:.2}",
                    heatmap.rows.get(r).map(String::as_str).unwrap_or_default(),
                    heatmap.columns.get(c).map(String::as_str).unwrap_or_default(),
                )),
            });
            layout.marks.push(Mark::Text(axis::text_mark(
                &format!("{value:.2}"),
                ((x0 + x1) / 2.0, (y0 + y1) / 2.0),
                font_size,
                true,
                TextAnchor::Middle,
                contrast_text_color(&fill),
                theme,
                config,
            )));
        }
    }

    let column_ticks: Vec<(f32, String)> = heatmap
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| (c as f32 + 0.5, name.clone()))
        .collect();
    layout.x_ticks = axis::x_ticks(&plot, &column_ticks, tick_font, true, 0.0, theme, config);
    layout.y_ticks = heatmap
        .rows
        .iter()
        .enumerate()
        .map(|(r, name)| {
            let value = (rows - r) as f32 - 0.5;
            let pos = plot.py(value);
            Tick {
                value,
                pos,
                label: axis::text_mark(
                    name,
                    (plot.left - 8.0, pos),
                    tick_font,
                    true,
                    TextAnchor::End,
                    &theme.text_color,
                    theme,
                    config,
                ),
            }
        })
        .collect();

    layout.title = Some(axis::title_over(&plot, &heatmap.title, font_size * 1.15, 15.0, theme, config));
    if let Some(title) = &heatmap.x_title {
        layout.x_title = Some(axis::x_title(
            &plot,
            title,
            plot.bottom() + font_size * 3.0,
            font_size * 0.9,
            theme,
            config,
        ));
    }
    layout.colorbar = Some(colorbar(&plot, heatmap.value_range, tick_font, theme, config));

    Layout {
        width: heatmap.width,
        height: heatmap.height,
        background: theme.background.clone(),
        title: heatmap.title.clone(),
        diagram: DiagramData::Chart(layout),
    }
}

fn colorbar(
    plot: &PlotArea,
    (lo, hi): (f32, f32),
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> ColorBar {
    let x = plot.right() + COLORBAR_GAP;
    let stops = (0..COLORBAR_STOPS)
        .map(|i| {
            let t = i as f32 / (COLORBAR_STOPS - 1) as f32;
            (t, rdylgn(t))
        })
        .collect();
    let scale = PlotArea {
        left: x,
        width: COLORBAR_WIDTH,
        y_min: lo,
        y_max: hi,
        ..*plot
    };
    let ticks = axis::nice_ticks(lo, hi, 5)
        .into_iter()
        .map(|value| {
            let pos = scale.py(value);
            Tick {
                value,
                pos,
                label: axis::text_mark(
                    &format!("{value:.1}"),
                    (x + COLORBAR_WIDTH + 6.0, pos),
                    font_size,
                    false,
                    TextAnchor::Start,
                    &theme.text_color,
                    theme,
                    config,
                ),
            }
        })
        .collect();
    ColorBar {
        x,
        y: plot.top,
        width: COLORBAR_WIDTH,
        height: plot.height,
        stops,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heatmap() -> Heatmap {
        Heatmap {
            title: "Problem".to_string(),
            x_title: Some("Level".to_string()),
            rows: vec!["Top".to_string(), "Bottom".to_string()],
            columns: vec!["L1".to_string(), "L2".to_string(), "L3".to_string()],
            values: vec![vec![0.8, 0.35, 0.09], vec![0.45, 0.06, 0.03]],
            value_range: (0.0, 1.0),
            width: 800.0,
            height: 600.0,
        }
    }

    fn fast() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    fn chart(layout: &Layout) -> &ChartLayout {
        match &layout.diagram {
            DiagramData::Chart(chart) => chart,
            DiagramData::Venn(_) => panic!("expected chart data"),
        }
    }

    #[test]
    fn one_cell_and_annotation_per_value() {
        let layout = compute_heatmap_layout(&heatmap(), &Theme::paper(), &fast());
        let data = chart(&layout);
        let rects = data.marks.iter().filter(|m| matches!(m, Mark::Rect { .. })).count();
        let texts: Vec<String> = data
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text(t) => Some(t.text.lines[0].clone()),
                _ => None,
            })
            .collect();
        assert_eq!(rects, 6);
        assert_eq!(texts[0], "0.80");
        assert_eq!(texts[5], "0.03");
    }

    #[test]
    fn first_row_is_drawn_on_top() {
        let layout = compute_heatmap_layout(&heatmap(), &Theme::paper(), &fast());
        let data = chart(&layout);
        let Mark::Rect { y, fill, .. } = &data.marks[0] else {
            panic!("expected a cell");
        };
        assert!((y - data.plot.top).abs() < 1e-3);
        assert_eq!(*fill, rdylgn(0.8));
        assert!(data.y_ticks[0].pos < data.y_ticks[1].pos);
    }

    #[test]
    fn colorbar_spans_the_value_range() {
        let layout = compute_heatmap_layout(&heatmap(), &Theme::paper(), &fast());
        let bar = chart(&layout).colorbar.as_ref().unwrap();
        assert_eq!(bar.stops.len(), COLORBAR_STOPS);
        assert_eq!(bar.ticks.first().unwrap().label.text.lines[0], "0.0");
        assert_eq!(bar.ticks.last().unwrap().label.text.lines[0], "1.0");
        assert!(bar.ticks.first().unwrap().pos > bar.ticks.last().unwrap().pos);
    }
}
