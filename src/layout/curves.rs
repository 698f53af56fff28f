use super::axis::{self, Margins};
use super::legend::{build_legend, translate_legend};
use super::*;
use crate::ir::{CurveChart, LegendPlacement};

const LEGEND_INSET: f32 = 10.0;

pub fn compute_curve_layout(chart: &CurveChart, theme: &Theme, config: &LayoutConfig) -> Layout {
    let font_size = chart.font_size;
    let tick_font = font_size * 0.93;
    let axis_font = font_size * 1.15;

    let mut rows: Vec<Vec<(Swatch, String)>> = Vec::new();
    let mut legend_items: Vec<(Swatch, String)> = chart
        .bands
        .iter()
        .map(|band| {
            (
                Swatch::Rect {
                    fill: band.fill.clone(),
                    opacity: 1.0,
                },
                band.name.clone(),
            )
        })
        .collect();
    legend_items.extend(chart.series.iter().map(|series| {
        (
            Swatch::Line {
                stroke: series.color.clone(),
                width: series.width,
                dash: series.dash,
            },
            series.name.clone(),
        )
    }));
    match chart.legend {
        LegendPlacement::Below => rows.push(legend_items),
        LegendPlacement::TopLeft | LegendPlacement::TopRight => {
            rows.extend(legend_items.into_iter().map(|item| vec![item]));
        }
    }
    let mut legend = (!rows.is_empty()).then(|| build_legend(&rows, tick_font, theme, config));

    let below = match (&legend, chart.legend) {
        (Some(legend), LegendPlacement::Below) => legend.height + 16.0,
        _ => 0.0,
    };
    let margins = Margins {
        left: font_size * 6.0,
        right: 40.0,
        top: font_size * 5.0,
        bottom: font_size * 5.0 + below,
    };
    let plot = axis::plot_area(chart.width, chart.height, margins, chart.x_range, chart.y_range);
    let mut layout = ChartLayout::new(plot, &theme.plot_background);

    for rect in &chart.shaded {
        let (x0, y0) = plot.point((rect.x.0, rect.y.1));
        let (x1, y1) = plot.point((rect.x.1, rect.y.0));
        layout.marks.push(Mark::Rect {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
            fill: rect.fill.clone(),
            opacity: rect.opacity,
            stroke: None,
            tooltip: None,
        });
    }

    for band in &chart.bands {
        let points = band
            .upper
            .iter()
            .chain(band.lower.iter().rev())
            .map(|point| plot.point(*point))
            .collect();
        layout.marks.push(Mark::Area {
            points,
            fill: band.fill.clone(),
            opacity: 1.0,
        });
    }

    for line in &chart.reference_lines {
        let y = plot.py(line.y);
        layout.marks.push(Mark::Line {
            points: vec![(plot.left, y), (plot.right(), y)],
            stroke: line.color.clone(),
            width: line.width,
            dash: line.dash,
            opacity: line.opacity,
        });
        if let Some(label) = &line.label {
            let mut mark = axis::text_mark(
                label,
                (plot.right() - 4.0, 0.0),
                tick_font,
                false,
                TextAnchor::End,
                &theme.text_color,
                theme,
                config,
            );
            mark.y = y - mark.text.height / 2.0 - 2.0;
            layout.overlays.push(Mark::Text(mark));
        }
    }

    for series in &chart.series {
        layout.marks.push(Mark::Line {
            points: series.points.iter().map(|point| plot.point(*point)).collect(),
            stroke: series.color.clone(),
            width: series.width,
            dash: series.dash,
            opacity: 1.0,
        });
    }

    for note in &chart.annotations {
        let target = plot.point(note.at);
        let at = match note.arrow {
            Some((dx, dy)) => (target.0 + dx, target.1 + dy),
            None => target,
        };
        let mut mark = axis::text_mark(
            &note.text,
            at,
            note.font_size,
            true,
            TextAnchor::Middle,
            &note.color,
            theme,
            config,
        );
        mark.background = note.background.clone();
        if note.arrow.is_some() {
            // Start the arrow at the edge of the text block facing the target.
            let from = if at.1 > target.1 {
                (at.0, at.1 - mark.text.height / 2.0)
            } else if at.1 < target.1 {
                (at.0, at.1 + mark.text.height / 2.0)
            } else {
                at
            };
            layout.overlays.push(Mark::Arrow {
                from,
                to: target,
                color: note.color.clone(),
                width: 2.0,
            });
        }
        layout.overlays.push(Mark::Text(mark));
    }

    layout.x_ticks = axis::numeric_x_ticks(&plot, 6, tick_font, theme, config);
    let y_values = chart
        .y_ticks
        .clone()
        .unwrap_or_else(|| axis::nice_ticks(chart.y_range.0, chart.y_range.1, 6));
    layout.y_ticks = axis::y_ticks(&plot, &y_values, tick_font, false, theme, config);
    layout.title = Some(axis::title_over(&plot, &chart.title, font_size * 1.6, font_size * 1.2, theme, config));
    layout.x_title = Some(axis::x_title(
        &plot,
        &chart.x_title,
        plot.bottom() + tick_font * 1.5 + axis_font * 1.2,
        axis_font,
        theme,
        config,
    ));
    layout.y_title = Some(axis::y_title(&plot, &chart.y_title, font_size * 1.5, axis_font, theme, config));

    if let Some(legend) = legend.as_mut() {
        let (dx, dy) = match chart.legend {
            LegendPlacement::Below => (
                plot.left + (plot.width - legend.width) / 2.0,
                chart.height - below - 8.0,
            ),
            LegendPlacement::TopLeft => (plot.left + LEGEND_INSET, plot.top + LEGEND_INSET),
            LegendPlacement::TopRight => (
                plot.right() - legend.width - LEGEND_INSET,
                plot.top + LEGEND_INSET,
            ),
        };
        translate_legend(legend, dx, dy);
    }
    layout.legend = legend;

    Layout {
        width: chart.width,
        height: chart.height,
        background: theme.background.clone(),
        title: chart.title.clone(),
        diagram: DiagramData::Chart(layout),
    }
}
