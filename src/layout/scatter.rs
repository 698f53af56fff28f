use super::axis::{self, Margins};
use super::legend::{build_legend, translate_legend};
use super::*;
use crate::ir::ScatterChart;

const MARKER_OPACITY: f32 = 0.85;
const MARKER_OUTLINE: (&str, f32) = ("#000000", 3.0);
const RANGE_PADDING: f32 = 0.08;

/// Data window covering every point, padded on each side.
pub fn data_extent(chart: &ScatterChart) -> ((f32, f32), (f32, f32)) {
    let points = chart
        .segments
        .iter()
        .flat_map(|segment| [segment.from, segment.to])
        .chain(chart.series.iter().flat_map(|series| series.points.iter().copied()));
    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) =
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY);
    for (x, y) in points {
        x_lo = x_lo.min(x);
        x_hi = x_hi.max(x);
        y_lo = y_lo.min(y);
        y_hi = y_hi.max(y);
    }
    let pad = |lo: f32, hi: f32| {
        if !lo.is_finite() {
            return (-1.0, 1.0);
        }
        let span = (hi - lo).max(1e-3);
        (lo - span * RANGE_PADDING, hi + span * RANGE_PADDING)
    };
    (pad(x_lo, x_hi), pad(y_lo, y_hi))
}

pub fn compute_scatter_layout(chart: &ScatterChart, theme: &Theme, config: &LayoutConfig) -> Layout {
    let font_size = chart.font_size;
    let tick_font = font_size * 0.85;
    let axis_font = font_size * 1.35;

    let margins = Margins {
        left: font_size * 6.0,
        right: 40.0,
        top: font_size * 4.5,
        bottom: font_size * 5.0,
    };
    let (x_range, y_range) = data_extent(chart);
    let plot = axis::plot_area(chart.width, chart.height, margins, x_range, y_range);
    let mut layout = ChartLayout::new(plot, &theme.plot_background);

    for segment in &chart.segments {
        layout.marks.push(Mark::Line {
            points: vec![plot.point(segment.from), plot.point(segment.to)],
            stroke: segment.color.clone(),
            width: segment.width,
            dash: crate::ir::LineDash::Solid,
            opacity: 1.0,
        });
    }
    for series in &chart.series {
        for point in &series.points {
            let (x, y) = plot.point(*point);
            layout.marks.push(Mark::Marker {
                x,
                y,
                size: series.size,
                fill: series.color.clone(),
                opacity: MARKER_OPACITY,
                stroke: Some((MARKER_OUTLINE.0.to_string(), MARKER_OUTLINE.1)),
                tooltip: Some(format!("{} ({:.3}, {:.3})", series.name, point.0, point.1)),
            });
        }
    }

    layout.x_ticks = axis::numeric_x_ticks(&plot, 8, tick_font, theme, config);
    let y_values = axis::nice_ticks(y_range.0, y_range.1, 6);
    layout.y_ticks = axis::y_ticks(&plot, &y_values, tick_font, false, theme, config);
    layout.title = Some(axis::title_over(&plot, &chart.title, font_size * 1.6, font_size, theme, config));
    layout.x_title = Some(axis::x_title(
        &plot,
        &chart.x_title,
        plot.bottom() + tick_font * 1.6 + axis_font,
        axis_font,
        theme,
        config,
    ));
    layout.y_title = Some(axis::y_title(&plot, &chart.y_title, font_size * 1.2, axis_font, theme, config));

    let rows: Vec<Vec<(Swatch, String)>> = chart
        .series
        .iter()
        .map(|series| {
            vec![(
                Swatch::Marker {
                    fill: series.color.clone(),
                },
                series.name.clone(),
            )]
        })
        .collect();
    if !rows.is_empty() {
        let mut legend = build_legend(&rows, font_size, theme, config);
        translate_legend(&mut legend, plot.left + plot.width * 0.02, plot.top + plot.height * 0.02);
        layout.legend = Some(legend);
    }

    Layout {
        width: chart.width,
        height: chart.height,
        background: theme.background.clone(),
        title: chart.title.clone(),
        diagram: DiagramData::Chart(layout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{MarkerSeries, Segment};

    fn chart() -> ScatterChart {
        ScatterChart {
            title: "Quantization".to_string(),
            x_title: "PCA 1".to_string(),
            y_title: "PCA 2".to_string(),
            segments: vec![Segment {
                from: (0.0, 0.0),
                to: (1.0, 2.0),
                color: "red".to_string(),
                width: 4.0,
            }],
            series: vec![
                MarkerSeries {
                    name: "Initial".to_string(),
                    points: vec![(0.0, 0.0)],
                    color: "blue".to_string(),
                    size: 10.0,
                },
                MarkerSeries {
                    name: "Lower".to_string(),
                    points: vec![(1.0, 2.0)],
                    color: "red".to_string(),
                    size: 10.0,
                },
            ],
            font_size: 24.0,
            width: 1920.0,
            height: 1080.0,
        }
    }

    #[test]
    fn extent_pads_every_point() {
        let ((x0, x1), (y0, y1)) = data_extent(&chart());
        assert!(x0 < 0.0 && x1 > 1.0);
        assert!(y0 < 0.0 && y1 > 2.0);
    }

    #[test]
    fn segments_are_drawn_before_markers() {
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let layout = compute_scatter_layout(&chart(), &Theme::paper(), &config);
        let DiagramData::Chart(data) = &layout.diagram else {
            panic!("expected chart data");
        };
        assert!(matches!(data.marks[0], Mark::Line { .. }));
        assert!(matches!(data.marks[1], Mark::Marker { .. }));
        assert_eq!(data.marks.len(), 3);
        assert_eq!(data.legend.as_ref().map(|l| l.entries.len()), Some(2));
    }
}
