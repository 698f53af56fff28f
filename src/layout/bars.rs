use super::axis::{self, Margins};
use super::legend::{build_legend, translate_legend};
use super::text::measure_label;
use super::*;
use crate::ir::{BarAnnotation, BarChart};

const TICK_ROTATION: f32 = -45.0;
const ANNOTATION_FONT: f32 = 10.0;
const X_PADDING: f32 = 0.35;

pub fn compute_bar_layout(chart: &BarChart, theme: &Theme, config: &LayoutConfig) -> Layout {
    let font_size = theme.font_size;
    let tick_font = font_size * 0.9;

    let tick_texts: Vec<String> = chart
        .tick_labels
        .iter()
        .map(|lines| lines.join("\n"))
        .collect();
    // Rotated tick labels hang below the axis; reserve their diagonal extent.
    let (sin, cos) = TICK_ROTATION.to_radians().abs().sin_cos();
    let tick_drop = tick_texts
        .iter()
        .map(|label| {
            let block = measure_label(label, tick_font, true, theme, config);
            block.width * sin + block.height * cos
        })
        .fold(0.0, f32::max);

    let title_space = if chart.title.is_some() { font_size * 3.0 } else { 30.0 };
    let margins = Margins {
        left: 90.0,
        right: 40.0,
        top: title_space,
        bottom: tick_drop + 30.0,
    };
    let (x_min, x_max) = chart
        .positions
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let x_range = if x_min.is_finite() {
        (x_min - X_PADDING, x_max + X_PADDING)
    } else {
        (0.0, 1.0)
    };
    let plot = axis::plot_area(chart.width, chart.height, margins, x_range, chart.y_range);
    let mut layout = ChartLayout::new(plot, &theme.plot_background);
    layout.x_grid = false;

    let baseline = plot.py(chart.y_range.0.max(0.0));
    let half = chart.bar_width / 2.0;
    for group in &chart.groups {
        for series in &group.series {
            for (pos, value) in chart.positions.iter().zip(&series.values) {
                let center = pos + series.offset;
                let left = plot.px(center - half);
                let right = plot.px(center + half);
                let top = plot.py(*value);
                layout.marks.push(Mark::Rect {
                    x: left,
                    y: top.min(baseline),
                    width: right - left,
                    height: (baseline - top).abs(),
                    fill: series.color.clone(),
                    opacity: series.opacity,
                    stroke: None,
                    tooltip: Some(format!("{}: {}", series.name, axis::format_tick(*value))),
                });
            }

            let Some(annotation) = &series.annotation else {
                continue;
            };
            for (idx, (pos, value)) in chart.positions.iter().zip(&series.values).enumerate() {
                let (text, offset, color) = match annotation {
                    BarAnnotation::Value { offset, color } => {
                        (axis::format_tick(*value), *offset, color)
                    }
                    BarAnnotation::Delta {
                        baseline,
                        offset,
                        color,
                    } => {
                        let delta = value - baseline.get(idx).copied().unwrap_or(0.0);
                        let sign = if delta >= 0.0 { "+" } else { "" };
                        (
                            format!(
                                "{} ({sign}{})",
                                axis::format_tick(*value),
                                axis::format_tick(delta)
                            ),
                            *offset,
                            color,
                        )
                    }
                };
                layout.overlays.push(Mark::Text(axis::text_mark(
                    &text,
                    plot.point((pos + series.offset, value + offset)),
                    ANNOTATION_FONT,
                    true,
                    TextAnchor::Middle,
                    color,
                    theme,
                    config,
                )));
            }
        }
    }

    let ticks: Vec<(f32, String)> = chart.positions.iter().copied().zip(tick_texts).collect();
    layout.x_ticks = axis::x_ticks(&plot, &ticks, tick_font, true, TICK_ROTATION, theme, config);
    let y_values = axis::nice_ticks(chart.y_range.0, chart.y_range.1, 5);
    layout.y_ticks = axis::y_ticks(&plot, &y_values, tick_font, true, theme, config);
    if let Some(title) = &chart.y_title {
        layout.y_title = Some(axis::y_title(&plot, title, 24.0, font_size, theme, config));
    }
    if let Some(title) = &chart.title {
        layout.title = Some(axis::title_over(&plot, title, font_size * 1.4, 12.0, theme, config));
    }

    let rows: Vec<Vec<(Swatch, String)>> = chart
        .groups
        .iter()
        .map(|group| {
            std::iter::once((Swatch::None, group.name.clone()))
                .chain(group.series.iter().map(|series| {
                    (
                        Swatch::Rect {
                            fill: series.color.clone(),
                            opacity: series.opacity,
                        },
                        series.name.clone(),
                    )
                }))
                .collect()
        })
        .collect();
    if !rows.is_empty() {
        let mut legend = build_legend(&rows, tick_font, theme, config);
        // Horizontal legend hanging from 95% of the plot height.
        let dx = plot.left + (plot.width - legend.width) / 2.0;
        let dy = plot.top + plot.height * 0.05;
        translate_legend(&mut legend, dx, dy);
        layout.legend = Some(legend);
    }

    Layout {
        width: chart.width,
        height: chart.height,
        background: theme.background.clone(),
        title: chart
            .title
            .clone()
            .unwrap_or_else(|| "Grouped bars".to_string()),
        diagram: DiagramData::Chart(layout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BarGroup, BarSeries};

    fn chart() -> BarChart {
        let series = |name: &str, values: Vec<f32>, offset: f32, annotation| BarSeries {
            name: name.to_string(),
            values,
            color: "blue".to_string(),
            opacity: 1.0,
            offset,
            annotation,
        };
        BarChart {
            title: None,
            positions: vec![0.0, 0.6],
            tick_labels: vec![
                vec!["Setting 1".to_string(), "Skill A".to_string()],
                vec!["Setting 2".to_string(), "Skill B".to_string()],
            ],
            bar_width: 0.15,
            y_range: (0.0, 100.0),
            y_title: Some("Accuracy (%)".to_string()),
            groups: vec![
                BarGroup {
                    name: "Before".to_string(),
                    series: vec![series(
                        "A",
                        vec![33.0, 6.0],
                        -0.15,
                        Some(BarAnnotation::Value {
                            offset: -5.0,
                            color: "blue".to_string(),
                        }),
                    )],
                },
                BarGroup {
                    name: "After".to_string(),
                    series: vec![series(
                        "A",
                        vec![61.0, 6.0],
                        -0.15,
                        Some(BarAnnotation::Delta {
                            baseline: vec![33.0, 6.0],
                            offset: 3.0,
                            color: "black".to_string(),
                        }),
                    )],
                },
            ],
            width: 900.0,
            height: 700.0,
        }
    }

    fn fast() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn bars_stand_on_the_baseline() {
        let layout = compute_bar_layout(&chart(), &Theme::paper(), &fast());
        let DiagramData::Chart(data) = &layout.diagram else {
            panic!("expected chart data");
        };
        assert_eq!(data.marks.len(), 4);
        for mark in &data.marks {
            let Mark::Rect { y, height, .. } = mark else {
                panic!("expected bars only");
            };
            assert!((y + height - data.plot.bottom()).abs() < 1e-3);
        }
    }

    #[test]
    fn annotations_show_values_and_deltas() {
        let layout = compute_bar_layout(&chart(), &Theme::paper(), &fast());
        let DiagramData::Chart(data) = &layout.diagram else {
            panic!("expected chart data");
        };
        let texts: Vec<String> = data
            .overlays
            .iter()
            .filter_map(|mark| match mark {
                Mark::Text(text) => Some(text.text.lines.join(" ")),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"33".to_string()));
        assert!(texts.contains(&"61 (+28)".to_string()));
        assert!(texts.contains(&"6 (+0)".to_string()));
    }

    #[test]
    fn ticks_are_rotated_and_legend_has_group_rows() {
        let layout = compute_bar_layout(&chart(), &Theme::paper(), &fast());
        let DiagramData::Chart(data) = &layout.diagram else {
            panic!("expected chart data");
        };
        assert_eq!(data.x_ticks.len(), 2);
        assert_eq!(data.x_ticks[0].label.rotate, TICK_ROTATION);
        assert_eq!(data.x_ticks[0].label.text.lines.len(), 2);
        let legend = data.legend.as_ref().unwrap();
        assert_eq!(legend.entries.len(), 4);
        assert!(matches!(legend.entries[0].swatch, Swatch::None));
    }
}
