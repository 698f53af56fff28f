// Axis ticks and the frame pieces shared by every chart layout.

use super::text::measure_label;
use super::*;

const TICK_LABEL_GAP: f32 = 8.0;

/// Round `value` to 1, 2 or 5 times a power of ten.
pub fn nice_number(value: f32) -> f32 {
    if value <= 0.0 || !value.is_finite() {
        return 1.0;
    }
    let exponent = value.log10().floor();
    let magnitude = 10f32.powf(exponent);
    let fraction = value / magnitude;
    let nice = if fraction < 1.5 {
        1.0
    } else if fraction < 3.0 {
        2.0
    } else if fraction < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of a nice step covering `[min, max]`, roughly `target` of them.
pub fn nice_ticks(min: f32, max: f32, target: usize) -> Vec<f32> {
    if !(min.is_finite() && max.is_finite()) || max <= min {
        return vec![min];
    }
    let step = nice_number((max - min) / target.max(2) as f32);
    let first = (min / step - 1e-4).ceil() as i64;
    let last = (max / step + 1e-4).floor() as i64;
    (first..=last)
        .map(|i| {
            let value = i as f32 * step;
            // Snap -0.0 and float residue onto the step grid.
            if value.abs() < step * 1e-4 { 0.0 } else { value }
        })
        .collect()
}

pub fn format_tick(value: f32) -> String {
    if value.abs() < 1e-6 {
        return "0".to_string();
    }
    let mut text = format!("{value:.3}");
    while text.contains('.') && text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

pub(crate) fn plot_area(
    width: f32,
    height: f32,
    margins: Margins,
    x_range: (f32, f32),
    y_range: (f32, f32),
) -> PlotArea {
    PlotArea {
        left: margins.left,
        top: margins.top,
        width: (width - margins.left - margins.right).max(1.0),
        height: (height - margins.top - margins.bottom).max(1.0),
        x_min: x_range.0,
        x_max: x_range.1,
        y_min: y_range.0,
        y_max: y_range.1,
    }
}

pub(crate) fn text_mark(
    text: &str,
    (x, y): (f32, f32),
    font_size: f32,
    bold: bool,
    anchor: TextAnchor,
    color: &str,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextMark {
    TextMark {
        x,
        y,
        text: measure_label(text, font_size, bold, theme, config),
        anchor,
        color: color.to_string(),
        rotate: 0.0,
        background: None,
    }
}

/// Ticks under the plot; `rotate` tilts the labels (degrees, negative is
/// counter-clockwise) and anchors them at their end.
pub(crate) fn x_ticks(
    plot: &PlotArea,
    ticks: &[(f32, String)],
    font_size: f32,
    bold: bool,
    rotate: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<Tick> {
    ticks
        .iter()
        .map(|(value, label)| {
            let pos = plot.px(*value);
            let mut mark = text_mark(
                label,
                (pos, 0.0),
                font_size,
                bold,
                TextAnchor::Middle,
                &theme.text_color,
                theme,
                config,
            );
            if rotate == 0.0 {
                mark.y = plot.bottom() + TICK_LABEL_GAP + mark.text.height / 2.0;
            } else {
                mark.anchor = TextAnchor::End;
                mark.rotate = rotate;
                mark.y = plot.bottom() + TICK_LABEL_GAP;
            }
            Tick {
                value: *value,
                pos,
                label: mark,
            }
        })
        .collect()
}

pub(crate) fn y_ticks(
    plot: &PlotArea,
    values: &[f32],
    font_size: f32,
    bold: bool,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<Tick> {
    values
        .iter()
        .map(|value| {
            let pos = plot.py(*value);
            Tick {
                value: *value,
                pos,
                label: text_mark(
                    &format_tick(*value),
                    (plot.left - TICK_LABEL_GAP, pos),
                    font_size,
                    bold,
                    TextAnchor::End,
                    &theme.text_color,
                    theme,
                    config,
                ),
            }
        })
        .collect()
}

/// Numeric x ticks at nice positions.
pub(crate) fn numeric_x_ticks(
    plot: &PlotArea,
    target: usize,
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<Tick> {
    let ticks: Vec<(f32, String)> = nice_ticks(plot.x_min, plot.x_max, target)
        .into_iter()
        .map(|value| (value, format_tick(value)))
        .collect();
    x_ticks(plot, &ticks, font_size, false, 0.0, theme, config)
}

/// Title centered over the plot, `gap` pixels above it.
pub(crate) fn title_over(
    plot: &PlotArea,
    text: &str,
    font_size: f32,
    gap: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextMark {
    let mut mark = text_mark(
        text,
        (plot.left + plot.width / 2.0, 0.0),
        font_size,
        true,
        TextAnchor::Middle,
        &theme.text_color,
        theme,
        config,
    );
    mark.y = (plot.top - gap - mark.text.height / 2.0).max(mark.text.height / 2.0);
    mark
}

pub(crate) fn x_title(
    plot: &PlotArea,
    text: &str,
    y: f32,
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextMark {
    text_mark(
        text,
        (plot.left + plot.width / 2.0, y),
        font_size,
        true,
        TextAnchor::Middle,
        &theme.text_color,
        theme,
        config,
    )
}

/// Vertical axis title, rotated to read bottom-up.
pub(crate) fn y_title(
    plot: &PlotArea,
    text: &str,
    x: f32,
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextMark {
    let mut mark = text_mark(
        text,
        (x, plot.top + plot.height / 2.0),
        font_size,
        true,
        TextAnchor::Middle,
        &theme.text_color,
        theme,
        config,
    );
    mark.rotate = -90.0;
    mark
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nice_number_rounds_to_one_two_five() {
        assert_relative_eq!(nice_number(0.13), 0.1, epsilon = 1e-6);
        assert_relative_eq!(nice_number(0.25), 0.2, epsilon = 1e-6);
        assert_relative_eq!(nice_number(4.0), 5.0, epsilon = 1e-5);
        assert_relative_eq!(nice_number(80.0), 100.0, epsilon = 1e-3);
        assert_eq!(nice_number(0.0), 1.0);
    }

    #[test]
    fn nice_ticks_cover_the_range() {
        assert_eq!(nice_ticks(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        let ticks = nice_ticks(-0.6, 1.1, 6);
        assert_eq!(ticks.len(), 9);
        assert_relative_eq!(ticks[0], -0.6, epsilon = 1e-5);
        assert!(ticks.contains(&0.0));
        assert!(ticks.iter().all(|t| *t >= -0.6 - 1e-5 && *t <= 1.1 + 1e-5));
        assert_eq!(nice_ticks(3.0, 3.0, 5), vec![3.0]);
    }

    #[test]
    fn format_tick_trims_trailing_zeros() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(-0.2), "-0.2");
    }

    #[test]
    fn y_ticks_run_bottom_up() {
        let plot = plot_area(
            400.0,
            300.0,
            Margins {
                left: 50.0,
                right: 10.0,
                top: 10.0,
                bottom: 40.0,
            },
            (0.0, 1.0),
            (0.0, 100.0),
        );
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let ticks = y_ticks(&plot, &[0.0, 100.0], 12.0, false, &Theme::paper(), &config);
        assert_eq!(ticks[0].pos, plot.bottom());
        assert_eq!(ticks[1].pos, plot.top);
        assert_eq!(ticks[1].label.text.lines, vec!["100"]);
        assert_eq!(ticks[0].label.anchor, TextAnchor::End);
    }
}
