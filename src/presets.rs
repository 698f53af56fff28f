//! The shipped figures, expressed as `ir` values.

use crate::ir::{
    Annotation, Band, BarAnnotation, BarChart, BarGroup, BarSeries, Category, CurveChart,
    CurveSeries, Heatmap, LabelSpec, LegendPlacement, LineDash, MarkerSeries, ReferenceLine,
    ScatterChart, Segment, ShadedRect, VennDiagram,
};
use crate::quantize::{QuantizationParams, quantization_projection};

const VENN_RADIUS: f32 = 4.15;
const PENALTY_FILL: &str = "rgba(231, 76, 60, 0.15)";
const DIVERSE_COLOR: &str = "#2ecc71";
const CONCENTRATED_COLOR: &str = "#e74c3c";
const PRECISION_COLORS: [&str; 5] = ["red", "orange", "green", "purple", "brown"];

pub const BRIER_TABLE: &str = "\
| Scenario          | I(x₁=y) | I(x₂=y) | I(x₁=x₂) | Score |
|-------------------|---------|---------|----------|-------|
| Both Correct      | 1       | 1       | 1        | **1** |
| Partial Correct   | 1       | 0       | 0        | **1** |
| Diverse Error     | 0       | 0       | 0        | **0** |
| Confident Error   | 0       | 0       | 1        | **-1**|";

pub const BRIERLM_CAPTION: &str = "Expected BrierLM score as a function of probability p assigned to \
the correct token, scaled to 0-100 (higher is better). The green curve represents the best case where \
errors are uniformly distributed across wrong tokens. The red dashed curve shows the worst case where \
all error probability mass is concentrated on a single wrong token. The shaded region illustrates the \
penalty for overconfidence on wrong predictions.";

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f32, end: f32, n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f32;
            (0..n).map(|i| start + step * i as f32).collect()
        }
    }
}

fn category(name: &str, center: (f32, f32), color: &str, badge: (f32, f32)) -> Category {
    Category {
        name: name.to_string(),
        center,
        radius: VENN_RADIUS,
        color: color.to_string(),
        badge,
    }
}

fn label(text: &str, anchor: (f32, f32), region: &[&str]) -> LabelSpec {
    LabelSpec {
        text: text.to_string(),
        anchor,
        region: region.iter().map(|name| name.to_string()).collect(),
    }
}

/// Four data-type circles with the metrics each type supports.
pub fn default_venn() -> VennDiagram {
    const ALL: [&str; 4] = ["Numeric", "Sequence", "Categorical", "Date"];
    VennDiagram {
        categories: vec![
            category("Numeric", (3.3, 6.3), "#1E5BFF", (0.08, 0.95)),
            category("Sequence", (7.0, 6.2), "#2E7D32", (0.92, 0.95)),
            category("Categorical", (6.0, 3.2), "#C62828", (0.92, 0.06)),
            category("Date", (3.1, 3.3), "#5A2ECC", (0.08, 0.06)),
        ],
        labels: vec![
            label("Description", (5.0, 5.2), &ALL),
            label("Missing Percentage", (5.7, 4.7), &ALL),
            label("Samples", (4.6, 5.4), &ALL),
            label("Most Frequent Values", (5.0, 3.9), &ALL),
            label("Cardinality", (6.1, 4.2), &ALL),
            label("Uniqueness Ratio", (5.0, 3.3), &ALL),
            label("Quantiles", (3.8, 8.1), &["Numeric"]),
            label("Average Value", (2.6, 6.7), &["Numeric"]),
            label("Maximum Length", (8.1, 7.2), &["Sequence"]),
            label("Mean Length", (8.5, 5.3), &["Sequence"]),
            label("Minimum Length", (6.7, 8.7), &["Sequence"]),
            label("Frequency", (5.5, 6.8), &["Numeric", "Sequence"]),
            label("Uniformity", (5.8, 7.6), &["Numeric", "Sequence"]),
            label("Unique Count", (6.5, 6.8), &["Numeric", "Sequence"]),
            label("Minimum Value", (2.0, 4.6), &["Numeric", "Date"]),
            label("Maximum Value", (2.6, 2.9), &["Numeric", "Date"]),
            label("Distribution", (5.0, 1.9), &["Categorical", "Date"]),
        ],
        x_range: (0.0, 10.0),
        y_range: (0.0, 10.0),
    }
}

fn bar_series(
    name: &str,
    values: &[f32],
    color: &str,
    opacity: f32,
    offset: f32,
    annotation: BarAnnotation,
) -> BarSeries {
    BarSeries {
        name: name.to_string(),
        values: values.to_vec(),
        color: color.to_string(),
        opacity,
        offset,
        annotation: Some(annotation),
    }
}

/// Accuracy before and after RL on seven compositional settings.
pub fn grouped_bars() -> BarChart {
    let skill_a = [
        "Skill A: Gcd",
        "Skill A: Polygon Rotation",
        "Skill A: Circle",
        "Skill A: Prob No Fixed",
        "Skill A: Prob No Fixed",
        "Skill A: Polygon Color",
        "Skill A: Grid Chip",
    ];
    let skill_b = [
        "Skill B: Polynomial Roots",
        "Skill B: Pattern Matching",
        "Skill B: Func Intersection",
        "Skill B: Func Intersection",
        "Skill B: Matrix Rank",
        "Skill B: Prob No Fixed",
        "Skill B: Prob No Fixed",
    ];
    let zero_shot_a = [33.0, 6.0, 13.0, 5.0, 5.0, 24.0, 4.0];
    let finetuned_a = [61.0, 22.0, 39.0, 22.0, 25.0, 50.0, 48.0];
    let zero_shot_b = [5.0, 13.0, 21.0, 20.0, 19.0, 5.0, 18.0];
    let finetuned_b = [37.0, 82.0, 70.0, 68.0, 75.0, 25.0, 22.0];
    let zero_shot_ab = [10.0, 5.0, 30.0, 6.0, 30.0, 0.0, 1.0];
    let finetuned_ab = [10.0, 20.0, 30.0, 6.0, 38.0, 0.0, 3.0];

    let offsets = [-0.15, 0.0, 0.15];
    let value = |color: &str| BarAnnotation::Value {
        offset: -5.0,
        color: color.to_string(),
    };
    let delta = |baseline: &[f32]| BarAnnotation::Delta {
        baseline: baseline.to_vec(),
        offset: 3.0,
        color: "black".to_string(),
    };

    BarChart {
        title: None,
        positions: (0..skill_a.len()).map(|i| i as f32 * 0.6).collect(),
        tick_labels: skill_a
            .iter()
            .zip(skill_b)
            .enumerate()
            .map(|(i, (a, b))| vec![format!("Comp. Setting {}", i + 1), a.to_string(), b.to_string()])
            .collect(),
        bar_width: 0.15,
        y_range: (0.0, 100.0),
        y_title: Some("Accuracy (%)".to_string()),
        groups: vec![
            BarGroup {
                name: "Before RL".to_string(),
                series: vec![
                    bar_series("Before RL - Skill A (ID)", &zero_shot_a, "blue", 1.0, offsets[0], value("blue")),
                    bar_series("Before RL - Skill B (ID)", &zero_shot_b, "green", 1.0, offsets[1], value("green")),
                    bar_series(
                        "Before RL - Skill A+B (OOD)",
                        &zero_shot_ab,
                        "orange",
                        1.0,
                        offsets[2],
                        value("orange"),
                    ),
                ],
            },
            BarGroup {
                name: "After RL".to_string(),
                series: vec![
                    bar_series("After RL - Skill A (ID)", &finetuned_a, "lightblue", 0.5, offsets[0], delta(&zero_shot_a)),
                    bar_series("After RL - Skill B (ID)", &finetuned_b, "lightgreen", 0.5, offsets[1], delta(&zero_shot_b)),
                    bar_series(
                        "After RL - Skill A+B (OOD)",
                        &finetuned_ab,
                        "lightsalmon",
                        0.5,
                        offsets[2],
                        delta(&zero_shot_ab),
                    ),
                ],
            },
        ],
        width: 1200.0,
        height: 800.0,
    }
}

/// GCD accuracy by training curriculum and test complexity.
pub fn omega_heatmap() -> Heatmap {
    Heatmap {
        title: "Problem: Arithmetic GCD".to_string(),
        x_title: Some("Complexity level of Test Problems".to_string()),
        rows: ["Level 1-4", "Level 1-3", "Level 1-2", "Level 1", "Before Train"]
            .iter()
            .map(|row| row.to_string())
            .collect(),
        columns: (1..=5).map(|level| format!("Level {level}")).collect(),
        values: vec![
            vec![0.80, 0.35, 0.09, 0.12, 0.03],
            vec![0.78, 0.35, 0.15, 0.14, 0.03],
            vec![0.81, 0.38, 0.10, 0.08, 0.03],
            vec![0.93, 0.16, 0.06, 0.06, 0.03],
            vec![0.45, 0.06, 0.06, 0.06, 0.03],
        ],
        value_range: (0.0, 1.0),
        width: 800.0,
        height: 600.0,
    }
}

fn diverse(p: f32) -> f32 {
    2.0 * p - p * p
}

fn concentrated(p: f32) -> f32 {
    2.0 * p - (p * p + (1.0 - p) * (1.0 - p))
}

fn curve(name: &str, points: Vec<(f32, f32)>, color: &str, dash: LineDash) -> CurveSeries {
    CurveSeries {
        name: name.to_string(),
        points,
        color: color.to_string(),
        width: 4.0,
        dash,
    }
}

fn note(at: (f32, f32), text: &str, color: &str, font_size: f32, arrow: Option<(f32, f32)>) -> Annotation {
    Annotation {
        at,
        text: text.to_string(),
        color: color.to_string(),
        font_size,
        background: None,
        arrow,
    }
}

/// Diverse and concentrated error curves plus the band between them,
/// with every value passed through `scale`.
fn error_strategies(probs: &[f32], scale: impl Fn(f32) -> f32) -> (Band, Vec<CurveSeries>) {
    let upper: Vec<(f32, f32)> = probs.iter().map(|p| (*p, scale(diverse(*p)))).collect();
    let lower: Vec<(f32, f32)> = probs.iter().map(|p| (*p, scale(concentrated(*p)))).collect();
    let band = Band {
        name: "Overconfidence Penalty".to_string(),
        upper: upper.clone(),
        lower: lower.clone(),
        fill: PENALTY_FILL.to_string(),
    };
    let series = vec![
        curve(
            "Diverse Errors\n(Uniform over wrong tokens)",
            upper,
            DIVERSE_COLOR,
            LineDash::Solid,
        ),
        curve(
            "Concentrated Errors\n(All mass on one wrong token)",
            lower,
            CONCENTRATED_COLOR,
            LineDash::Dash,
        ),
    ];
    (band, series)
}

/// Expected two-sample Brier score for diverse vs concentrated errors.
pub fn brier_chart() -> CurveChart {
    let probs = linspace(0.001, 1.0, 200);
    let (band, series) = error_strategies(&probs, |score| score);
    let mut penalty = note((0.5, 0.25), "Overconfidence\nPenalty", "#c0392b", 14.0, None);
    penalty.background = Some("rgba(255,255,255,0.8)".to_string());
    CurveChart {
        title: "Expected Brier Score: Diverse vs Concentrated Errors".to_string(),
        x_title: "Probability Assigned to Correct Token (p)".to_string(),
        y_title: "Expected Score".to_string(),
        x_range: (0.0, 1.0),
        y_range: (-0.6, 1.1),
        y_ticks: None,
        series,
        bands: vec![band],
        reference_lines: vec![ReferenceLine {
            y: 0.0,
            color: "gray".to_string(),
            width: 1.5,
            dash: LineDash::Solid,
            opacity: 0.7,
            label: None,
        }],
        shaded: Vec::new(),
        annotations: vec![
            penalty,
            note(
                (0.15, -0.3),
                "Confident errors\nare penalized",
                CONCENTRATED_COLOR,
                12.0,
                Some((40.0, -40.0)),
            ),
        ],
        legend: LegendPlacement::Below,
        font_size: 14.0,
        width: 900.0,
        height: 550.0,
    }
}

/// The Brier curves rescaled to 0-100.
pub fn brierlm_chart() -> CurveChart {
    let probs = linspace(0.001, 0.999, 200);
    let (band, series) = error_strategies(&probs, |score| (score + 1.0) * 50.0);
    CurveChart {
        title: "Expected BrierLM Score (0-100 Scale)".to_string(),
        x_title: "Probability Assigned to Correct Token (p)".to_string(),
        y_title: "BrierLM Score".to_string(),
        x_range: (0.0, 1.0),
        y_range: (0.0, 105.0),
        y_ticks: Some(vec![0.0, 25.0, 50.0, 75.0, 100.0]),
        series,
        bands: vec![band],
        reference_lines: vec![ReferenceLine {
            y: 50.0,
            color: "gray".to_string(),
            width: 2.0,
            dash: LineDash::Dot,
            opacity: 0.7,
            label: Some("Random Baseline".to_string()),
        }],
        shaded: Vec::new(),
        annotations: vec![
            note((0.5, 65.0), "Overconfidence\nPenalty", "#c0392b", 14.0, None),
            note(
                (0.15, 30.0),
                "Confident errors\npenalized here",
                CONCENTRATED_COLOR,
                12.0,
                Some((40.0, -30.0)),
            ),
            note((0.9, 95.0), "High accuracy\nregion", "#27ae60", 12.0, Some((-40.0, 30.0))),
        ],
        legend: LegendPlacement::Below,
        font_size: 14.0,
        width: 900.0,
        height: 550.0,
    }
}

/// Negative log-likelihood of the correct class.
pub fn loss_chart() -> CurveChart {
    let points = linspace(1e-10, 1.0, 1000)
        .into_iter()
        .map(|p| (p, -p.ln()))
        .collect();
    let shade = |x: (f32, f32), fill: &str| ShadedRect {
        x,
        y: (0.0, 10.0),
        fill: fill.to_string(),
        opacity: 0.1,
    };
    CurveChart {
        title: "Negative Log-Likelihood (Loss) vs. Probability (p)".to_string(),
        x_title: "Probability of Correct Class (p)".to_string(),
        y_title: "Loss (-log(p))".to_string(),
        x_range: (0.0, 1.05),
        y_range: (0.0, 8.0),
        y_ticks: None,
        series: vec![curve("Negative Log-Likelihood", points, "red", LineDash::Solid)],
        bands: Vec::new(),
        reference_lines: Vec::new(),
        shaded: vec![shade((0.7, 0.95), "green"), shade((0.0, 0.2), "orange")],
        annotations: vec![
            note(
                (0.15, 4.0),
                "High Penalty Region:\nLearns Rare Grammar\n(Forces model to remember\nspecific examples)",
                "darkorange",
                14.0,
                Some((60.0, -40.0)),
            ),
            note(
                (0.825, 0.5),
                "Sweet Spot:\nDiminishing Returns\n(Correct but not Overconfident)",
                "darkgreen",
                14.0,
                Some((0.0, -60.0)),
            ),
        ],
        legend: LegendPlacement::TopRight,
        font_size: 15.0,
        width: 1000.0,
        height: 650.0,
    }
}

fn to_f32(points: &[(f64, f64)]) -> Vec<(f32, f32)> {
    points.iter().map(|(x, y)| (*x as f32, *y as f32)).collect()
}

/// Seeded parameters at several precisions, projected onto two PCA axes.
pub fn quantization_chart(params: &QuantizationParams) -> ScatterChart {
    let projection = quantization_projection(params);
    let initial = to_f32(&projection.initial);

    let mut segments = Vec::new();
    let mut series = vec![MarkerSeries {
        name: format!("Initial Precision ({} bits)", params.initial_levels),
        points: initial.clone(),
        color: "blue".to_string(),
        size: 10.0,
    }];
    for (idx, (levels, points)) in projection.lowered.iter().enumerate() {
        let color = PRECISION_COLORS[idx % PRECISION_COLORS.len()];
        let points = to_f32(points);
        segments.extend(initial.iter().zip(&points).map(|(from, to)| Segment {
            from: *from,
            to: *to,
            color: color.to_string(),
            width: 4.0,
        }));
        series.push(MarkerSeries {
            name: format!("Precision {levels} bits"),
            points,
            color: color.to_string(),
            size: 10.0,
        });
    }

    ScatterChart {
        title: "Parameter Quantization: Initial and Multiple Lower Precisions".to_string(),
        x_title: "PCA Dimension 1".to_string(),
        y_title: "PCA Dimension 2".to_string(),
        segments,
        series,
        font_size: 24.0,
        width: 1920.0,
        height: 1080.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_includes_both_ends() {
        let values = linspace(0.001, 1.0, 200);
        assert_eq!(values.len(), 200);
        assert_relative_eq!(values[0], 0.001);
        assert_relative_eq!(values[199], 1.0, epsilon = 1e-5);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }

    #[test]
    fn default_venn_has_four_categories_and_seventeen_labels() {
        let venn = default_venn();
        assert_eq!(venn.categories.len(), 4);
        assert_eq!(venn.labels.len(), 17);
        let names: Vec<&str> = venn.categories.iter().map(|c| c.name.as_str()).collect();
        for label in &venn.labels {
            assert!(label.region.iter().all(|name| names.contains(&name.as_str())));
        }
    }

    #[test]
    fn brier_curves_meet_at_certainty() {
        assert_relative_eq!(diverse(1.0), 1.0);
        assert_relative_eq!(concentrated(1.0), 1.0);
        assert_relative_eq!(concentrated(0.0), -1.0);
        let chart = brierlm_chart();
        let last = chart.series[1].points.last().copied().unwrap();
        assert!(last.1 > 99.0 && last.1 <= 100.0);
    }

    #[test]
    fn bar_deltas_use_the_matching_baseline() {
        let chart = grouped_bars();
        assert_eq!(chart.positions.len(), 7);
        assert_eq!(chart.tick_labels[0][0], "Comp. Setting 1");
        let after = &chart.groups[1].series[1];
        let Some(BarAnnotation::Delta { baseline, .. }) = &after.annotation else {
            panic!("expected delta annotation");
        };
        assert_eq!(baseline[1], 13.0);
        assert_eq!(after.values[1], 82.0);
    }

    #[test]
    fn quantization_chart_links_each_point_per_precision() {
        let params = QuantizationParams::default();
        let chart = quantization_chart(&params);
        assert_eq!(chart.series.len(), 1 + params.lower_levels.len());
        assert_eq!(chart.segments.len(), params.n_points * params.lower_levels.len());
        assert_eq!(chart.series[0].name, "Initial Precision (64 bits)");
        assert_eq!(chart.series[4].name, "Precision 4 bits");
    }
}
