//! Figure inputs: plain data describing what to draw, independent of pixels.

use serde::{Deserialize, Serialize};

/// One set of the concurrent-circles figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Circle center in data units before shared-region interpolation.
    pub center: (f32, f32),
    pub radius: f32,
    pub color: String,
    /// Badge position as a fraction of the area inside the canvas margins
    /// (0,0 = bottom-left).
    pub badge: (f32, f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSpec {
    pub text: String,
    /// Hand-tuned design coordinate in data units.
    pub anchor: (f32, f32),
    /// Names of the categories whose intersection owns the label.
    pub region: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VennDiagram {
    pub categories: Vec<Category>,
    pub labels: Vec<LabelSpec>,
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineDash {
    #[default]
    Solid,
    Dash,
    Dot,
}

impl LineDash {
    pub fn dasharray(self, width: f32) -> Option<String> {
        match self {
            LineDash::Solid => None,
            LineDash::Dash => Some(format!("{:.1} {:.1}", width * 3.0, width * 2.0)),
            LineDash::Dot => Some(format!("{:.1} {:.1}", width, width * 1.5)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BarAnnotation {
    /// Print the bar value `offset` units from the bar top.
    Value { offset: f32, color: String },
    /// Print `value (+delta)` against a baseline series.
    Delta {
        baseline: Vec<f32>,
        offset: f32,
        color: String,
    },
}

#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f32>,
    pub color: String,
    pub opacity: f32,
    /// Horizontal offset from the category position, in data units.
    pub offset: f32,
    pub annotation: Option<BarAnnotation>,
}

#[derive(Debug, Clone)]
pub struct BarGroup {
    pub name: String,
    pub series: Vec<BarSeries>,
}

/// Overlay bar chart: later groups are drawn on top of earlier ones.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: Option<String>,
    pub positions: Vec<f32>,
    /// Multi-line tick text per position.
    pub tick_labels: Vec<Vec<String>>,
    pub bar_width: f32,
    pub y_range: (f32, f32),
    pub y_title: Option<String>,
    pub groups: Vec<BarGroup>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct Heatmap {
    pub title: String,
    pub x_title: Option<String>,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f32>>,
    pub value_range: (f32, f32),
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct CurveSeries {
    pub name: String,
    pub points: Vec<(f32, f32)>,
    pub color: String,
    pub width: f32,
    pub dash: LineDash,
}

/// Filled area between two polylines sharing an x domain.
#[derive(Debug, Clone)]
pub struct Band {
    pub name: String,
    pub upper: Vec<(f32, f32)>,
    pub lower: Vec<(f32, f32)>,
    pub fill: String,
}

#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub y: f32,
    pub color: String,
    pub width: f32,
    pub dash: LineDash,
    pub opacity: f32,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShadedRect {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub fill: String,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    /// Target point in data units.
    pub at: (f32, f32),
    pub text: String,
    pub color: String,
    pub font_size: f32,
    pub background: Option<String>,
    /// Text offset from the target in pixels; draws an arrow when set.
    pub arrow: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    Below,
    TopLeft,
    TopRight,
}

#[derive(Debug, Clone)]
pub struct CurveChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
    pub y_ticks: Option<Vec<f32>>,
    pub series: Vec<CurveSeries>,
    pub bands: Vec<Band>,
    pub reference_lines: Vec<ReferenceLine>,
    pub shaded: Vec<ShadedRect>,
    pub annotations: Vec<Annotation>,
    pub legend: LegendPlacement,
    /// Base font size; titles and ticks scale from it.
    pub font_size: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct MarkerSeries {
    pub name: String,
    pub points: Vec<(f32, f32)>,
    pub color: String,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone)]
pub struct ScatterChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub segments: Vec<Segment>,
    pub series: Vec<MarkerSeries>,
    pub font_size: f32,
    pub width: f32,
    pub height: f32,
}

/// Any figure the crate can lay out.
#[derive(Debug, Clone)]
pub enum Figure {
    Venn(VennDiagram),
    Bars(BarChart),
    Heatmap(Heatmap),
    Curves(CurveChart),
    Scatter(ScatterChart),
}
