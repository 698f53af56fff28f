use crate::ir::LineDash;

use super::label_placement::{PlacedLabel, PlacementQuality};

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub bold: bool,
}

/// Pixel-space result of a layout pass, ready for serialization.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Document title used for HTML export.
    pub title: String,
    pub diagram: DiagramData,
}

#[derive(Debug, Clone)]
pub enum DiagramData {
    Venn(VennLayout),
    Chart(ChartLayout),
}

/// Rectangle of the canvas that a data window maps onto. Data y points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl PlotArea {
    pub fn px(&self, x: f32) -> f32 {
        let span = self.x_max - self.x_min;
        if span.abs() <= f32::EPSILON {
            return self.left + self.width / 2.0;
        }
        self.left + (x - self.x_min) / span * self.width
    }

    pub fn py(&self, y: f32) -> f32 {
        let span = self.y_max - self.y_min;
        if span.abs() <= f32::EPSILON {
            return self.top + self.height / 2.0;
        }
        self.top + self.height - (y - self.y_min) / span * self.height
    }

    pub fn point(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (self.px(x), self.py(y))
    }

    /// Pixels per data unit along x.
    pub fn x_scale(&self) -> f32 {
        let span = self.x_max - self.x_min;
        if span.abs() <= f32::EPSILON {
            0.0
        } else {
            self.width / span
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone)]
pub struct VennLayout {
    pub plot: PlotArea,
    pub circles: Vec<CircleLayout>,
    pub labels: Vec<VennLabelLayout>,
    pub badges: Vec<BadgeLayout>,
}

impl VennLayout {
    /// Labels whose placement fell back to a degraded position.
    pub fn degraded(&self) -> impl Iterator<Item = &VennLabelLayout> {
        self.labels
            .iter()
            .filter(|label| label.placement.quality.is_degraded())
    }
}

#[derive(Debug, Clone)]
pub struct CircleLayout {
    pub name: String,
    /// Center in data units after shared-region interpolation.
    pub center: (f32, f32),
    pub radius: f32,
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub fill: String,
    pub fill_opacity: f32,
    pub stroke: String,
    pub stroke_width: f32,
}

#[derive(Debug, Clone)]
pub struct VennLabelLayout {
    pub text: TextBlock,
    pub region: Vec<String>,
    pub placement: PlacedLabel,
    /// Box center in pixels.
    pub x: f32,
    pub y: f32,
    pub box_width: f32,
    pub box_height: f32,
    pub color: String,
    pub border_width: f32,
    pub padding: f32,
}

impl VennLabelLayout {
    pub fn quality(&self) -> PlacementQuality {
        self.placement.quality
    }
}

#[derive(Debug, Clone)]
pub struct BadgeLayout {
    pub text: TextBlock,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub text_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Positioned text; `(x, y)` is the anchor point of the block's vertical center.
#[derive(Debug, Clone)]
pub struct TextMark {
    pub x: f32,
    pub y: f32,
    pub text: TextBlock,
    pub anchor: TextAnchor,
    pub color: String,
    /// Rotation in degrees around `(x, y)`.
    pub rotate: f32,
    pub background: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Mark {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: String,
        opacity: f32,
        stroke: Option<(String, f32)>,
        tooltip: Option<String>,
    },
    Line {
        points: Vec<(f32, f32)>,
        stroke: String,
        width: f32,
        dash: LineDash,
        opacity: f32,
    },
    /// Closed filled polygon.
    Area {
        points: Vec<(f32, f32)>,
        fill: String,
        opacity: f32,
    },
    Marker {
        x: f32,
        y: f32,
        /// Diameter in pixels.
        size: f32,
        fill: String,
        opacity: f32,
        stroke: Option<(String, f32)>,
        tooltip: Option<String>,
    },
    Arrow {
        from: (f32, f32),
        to: (f32, f32),
        color: String,
        width: f32,
    },
    Text(TextMark),
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub value: f32,
    /// Pixel coordinate along the axis.
    pub pos: f32,
    pub label: TextMark,
}

#[derive(Debug, Clone)]
pub enum Swatch {
    Rect { fill: String, opacity: f32 },
    Line { stroke: String, width: f32, dash: LineDash },
    Marker { fill: String },
    /// Group heading with no glyph.
    None,
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    /// Swatch center in pixels.
    pub x: f32,
    pub y: f32,
    pub swatch: Swatch,
    pub label: TextMark,
}

#[derive(Debug, Clone)]
pub struct LegendLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub border: String,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone)]
pub struct ColorBar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Gradient stops from the bottom (offset 0) to the top (offset 1).
    pub stops: Vec<(f32, String)>,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub plot: PlotArea,
    pub plot_background: String,
    pub title: Option<TextMark>,
    pub x_title: Option<TextMark>,
    pub y_title: Option<TextMark>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub x_grid: bool,
    pub y_grid: bool,
    pub show_axes: bool,
    /// Data marks, clipped to the plot area.
    pub marks: Vec<Mark>,
    /// Unclipped marks drawn above everything else.
    pub overlays: Vec<Mark>,
    pub legend: Option<LegendLayout>,
    pub colorbar: Option<ColorBar>,
}

impl ChartLayout {
    pub fn new(plot: PlotArea, plot_background: &str) -> Self {
        Self {
            plot,
            plot_background: plot_background.to_string(),
            title: None,
            x_title: None,
            y_title: None,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            x_grid: true,
            y_grid: true,
            show_axes: true,
            marks: Vec::new(),
            overlays: Vec::new(),
            legend: None,
            colorbar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlotArea {
        PlotArea {
            left: 40.0,
            top: 40.0,
            width: 200.0,
            height: 100.0,
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 5.0,
        }
    }

    #[test]
    fn plot_area_maps_y_up() {
        let plot = area();
        assert_eq!(plot.point((0.0, 0.0)), (40.0, 140.0));
        assert_eq!(plot.point((10.0, 5.0)), (240.0, 40.0));
        assert_eq!(plot.px(5.0), 140.0);
        assert_eq!(plot.x_scale(), 20.0);
    }

    #[test]
    fn degenerate_window_maps_to_center() {
        let plot = PlotArea {
            x_max: 0.0,
            y_max: 0.0,
            ..area()
        };
        assert_eq!(plot.point((3.0, 3.0)), (140.0, 90.0));
        assert_eq!(plot.x_scale(), 0.0);
    }
}
