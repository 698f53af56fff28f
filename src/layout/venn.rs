use super::label_placement::{self, Circle, Label, Plane, RegionKey, MAX_CATEGORIES};
use super::text::measure_label;
use super::*;
use crate::config::VennConfig;
use crate::error::FigureError;
use crate::ir::VennDiagram;
use crate::theme::{blend_colors, darken_color};
use tracing::debug;

// Lower bound on the anchor interpolation factor per region cardinality, so
// single-category labels do not collapse into the middle as circles merge.
const ANCHOR_MIN_FACTORS: [f32; 4] = [0.90, 0.70, 0.55, 0.35];
const ANCHOR_MIN_FACTOR_OTHER: f32 = 0.6;

const CIRCLE_STROKE_WIDTH: f32 = 3.0;
const LABEL_BORDER_WIDTH: f32 = 2.0;
const BADGE_PADDING: f32 = 6.0;
const BADGE_FONT_RATIO: f32 = 0.9;
const MIN_BADGE_FONT: f32 = 18.0;
const BADGE_TEXT_COLOR: &str = "#ffffff";

pub fn clamp_shared(shared_region: f32) -> f32 {
    if shared_region.is_finite() {
        shared_region.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn centroid(points: &[(f32, f32)]) -> (f32, f32) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    (sx / n, sy / n)
}

fn toward(point: (f32, f32), target: (f32, f32), factor: f32) -> (f32, f32) {
    (
        target.0 + (point.0 - target.0) * factor,
        target.1 + (point.1 - target.1) * factor,
    )
}

/// Pull every center toward the common centroid; `shared = 1` merges them.
pub fn interpolate_centers(centers: &[(f32, f32)], shared_region: f32) -> Vec<(f32, f32)> {
    let shared = clamp_shared(shared_region);
    let middle = centroid(centers);
    centers
        .iter()
        .map(|center| toward(*center, middle, 1.0 - shared))
        .collect()
}

pub fn anchor_factor(cardinality: usize, shared_region: f32) -> f32 {
    let min_factor = match cardinality {
        1..=4 => ANCHOR_MIN_FACTORS[cardinality - 1],
        _ => ANCHOR_MIN_FACTOR_OTHER,
    };
    min_factor.max(1.0 - clamp_shared(shared_region))
}

pub fn interpolate_anchor(
    anchor: (f32, f32),
    middle: (f32, f32),
    cardinality: usize,
    shared_region: f32,
) -> (f32, f32) {
    toward(anchor, middle, anchor_factor(cardinality, shared_region))
}

/// Resolve each label's owning category names to a [`RegionKey`].
pub fn region_keys(diagram: &VennDiagram) -> Result<Vec<RegionKey>, FigureError> {
    if diagram.categories.len() > MAX_CATEGORIES {
        return Err(FigureError::TooManyCategories {
            count: diagram.categories.len(),
            max: MAX_CATEGORIES,
        });
    }
    diagram
        .labels
        .iter()
        .map(|label| {
            let indices = label
                .region
                .iter()
                .map(|name| {
                    diagram
                        .categories
                        .iter()
                        .position(|category| &category.name == name)
                        .ok_or_else(|| FigureError::UnknownCategory {
                            label: label.text.clone(),
                            category: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let key = RegionKey::from_indices(indices);
            if key.is_empty() {
                return Err(FigureError::EmptyRegion {
                    label: label.text.clone(),
                });
            }
            Ok(key)
        })
        .collect()
}

pub fn compute_venn_layout(
    diagram: &VennDiagram,
    theme: &Theme,
    venn: &VennConfig,
    config: &LayoutConfig,
) -> Result<Layout, FigureError> {
    let keys = region_keys(diagram)?;

    let base_centers: Vec<(f32, f32)> = diagram.categories.iter().map(|c| c.center).collect();
    let middle = centroid(&base_centers);
    let centers = interpolate_centers(&base_centers, venn.shared_region);
    let circles: Vec<Circle> = diagram
        .categories
        .iter()
        .zip(&centers)
        .map(|(category, center)| Circle {
            name: category.name.clone(),
            center: *center,
            radius: category.radius,
        })
        .collect();

    let labels: Vec<Label> = diagram
        .labels
        .iter()
        .zip(&keys)
        .map(|(spec, key)| Label {
            text: spec.text.clone(),
            key: *key,
            radius: label_placement::label_radius(&spec.text, venn.font_size),
            anchor: interpolate_anchor(spec.anchor, middle, key.len(), venn.shared_region),
        })
        .collect();

    let plane = Plane {
        x_range: diagram.x_range,
        y_range: diagram.y_range,
    };
    let mut placed = label_placement::place_labels(&circles, &labels, &plane, &venn.placement);
    if venn.relax.enabled {
        let texts: Vec<&str> = labels.iter().map(|label| label.text.as_str()).collect();
        label_placement::relax_labels(&mut placed, &texts, venn.font_size, &venn.relax);
        label_placement::flag_displaced(&circles, &mut placed, &texts, venn.placement.region_padding);
    }

    let width = venn.width.max(1.0);
    let height = venn.height.max(1.0);
    let margin = venn.margin.max(0.0);
    let inner_w = (width - 2.0 * margin).max(1.0);
    let inner_h = (height - 2.0 * margin).max(1.0);
    let plot = square_plot(margin, inner_w, inner_h, diagram.x_range, diagram.y_range);

    let stroke_factor = venn.color_strength.clamp(0.2, 1.0);
    let circle_layouts: Vec<CircleLayout> = diagram
        .categories
        .iter()
        .zip(&circles)
        .map(|(category, circle)| {
            let (cx, cy) = plot.point(circle.center);
            CircleLayout {
                name: category.name.clone(),
                center: circle.center,
                radius: circle.radius,
                cx,
                cy,
                r: circle.radius * plot.x_scale(),
                fill: category.color.clone(),
                fill_opacity: venn.circle_opacity.clamp(0.0, 1.0),
                stroke: darken_color(&category.color, stroke_factor),
                stroke_width: CIRCLE_STROKE_WIDTH,
            }
        })
        .collect();

    let padding = venn.label_padding.max(0.0);
    let label_layouts: Vec<VennLabelLayout> = diagram
        .labels
        .iter()
        .zip(&placed)
        .map(|(spec, placement)| {
            let colors: Vec<&str> = placement
                .key
                .indices()
                .filter_map(|idx| diagram.categories.get(idx).map(|c| c.color.as_str()))
                .collect();
            let text = measure_label(&spec.text, venn.font_size, true, theme, config);
            let (x, y) = plot.point((placement.x, placement.y));
            VennLabelLayout {
                box_width: text.width + 2.0 * padding,
                box_height: text.height + 2.0 * padding,
                text,
                region: spec.region.clone(),
                placement: *placement,
                x,
                y,
                color: blend_colors(&colors),
                border_width: LABEL_BORDER_WIDTH,
                padding,
            }
        })
        .collect();

    let badge_font = (venn.font_size * BADGE_FONT_RATIO).floor().max(MIN_BADGE_FONT);
    let badges: Vec<BadgeLayout> = diagram
        .categories
        .iter()
        .map(|category| {
            let text = measure_label(&category.name, badge_font, true, theme, config);
            let box_w = text.width + 2.0 * BADGE_PADDING;
            let box_h = text.height + 2.0 * BADGE_PADDING;
            let (fx, fy) = category.badge;
            let x = badge_anchor(margin + fx * inner_w, box_w, fx);
            // Fractions run bottom-up; pixels run top-down.
            let y = badge_anchor(margin + (1.0 - fy) * inner_h, box_h, 1.0 - fy);
            BadgeLayout {
                text,
                x,
                y,
                width: box_w,
                height: box_h,
                fill: category.color.clone(),
                text_color: BADGE_TEXT_COLOR.to_string(),
            }
        })
        .collect();

    debug!(
        circles = circle_layouts.len(),
        labels = label_layouts.len(),
        degraded = placed.iter().filter(|p| p.quality.is_degraded()).count(),
        "venn layout computed"
    );

    Ok(Layout {
        width,
        height,
        background: theme.background.clone(),
        title: "Concurrent circles".to_string(),
        diagram: DiagramData::Venn(VennLayout {
            plot,
            circles: circle_layouts,
            labels: label_layouts,
            badges,
        }),
    })
}

/// Largest equal-aspect window for the data ranges, centered in the inner area.
fn square_plot(
    margin: f32,
    inner_w: f32,
    inner_h: f32,
    x_range: (f32, f32),
    y_range: (f32, f32),
) -> PlotArea {
    let x_span = (x_range.1 - x_range.0).abs().max(f32::EPSILON);
    let y_span = (y_range.1 - y_range.0).abs().max(f32::EPSILON);
    let scale = (inner_w / x_span).min(inner_h / y_span);
    let width = x_span * scale;
    let height = y_span * scale;
    PlotArea {
        left: margin + (inner_w - width) / 2.0,
        top: margin + (inner_h - height) / 2.0,
        width,
        height,
        x_min: x_range.0,
        x_max: x_range.1,
        y_min: y_range.0,
        y_max: y_range.1,
    }
}

/// Box center for a badge pinned at `pos`: near edges the box hugs the
/// position from the inside, in the middle third it is centered on it.
fn badge_anchor(pos: f32, size: f32, fraction: f32) -> f32 {
    if fraction < 1.0 / 3.0 {
        pos + size / 2.0
    } else if fraction > 2.0 / 3.0 {
        pos - size / 2.0
    } else {
        pos
    }
}
