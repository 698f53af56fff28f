// Region-constrained label placement for overlapping-circle figures.
// Pure geometry in data units; the Venn layout maps results to pixels.

use crate::config::{PlacementConfig, RelaxConfig};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Largest number of circles a region key can address.
pub const MAX_CATEGORIES: usize = 8;

const FONT_SCALE_BASE: f32 = 26.0;
const PLACEMENT_CHAR_RADIUS: f32 = 0.007;
const RELAX_CHAR_RADIUS: f32 = 0.006;
const CLEARANCE_WEIGHT: f32 = 0.5;
const CROSS_KEY_SPACING: f32 = 0.08;
const COINCIDENT_NUDGE: f32 = 0.001;

/// Subset of categories owning a label, as a bitmask over circle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct RegionKey(u8);

impl RegionKey {
    /// Indices at or past `MAX_CATEGORIES` are ignored.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let bits = indices
            .into_iter()
            .filter(|idx| *idx < MAX_CATEGORIES)
            .fold(0u8, |acc, idx| acc | (1 << idx));
        Self(bits)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, idx: usize) -> bool {
        idx < MAX_CATEGORIES && self.0 & (1 << idx) != 0
    }

    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..MAX_CATEGORIES).filter(move |idx| self.contains(*idx))
    }

    /// Sorted names of the owned circles.
    pub fn names(self, circles: &[Circle]) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .indices()
            .filter_map(|idx| circles.get(idx).map(|c| c.name.as_str()))
            .collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub name: String,
    pub center: (f32, f32),
    pub radius: f32,
}

impl Circle {
    fn distance(&self, x: f32, y: f32) -> f32 {
        (x - self.center.0).hypot(y - self.center.1)
    }
}

/// Placement input for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub key: RegionKey,
    pub radius: f32,
    pub anchor: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: f32,
    pub y: f32,
    /// Distance to the nearest boundary the point must respect.
    pub margin: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementQuality {
    Clear,
    /// No candidate met the hard constraints; the deepest region point was used.
    Overlapping,
    /// The region has no grid points; the anchor was used.
    Anchored,
    /// Relaxation moved the label out of its region.
    Displaced,
}

impl PlacementQuality {
    pub fn is_degraded(self) -> bool {
        self != PlacementQuality::Clear
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlacementQuality::Clear => "clear",
            PlacementQuality::Overlapping => "overlapping",
            PlacementQuality::Anchored => "anchored",
            PlacementQuality::Displaced => "displaced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLabel {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub key: RegionKey,
    pub anchor: (f32, f32),
    pub quality: PlacementQuality,
}

/// Sampling window in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            x_range: (0.0, 10.0),
            y_range: (0.0, 10.0),
        }
    }
}

fn font_scale(font_size: f32) -> f32 {
    if font_size.is_finite() {
        (font_size / FONT_SCALE_BASE).clamp(0.5, 2.0)
    } else {
        1.0
    }
}

/// Disk radius a label claims during placement.
pub fn label_radius(text: &str, font_size: f32) -> f32 {
    let s = font_scale(font_size);
    0.12 * s + PLACEMENT_CHAR_RADIUS * text.chars().count() as f32 * s
}

/// Disk radius used by the relaxation pass.
pub fn relax_radius(text: &str, font_size: f32) -> f32 {
    let s = font_scale(font_size);
    0.12 * s + RELAX_CHAR_RADIUS * text.chars().count() as f32 * s
}

/// Grid coordinates `min + i * step` for `i` in `0..=floor((max - min) / step)`.
pub fn grid_axis(min: f32, max: f32, step: f32) -> Vec<f32> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || max < min {
        return Vec::new();
    }
    let count = ((max - min) / step + 1e-4).floor() as usize;
    (0..=count).map(|i| min + i as f32 * step).collect()
}

/// Grid points strictly inside every owned circle and strictly outside every
/// other one, sorted by descending margin. Ties keep scan order (x outer,
/// y inner). Points on a boundary have zero margin and are skipped.
pub fn region_candidates(circles: &[Circle], key: RegionKey, xs: &[f32], ys: &[f32]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for &x in xs {
        'points: for &y in ys {
            let mut min_in = f32::INFINITY;
            for idx in key.indices() {
                let Some(circle) = circles.get(idx) else {
                    continue 'points;
                };
                let d = circle.distance(x, y);
                if d > circle.radius {
                    continue 'points;
                }
                min_in = min_in.min(circle.radius - d);
            }

            let mut min_out = f32::INFINITY;
            for (idx, circle) in circles.iter().enumerate() {
                if key.contains(idx) {
                    continue;
                }
                let d = circle.distance(x, y);
                if d < circle.radius {
                    continue 'points;
                }
                min_out = min_out.min(d - circle.radius);
            }

            let margin = min_in.min(min_out);
            if margin <= 0.0 {
                continue;
            }
            candidates.push(Candidate { x, y, margin });
        }
    }
    candidates.sort_by(|a, b| b.margin.total_cmp(&a.margin));
    candidates
}

/// Distinct keys in processing order: larger subsets first, then by the
/// sorted category names.
pub fn region_order(circles: &[Circle], labels: &[Label]) -> Vec<RegionKey> {
    let mut keys: Vec<RegionKey> = labels
        .iter()
        .map(|label| label.key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    keys.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.names(circles).cmp(&b.names(circles)))
    });
    keys
}

/// Place every label inside its region. Never fails: infeasible labels are
/// returned with a degraded [`PlacementQuality`]. Output follows input order.
pub fn place_labels(
    circles: &[Circle],
    labels: &[Label],
    plane: &Plane,
    config: &PlacementConfig,
) -> Vec<PlacedLabel> {
    let step = config.effective_grid_step();
    let xs = grid_axis(plane.x_range.0, plane.x_range.1, step);
    let ys = grid_axis(plane.y_range.0, plane.y_range.1, step);

    let mut slots: Vec<Option<PlacedLabel>> = vec![None; labels.len()];
    let mut occupied: Vec<PlacedLabel> = Vec::with_capacity(labels.len());

    for key in region_order(circles, labels) {
        let candidates = region_candidates(circles, key, &xs, &ys);
        let region = key.names(circles).join("&");
        debug!(
            region = %region,
            candidates = candidates.len(),
            step,
            "sampled region"
        );
        let extra = config.same_region_spacing(key.len());

        for (idx, label) in labels.iter().enumerate() {
            if label.key != key {
                continue;
            }
            let placed = match best_candidate(label, &candidates, &occupied, extra, config.region_padding) {
                Some((score, candidate)) => {
                    debug!(label = %label.text, x = candidate.x, y = candidate.y, score, "placed label");
                    PlacedLabel {
                        x: candidate.x,
                        y: candidate.y,
                        radius: label.radius,
                        key,
                        anchor: label.anchor,
                        quality: PlacementQuality::Clear,
                    }
                }
                None => fallback(label, key, &region, candidates.first()),
            };
            occupied.push(placed);
            slots[idx] = Some(placed);
        }
    }

    slots.into_iter().flatten().collect()
}

fn best_candidate(
    label: &Label,
    candidates: &[Candidate],
    occupied: &[PlacedLabel],
    same_region_extra: f32,
    padding: f32,
) -> Option<(f32, Candidate)> {
    let min_margin = label.radius + padding;
    let mut best: Option<(f32, Candidate)> = None;

    'candidates: for candidate in candidates {
        // Sorted by margin, so nothing further down can qualify.
        if candidate.margin < min_margin {
            break;
        }
        let mut clearance = f32::INFINITY;
        for other in occupied {
            let extra = if other.key == label.key { same_region_extra } else { 0.0 };
            let required = other.radius + label.radius + extra;
            let dist = (candidate.x - other.x).hypot(candidate.y - other.y);
            if dist < required {
                continue 'candidates;
            }
            clearance = clearance.min(dist - required);
        }
        let score = candidate.margin + CLEARANCE_WEIGHT * clearance;
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, *candidate));
        }
    }
    best
}

fn fallback(label: &Label, key: RegionKey, region: &str, top: Option<&Candidate>) -> PlacedLabel {
    let (x, y, quality) = match top {
        Some(candidate) => {
            warn!(
                label = %label.text,
                region = %region,
                margin = candidate.margin,
                "no admissible position; using the deepest region point"
            );
            (candidate.x, candidate.y, PlacementQuality::Overlapping)
        }
        None => {
            warn!(
                label = %label.text,
                region = %region,
                "region is empty at this grid step; using the anchor"
            );
            (label.anchor.0, label.anchor.1, PlacementQuality::Anchored)
        }
    };
    PlacedLabel {
        x,
        y,
        radius: label.radius,
        key,
        anchor: label.anchor,
        quality,
    }
}

/// Signed distance from `(x, y)` to the nearest boundary of `key`'s region.
/// Negative when the point lies outside the region.
pub fn region_margin(circles: &[Circle], key: RegionKey, x: f32, y: f32) -> f32 {
    circles
        .iter()
        .enumerate()
        .map(|(idx, circle)| {
            let d = circle.distance(x, y);
            if key.contains(idx) { circle.radius - d } else { d - circle.radius }
        })
        .fold(f32::INFINITY, f32::min)
}

/// Downgrade `Clear` labels whose disk no longer fits inside their region
/// after relaxation. Returns how many were flagged.
pub fn flag_displaced(circles: &[Circle], placed: &mut [PlacedLabel], texts: &[&str], padding: f32) -> usize {
    let mut flagged = 0;
    for (idx, label) in placed.iter_mut().enumerate() {
        if label.quality != PlacementQuality::Clear {
            continue;
        }
        let margin = region_margin(circles, label.key, label.x, label.y);
        if margin >= label.radius + padding {
            continue;
        }
        warn!(
            label = %texts.get(idx).copied().unwrap_or_default(),
            region = %label.key.names(circles).join("&"),
            margin,
            required = label.radius + padding,
            "relaxation moved label out of its region"
        );
        label.quality = PlacementQuality::Displaced;
        flagged += 1;
    }
    flagged
}

/// Force-relaxation pass: pairwise repulsion plus a weak pull toward each
/// label's anchor, clamped to the configured bounds every iteration.
/// `texts` supplies the text of each placed label, in the same order.
pub fn relax_labels(placed: &mut [PlacedLabel], texts: &[&str], font_size: f32, config: &RelaxConfig) {
    let radii: Vec<f32> = placed
        .iter()
        .enumerate()
        .map(|(idx, _)| relax_radius(texts.get(idx).copied().unwrap_or_default(), font_size))
        .collect();
    let cross_penalty = config.cluster_penalty.max(0.0);
    let cross_push = config.cluster_penalty.max(1.0);
    let spread = if config.cluster_spread.is_finite() && config.cluster_spread > 0.0 {
        config.cluster_spread / crate::config::DEFAULT_CLUSTER_SPREAD
    } else {
        1.0
    };
    let n = placed.len();

    for _ in 0..config.iterations {
        for i in 0..n {
            for j in (i + 1)..n {
                let same_key = placed[i].key == placed[j].key;
                let mut min_d = radii[i] + radii[j];
                if same_key {
                    min_d *= spread;
                } else {
                    min_d *= 1.0 + CROSS_KEY_SPACING * cross_penalty;
                }
                let mut dx = placed[i].x - placed[j].x;
                let mut dy = placed[i].y - placed[j].y;
                if dx == 0.0 && dy == 0.0 {
                    dx = COINCIDENT_NUDGE;
                    dy = 0.0;
                }
                let dist = dx.hypot(dy);
                if dist >= min_d {
                    continue;
                }
                let mut push = (min_d - dist) / min_d.max(1e-6);
                if !same_key {
                    push *= cross_push;
                }
                let (ux, uy) = (dx / dist, dy / dist);
                let shift = config.step * push;
                placed[i].x += ux * shift;
                placed[i].y += uy * shift;
                placed[j].x -= ux * shift;
                placed[j].y -= uy * shift;
            }
        }

        for label in placed.iter_mut() {
            label.x += (label.anchor.0 - label.x) * config.anchor_strength;
            label.y += (label.anchor.1 - label.y) * config.anchor_strength;
            label.x = label.x.clamp(config.x_bounds.0, config.x_bounds.1);
            label.y = label.y.clamp(config.y_bounds.0, config.y_bounds.1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(name: &str, center: (f32, f32), radius: f32) -> Circle {
        Circle {
            name: name.to_string(),
            center,
            radius,
        }
    }

    fn two_circles() -> Vec<Circle> {
        vec![circle("A", (4.0, 5.0), 2.5), circle("B", (6.0, 5.0), 2.5)]
    }

    fn label(text: &str, key: RegionKey, anchor: (f32, f32)) -> Label {
        Label {
            text: text.to_string(),
            key,
            radius: label_radius(text, 26.0),
            anchor,
        }
    }

    fn coarse() -> PlacementConfig {
        PlacementConfig {
            grid_step: 0.05,
            ..PlacementConfig::default()
        }
    }

    #[test]
    fn region_key_tracks_membership() {
        let key = RegionKey::from_indices([0, 2, 9]);
        assert_eq!(key.len(), 2);
        assert!(key.contains(0));
        assert!(!key.contains(1));
        assert!(key.contains(2));
        assert!(!key.contains(9));
        assert_eq!(key.indices().collect::<Vec<_>>(), vec![0, 2]);
        assert!(RegionKey::default().is_empty());
    }

    #[test]
    fn region_key_names_are_sorted() {
        let circles = vec![
            circle("Sequence", (0.0, 0.0), 1.0),
            circle("Numeric", (0.0, 0.0), 1.0),
        ];
        assert_eq!(RegionKey::from_indices([0, 1]).names(&circles), vec!["Numeric", "Sequence"]);
    }

    #[test]
    fn label_radius_grows_with_text_and_clamps_font_scale() {
        assert_relative_eq!(label_radius("", 26.0), 0.12);
        assert_relative_eq!(label_radius("Samples", 26.0), 0.12 + 0.049, epsilon = 1e-6);
        assert_relative_eq!(label_radius("Samples", 200.0), label_radius("Samples", 52.0));
        assert_relative_eq!(label_radius("Samples", 1.0), label_radius("Samples", 13.0));
        assert!(relax_radius("Samples", 26.0) < label_radius("Samples", 26.0));
    }

    #[test]
    fn grid_axis_includes_both_ends() {
        let axis = grid_axis(0.0, 10.0, 0.04);
        assert_eq!(axis.len(), 251);
        assert_relative_eq!(axis[250], 10.0, epsilon = 1e-4);
        assert!(grid_axis(1.0, 0.0, 0.1).is_empty());
        assert!(grid_axis(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn candidates_respect_region_and_sort_by_margin() {
        let circles = two_circles();
        let xs = grid_axis(0.0, 10.0, 0.1);
        let ys = xs.clone();
        let only_a = RegionKey::from_indices([0]);
        let candidates = region_candidates(&circles, only_a, &xs, &ys);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(circles[0].distance(c.x, c.y) <= circles[0].radius);
            assert!(circles[1].distance(c.x, c.y) >= circles[1].radius);
        }
        for pair in candidates.windows(2) {
            assert!(pair[0].margin >= pair[1].margin);
        }
    }

    #[test]
    fn regions_are_processed_by_cardinality_then_name() {
        let circles = vec![
            circle("B", (0.0, 0.0), 1.0),
            circle("A", (0.0, 0.0), 1.0),
            circle("C", (0.0, 0.0), 1.0),
        ];
        let labels = vec![
            label("x", RegionKey::from_indices([0]), (0.0, 0.0)),
            label("y", RegionKey::from_indices([1]), (0.0, 0.0)),
            label("z", RegionKey::from_indices([0, 2]), (0.0, 0.0)),
            label("w", RegionKey::from_indices([0, 1]), (0.0, 0.0)),
        ];
        let order = region_order(&circles, &labels);
        assert_eq!(
            order,
            vec![
                RegionKey::from_indices([0, 1]),
                RegionKey::from_indices([0, 2]),
                RegionKey::from_indices([1]),
                RegionKey::from_indices([0]),
            ]
        );
    }

    #[test]
    fn clear_labels_stay_inside_their_region() {
        let circles = two_circles();
        let both = RegionKey::from_indices([0, 1]);
        let only_a = RegionKey::from_indices([0]);
        let only_b = RegionKey::from_indices([1]);
        let labels = vec![
            label("Shared", both, (5.0, 5.0)),
            label("Left", only_a, (2.5, 5.0)),
            label("Right", only_b, (7.5, 5.0)),
            label("Left two", only_a, (2.5, 6.0)),
        ];
        let config = coarse();
        let placed = place_labels(&circles, &labels, &Plane::default(), &config);
        assert_eq!(placed.len(), labels.len());

        let tolerance = config.effective_grid_step();
        for (spec, p) in labels.iter().zip(&placed) {
            assert_eq!(p.quality, PlacementQuality::Clear, "{}", spec.text);
            let need = p.radius + config.region_padding - tolerance;
            for (idx, c) in circles.iter().enumerate() {
                let d = c.distance(p.x, p.y);
                if spec.key.contains(idx) {
                    assert!(c.radius - d >= need, "{} escapes {}", spec.text, c.name);
                } else {
                    assert!(d - c.radius >= need, "{} enters {}", spec.text, c.name);
                }
            }
        }
    }

    #[test]
    fn same_region_labels_keep_their_spacing() {
        let circles = two_circles();
        let only_a = RegionKey::from_indices([0]);
        let labels: Vec<Label> = ["One", "Two", "Three"]
            .iter()
            .map(|text| label(text, only_a, (2.5, 5.0)))
            .collect();
        let config = coarse();
        let placed = place_labels(&circles, &labels, &Plane::default(), &config);
        let extra = config.same_region_spacing(1);
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let (a, b) = (placed[i], placed[j]);
                assert_eq!(a.quality, PlacementQuality::Clear);
                let dist = (a.x - b.x).hypot(a.y - b.y);
                assert!(dist >= a.radius + b.radius + extra - 1e-4);
            }
        }
    }

    #[test]
    fn vanished_region_falls_back_to_anchor() {
        // Identical circles leave no "A only" area.
        let circles = vec![circle("A", (5.0, 5.0), 3.0), circle("B", (5.0, 5.0), 3.0)];
        let labels = vec![label("Lonely", RegionKey::from_indices([0]), (4.2, 5.1))];
        let placed = place_labels(&circles, &labels, &Plane::default(), &coarse());
        assert_eq!(placed[0].quality, PlacementQuality::Anchored);
        assert_eq!((placed[0].x, placed[0].y), (4.2, 5.1));
        assert!(placed[0].quality.is_degraded());
    }

    #[test]
    fn boundary_grid_points_do_not_count_as_region() {
        // With step 0.5 the shared edge passes exactly through grid points
        // such as (7, 5) and (5, 3).
        let circles = vec![circle("A", (5.0, 5.0), 2.0), circle("B", (5.0, 5.0), 2.0)];
        let only_a = RegionKey::from_indices([0]);
        let xs = grid_axis(0.0, 10.0, 0.5);
        assert!(xs.contains(&7.0) && xs.contains(&3.0));
        assert!(region_candidates(&circles, only_a, &xs, &xs).is_empty());

        let labels = vec![label("Edge", only_a, (6.0, 5.5))];
        let config = PlacementConfig {
            grid_step: 0.5,
            ..PlacementConfig::default()
        };
        let placed = place_labels(&circles, &labels, &Plane::default(), &config);
        assert_eq!(placed[0].quality, PlacementQuality::Anchored);
        assert_eq!((placed[0].x, placed[0].y), (6.0, 5.5));
    }

    #[test]
    fn region_margin_is_signed() {
        let circles = two_circles();
        let only_a = RegionKey::from_indices([0]);
        assert_relative_eq!(region_margin(&circles, only_a, 2.0, 5.0), 0.5, epsilon = 1e-6);
        assert!(region_margin(&circles, only_a, 5.0, 5.0) < 0.0);
        assert!(region_margin(&circles, only_a, 9.5, 5.0) < 0.0);
    }

    #[test]
    fn labels_pushed_out_of_their_region_are_flagged() {
        let circles = two_circles();
        let only_a = RegionKey::from_indices([0]);
        let at = |x: f32, quality| PlacedLabel {
            x,
            y: 5.0,
            radius: 0.2,
            key: only_a,
            anchor: (2.5, 5.0),
            quality,
        };
        let mut placed = vec![
            at(2.5, PlacementQuality::Clear),
            at(5.0, PlacementQuality::Clear),
            at(5.0, PlacementQuality::Overlapping),
        ];
        let flagged = flag_displaced(&circles, &mut placed, &["Inside", "Shared", "Stuck"], 0.03);
        assert_eq!(flagged, 1);
        assert_eq!(placed[0].quality, PlacementQuality::Clear);
        assert_eq!(placed[1].quality, PlacementQuality::Displaced);
        assert_eq!(placed[2].quality, PlacementQuality::Overlapping);
        assert!(placed[1].quality.is_degraded());
    }

    #[test]
    fn impossible_spacing_falls_back_to_deepest_point() {
        let circles = two_circles();
        let only_a = RegionKey::from_indices([0]);
        let labels = vec![label("First", only_a, (2.5, 5.0)), label("Second", only_a, (2.5, 5.0))];
        let config = PlacementConfig {
            spacing_overrides: [Some(50.0), None, None, None],
            ..coarse()
        };
        let placed = place_labels(&circles, &labels, &Plane::default(), &config);
        assert_eq!(placed[0].quality, PlacementQuality::Clear);
        assert_eq!(placed[1].quality, PlacementQuality::Overlapping);

        let xs = grid_axis(0.0, 10.0, config.effective_grid_step());
        let top = region_candidates(&circles, only_a, &xs, &xs)[0];
        assert_eq!((placed[1].x, placed[1].y), (top.x, top.y));
    }

    #[test]
    fn placement_is_deterministic() {
        let circles = two_circles();
        let labels = vec![
            label("Shared", RegionKey::from_indices([0, 1]), (5.0, 5.0)),
            label("Left", RegionKey::from_indices([0]), (2.5, 5.0)),
        ];
        let config = coarse();
        let first = place_labels(&circles, &labels, &Plane::default(), &config);
        let second = place_labels(&circles, &labels, &Plane::default(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn finest_grid_step_completes() {
        let circles = two_circles();
        let labels = vec![label("Shared", RegionKey::from_indices([0, 1]), (5.0, 5.0))];
        let config = PlacementConfig {
            grid_step: 0.001,
            ..PlacementConfig::default()
        };
        let started = std::time::Instant::now();
        let placed = place_labels(&circles, &labels, &Plane::default(), &config);
        assert_eq!(placed[0].quality, PlacementQuality::Clear);
        assert!(started.elapsed() < std::time::Duration::from_secs(30));
    }

    #[test]
    fn relaxation_separates_coincident_labels_within_bounds() {
        let key = RegionKey::from_indices([0]);
        let start = PlacedLabel {
            x: 5.0,
            y: 5.0,
            radius: 0.2,
            key,
            anchor: (5.0, 5.0),
            quality: PlacementQuality::Clear,
        };
        let mut placed = vec![start, start];
        let config = RelaxConfig {
            enabled: true,
            ..RelaxConfig::default()
        };
        relax_labels(&mut placed, &["Alpha", "Beta"], 26.0, &config);
        assert!(placed[0].x > placed[1].x);
        for p in &placed {
            assert!(p.x >= config.x_bounds.0 && p.x <= config.x_bounds.1);
            assert!(p.y >= config.y_bounds.0 && p.y <= config.y_bounds.1);
        }

        let mut again = vec![start, start];
        relax_labels(&mut again, &["Alpha", "Beta"], 26.0, &config);
        assert_eq!(placed, again);
    }

    #[test]
    fn relaxation_pushes_other_regions_harder() {
        let a = RegionKey::from_indices([0]);
        let b = RegionKey::from_indices([1]);
        let base = |x: f32, key: RegionKey| PlacedLabel {
            x,
            y: 5.0,
            radius: 0.2,
            key,
            anchor: (x, 5.0),
            quality: PlacementQuality::Clear,
        };
        let config = RelaxConfig {
            iterations: 1,
            ..RelaxConfig::default()
        };
        let mut same = vec![base(5.0, a), base(5.1, a)];
        let mut cross = vec![base(5.0, a), base(5.1, b)];
        relax_labels(&mut same, &["Alpha", "Beta"], 26.0, &config);
        relax_labels(&mut cross, &["Alpha", "Beta"], 26.0, &config);
        assert!(cross[1].x - cross[0].x > same[1].x - same[0].x);
    }
}
