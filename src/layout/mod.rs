mod axis;
mod bars;
mod curves;
mod heatmap;
pub mod label_placement;
mod legend;
mod scatter;
mod text;
pub(crate) mod types;
mod venn;

pub use axis::{format_tick, nice_number, nice_ticks};
pub use bars::compute_bar_layout;
pub use curves::compute_curve_layout;
pub use heatmap::compute_heatmap_layout;
pub use label_placement::{
    Candidate, Circle, Label, PlacedLabel, PlacementQuality, Plane, RegionKey, MAX_CATEGORIES,
};
pub use scatter::{compute_scatter_layout, data_extent};
pub use text::measure_label;
pub use types::*;
pub use venn::{
    anchor_factor, centroid, clamp_shared, compute_venn_layout, interpolate_anchor,
    interpolate_centers, region_keys,
};

use crate::config::{Config, LayoutConfig};
use crate::error::FigureError;
use crate::ir::Figure;
use crate::theme::Theme;

/// Lay out any figure. Only the Venn figure can fail, on malformed labels.
pub fn compute_layout(figure: &Figure, config: &Config) -> Result<Layout, FigureError> {
    let theme = &config.theme;
    let layout_config = &config.layout;
    let layout = match figure {
        Figure::Venn(diagram) => compute_venn_layout(diagram, theme, &config.venn, layout_config)?,
        Figure::Bars(chart) => compute_bar_layout(chart, theme, layout_config),
        Figure::Heatmap(heatmap) => compute_heatmap_layout(heatmap, theme, layout_config),
        Figure::Curves(chart) => compute_curve_layout(chart, theme, layout_config),
        Figure::Scatter(chart) => compute_scatter_layout(chart, theme, layout_config),
    };
    Ok(layout)
}
