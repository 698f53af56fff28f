use thiserror::Error;

/// Errors raised while building or exporting a figure.
///
/// Geometric infeasibility during label placement is not an error: it degrades
/// to a flagged placement. `DegradedPlacement` is only produced when the
/// caller asks for strict placement.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("label {label:?} references unknown category {category:?}")]
    UnknownCategory { label: String, category: String },

    #[error("label {label:?} does not belong to any category")]
    EmptyRegion { label: String },

    #[error("at most {max} categories are supported, got {count}")]
    TooManyCategories { count: usize, max: usize },

    #[error("{count} label(s) could not be placed inside their region: {labels}")]
    DegradedPlacement { count: usize, labels: String },

    #[error("unsupported output extension {0:?} (expected svg, html or png)")]
    UnsupportedOutput(String),

    #[error("PNG output requires the `png` feature")]
    PngUnsupported,
}
