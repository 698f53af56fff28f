use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_GRID_STEP: f32 = 0.01;
pub const DEFAULT_GRID_STEP: f32 = 0.04;
pub const DEFAULT_CLUSTER_SPREAD: f32 = 0.7;

// Same-region spacing as a fraction of `region_spacing`, indexed by
// cardinality - 1.
const SPACING_FALLBACK_FACTORS: [f32; 4] = [0.40, 0.60, 0.75, 1.00];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub grid_step: f32,
    pub region_padding: f32,
    pub region_spacing: f32,
    /// Explicit same-region spacing for 1-, 2-, 3- and 4-way regions.
    pub spacing_overrides: [Option<f32>; 4],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            region_padding: 0.03,
            region_spacing: 0.20,
            spacing_overrides: [None; 4],
        }
    }
}

impl PlacementConfig {
    /// Grid step actually used for sampling.
    pub fn effective_grid_step(&self) -> f32 {
        if self.grid_step.is_finite() {
            self.grid_step.max(MIN_GRID_STEP)
        } else {
            DEFAULT_GRID_STEP
        }
    }

    /// Extra clearance between two labels owned by the same region of the
    /// given cardinality.
    pub fn same_region_spacing(&self, cardinality: usize) -> f32 {
        let base = self.region_spacing.max(0.0);
        match cardinality {
            1..=4 => {
                let idx = cardinality - 1;
                match self.spacing_overrides[idx] {
                    Some(value) if value >= 0.0 => value,
                    _ => SPACING_FALLBACK_FACTORS[idx] * base,
                }
            }
            _ => SPACING_FALLBACK_FACTORS[1] * base,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxConfig {
    pub enabled: bool,
    pub iterations: usize,
    pub step: f32,
    pub cluster_penalty: f32,
    pub cluster_spread: f32,
    pub anchor_strength: f32,
    pub x_bounds: (f32, f32),
    pub y_bounds: (f32, f32),
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            iterations: 220,
            step: 0.07,
            cluster_penalty: 2.0,
            cluster_spread: DEFAULT_CLUSTER_SPREAD,
            anchor_strength: 0.04,
            x_bounds: (0.4, 9.6),
            y_bounds: (0.4, 9.6),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VennConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub circle_opacity: f32,
    pub color_strength: f32,
    pub shared_region: f32,
    pub label_padding: f32,
    pub strict: bool,
    pub placement: PlacementConfig,
    pub relax: RelaxConfig,
}

impl Default for VennConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 1500.0,
            margin: 40.0,
            font_size: 26.0,
            circle_opacity: 0.55,
            color_strength: 0.55,
            shared_region: 0.0,
            label_padding: 4.0,
            strict: false,
            placement: PlacementConfig::default(),
            relax: RelaxConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub label_line_height: f32,
    /// Skip font discovery and use the built-in width table.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_line_height: 1.2,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Rasterization scale for PNG export.
    pub scale: f32,
    /// Canvas fill painted under the SVG when rasterizing.
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub venn: VennConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VennConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    font_size: Option<f32>,
    circle_opacity: Option<f32>,
    color_strength: Option<f32>,
    shared_region: Option<f32>,
    cluster_penalty: Option<f32>,
    cluster_spread: Option<f32>,
    grid_step: Option<f32>,
    region_padding: Option<f32>,
    region_spacing: Option<f32>,
    #[serde(rename = "spacing1way")]
    spacing_1way: Option<f32>,
    #[serde(rename = "spacing2way")]
    spacing_2way: Option<f32>,
    #[serde(rename = "spacing3way")]
    spacing_3way: Option<f32>,
    #[serde(rename = "spacing4way")]
    spacing_4way: Option<f32>,
    relax: Option<bool>,
    relax_iterations: Option<usize>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeConfigFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    background: Option<String>,
    grid_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    venn: Option<VennConfigFile>,
    render: Option<RenderConfigFile>,
    theme: Option<ThemeConfigFile>,
    fast_text: Option<bool>,
}

/// Load defaults, then overlay a JSON (or `.json5`) config file when given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json5"));
    let parsed: ConfigFile = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    apply_config_file(&mut config, parsed);
    Ok(config)
}

/// Parse config text directly; used by tests and embedders.
pub fn parse_config_str(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(fast) = parsed.fast_text {
        config.layout.fast_text_metrics = fast;
    }

    if let Some(vars) = parsed.theme {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.theme.plot_background = v.clone();
            config.render.background = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    if let Some(venn) = parsed.venn {
        let target = &mut config.venn;
        if let Some(v) = venn.width {
            target.width = v;
        }
        if let Some(v) = venn.height {
            target.height = v;
        }
        if let Some(v) = venn.font_size {
            target.font_size = v;
        }
        if let Some(v) = venn.circle_opacity {
            target.circle_opacity = v;
        }
        if let Some(v) = venn.color_strength {
            target.color_strength = v;
        }
        if let Some(v) = venn.shared_region {
            target.shared_region = v;
        }
        if let Some(v) = venn.cluster_penalty {
            target.relax.cluster_penalty = v;
        }
        if let Some(v) = venn.cluster_spread {
            target.relax.cluster_spread = v;
        }
        if let Some(v) = venn.relax {
            target.relax.enabled = v;
        }
        if let Some(v) = venn.relax_iterations {
            target.relax.iterations = v;
        }
        if let Some(v) = venn.grid_step {
            target.placement.grid_step = v;
        }
        if let Some(v) = venn.region_padding {
            target.placement.region_padding = v;
        }
        if let Some(v) = venn.region_spacing {
            target.placement.region_spacing = v;
        }
        let overrides = [
            venn.spacing_1way,
            venn.spacing_2way,
            venn.spacing_3way,
            venn.spacing_4way,
        ];
        for (slot, value) in target.placement.spacing_overrides.iter_mut().zip(overrides) {
            if let Some(v) = value {
                *slot = (v >= 0.0).then_some(v);
            }
        }
        if let Some(v) = venn.strict {
            target.strict = v;
        }
    }
}
