use crate::config::{Config, load_config};
use crate::error::FigureError;
use crate::ir::Figure;
use crate::layout::{DiagramData, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::presets;
use crate::quantize::QuantizationParams;
use crate::render::{render_svg, write_output, write_output_html, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pfig", version, about = "Publication figures: concurrent circles, bars, heatmap and scoring curves")]
pub struct Args {
    /// Config file (JSON, or JSON5 with a .json5 extension)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `paper_figures=trace` (defaults to RUST_LOG, then `warn`)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Use the built-in width table instead of system fonts
    #[arg(long = "fast-text", global = true)]
    pub fast_text: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concurrent-circles diagram with region-constrained labels
    Venn(VennArgs),
    /// Accuracy before/after RL as overlaid grouped bars
    Bars(OutputArgs),
    /// GCD generalisation heatmap
    Heatmap(OutputArgs),
    /// Expected Brier score curves; prints the scenario table
    Brier(OutputArgs),
    /// Expected BrierLM curves; prints the figure caption
    Brierlm(OutputArgs),
    /// Negative log-likelihood curve
    Loss(OutputArgs),
    /// PCA view of parameters at several quantization precisions
    Quantization(QuantizationArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct OutputArgs {
    /// Output file; the format follows the extension (svg, html, png)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    fn resolve(&self, default: &str) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

#[derive(ClapArgs, Debug)]
pub struct VennArgs {
    #[arg(long)]
    pub width: Option<f32>,
    #[arg(long)]
    pub height: Option<f32>,
    #[arg(long = "font-size")]
    pub font_size: Option<f32>,
    /// Pull circles (and labels) toward the centroid, 0..=1
    #[arg(long = "shared-region", allow_negative_numbers = true)]
    pub shared_region: Option<f32>,
    #[arg(long = "cluster-penalty")]
    pub cluster_penalty: Option<f32>,
    #[arg(long = "cluster-spread")]
    pub cluster_spread: Option<f32>,
    /// Candidate grid resolution in data units (minimum 0.01)
    #[arg(long = "grid-step", allow_negative_numbers = true)]
    pub grid_step: Option<f32>,
    #[arg(long = "region-padding")]
    pub region_padding: Option<f32>,
    #[arg(long = "region-spacing", allow_negative_numbers = true)]
    pub region_spacing: Option<f32>,
    /// Same-region spacing for 1-way regions; negative means unset
    #[arg(long = "spacing-1way", allow_negative_numbers = true)]
    pub spacing_1way: Option<f32>,
    #[arg(long = "spacing-2way", allow_negative_numbers = true)]
    pub spacing_2way: Option<f32>,
    #[arg(long = "spacing-3way", allow_negative_numbers = true)]
    pub spacing_3way: Option<f32>,
    #[arg(long = "spacing-4way", allow_negative_numbers = true)]
    pub spacing_4way: Option<f32>,
    #[arg(long = "color-strength")]
    pub color_strength: Option<f32>,
    #[arg(long = "circle-opacity")]
    pub circle_opacity: Option<f32>,
    #[arg(long, default_value = "concurrent_circles.html")]
    pub html: PathBuf,
    #[arg(long)]
    pub png: Option<PathBuf>,
    #[arg(long)]
    pub svg: Option<PathBuf>,
    /// PNG rasterization scale
    #[arg(long)]
    pub scale: Option<f32>,
    /// Run the force-relaxation pass after placement
    #[arg(long)]
    pub relax: bool,
    /// Fail when any label falls back to a degraded placement
    #[arg(long)]
    pub strict: bool,
    /// Write computed placements as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct QuantizationArgs {
    #[command(flatten)]
    pub output: OutputArgs,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    #[arg(long, default_value_t = 4)]
    pub points: usize,
    #[arg(long, default_value_t = 64)]
    pub initial: usize,
    #[arg(long, value_delimiter = ',', default_values_t = [32, 16, 8, 4])]
    pub precisions: Vec<usize>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let mut config = load_config(args.config.as_deref())?;
    if args.fast_text {
        config.layout.fast_text_metrics = true;
    }

    match &args.command {
        Command::Venn(venn) => {
            apply_venn_args(&mut config, venn);
            run_venn(venn, &config)
        }
        Command::Bars(out) => export(
            &Figure::Bars(presets::grouped_bars()),
            &out.resolve("grouped_bars.html"),
            &config,
        ),
        Command::Heatmap(out) => {
            let default = if cfg!(feature = "png") {
                "omega_heatmap.png"
            } else {
                "omega_heatmap.svg"
            };
            export(&Figure::Heatmap(presets::omega_heatmap()), &out.resolve(default), &config)
        }
        Command::Brier(out) => {
            export(&Figure::Curves(presets::brier_chart()), &out.resolve("brier_score.html"), &config)?;
            println!("{}", presets::BRIER_TABLE);
            Ok(())
        }
        Command::Brierlm(out) => {
            export(
                &Figure::Curves(presets::brierlm_chart()),
                &out.resolve("brierlm_score.html"),
                &config,
            )?;
            println!("{}", presets::BRIERLM_CAPTION);
            Ok(())
        }
        Command::Loss(out) => export(
            &Figure::Curves(presets::loss_chart()),
            &out.resolve("loss_likelihood.html"),
            &config,
        ),
        Command::Quantization(quant) => {
            let params = QuantizationParams {
                n_points: quant.points,
                seed: quant.seed,
                initial_levels: quant.initial,
                lower_levels: quant.precisions.clone(),
                ..QuantizationParams::default()
            };
            export(
                &Figure::Scatter(presets::quantization_chart(&params)),
                &quant.output.resolve("quantization_plot.html"),
                &config,
            )
        }
    }
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Overlay command-line flags on the loaded config.
pub fn apply_venn_args(config: &mut Config, args: &VennArgs) {
    let venn = &mut config.venn;
    let scalars = [
        (args.width, &mut venn.width),
        (args.height, &mut venn.height),
        (args.font_size, &mut venn.font_size),
        (args.shared_region, &mut venn.shared_region),
        (args.color_strength, &mut venn.color_strength),
        (args.circle_opacity, &mut venn.circle_opacity),
        (args.cluster_penalty, &mut venn.relax.cluster_penalty),
        (args.cluster_spread, &mut venn.relax.cluster_spread),
        (args.grid_step, &mut venn.placement.grid_step),
        (args.region_padding, &mut venn.placement.region_padding),
        (args.region_spacing, &mut venn.placement.region_spacing),
        (args.scale, &mut config.render.scale),
    ];
    for (value, slot) in scalars {
        if let Some(value) = value {
            *slot = value;
        }
    }

    let overrides = [args.spacing_1way, args.spacing_2way, args.spacing_3way, args.spacing_4way];
    for (slot, value) in venn.placement.spacing_overrides.iter_mut().zip(overrides) {
        if let Some(value) = value {
            *slot = (value >= 0.0).then_some(value);
        }
    }
    if args.relax {
        venn.relax.enabled = true;
    }
    if args.strict {
        venn.strict = true;
    }
}

fn run_venn(args: &VennArgs, config: &Config) -> Result<()> {
    let layout = compute_layout(&Figure::Venn(presets::default_venn()), config)?;
    let DiagramData::Venn(venn) = &layout.diagram else {
        anyhow::bail!("venn figure produced a chart layout");
    };

    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &layout, venn)?;
        info!(path = %path.display(), "wrote layout dump");
    }

    if config.venn.strict {
        let degraded: Vec<String> = venn
            .degraded()
            .map(|label| format!("{} ({})", label.text.lines.join(" "), label.quality().as_str()))
            .collect();
        if !degraded.is_empty() {
            return Err(FigureError::DegradedPlacement {
                count: degraded.len(),
                labels: degraded.join(", "),
            }
            .into());
        }
    }

    let svg = render_svg(&layout, &config.theme);
    write_output_html(&svg, &layout.title, &args.html)?;
    if let Some(path) = &args.svg {
        write_output_svg(&svg, Some(path))?;
    }
    if let Some(path) = &args.png {
        write_output_png(&svg, path, &config.render)?;
    }
    Ok(())
}

fn export(figure: &Figure, output: &std::path::Path, config: &Config) -> Result<()> {
    let layout = compute_layout(figure, config)?;
    let svg = render_svg(&layout, &config.theme);
    write_output(&svg, &layout.title, output, &config.render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config_str;

    fn venn_args(argv: &[&str]) -> VennArgs {
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Command::Venn(venn) => venn,
            other => panic!("expected venn command, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_config_file_values() {
        let mut config = parse_config_str(r#"{ venn: { sharedRegion: 0.2, gridStep: 0.05, fontSize: 30 } }"#).unwrap();
        let args = venn_args(&["pfig", "venn", "--shared-region", "0.6", "--relax", "--scale", "3"]);
        apply_venn_args(&mut config, &args);
        assert_eq!(config.venn.shared_region, 0.6);
        assert_eq!(config.venn.placement.grid_step, 0.05);
        assert_eq!(config.venn.font_size, 30.0);
        assert!(config.venn.relax.enabled);
        assert_eq!(config.render.scale, 3.0);
    }

    #[test]
    fn negative_spacing_flag_clears_the_override() {
        let mut config = parse_config_str(r#"{ venn: { spacing3way: 0.4 } }"#).unwrap();
        assert_eq!(config.venn.placement.spacing_overrides[2], Some(0.4));
        let args = venn_args(&["pfig", "venn", "--spacing-3way", "-1", "--spacing-1way", "0.1"]);
        apply_venn_args(&mut config, &args);
        assert_eq!(config.venn.placement.spacing_overrides[2], None);
        assert_eq!(config.venn.placement.spacing_overrides[0], Some(0.1));
    }

    #[test]
    fn negative_shared_region_is_accepted_and_clamped() {
        let mut config = Config::default();
        let args = venn_args(&["pfig", "venn", "--shared-region", "-0.5"]);
        apply_venn_args(&mut config, &args);
        assert_eq!(config.venn.shared_region, -0.5);
        assert_eq!(crate::layout::clamp_shared(config.venn.shared_region), 0.0);
    }

    #[test]
    fn defaults_name_the_output_files() {
        let args = venn_args(&["pfig", "venn"]);
        assert_eq!(args.html, PathBuf::from("concurrent_circles.html"));
        assert!(args.png.is_none());

        let parsed = Args::try_parse_from(["pfig", "--fast-text", "quantization", "--precisions", "16,4"]).unwrap();
        assert!(parsed.fast_text);
        let Command::Quantization(quant) = parsed.command else {
            panic!("expected quantization command");
        };
        assert_eq!(quant.precisions, vec![16, 4]);
        assert_eq!(quant.seed, 42);
        assert_eq!(quant.output.resolve("quantization_plot.html"), PathBuf::from("quantization_plot.html"));
    }

    #[test]
    fn export_writes_the_requested_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        let path = dir.path().join("loss.svg");
        export(&Figure::Curves(presets::loss_chart()), &path, &config).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
    }
}
