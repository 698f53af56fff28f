use crate::config::RenderConfig;
use crate::error::FigureError;
use crate::layout::{
    ChartLayout, ColorBar, DiagramData, Layout, LegendLayout, Mark, Swatch, TextMark, VennLayout,
};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;
use tracing::info;

const PLOT_CLIP_ID: &str = "plot-clip";
const COLORBAR_GRADIENT_ID: &str = "colorbar-gradient";
// Distance from a line's vertical center to its alphabetic baseline, in em.
const BASELINE_SHIFT: f32 = 0.35;
const ARROW_HEAD: f32 = 9.0;
const TEXT_BACKGROUND_PAD: f32 = 3.0;

pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&layout.background)
    ));

    match &layout.diagram {
        DiagramData::Venn(venn) => render_venn(&mut svg, venn, theme),
        DiagramData::Chart(chart) => render_chart(&mut svg, chart, theme),
    }

    svg.push_str("</svg>");
    svg
}

fn render_venn(svg: &mut String, venn: &VennLayout, theme: &Theme) {
    for circle in &venn.circles {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.3}\" stroke=\"{}\" stroke-width=\"{}\"><title>{}</title></circle>",
            circle.cx,
            circle.cy,
            circle.r,
            escape_xml(&circle.fill),
            circle.fill_opacity,
            escape_xml(&circle.stroke),
            circle.stroke_width,
            escape_xml(&circle.name)
        ));
    }

    for label in &venn.labels {
        let x = label.x - label.box_width / 2.0;
        let y = label.y - label.box_height / 2.0;
        svg.push_str(&format!(
            "<g class=\"label\" data-quality=\"{}\"><title>{} ({}): {}</title>",
            label.quality().as_str(),
            escape_xml(&label.text.lines.join(" ")),
            escape_xml(&label.region.join(" ∩ ")),
            label.quality().as_str()
        ));
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            label.box_width,
            label.box_height,
            escape_xml(&theme.label_background),
            escape_xml(&label.color),
            label.border_width
        ));
        let mark = TextMark {
            x: label.x,
            y: label.y,
            text: label.text.clone(),
            anchor: Default::default(),
            color: label.color.clone(),
            rotate: 0.0,
            background: None,
        };
        svg.push_str(&text_svg(&mark, theme));
        svg.push_str("</g>");
    }

    for badge in &venn.badges {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\"/>",
            badge.x - badge.width / 2.0,
            badge.y - badge.height / 2.0,
            badge.width,
            badge.height,
            escape_xml(&badge.fill)
        ));
        let mark = TextMark {
            x: badge.x,
            y: badge.y,
            text: badge.text.clone(),
            anchor: Default::default(),
            color: badge.text_color.clone(),
            rotate: 0.0,
            background: None,
        };
        svg.push_str(&text_svg(&mark, theme));
    }
}

fn render_chart(svg: &mut String, chart: &ChartLayout, theme: &Theme) {
    let plot = &chart.plot;
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<clipPath id=\"{PLOT_CLIP_ID}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
        plot.left, plot.top, plot.width, plot.height
    ));
    if let Some(colorbar) = &chart.colorbar {
        gradient_svg(svg, colorbar);
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        plot.left,
        plot.top,
        plot.width,
        plot.height,
        escape_xml(&chart.plot_background)
    ));

    if chart.x_grid {
        for tick in &chart.x_ticks {
            line_svg(svg, (tick.pos, plot.top), (tick.pos, plot.bottom()), &theme.grid_color, 1.0);
        }
    }
    if chart.y_grid {
        for tick in &chart.y_ticks {
            line_svg(svg, (plot.left, tick.pos), (plot.right(), tick.pos), &theme.grid_color, 1.0);
        }
    }

    svg.push_str(&format!("<g clip-path=\"url(#{PLOT_CLIP_ID})\">"));
    for mark in &chart.marks {
        mark_svg(svg, mark, theme);
    }
    svg.push_str("</g>");

    if chart.show_axes {
        line_svg(svg, (plot.left, plot.bottom()), (plot.right(), plot.bottom()), &theme.axis_color, 1.2);
        line_svg(svg, (plot.left, plot.top), (plot.left, plot.bottom()), &theme.axis_color, 1.2);
    }
    for tick in chart.x_ticks.iter().chain(&chart.y_ticks) {
        svg.push_str(&text_svg(&tick.label, theme));
    }
    for title in [&chart.title, &chart.x_title, &chart.y_title].into_iter().flatten() {
        svg.push_str(&text_svg(title, theme));
    }

    for mark in &chart.overlays {
        mark_svg(svg, mark, theme);
    }
    if let Some(legend) = &chart.legend {
        legend_svg(svg, legend, theme);
    }
    if let Some(colorbar) = &chart.colorbar {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"url(#{COLORBAR_GRADIENT_ID})\"/>",
            colorbar.x, colorbar.y, colorbar.width, colorbar.height
        ));
        for tick in &colorbar.ticks {
            let right = colorbar.x + colorbar.width;
            line_svg(svg, (right, tick.pos), (right + 4.0, tick.pos), &theme.axis_color, 1.0);
            svg.push_str(&text_svg(&tick.label, theme));
        }
    }
}

fn gradient_svg(svg: &mut String, colorbar: &ColorBar) {
    svg.push_str(&format!(
        "<linearGradient id=\"{COLORBAR_GRADIENT_ID}\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">"
    ));
    for (offset, color) in &colorbar.stops {
        svg.push_str(&format!(
            "<stop offset=\"{:.3}\" stop-color=\"{}\"/>",
            offset,
            escape_xml(color)
        ));
    }
    svg.push_str("</linearGradient>");
}

fn mark_svg(svg: &mut String, mark: &Mark, theme: &Theme) {
    match mark {
        Mark::Rect {
            x,
            y,
            width,
            height,
            fill,
            opacity,
            stroke,
            tooltip,
        } => {
            let stroke_attr = stroke
                .as_ref()
                .map(|(color, width)| format!(" stroke=\"{}\" stroke-width=\"{width}\"", escape_xml(color)))
                .unwrap_or_default();
            svg.push_str(&format!(
                "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"{opacity:.3}\"{stroke_attr}>",
                width.max(0.0),
                height.max(0.0),
                escape_xml(fill)
            ));
            push_tooltip(svg, tooltip.as_deref());
            svg.push_str("</rect>");
        }
        Mark::Line {
            points,
            stroke,
            width,
            dash,
            opacity,
        } => {
            if points.len() < 2 {
                return;
            }
            let dash_attr = dash
                .dasharray(*width)
                .map(|dashes| format!(" stroke-dasharray=\"{dashes}\""))
                .unwrap_or_default();
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\" stroke-opacity=\"{opacity:.3}\" stroke-linejoin=\"round\"{dash_attr}/>",
                points_to_path(points, false),
                escape_xml(stroke)
            ));
        }
        Mark::Area {
            points,
            fill,
            opacity,
        } => {
            if points.len() < 3 {
                return;
            }
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"{}\" fill-opacity=\"{opacity:.3}\" stroke=\"none\"/>",
                points_to_path(points, true),
                escape_xml(fill)
            ));
        }
        Mark::Marker {
            x,
            y,
            size,
            fill,
            opacity,
            stroke,
            tooltip,
        } => {
            let stroke_attr = stroke
                .as_ref()
                .map(|(color, width)| format!(" stroke=\"{}\" stroke-width=\"{width}\"", escape_xml(color)))
                .unwrap_or_default();
            svg.push_str(&format!(
                "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{opacity:.3}\"{stroke_attr}>",
                size / 2.0,
                escape_xml(fill)
            ));
            push_tooltip(svg, tooltip.as_deref());
            svg.push_str("</circle>");
        }
        Mark::Arrow {
            from,
            to,
            color,
            width,
        } => arrow_svg(svg, *from, *to, color, *width),
        Mark::Text(text) => svg.push_str(&text_svg(text, theme)),
    }
}

fn arrow_svg(svg: &mut String, from: (f32, f32), to: (f32, f32), color: &str, width: f32) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let head = ARROW_HEAD.min(len);
    let base = (to.0 - ux * head, to.1 - uy * head);
    let half = head * 0.5;
    line_svg(svg, from, base, color, width);
    svg.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} Z\" fill=\"{}\"/>",
        to.0,
        to.1,
        base.0 - uy * half,
        base.1 + ux * half,
        base.0 + uy * half,
        base.1 - ux * half,
        escape_xml(color)
    ));
}

fn legend_svg(svg: &mut String, legend: &LegendLayout, theme: &Theme) {
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        legend.x,
        legend.y,
        legend.width,
        legend.height,
        escape_xml(&legend.background),
        escape_xml(&legend.border)
    ));
    for entry in &legend.entries {
        let (x, y) = (entry.x, entry.y);
        match &entry.swatch {
            Swatch::Rect { fill, opacity } => {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"20\" height=\"12\" fill=\"{}\" fill-opacity=\"{opacity:.3}\"/>",
                    x - 10.0,
                    y - 6.0,
                    escape_xml(fill)
                ));
            }
            Swatch::Line { stroke, width, dash } => {
                mark_svg(
                    svg,
                    &Mark::Line {
                        points: vec![(x - 12.0, y), (x + 12.0, y)],
                        stroke: stroke.clone(),
                        width: width.min(4.0),
                        dash: *dash,
                        opacity: 1.0,
                    },
                    theme,
                );
            }
            Swatch::Marker { fill } => {
                svg.push_str(&format!(
                    "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"6\" fill=\"{}\" stroke=\"#000000\" stroke-width=\"1.5\"/>",
                    escape_xml(fill)
                ));
            }
            Swatch::None => {}
        }
        svg.push_str(&text_svg(&entry.label, theme));
    }
}

fn line_svg(svg: &mut String, from: (f32, f32), to: (f32, f32), color: &str, width: f32) {
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width}\"/>",
        from.0,
        from.1,
        to.0,
        to.1,
        escape_xml(color)
    ));
}

fn push_tooltip(svg: &mut String, tooltip: Option<&str>) {
    if let Some(tooltip) = tooltip {
        svg.push_str(&format!("<title>{}</title>", escape_xml(tooltip)));
    }
}

fn points_to_path(points: &[(f32, f32)], close: bool) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        let cmd = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{cmd} {x:.2} {y:.2}"));
    }
    if close {
        d.push_str(" Z");
    }
    d
}

fn text_svg(mark: &TextMark, theme: &Theme) -> String {
    let block = &mark.text;
    let line_count = block.lines.len().max(1) as f32;
    let line_height = block.height / line_count;
    let top = mark.y - block.height / 2.0;
    let mut text = String::new();

    let transform = if mark.rotate.abs() > f32::EPSILON {
        format!(" transform=\"rotate({:.2} {:.2} {:.2})\"", mark.rotate, mark.x, mark.y)
    } else {
        String::new()
    };
    text.push_str(&format!("<g{transform}>"));

    if let Some(background) = &mark.background {
        let left = match mark.anchor.as_svg() {
            "start" => mark.x,
            "end" => mark.x - block.width,
            _ => mark.x - block.width / 2.0,
        };
        text.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            left - TEXT_BACKGROUND_PAD,
            top - TEXT_BACKGROUND_PAD,
            block.width + 2.0 * TEXT_BACKGROUND_PAD,
            block.height + 2.0 * TEXT_BACKGROUND_PAD,
            escape_xml(background)
        ));
    }

    let weight = if block.bold { " font-weight=\"bold\"" } else { "" };
    text.push_str(&format!(
        "<text text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{weight}>",
        mark.anchor.as_svg(),
        escape_xml(&theme.font_family),
        block.font_size,
        escape_xml(&mark.color)
    ));
    for (idx, line) in block.lines.iter().enumerate() {
        let baseline = top + line_height * (idx as f32 + 0.5) + block.font_size * BASELINE_SHIFT;
        text.push_str(&format!(
            "<tspan x=\"{:.2}\" y=\"{baseline:.2}\">{}</tspan>",
            mark.x,
            escape_xml(line)
        ));
    }
    text.push_str("</text></g>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            info!(path = %path.display(), "wrote svg");
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

/// Standalone HTML page with the SVG inlined.
pub fn write_output_html(svg: &str, title: &str, output: &Path) -> Result<()> {
    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>body{{margin:0;display:flex;justify-content:center;background:#ffffff}}svg{{max-width:100%;height:auto}}</style>\n</head>\n<body>\n{svg}\n</body>\n</html>\n",
        escape_xml(title)
    );
    std::fs::write(output, page)?;
    info!(path = %output.display(), "wrote html");
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.scale.is_finite() && render_cfg.scale > 0.0 {
        render_cfg.scale
    } else {
        1.0
    };
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate {width}x{height} pixmap"))?;
    match crate::theme::parse_hex_color(&render_cfg.background) {
        Some((r, g, b)) => pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255)),
        None => tracing::debug!(background = %render_cfg.background, "unparsed png background; leaving it transparent"),
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    info!(path = %output.display(), width, height, "wrote png");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(FigureError::PngUnsupported.into())
}

/// Write the figure in the format named by the output extension.
pub fn write_output(svg: &str, title: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let ext = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "svg" => write_output_svg(svg, Some(output)),
        "html" | "htm" => write_output_html(svg, title, output),
        "png" => write_output_png(svg, output, render_cfg),
        _ => Err(FigureError::UnsupportedOutput(output.display().to_string()).into()),
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
