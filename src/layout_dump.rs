use crate::layout::{Layout, PlacementQuality, VennLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub categories: Vec<CategoryDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct CategoryDump {
    pub name: String,
    /// Data-space center after shared-region interpolation.
    pub center: [f32; 2],
    pub radius: f32,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub text: String,
    pub region: Vec<String>,
    pub anchor: [f32; 2],
    pub position: [f32; 2],
    pub radius: f32,
    pub quality: PlacementQuality,
    /// Box center in pixels.
    pub pixel: [f32; 2],
}

impl LayoutDump {
    pub fn from_venn(layout: &Layout, venn: &VennLayout) -> Self {
        let categories = venn
            .circles
            .iter()
            .map(|circle| CategoryDump {
                name: circle.name.clone(),
                center: [circle.center.0, circle.center.1],
                radius: circle.radius,
            })
            .collect();

        let labels = venn
            .labels
            .iter()
            .map(|label| LabelDump {
                text: label.text.lines.join(" "),
                region: label.region.clone(),
                anchor: [label.placement.anchor.0, label.placement.anchor.1],
                position: [label.placement.x, label.placement.y],
                radius: label.placement.radius,
                quality: label.quality(),
                pixel: [label.x, label.y],
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            categories,
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, venn: &VennLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_venn(layout, venn);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::Figure;
    use crate::layout::{DiagramData, compute_layout};
    use crate::presets::default_venn;

    #[test]
    fn dump_lists_every_placed_label() {
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        let layout = compute_layout(&Figure::Venn(default_venn()), &config).unwrap();
        let DiagramData::Venn(venn) = &layout.diagram else {
            panic!("expected venn layout");
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        write_layout_dump(&path, &layout, venn).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["categories"].as_array().unwrap().len(), 4);
        let labels = value["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 17);
        assert_eq!(labels[0]["text"], "Description");
        assert_eq!(labels[0]["region"].as_array().unwrap().len(), 4);
        assert!(labels[0]["quality"].is_string());
    }
}
