use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: miRNA name → Color32
// ---------------------------------------------------------------------------

/// Gives every miRNA its own hue; genes share one neutral colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    gene_color: Color32,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given miRNA names.
    pub fn new<'a>(mirnas: impl ExactSizeIterator<Item = &'a String>) -> Self {
        let palette = generate_palette(mirnas.len());
        let mapping: BTreeMap<String, Color32> = mirnas
            .zip(palette)
            .map(|(m, c): (&String, Color32)| (m.clone(), c))
            .collect();

        ColorMap {
            mapping,
            gene_color: Color32::LIGHT_GRAY,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a miRNA.
    pub fn color_for(&self, mirna: &str) -> Color32 {
        self.mapping
            .get(mirna)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn gene_color(&self) -> Color32 {
        self.gene_color
    }

    /// Return the legend entries (miRNA → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(m, c): (&String, &Color32)| (m.clone(), *c))
            .collect()
    }
}
