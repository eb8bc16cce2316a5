use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use salary_scenes::scene::SceneData;

/// Area fill of the trend chart.
pub const TREND_COLOR: Color32 = Color32::from_rgb(70, 130, 180);

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
            let hue = (i as f32 / n as f32) * 360.0 + 210.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
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
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps chart series (group labels or histogram subkeys) to distinct colours,
/// keeping the order in which they were given.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: Vec<(String, Color32)>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let palette = generate_palette(keys.len());
        ColorMap {
            mapping: keys.into_iter().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Colours for whatever series `data` draws.
    pub fn for_scene_data(data: &SceneData) -> Self {
        match data {
            SceneData::Trend(_) => ColorMap {
                mapping: Vec::new(),
                default_color: TREND_COLOR,
            },
            SceneData::Comparison(rows) => Self::new(rows.iter().map(|r| r.label.as_str())),
            SceneData::Explore { criterion, .. } => Self::new(criterion.cross_tab().keys),
        }
    }

    /// Look up the colour for a given series key.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (key → colour) in series order.
    pub fn legend_entries(&self) -> &[(String, Color32)] {
        &self.mapping
    }
}
