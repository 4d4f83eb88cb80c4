use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::de::{self, Deserializer};
use serde::Deserialize;

const CLUSTER_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// A color written as `#rrggbb` or `#rrggbbaa` in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HexColor(pub Color32);

impl HexColor {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        Color32::from_hex(text)
            .map(Self)
            .map_err(|error| format!("invalid color {text:?}: {error:?}"))
    }

    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Color32::from_rgb(r, g, b))
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Theme {
    pub background: HexColor,
    pub grid: HexColor,
    pub label: HexColor,
    pub node_default: HexColor,
    pub node_selected: HexColor,
    pub node_connected: HexColor,
    pub node_outline: HexColor,
    pub link_default: HexColor,
    pub link_selected: HexColor,
    pub selection_rect: HexColor,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: HexColor::rgb(246, 247, 249),
            grid: HexColor(Color32::from_rgba_unmultiplied(150, 160, 170, 50)),
            label: HexColor::rgb(34, 38, 44),
            node_default: HexColor::rgb(74, 144, 217),
            node_selected: HexColor::rgb(230, 82, 82),
            node_connected: HexColor::rgb(242, 178, 51),
            node_outline: HexColor(Color32::from_rgba_unmultiplied(40, 40, 40, 160)),
            link_default: HexColor::rgb(153, 153, 153),
            link_selected: HexColor::rgb(230, 82, 82),
            selection_rect: HexColor::rgb(64, 128, 255),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: HexColor::rgb(19, 23, 29),
            grid: HexColor(Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
            label: HexColor::rgb(238, 238, 238),
            node_default: HexColor::rgb(105, 179, 255),
            node_selected: HexColor::rgb(245, 206, 93),
            node_connected: HexColor::rgb(241, 146, 94),
            node_outline: HexColor(Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            link_default: HexColor::rgb(90, 100, 112),
            link_selected: HexColor::rgb(246, 206, 104),
            selection_rect: HexColor::rgb(100, 150, 255),
        }
    }
}

fn default_cluster_colors() -> Vec<HexColor> {
    CLUSTER_COLORS
        .iter()
        .filter_map(|text| HexColor::parse(text).ok())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Palette {
    #[serde(default = "Theme::light")]
    pub light: Theme,
    #[serde(default = "Theme::dark")]
    pub dark: Theme,
    #[serde(default = "default_cluster_colors")]
    pub clusters: Vec<HexColor>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            light: Theme::light(),
            dark: Theme::dark(),
            clusters: default_cluster_colors(),
        }
    }
}

impl Palette {
    pub fn theme(&self, dark_mode: bool) -> &Theme {
        if dark_mode { &self.dark } else { &self.light }
    }

    pub fn cluster_color(&self, cluster: usize) -> Color32 {
        if self.clusters.is_empty() {
            return Color32::GRAY;
        }
        self.clusters[cluster % self.clusters.len()].0
    }
}

/// Simulation defaults and the emphasis applied to focused elements.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub center_strength: f32,
    pub emphasis_distance_factor: f32,
    pub emphasis_charge_factor: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            charge_strength: -80.0,
            center_strength: 0.05,
            emphasis_distance_factor: 2.5,
            emphasis_charge_factor: 3.0,
        }
    }
}

/// Contents of the optional `--config` JSON file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub forces: ForceConfig,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub palette: Palette,
    pub forces: ForceConfig,
    pub dark_mode: bool,
    pub export_dir: PathBuf,
    pub entities: Option<PathBuf>,
    pub relationships: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_settings_use_builtin_palette_and_forces() {
        let settings: SettingsFile = serde_json::from_str("{}").expect("settings");
        assert_eq!(settings, SettingsFile::default());
        assert_eq!(settings.palette.clusters.len(), CLUSTER_COLORS.len());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let settings: SettingsFile = serde_json::from_str(
            r##"{"palette": {"clusters": ["#000000", "#ffffff"]}, "forces": {"charge_strength": -120.0}}"##,
        )
        .expect("settings");

        assert_eq!(settings.palette.cluster_color(0), Color32::BLACK);
        assert_eq!(settings.palette.cluster_color(3), Color32::WHITE);
        assert_eq!(settings.palette.dark, Theme::dark());
        assert_eq!(settings.forces.charge_strength, -120.0);
        assert_eq!(settings.forces.link_distance, 30.0);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        let result = serde_json::from_str::<SettingsFile>(r#"{"palette": {"clusters": ["red"]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn theme_follows_dark_mode() {
        let palette = Palette::default();
        assert_eq!(palette.theme(true), &palette.dark);
        assert_eq!(palette.theme(false), &palette.light);
    }
}
