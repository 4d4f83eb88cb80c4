use eframe::egui::Color32;

use super::selection::SelectionState;
use crate::config::{ForceConfig, Palette, Theme};
use crate::dataset::{ClusterMap, Edge, Node};

const HIGHLIGHT_LINK_WIDTH: f32 = 4.0;
const DIMMED_LINK_WIDTH: f32 = 1.0;

/// Everything the canvas needs to paint one frame, derived from scratch
/// whenever selection, clusters or theme change.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct ViewStyle {
    pub(in crate::app) node_colors: Vec<Color32>,
    pub(in crate::app) node_emphasized: Vec<bool>,
    pub(in crate::app) link_colors: Vec<Color32>,
    pub(in crate::app) link_widths: Vec<f32>,
    pub(in crate::app) background: Color32,
    pub(in crate::app) grid: Color32,
    pub(in crate::app) label: Color32,
    pub(in crate::app) outline: Color32,
    pub(in crate::app) selection_rect: Color32,
    pub(in crate::app) node_default: Color32,
    pub(in crate::app) link_default: Color32,
}

impl ViewStyle {
    fn themed(theme: &Theme) -> Self {
        Self {
            node_colors: Vec::new(),
            node_emphasized: Vec::new(),
            link_colors: Vec::new(),
            link_widths: Vec::new(),
            background: theme.background.0,
            grid: theme.grid.0,
            label: theme.label.0,
            outline: theme.node_outline.0,
            selection_rect: theme.selection_rect.0,
            node_default: theme.node_default.0,
            link_default: theme.link_default.0,
        }
    }

    pub(in crate::app) fn node_color(&self, index: usize) -> Color32 {
        self.node_colors
            .get(index)
            .copied()
            .unwrap_or(self.node_default)
    }

    pub(in crate::app) fn is_node_emphasized(&self, index: usize) -> bool {
        self.node_emphasized.get(index).copied().unwrap_or(false)
    }

    pub(in crate::app) fn link_color(&self, index: usize) -> Color32 {
        self.link_colors
            .get(index)
            .copied()
            .unwrap_or(self.link_default)
    }

    pub(in crate::app) fn link_width(&self, index: usize) -> f32 {
        self.link_widths
            .get(index)
            .copied()
            .unwrap_or(DIMMED_LINK_WIDTH)
    }
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self::themed(&Theme::light())
    }
}

pub(in crate::app) struct StyleInputs<'a> {
    pub(in crate::app) nodes: &'a [Node],
    pub(in crate::app) links: &'a [Edge],
    pub(in crate::app) selection: &'a SelectionState,
    /// `None` while clusters are stale.
    pub(in crate::app) clusters: Option<&'a ClusterMap>,
    pub(in crate::app) palette: &'a Palette,
    pub(in crate::app) dark_mode: bool,
    pub(in crate::app) cluster_coloring: bool,
}

pub(in crate::app) fn derive_style(inputs: &StyleInputs<'_>) -> ViewStyle {
    let theme = inputs.palette.theme(inputs.dark_mode);
    let selection = inputs.selection;
    let clusters = inputs.clusters.filter(|_| inputs.cluster_coloring);
    let mut style = ViewStyle::themed(theme);

    style.node_colors = inputs
        .nodes
        .iter()
        .map(|node| {
            if selection.is_primary(&node.id) {
                theme.node_selected.0
            } else if selection.is_node_highlighted(&node.id) {
                theme.node_connected.0
            } else if let Some(cluster) = clusters.and_then(|map| map.cluster_of(&node.id)) {
                inputs.palette.cluster_color(cluster)
            } else {
                theme.node_default.0
            }
        })
        .collect();
    style.node_emphasized = inputs
        .nodes
        .iter()
        .map(|node| selection.is_node_highlighted(&node.id))
        .collect();

    let highlight_active = selection.has_highlight();
    for link in inputs.links {
        if selection.is_link_highlighted(&link.id) {
            style.link_colors.push(theme.link_selected.0);
            style.link_widths.push(HIGHLIGHT_LINK_WIDTH);
        } else {
            style.link_colors.push(theme.link_default.0);
            style.link_widths.push(if highlight_active {
                DIMMED_LINK_WIDTH
            } else {
                weighted_width(link.weight)
            });
        }
    }

    style
}

fn weighted_width(weight: f64) -> f32 {
    ((weight * 2.0) as f32).max(1.0)
}

/// Per-link distance and per-node charge handed to the simulation's named
/// forces.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct ForceParams {
    pub(in crate::app) link_distance: Vec<f32>,
    pub(in crate::app) charge: Vec<f32>,
}

pub(in crate::app) fn derive_forces(
    nodes: &[Node],
    links: &[Edge],
    selection: &SelectionState,
    config: &ForceConfig,
    emphasize: bool,
) -> ForceParams {
    let link_distance = links
        .iter()
        .map(|link| {
            if emphasize && selection.is_link_highlighted(&link.id) {
                config.link_distance * config.emphasis_distance_factor
            } else {
                config.link_distance
            }
        })
        .collect();
    let charge = nodes
        .iter()
        .map(|node| {
            if emphasize && selection.is_node_highlighted(&node.id) {
                config.charge_strength * config.emphasis_charge_factor
            } else {
                config.charge_strength
            }
        })
        .collect();

    ForceParams {
        link_distance,
        charge,
    }
}
