use std::collections::HashMap;
use std::time::Duration;

use eframe::egui::{Pos2, Rect};
use tracing::{debug, info, warn};

use super::engine::{NamedForce, RenderEngine};
use super::selection::{Emphasis, SelectionState, Transition, nodes_in_region};
use super::view_adapter::{StyleInputs, derive_forces, derive_style};
use crate::config::{ForceConfig, Palette};
use crate::dataset::{
    ClusterState, DatasetError, DatasetKind, DatasetPayload, DiscardedEdge, HighlightExport,
    LoadedDataset, RawEntity, RawRelationship, export_highlighted, normalize,
};

const CENTER_DURATION: Duration = Duration::from_millis(1000);
const FIT_DURATION: Duration = Duration::from_millis(400);
const FIT_PADDING: f32 = 50.0;
const FIT_DELAY_AFTER_GENERATE: Duration = Duration::from_secs(1);
const FOCUS_DURATION: Duration = Duration::from_millis(1000);
const FOCUS_ZOOM: f32 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum DetailTarget {
    Node(usize),
    Link(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct GenerationSummary {
    pub(in crate::app) nodes: usize,
    pub(in crate::app) links: usize,
    pub(in crate::app) discarded: usize,
    pub(in crate::app) clusters: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum PanelEntry {
    Node(String),
    Link(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct NodeEntry {
    pub(in crate::app) id: String,
    pub(in crate::app) name: String,
    pub(in crate::app) entity_type: String,
    pub(in crate::app) topic_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct LinkEntry {
    pub(in crate::app) id: String,
    pub(in crate::app) description: Option<String>,
    pub(in crate::app) source_name: String,
    pub(in crate::app) target_name: String,
    pub(in crate::app) weight: f64,
}

/// Contents of the highlight side panel, in graph order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct HighlightSummary {
    pub(in crate::app) nodes: Vec<NodeEntry>,
    pub(in crate::app) links: Vec<LinkEntry>,
}

/// Application state behind the canvas. Every user action is a method here;
/// the render engine only receives commands.
pub(in crate::app) struct Controller {
    palette: Palette,
    forces: ForceConfig,
    entities: Option<Vec<RawEntity>>,
    relationships: Option<Vec<RawRelationship>>,
    discarded: Vec<DiscardedEdge>,
    clusters: ClusterState,
    cluster_coloring: bool,
    dark_mode: bool,
    selection: SelectionState,
    details: Option<DetailTarget>,
    emphasis_active: bool,
    node_index: HashMap<String, usize>,
    link_index: HashMap<String, usize>,
}

impl Controller {
    pub(in crate::app) fn new(palette: Palette, forces: ForceConfig, dark_mode: bool) -> Self {
        Self {
            palette,
            forces,
            entities: None,
            relationships: None,
            discarded: Vec::new(),
            clusters: ClusterState::default(),
            cluster_coloring: false,
            dark_mode,
            selection: SelectionState::default(),
            details: None,
            emphasis_active: false,
            node_index: HashMap::new(),
            link_index: HashMap::new(),
        }
    }

    pub(in crate::app) fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub(in crate::app) fn clusters(&self) -> &ClusterState {
        &self.clusters
    }

    pub(in crate::app) fn discarded(&self) -> &[DiscardedEdge] {
        &self.discarded
    }

    pub(in crate::app) fn cluster_coloring(&self) -> bool {
        self.cluster_coloring
    }

    pub(in crate::app) fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub(in crate::app) fn details(&self) -> Option<DetailTarget> {
        self.details
    }

    pub(in crate::app) fn node_index(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub(in crate::app) fn load_dataset(&mut self, dataset: LoadedDataset) {
        info!(
            kind = %dataset.kind(),
            file = %dataset.file_name(),
            records = dataset.record_count(),
            "dataset loaded"
        );
        match dataset.payload {
            DatasetPayload::Entities(records) => self.entities = Some(records),
            DatasetPayload::Relationships(records) => self.relationships = Some(records),
        }
    }

    pub(in crate::app) fn clear_dataset(&mut self, kind: DatasetKind) {
        match kind {
            DatasetKind::Entities => self.entities = None,
            DatasetKind::Relationships => self.relationships = None,
        }
    }

    /// Rebuilds the graph from the loaded datasets. On error nothing changes.
    pub(in crate::app) fn generate(
        &mut self,
        engine: &mut impl RenderEngine,
    ) -> Result<GenerationSummary, DatasetError> {
        let graph = normalize(self.entities.as_deref(), self.relationships.as_deref())?;

        let mut nodes = graph.nodes;
        self.clusters.invalidate();
        let cluster_count = self
            .clusters
            .recompute(&nodes, &graph.edges)
            .cluster_count();
        if let Some(map) = self.clusters.current() {
            map.apply_to(&mut nodes);
        }

        let summary = GenerationSummary {
            nodes: nodes.len(),
            links: graph.edges.len(),
            discarded: graph.discarded.len(),
            clusters: cluster_count,
        };

        self.discarded = graph.discarded;
        self.selection.reset();
        self.details = None;
        self.emphasis_active = false;

        engine.replace_graph(nodes, graph.edges);
        self.node_index = index_by_id(engine.nodes().iter().map(|node| node.id.as_str()));
        self.link_index = index_by_id(engine.links().iter().map(|link| link.id.as_str()));
        engine.set_interactions(true, true);
        self.push_forces(engine, false);
        self.refresh(engine);
        engine.zoom_to_fit(FIT_DURATION, FIT_PADDING, FIT_DELAY_AFTER_GENERATE);

        info!(
            nodes = summary.nodes,
            valid_links = summary.links,
            invalid_links = summary.discarded,
            clusters = summary.clusters,
            "graph generated"
        );
        Ok(summary)
    }

    /// Regenerates from the current datasets, if both are loaded.
    pub(in crate::app) fn reset(
        &mut self,
        engine: &mut impl RenderEngine,
    ) -> Result<Option<GenerationSummary>, DatasetError> {
        if self.entities.is_none() || self.relationships.is_none() {
            return Ok(None);
        }
        self.generate(engine).map(Some)
    }

    pub(in crate::app) fn click_node(&mut self, engine: &mut impl RenderEngine, index: usize) {
        let Some(node) = engine.nodes().get(index) else {
            return;
        };
        let id = node.id.clone();

        if let Some(transition) = self.selection.focus_node(&id, engine.links()) {
            self.details = Some(DetailTarget::Node(index));
            self.apply_transition(engine, transition);
        }
    }

    pub(in crate::app) fn click_link(&mut self, engine: &mut impl RenderEngine, index: usize) {
        let Some(link) = engine.links().get(index) else {
            return;
        };
        let id = link.id.clone();

        if let Some(transition) = self.selection.focus_link(&id) {
            self.details = Some(DetailTarget::Link(index));
            self.apply_transition(engine, transition);
        }
    }

    pub(in crate::app) fn click_background(&mut self, engine: &mut impl RenderEngine) {
        if let Some(transition) = self.selection.clear() {
            self.apply_transition(engine, transition);
        }
    }

    pub(in crate::app) fn set_region_mode(&mut self, engine: &mut impl RenderEngine, enabled: bool) {
        if enabled == self.selection.region_mode() {
            return;
        }

        let transition = if enabled {
            Some(self.selection.enter_region_mode())
        } else {
            self.selection.exit_region_mode()
        };
        if let Some(transition) = transition {
            self.apply_transition(engine, transition);
        }
    }

    /// Selects nodes inside the rectangle spanned by two screen points.
    pub(in crate::app) fn select_region(
        &mut self,
        engine: &mut impl RenderEngine,
        start: Pos2,
        end: Pos2,
    ) {
        let region = Rect::from_two_pos(engine.screen_to_graph(start), engine.screen_to_graph(end));
        let selected = nodes_in_region(region, engine.nodes(), |index| engine.node_position(index));

        if let Some(transition) = self.selection.select_region(selected, engine.links()) {
            self.apply_transition(engine, transition);
        }
    }

    /// Returns whether the request was honored. Coloring by cluster is
    /// refused while cluster assignments are stale.
    pub(in crate::app) fn set_cluster_coloring(
        &mut self,
        engine: &mut impl RenderEngine,
        enabled: bool,
    ) -> bool {
        if enabled && self.clusters.current().is_none() {
            warn!("cluster coloring requested before clusters were computed");
            return false;
        }

        self.cluster_coloring = enabled;
        self.refresh(engine);
        true
    }

    pub(in crate::app) fn set_dark_mode(&mut self, engine: &mut impl RenderEngine, dark_mode: bool) {
        self.dark_mode = dark_mode;
        self.refresh(engine);
    }

    pub(in crate::app) fn center_graph(&self, engine: &mut impl RenderEngine) {
        engine.center_at(Pos2::ZERO, CENTER_DURATION);
    }

    pub(in crate::app) fn zoom_fit(&self, engine: &mut impl RenderEngine) {
        engine.zoom_to_fit(FIT_DURATION, FIT_PADDING, Duration::ZERO);
    }

    pub(in crate::app) fn close_details(&mut self) {
        self.details = None;
    }

    pub(in crate::app) fn highlight_summary(
        &self,
        engine: &impl RenderEngine,
    ) -> Option<HighlightSummary> {
        if !self.selection.has_highlight() {
            return None;
        }

        let nodes = engine.nodes();
        let display_name = |id: &str| {
            self.node_index(id)
                .and_then(|index| nodes.get(index))
                .map_or_else(|| id.to_owned(), |node| node.name.clone())
        };

        Some(HighlightSummary {
            nodes: nodes
                .iter()
                .filter(|node| self.selection.is_node_highlighted(&node.id))
                .map(|node| NodeEntry {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    entity_type: node.entity_type.clone(),
                    topic_name: node.topic_name.clone(),
                })
                .collect(),
            links: engine
                .links()
                .iter()
                .filter(|link| self.selection.is_link_highlighted(&link.id))
                .map(|link| LinkEntry {
                    id: link.id.clone(),
                    description: link.description.clone(),
                    source_name: display_name(link.source_id()),
                    target_name: display_name(link.target_id()),
                    weight: link.weight,
                })
                .collect(),
        })
    }

    /// Centers on a highlight panel entry, zooms in and reopens its details.
    pub(in crate::app) fn focus_entry(&mut self, engine: &mut impl RenderEngine, entry: &PanelEntry) {
        let (target, position) = match entry {
            PanelEntry::Node(id) => {
                let Some(index) = self.node_index(id) else {
                    return;
                };
                (DetailTarget::Node(index), engine.node_position(index))
            }
            PanelEntry::Link(id) => {
                let Some(index) = self.link_index.get(id).copied() else {
                    return;
                };
                let midpoint = engine.links().get(index).and_then(|link| {
                    let source = engine.node_position(link.source.index()?)?;
                    let target = engine.node_position(link.target.index()?)?;
                    Some(source.lerp(target, 0.5))
                });
                (DetailTarget::Link(index), midpoint)
            }
        };

        let Some(position) = position else {
            return;
        };
        debug!(?entry, x = position.x, y = position.y, "focusing panel entry");
        engine.center_at(position, FOCUS_DURATION);
        engine.zoom_to(FOCUS_ZOOM, FOCUS_DURATION);
        self.details = Some(target);
    }

    /// Focuses a node chosen from the search list. Ignored in region mode,
    /// like canvas clicks.
    pub(in crate::app) fn pick_search_result(
        &mut self,
        engine: &mut impl RenderEngine,
        node_id: &str,
    ) -> bool {
        if self.selection.region_mode() {
            return false;
        }
        let Some(index) = self.node_index(node_id) else {
            return false;
        };

        self.click_node(engine, index);
        self.focus_entry(engine, &PanelEntry::Node(node_id.to_owned()));
        true
    }

    pub(in crate::app) fn export_highlighted(
        &self,
        engine: &impl RenderEngine,
    ) -> Result<HighlightExport, DatasetError> {
        export_highlighted(
            engine
                .nodes()
                .iter()
                .filter(|node| self.selection.is_node_highlighted(&node.id)),
            engine
                .links()
                .iter()
                .filter(|link| self.selection.is_link_highlighted(&link.id)),
        )
    }

    fn apply_transition(&mut self, engine: &mut impl RenderEngine, transition: Transition) {
        if transition.hide_panels {
            self.details = None;
        }
        if let Some(enabled) = transition.surface_interactions {
            engine.set_interactions(enabled, enabled);
        }

        match transition.emphasis {
            Emphasis::Apply => {
                self.push_forces(engine, true);
                engine.reheat();
                self.emphasis_active = true;
            }
            Emphasis::Restore if self.emphasis_active => {
                self.push_forces(engine, false);
                engine.reheat();
                self.emphasis_active = false;
            }
            Emphasis::Restore | Emphasis::Keep => {}
        }

        self.refresh(engine);
    }

    fn push_forces(&self, engine: &mut impl RenderEngine, emphasize: bool) {
        let params = derive_forces(
            engine.nodes(),
            engine.links(),
            &self.selection,
            &self.forces,
            emphasize,
        );
        engine.set_force(NamedForce::Link, params.link_distance);
        engine.set_force(NamedForce::Charge, params.charge);
    }

    /// Re-derives every visual from current state and hands it to the engine.
    pub(in crate::app) fn refresh(&self, engine: &mut impl RenderEngine) {
        let style = derive_style(&StyleInputs {
            nodes: engine.nodes(),
            links: engine.links(),
            selection: &self.selection,
            clusters: self.clusters.current(),
            palette: &self.palette,
            dark_mode: self.dark_mode,
            cluster_coloring: self.cluster_coloring,
        });
        engine.apply_style(style);
    }
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    ids.enumerate()
        .map(|(index, id)| (id.to_owned(), index))
        .collect()
}
