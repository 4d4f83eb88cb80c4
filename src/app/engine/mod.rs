mod camera;
mod hit;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::time::Duration;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::{debug, warn};

pub(in crate::app) use camera::Camera;

use super::physics::{PhysicsScratch, Simulation, step_physics};
use super::view_adapter::ViewStyle;
use crate::config::ForceConfig;
use crate::dataset::{Edge, Node};
use crate::util::stable_pair;

const INITIAL_RADIUS: f32 = 10.0;
const NODE_RELATIVE_SIZE: f32 = 4.0;
const DEFAULT_VIEWPORT: Vec2 = vec2(800.0, 600.0);

/// Forces the controller can retune by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum NamedForce {
    /// Per-link rest distance.
    Link,
    /// Per-node many-body strength.
    Charge,
}

/// Commands and queries the application needs from a graph renderer.
///
/// Positions are in graph space; camera commands animate and are replaced by
/// the next command of the same kind.
pub(in crate::app) trait RenderEngine {
    fn replace_graph(&mut self, nodes: Vec<Node>, links: Vec<Edge>);
    fn nodes(&self) -> &[Node];
    fn links(&self) -> &[Edge];
    fn node_position(&self, index: usize) -> Option<Pos2>;
    fn screen_to_graph(&self, screen: Pos2) -> Pos2;
    fn set_force(&mut self, force: NamedForce, values: Vec<f32>);
    fn reheat(&mut self);
    fn center_at(&mut self, position: Pos2, duration: Duration);
    fn zoom_to(&mut self, zoom: f32, duration: Duration);
    fn zoom_to_fit(&mut self, duration: Duration, padding: f32, delay: Duration);
    fn set_interactions(&mut self, node_drag: bool, pan: bool);
    fn apply_style(&mut self, style: ViewStyle);
}

pub(in crate::app) struct RenderNode {
    pub(in crate::app) world_pos: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) pinned: Option<Vec2>,
    pub(in crate::app) radius: f32,
}

pub(in crate::app) struct RenderGraph {
    pub(in crate::app) nodes: Vec<RenderNode>,
    pub(in crate::app) edges: Vec<(usize, usize)>,
    pub(in crate::app) degree: Vec<usize>,
    pub(in crate::app) link_distance: Vec<f32>,
    pub(in crate::app) charge: Vec<f32>,
    pub(in crate::app) scratch: PhysicsScratch,
}

#[derive(Clone, Copy, Debug)]
struct PendingFit {
    duration: Duration,
    padding: f32,
    delay: Duration,
    requested_at: Option<f64>,
}

/// In-process renderer backend: owns the graph data, the force layout and
/// the camera. The canvas code paints from it every frame.
pub(in crate::app) struct ForceEngine {
    nodes: Vec<Node>,
    links: Vec<Edge>,
    pub(in crate::app) render: RenderGraph,
    pub(in crate::app) simulation: Simulation,
    pub(in crate::app) camera: Camera,
    pub(in crate::app) style: ViewStyle,
    pub(in crate::app) live_physics: bool,
    defaults: ForceConfig,
    viewport: Rect,
    node_drag_enabled: bool,
    pan_enabled: bool,
    dragged_node: Option<usize>,
    pending_fit: Option<PendingFit>,
}

impl ForceEngine {
    pub(in crate::app) fn new(defaults: &ForceConfig) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            render: RenderGraph {
                nodes: Vec::new(),
                edges: Vec::new(),
                degree: Vec::new(),
                link_distance: Vec::new(),
                charge: Vec::new(),
                scratch: PhysicsScratch::default(),
            },
            simulation: Simulation::new(defaults.center_strength),
            camera: Camera::default(),
            style: ViewStyle::default(),
            live_physics: true,
            defaults: *defaults,
            viewport: Rect::from_center_size(Pos2::ZERO, DEFAULT_VIEWPORT),
            node_drag_enabled: true,
            pan_enabled: true,
            dragged_node: None,
            pending_fit: None,
        }
    }

    pub(in crate::app) fn viewport(&self) -> Rect {
        self.viewport
    }

    pub(in crate::app) fn node_drag_enabled(&self) -> bool {
        self.node_drag_enabled
    }

    pub(in crate::app) fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    pub(in crate::app) fn screen_position(&self, index: usize) -> Option<Pos2> {
        self.render
            .nodes
            .get(index)
            .map(|node| self.camera.world_to_screen(self.viewport, node.world_pos))
    }

    /// Runs one frame: layout tick, pending fit, camera animation. Returns
    /// whether another frame is needed.
    pub(in crate::app) fn advance(&mut self, now: f64, viewport: Rect) -> bool {
        self.viewport = viewport;

        let fit_waiting = self.run_pending_fit(now);
        let camera_moving = self.camera.advance(now);
        let layout_moving =
            self.live_physics && step_physics(&mut self.render, &mut self.simulation);

        fit_waiting || camera_moving || layout_moving
    }

    fn run_pending_fit(&mut self, now: f64) -> bool {
        let Some(fit) = self.pending_fit.as_mut() else {
            return false;
        };

        let requested_at = *fit.requested_at.get_or_insert(now);
        if now - requested_at < fit.delay.as_secs_f64() {
            return true;
        }

        let fit = *fit;
        self.pending_fit = None;
        if let Some(bounds) = self.graph_bounds() {
            self.camera
                .animate_fit(self.viewport, bounds, fit.padding, fit.duration);
        }
        false
    }

    /// Graph-space box around every node, radii included.
    pub(in crate::app) fn graph_bounds(&self) -> Option<Rect> {
        self.render.nodes.iter().fold(None, |bounds, node| {
            let own = Rect::from_center_size(node.world_pos.to_pos2(), Vec2::splat(node.radius * 2.0));
            Some(bounds.map_or(own, |bounds: Rect| bounds.union(own)))
        })
    }

    pub(in crate::app) fn begin_node_drag(&mut self, index: usize) -> bool {
        if !self.node_drag_enabled || index >= self.render.nodes.len() {
            return false;
        }

        let node = &mut self.render.nodes[index];
        node.pinned = Some(node.world_pos);
        self.dragged_node = Some(index);
        self.simulation.hold_warm(true);
        true
    }

    pub(in crate::app) fn drag_node_to(&mut self, screen: Pos2) {
        let Some(index) = self.dragged_node else {
            return;
        };

        let world = self.camera.screen_to_world(self.viewport, screen);
        if let Some(node) = self.render.nodes.get_mut(index) {
            node.pinned = Some(world);
            node.world_pos = world;
        }
    }

    pub(in crate::app) fn end_node_drag(&mut self) {
        if let Some(index) = self.dragged_node.take()
            && let Some(node) = self.render.nodes.get_mut(index)
        {
            node.pinned = None;
        }
        self.simulation.hold_warm(false);
    }

    pub(in crate::app) fn is_dragging_node(&self) -> bool {
        self.dragged_node.is_some()
    }

    pub(in crate::app) fn pan_by(&mut self, screen_delta: Vec2) {
        if self.pan_enabled {
            self.camera.pan_by(screen_delta);
        }
    }

    pub(in crate::app) fn zoom_around(&mut self, pointer: Pos2, factor: f32) {
        self.camera.zoom_around(self.viewport, pointer, factor);
    }
}

// Sunflower spiral around the origin, nudged by a per-id offset so that
// nodes with identical neighborhoods still separate.
fn initial_position(index: usize, id: &str) -> Vec2 {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    let (jitter_x, jitter_y) = stable_pair(id);
    vec2(radius * angle.cos() + jitter_x, radius * angle.sin() + jitter_y)
}

impl RenderEngine for ForceEngine {
    fn replace_graph(&mut self, nodes: Vec<Node>, links: Vec<Edge>) {
        let index_by_id: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();

        let mut resolved = Vec::with_capacity(links.len());
        let mut edges = Vec::with_capacity(links.len());
        let mut degree = vec![0usize; nodes.len()];
        for mut link in links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(link.source_id()),
                index_by_id.get(link.target_id()),
            ) else {
                warn!(
                    link = %link.id,
                    source = link.source_id(),
                    target = link.target_id(),
                    "renderer dropped link with unknown endpoint"
                );
                continue;
            };

            link.source = link.source.resolved(source);
            link.target = link.target.resolved(target);
            degree[source] += 1;
            degree[target] += 1;
            edges.push((source, target));
            resolved.push(link);
        }

        let render_nodes = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| RenderNode {
                world_pos: initial_position(index, &node.id),
                velocity: Vec2::ZERO,
                pinned: None,
                radius: NODE_RELATIVE_SIZE * node.value().sqrt(),
            })
            .collect();

        debug!(nodes = nodes.len(), links = resolved.len(), "graph data replaced");
        self.render = RenderGraph {
            nodes: render_nodes,
            link_distance: vec![self.defaults.link_distance; edges.len()],
            charge: vec![self.defaults.charge_strength; nodes.len()],
            edges,
            degree,
            scratch: PhysicsScratch::default(),
        };
        self.nodes = nodes;
        self.links = resolved;
        self.dragged_node = None;
        self.style = ViewStyle::default();
        self.simulation.reheat();
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn links(&self) -> &[Edge] {
        &self.links
    }

    fn node_position(&self, index: usize) -> Option<Pos2> {
        self.render
            .nodes
            .get(index)
            .map(|node| node.world_pos.to_pos2())
    }

    fn screen_to_graph(&self, screen: Pos2) -> Pos2 {
        self.camera.screen_to_world(self.viewport, screen).to_pos2()
    }

    fn set_force(&mut self, force: NamedForce, values: Vec<f32>) {
        let (target, expected) = match force {
            NamedForce::Link => (&mut self.render.link_distance, self.render.edges.len()),
            NamedForce::Charge => (&mut self.render.charge, self.render.nodes.len()),
        };

        if values.len() != expected {
            warn!(
                ?force,
                expected,
                received = values.len(),
                "ignoring force values for a different graph"
            );
            return;
        }
        *target = values;
    }

    fn reheat(&mut self) {
        self.simulation.reheat();
    }

    fn center_at(&mut self, position: Pos2, duration: Duration) {
        self.camera.animate_center(position.to_vec2(), duration);
    }

    fn zoom_to(&mut self, zoom: f32, duration: Duration) {
        self.camera.animate_zoom(zoom, duration);
    }

    fn zoom_to_fit(&mut self, duration: Duration, padding: f32, delay: Duration) {
        self.pending_fit = Some(PendingFit {
            duration,
            padding,
            delay,
            requested_at: None,
        });
    }

    fn set_interactions(&mut self, node_drag: bool, pan: bool) {
        self.node_drag_enabled = node_drag;
        self.pan_enabled = pan;
        if !node_drag {
            self.end_node_drag();
        }
    }

    fn apply_style(&mut self, style: ViewStyle) {
        self.style = style;
    }
}
