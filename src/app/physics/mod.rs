mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::engine::RenderGraph;
use forces::{ChargeParams, accumulate_charge_for_node, separation};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.9;
const ALPHA_MIN: f32 = 0.001;
const DRAG_ALPHA_TARGET: f32 = 0.3;

/// Cooling schedule of the layout, d3-style: `alpha` decays toward
/// `alpha_target` every tick and the layout stops once it falls below
/// `alpha_min`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Simulation {
    pub(in crate::app) alpha: f32,
    pub(in crate::app) alpha_min: f32,
    pub(in crate::app) alpha_decay: f32,
    pub(in crate::app) alpha_target: f32,
    pub(in crate::app) velocity_decay: f32,
    pub(in crate::app) center_strength: f32,
}

impl Simulation {
    pub(in crate::app) fn new(center_strength: f32) -> Self {
        Self {
            alpha: 1.0,
            alpha_min: ALPHA_MIN,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            center_strength,
        }
    }

    pub(in crate::app) fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    pub(in crate::app) fn hold_warm(&mut self, dragging: bool) {
        self.alpha_target = if dragging { DRAG_ALPHA_TARGET } else { 0.0 };
        if dragging {
            self.alpha = self.alpha.max(DRAG_ALPHA_TARGET);
        }
    }

    pub(in crate::app) fn is_active(&self) -> bool {
        self.alpha >= self.alpha_min || self.alpha_target >= self.alpha_min
    }
}

#[derive(Default)]
pub(in crate::app) struct PhysicsScratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

/// Advances the layout by one tick. Returns whether anything may have moved.
pub(in crate::app) fn step_physics(graph: &mut RenderGraph, simulation: &mut Simulation) -> bool {
    let node_count = graph.nodes.len();
    if node_count == 0 || !simulation.is_active() {
        return false;
    }

    simulation.alpha += (simulation.alpha_target - simulation.alpha) * simulation.alpha_decay;
    let alpha = simulation.alpha;

    apply_link_force(graph, alpha);

    let scratch = &mut graph.scratch;
    scratch.positions.clear();
    scratch
        .positions
        .extend(graph.nodes.iter().map(|node| node.world_pos));
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);

    if let Some(quadtree) = QuadNode::build(&scratch.positions, &graph.charge) {
        let params = ChargeParams {
            theta: BARNES_HUT_THETA,
            alpha,
        };
        for (index, force) in scratch.forces.iter_mut().enumerate() {
            accumulate_charge_for_node(
                &quadtree,
                index,
                &scratch.positions,
                &graph.charge,
                params,
                force,
            );
        }
    }

    let center_pull = simulation.center_strength * alpha;
    let retained = 1.0 - simulation.velocity_decay;
    for (node, force) in graph.nodes.iter_mut().zip(&scratch.forces) {
        if let Some(pinned) = node.pinned {
            node.world_pos = pinned;
            node.velocity = Vec2::ZERO;
            continue;
        }

        node.velocity += *force - node.world_pos * center_pull;
        node.velocity *= retained;
        node.world_pos += node.velocity;
    }

    true
}

// Springs pull each link toward its configured distance, split between the
// endpoints by degree so hubs move less than leaves.
fn apply_link_force(graph: &mut RenderGraph, alpha: f32) {
    for (edge_index, &(source, target)) in graph.edges.iter().enumerate() {
        if source == target || source >= graph.nodes.len() || target >= graph.nodes.len() {
            continue;
        }

        let source_degree = graph.degree[source].max(1) as f32;
        let target_degree = graph.degree[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);
        let distance = graph.link_distance[edge_index];

        let delta = separation(
            (graph.nodes[target].world_pos + graph.nodes[target].velocity)
                - (graph.nodes[source].world_pos + graph.nodes[source].velocity),
            source,
            target,
        );
        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);

        graph.nodes[target].velocity -= correction * bias;
        graph.nodes[source].velocity += correction * (1.0 - bias);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::engine::{RenderGraph, RenderNode};
    use super::*;

    fn graph(positions: &[Vec2], edges: Vec<(usize, usize)>, distance: f32) -> RenderGraph {
        let mut degree = vec![0; positions.len()];
        for &(source, target) in &edges {
            degree[source] += 1;
            degree[target] += 1;
        }

        RenderGraph {
            nodes: positions
                .iter()
                .map(|position| RenderNode {
                    world_pos: *position,
                    velocity: Vec2::ZERO,
                    pinned: None,
                    radius: 4.0,
                })
                .collect(),
            link_distance: vec![distance; edges.len()],
            charge: vec![0.0; positions.len()],
            edges,
            degree,
            scratch: PhysicsScratch::default(),
        }
    }

    #[test]
    fn alpha_cools_until_the_layout_stops() {
        let mut render = graph(&[vec2(0.0, 0.0), vec2(5.0, 0.0)], vec![(0, 1)], 30.0);
        let mut simulation = Simulation::new(0.05);

        let mut ticks = 0;
        while step_physics(&mut render, &mut simulation) {
            ticks += 1;
            assert!(ticks < 1000, "simulation never cooled");
        }

        assert!(ticks > 250);
        assert!(!simulation.is_active());
    }

    #[test]
    fn reheat_restarts_a_cooled_layout() {
        let mut render = graph(&[vec2(0.0, 0.0)], Vec::new(), 30.0);
        let mut simulation = Simulation::new(0.05);
        simulation.alpha = 0.0;
        assert!(!step_physics(&mut render, &mut simulation));

        simulation.reheat();
        assert!(step_physics(&mut render, &mut simulation));
    }

    #[test]
    fn links_settle_near_their_distance() {
        let mut render = graph(&[vec2(-1.0, 0.0), vec2(1.0, 0.0)], vec![(0, 1)], 60.0);
        let mut simulation = Simulation::new(0.0);

        for _ in 0..300 {
            step_physics(&mut render, &mut simulation);
        }

        let length = (render.nodes[1].world_pos - render.nodes[0].world_pos).length();
        assert!((length - 60.0).abs() < 6.0, "length was {length}");
    }

    #[test]
    fn pinned_nodes_stay_put() {
        let mut render = graph(&[vec2(0.0, 0.0), vec2(3.0, 0.0)], vec![(0, 1)], 50.0);
        render.nodes[0].pinned = Some(vec2(7.0, 7.0));
        let mut simulation = Simulation::new(0.05);

        step_physics(&mut render, &mut simulation);
        assert_eq!(render.nodes[0].world_pos, vec2(7.0, 7.0));
        assert_eq!(render.nodes[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn dragging_keeps_the_layout_warm() {
        let mut simulation = Simulation::new(0.05);
        simulation.alpha = 0.0;
        simulation.hold_warm(true);
        assert!(simulation.is_active());

        simulation.hold_warm(false);
        simulation.alpha = 0.0;
        assert!(!simulation.is_active());
    }
}
