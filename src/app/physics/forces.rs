use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

fn fallback_direction(index: usize, other: usize) -> Vec2 {
    let angle = ((index as f32) * 0.618_034 + (other as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Offset from a body to another charge; coincident bodies get a tiny
/// deterministic separation so the force has a direction.
pub(super) fn separation(delta: Vec2, index: usize, other: usize) -> Vec2 {
    if delta.length_sq() > 1e-6 {
        delta
    } else {
        fallback_direction(index, other) * 1e-3
    }
}

// Negative strength repels: the velocity change points away from `delta`.
fn charge_between(delta: Vec2, strength: f32, alpha: f32) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < MIN_DISTANCE_SQ {
        distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
    }
    delta * (strength * alpha / distance_sq)
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) theta: f32,
    pub(super) alpha: f32,
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: ChargeParams,
    force: &mut Vec2,
) {
    if node.count == 0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let delta = separation(positions[other_index] - point, index, other_index);
            let strength = charges.get(other_index).copied().unwrap_or(0.0);
            *force += charge_between(delta, strength, params.alpha);
        }
        return;
    }

    let delta = node.center_of_charge - point;
    let distance = delta.length().max(0.0001);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.count > 1;

    if can_approximate {
        *force += charge_between(delta, node.charge, params.alpha);
        return;
    }

    for child in &node.children {
        if let Some(child) = child.as_ref() {
            accumulate_charge_for_node(child, index, positions, charges, params, force);
        }
    }
}
