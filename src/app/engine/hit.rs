use eframe::egui::Pos2;

use super::ForceEngine;
use crate::app::render_utils::{LINK_CURVATURE, link_control_point, quadratic_point};

const MIN_NODE_HIT_RADIUS: f32 = 4.0;
const LINK_HIT_SLOP: f32 = 3.0;
const CURVE_SAMPLES: usize = 16;

impl ForceEngine {
    /// Topmost node under `screen`. Later nodes are painted on top.
    pub(in crate::app) fn node_at(&self, screen: Pos2) -> Option<usize> {
        let zoom = self.camera.zoom;
        self.render
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| {
                let center = self.camera.world_to_screen(self.viewport, node.world_pos);
                center.distance(screen) <= (node.radius * zoom).max(MIN_NODE_HIT_RADIUS)
            })
            .map(|(index, _)| index)
    }

    /// Closest link within reach of `screen`.
    pub(in crate::app) fn link_at(&self, screen: Pos2) -> Option<usize> {
        self.render
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, &(source, target))| {
                let start = self.screen_position(source)?;
                let end = self.screen_position(target)?;
                let distance = distance_to_curve(screen, start, end);
                let reach = self.style.link_width(index) * 0.5 + LINK_HIT_SLOP;
                (distance <= reach).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

/// Distance to a link drawn as a bent curve, measured on a polyline.
fn distance_to_curve(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let control = link_control_point(start, end, LINK_CURVATURE);
    let mut previous = start;
    let mut closest = f32::INFINITY;
    for step in 1..=CURVE_SAMPLES {
        let next = quadratic_point(start, control, end, step as f32 / CURVE_SAMPLES as f32);
        closest = closest.min(distance_to_segment(point, previous, next));
        previous = next;
    }
    closest
}

fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
