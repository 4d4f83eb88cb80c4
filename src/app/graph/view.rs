use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, StrokeKind, Ui, Vec2, vec2};

use super::super::ViewModel;
use super::super::engine::RenderEngine;
use super::super::render_utils::{
    LINK_CURVATURE, arrow_head, blend_color, circle_visible, draw_background, edge_visible,
    link_control_point,
};

const ARROW_LENGTH: f32 = 6.0;
const LABEL_ZOOM_THRESHOLD: f32 = 1.6;
const MIN_SCREEN_RADIUS: f32 = 1.5;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let now = ui.input(|input| input.time);
        if self.engine.advance(now, rect) || response.dragged() {
            ui.ctx().request_repaint();
        }

        let event = self.handle_canvas_input(ui, &response);

        let painter = ui.painter_at(rect);
        let style = &self.engine.style;
        let camera = &self.engine.camera;
        draw_background(
            &painter,
            rect,
            style.background,
            style.grid,
            camera.world_to_screen(rect, Vec2::ZERO),
            camera.zoom,
        );

        if self.engine.nodes().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Load the entities and relationships files, then generate the graph.",
                FontId::proportional(16.0),
                style.label,
            );
        }

        let zoom = camera.zoom;
        let screen_positions = (0..self.engine.render.nodes.len())
            .filter_map(|index| self.engine.screen_position(index))
            .collect::<Vec<_>>();
        let screen_radii = self
            .engine
            .render
            .nodes
            .iter()
            .map(|node| (node.radius * zoom).max(MIN_SCREEN_RADIUS))
            .collect::<Vec<_>>();

        for (index, &(source, target)) in self.engine.render.edges.iter().enumerate() {
            let (Some(&start), Some(&end)) = (screen_positions.get(source), screen_positions.get(target))
            else {
                continue;
            };
            let control = link_control_point(start, end, LINK_CURVATURE);
            let bend = (control - start.lerp(end, 0.5)).length();
            if !edge_visible(rect, start, end, ARROW_LENGTH + bend) {
                continue;
            }

            let color = style.link_color(index);
            painter.add(QuadraticBezierShape::from_points_stroke(
                [start, control, end],
                false,
                Color32::TRANSPARENT,
                Stroke::new(style.link_width(index), color),
            ));
            if let Some(arrow) = arrow_head(
                control,
                end,
                screen_radii[target],
                ARROW_LENGTH + style.link_width(index),
                color,
            ) {
                painter.add(arrow);
            }
        }

        let hovered = response
            .hover_pos()
            .and_then(|pointer| self.engine.node_at(pointer));
        let label_font = FontId::proportional(11.0);
        for (index, node) in self.engine.nodes().iter().enumerate() {
            let (Some(&center), Some(&radius)) = (screen_positions.get(index), screen_radii.get(index))
            else {
                continue;
            };
            if !circle_visible(rect, center, radius) {
                continue;
            }

            let emphasized = style.is_node_emphasized(index);
            let mut fill = style.node_color(index);
            if hovered == Some(index) {
                fill = blend_color(fill, Color32::WHITE, 0.3);
            }
            painter.circle_filled(center, radius, fill);
            if emphasized {
                painter.circle_stroke(center, radius + 1.0, Stroke::new(1.5, style.outline));
            }

            if emphasized || hovered == Some(index) || zoom >= LABEL_ZOOM_THRESHOLD {
                painter.text(
                    center + vec2(0.0, radius + 2.0),
                    Align2::CENTER_TOP,
                    node.name.as_str(),
                    label_font.clone(),
                    style.label,
                );
            }
        }

        if let Some((start, end)) = self.region_drag {
            let region = egui::Rect::from_two_pos(start, end);
            painter.rect_filled(region, 0.0, style.selection_rect.gamma_multiply(0.15));
            painter.rect_stroke(
                region,
                0.0,
                Stroke::new(1.0, style.selection_rect),
                StrokeKind::Inside,
            );
        }

        if let Some(event) = event {
            self.apply_canvas_event(event);
            ui.ctx().request_repaint();
        }
    }
}
