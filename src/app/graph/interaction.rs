use eframe::egui::{self, CursorIcon, PointerButton, Ui};

use super::super::{CanvasEvent, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| self.engine.viewport().center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine.zoom_around(pointer, zoom_factor);
    }

    fn handle_region_gesture(&mut self, ui: &Ui, response: &egui::Response) -> Option<CanvasEvent> {
        ui.ctx().set_cursor_icon(CursorIcon::Crosshair);

        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            self.region_drag = Some((origin, origin));
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some((_, end)) = self.region_drag.as_mut()
        {
            *end = pointer;
        }

        if response.drag_stopped_by(PointerButton::Primary)
            && let Some((start, end)) = self.region_drag.take()
        {
            return Some(CanvasEvent::RegionDrawn { start, end });
        }

        None
    }

    /// Routes pointer input on the canvas: drags move nodes or pan, clicks
    /// become events for the controller.
    pub(in crate::app) fn handle_canvas_input(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
    ) -> Option<CanvasEvent> {
        self.handle_graph_zoom(ui, response);

        if self.engine.pan_enabled()
            && (response.dragged_by(PointerButton::Secondary)
                || response.dragged_by(PointerButton::Middle))
        {
            self.engine.pan_by(response.drag_delta());
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        }

        if self.controller.selection().region_mode() {
            return self.handle_region_gesture(ui, response);
        }

        if response.drag_started_by(PointerButton::Primary)
            && self.engine.node_drag_enabled()
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(index) = self.engine.node_at(origin)
        {
            self.engine.begin_node_drag(index);
        }

        if response.dragged_by(PointerButton::Primary) {
            if self.engine.is_dragging_node() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    self.engine.drag_node_to(pointer);
                }
            } else {
                self.engine.pan_by(response.drag_delta());
            }
        }

        if response.drag_stopped() {
            self.engine.end_node_drag();
        }

        if let Some(hover) = response.hover_pos()
            && (self.engine.is_dragging_node() || self.engine.node_at(hover).is_some())
        {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let event = if let Some(index) = self.engine.node_at(pointer) {
                CanvasEvent::NodeClicked(index)
            } else if let Some(index) = self.engine.link_at(pointer) {
                CanvasEvent::LinkClicked(index)
            } else {
                CanvasEvent::BackgroundClicked
            };
            return Some(event);
        }

        None
    }

    pub(in crate::app) fn apply_canvas_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::NodeClicked(index) => self.controller.click_node(&mut self.engine, index),
            CanvasEvent::LinkClicked(index) => self.controller.click_link(&mut self.engine, index),
            CanvasEvent::BackgroundClicked => self.controller.click_background(&mut self.engine),
            CanvasEvent::RegionDrawn { start, end } => {
                self.controller.select_region(&mut self.engine, start, end);
            }
        }
    }
}
