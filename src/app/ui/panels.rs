use eframe::egui::{self, Align, Align2, Context, Layout, RichText};

use crate::config::ViewerConfig;
use crate::dataset::ClusterMap;

use super::super::controller::Controller;
use super::super::engine::ForceEngine;
use super::super::selection::{Interaction, SelectionState};
use super::super::ViewModel;

fn cluster_summary(clusters: &ClusterMap) -> String {
    let singletons = clusters.sizes().iter().filter(|&&size| size == 1).count();
    format!(
        "clusters: {} (largest {}, {singletons} isolated)",
        clusters.cluster_count(),
        clusters.largest()
    )
}

/// Short description of the current focus for the top bar.
fn selection_status(selection: &SelectionState) -> Option<String> {
    let nodes = selection.highlighted_nodes().len();
    let links = selection.highlighted_links().len();
    match selection.interaction() {
        Interaction::Idle => None,
        Interaction::NodeFocused(id) => Some(format!(
            "focused {id}: {} neighbors, {links} links",
            nodes.saturating_sub(1)
        )),
        Interaction::LinkFocused(id) => Some(format!("focused link {id}")),
        Interaction::RegionArmed => Some("region select: drag a rectangle".to_owned()),
        Interaction::RegionSelected(_) => Some(format!("region: {nodes} nodes, {links} links")),
    }
}

impl ViewModel {
    pub(in crate::app) fn new(config: &ViewerConfig) -> Self {
        let mut engine = ForceEngine::new(&config.forces);
        let controller = Controller::new(config.palette.clone(), config.forces, config.dark_mode);
        controller.refresh(&mut engine);

        Self {
            controller,
            engine,
            pending_loads: Vec::new(),
            entities_file: None,
            relationships_file: None,
            generate_when_loaded: false,
            last_summary: None,
            search: String::new(),
            export_dir: config.export_dir.clone(),
            alert: None,
            status: None,
            region_drag: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Entity Graph Viewer");
                    ui.separator();
                    let (nodes, links) = self
                        .last_summary
                        .map_or((0, 0), |summary| (summary.nodes, summary.links));
                    ui.label(format!("nodes: {nodes}"));
                    ui.label(format!("links: {links}"));
                    ui.label(format!(
                        "discarded links: {}",
                        self.controller.discarded().len()
                    ));
                    match self.controller.clusters().current() {
                        Some(clusters) => {
                            ui.label(cluster_summary(clusters));
                        }
                        None => {
                            ui.weak("clusters: not computed");
                        }
                    }
                    if let Some(status) = selection_status(self.controller.selection()) {
                        ui.separator();
                        ui.label(status);
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.is_loading() {
                            ui.spinner();
                            ui.label("loading...");
                        } else if let Some(status) = &self.status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.controller.details().is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        if self.controller.selection().has_highlight() {
            egui::TopBottomPanel::bottom("highlight_summary")
                .resizable(true)
                .default_height(200.0)
                .show(ctx, |ui| self.draw_highlight_summary(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        self.draw_alert(ctx);
    }

    fn draw_alert(&mut self, ctx: &Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).strong());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.alert = None;
        }
    }
}
