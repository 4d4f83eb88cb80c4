use eframe::egui::{self, RichText, Ui};
use serde_json::Value;

use crate::dataset::{Edge, Node};
use crate::util::{format_weight, or_na};

use super::super::ViewModel;
use super::super::controller::{DetailTarget, PanelEntry};
use super::super::engine::RenderEngine;

fn pretty_json(value: Option<&Value>) -> String {
    value
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "None".to_owned())
}

fn node_rows(node: &Node, cluster: Option<usize>) -> Vec<(&'static str, String)> {
    let attributes = node
        .attributes
        .as_ref()
        .map(|attributes| Value::Object(attributes.clone()));

    vec![
        ("ID", node.id.clone()),
        ("Name", node.name.clone()),
        ("Type", node.entity_type.clone()),
        ("Topic", or_na(node.topic_name.as_deref()).to_owned()),
        ("Attributes", pretty_json(attributes.as_ref())),
        ("Created", or_na(node.created_at.as_deref()).to_owned()),
        ("Updated", or_na(node.updated_at.as_deref()).to_owned()),
        (
            "Cluster",
            cluster.map_or_else(|| or_na(None).to_owned(), |cluster| cluster.to_string()),
        ),
    ]
}

fn link_rows(link: &Edge) -> Vec<(&'static str, String)> {
    vec![
        ("ID", link.id.clone()),
        ("Description", or_na(link.description.as_deref()).to_owned()),
        ("Weight", format_weight(link.weight)),
        ("Source", link.source_id().to_owned()),
        ("Target", link.target_id().to_owned()),
        ("Meta", pretty_json(link.meta.as_ref())),
        ("Document ID", or_na(link.document_id.as_deref()).to_owned()),
        ("Chunk ID", or_na(link.chunk_id.as_deref()).to_owned()),
        ("Last Modified", or_na(link.last_modified_at.as_deref()).to_owned()),
    ]
}

fn draw_rows(ui: &mut Ui, rows: &[(&'static str, String)]) {
    for (label, value) in rows {
        ui.label(RichText::new(*label).strong());
        if value.contains('\n') {
            ui.monospace(value.as_str());
        } else {
            ui.label(value.as_str());
        }
        ui.add_space(4.0);
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let mut close = false;
        let title = match self.controller.details() {
            Some(DetailTarget::Node(_)) => "Node Details",
            Some(DetailTarget::Link(_)) => "Relationship Details",
            None => return,
        };

        ui.horizontal(|ui| {
            ui.heading(title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                close = ui.button("×").on_hover_text("Close details").clicked();
            });
        });
        ui.separator();

        let rows = match self.controller.details() {
            Some(DetailTarget::Node(index)) => self.engine.nodes().get(index).map(|node| {
                let cluster = self
                    .controller
                    .clusters()
                    .current()
                    .and_then(|clusters| clusters.cluster_of(&node.id));
                node_rows(node, cluster)
            }),
            Some(DetailTarget::Link(index)) => self.engine.links().get(index).map(link_rows),
            None => None,
        };

        match rows {
            Some(rows) => {
                egui::ScrollArea::vertical()
                    .id_salt("details_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| draw_rows(ui, &rows));
            }
            None => {
                ui.label("The selected element is no longer in the graph.");
            }
        }

        if close {
            self.controller.close_details();
        }
    }

    pub(in crate::app) fn draw_highlight_summary(&mut self, ui: &mut Ui) {
        let Some(summary) = self.controller.highlight_summary(&self.engine) else {
            return;
        };

        ui.horizontal(|ui| {
            ui.heading("Highlighted");
            ui.label(format!(
                "{} nodes, {} links",
                summary.nodes.len(),
                summary.links.len()
            ));
        });
        ui.separator();

        let mut chosen = None;
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Nodes").strong());
            egui::ScrollArea::vertical()
                .id_salt("highlight_nodes_scroll")
                .auto_shrink([false, false])
                .show(&mut columns[0], |ui| {
                    for entry in &summary.nodes {
                        let text = format!(
                            "{}  ({}, {})",
                            entry.name,
                            entry.entity_type,
                            or_na(entry.topic_name.as_deref())
                        );
                        if ui.link(text).on_hover_text(entry.id.as_str()).clicked() {
                            chosen = Some(PanelEntry::Node(entry.id.clone()));
                        }
                    }
                });

            columns[1].label(RichText::new("Links").strong());
            egui::ScrollArea::vertical()
                .id_salt("highlight_links_scroll")
                .auto_shrink([false, false])
                .show(&mut columns[1], |ui| {
                    for entry in &summary.links {
                        let text = format!(
                            "{}: {} → {}  (weight {})",
                            or_na(entry.description.as_deref()),
                            entry.source_name,
                            entry.target_name,
                            format_weight(entry.weight)
                        );
                        if ui.link(text).on_hover_text(entry.id.as_str()).clicked() {
                            chosen = Some(PanelEntry::Link(entry.id.clone()));
                        }
                    }
                });
        });

        if let Some(entry) = chosen {
            self.controller.focus_entry(&mut self.engine, &entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dataset::fixtures::{edge, node};

    fn value_of<'a>(rows: &'a [(&'static str, String)], label: &str) -> &'a str {
        rows.iter()
            .find(|(row, _)| *row == label)
            .map(|(_, value)| value.as_str())
            .unwrap()
    }

    #[test]
    fn missing_node_fields_display_as_na() {
        let rows = node_rows(&node("a"), None);
        assert_eq!(value_of(&rows, "Topic"), "N/A");
        assert_eq!(value_of(&rows, "Attributes"), "None");
        assert_eq!(value_of(&rows, "Cluster"), "N/A");
    }

    #[test]
    fn node_attributes_are_pretty_printed() {
        let mut entity = node("a");
        entity.attributes = json!({"role": "admin"}).as_object().cloned();

        let rows = node_rows(&entity, Some(3));
        assert!(value_of(&rows, "Attributes").contains("\n  \"role\": \"admin\""));
        assert_eq!(value_of(&rows, "Cluster"), "3");
    }

    #[test]
    fn link_rows_show_raw_endpoint_ids() {
        let mut link = edge("ab", "a", "b");
        link.source = link.source.resolved(0);
        link.weight = 0.5;

        let rows = link_rows(&link);
        assert_eq!(value_of(&rows, "Source"), "a");
        assert_eq!(value_of(&rows, "Weight"), "0.5");
        assert_eq!(value_of(&rows, "Description"), "N/A");
    }
}
