use eframe::egui::{self, Button, Checkbox, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use rfd::FileDialog;

use crate::dataset::{DatasetKind, DiscardedEdge, Node};

use super::super::ViewModel;
use super::super::engine::RenderEngine;
use super::apply_theme;

const SEARCH_RESULT_LIMIT: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best matches for `query` against node names and ids, highest score first.
fn search_nodes(nodes: &[Node], query: &str, limit: usize) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let by_name = fuzzy_match_score(&matcher, &node.name, query);
            let by_id = fuzzy_match_score(&matcher, &node.id, query);
            by_name.max(by_id).map(|score| (score, index))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.truncate(limit);
    scored.into_iter().map(|(_, index)| index).collect()
}

fn discarded_line(edge: &DiscardedEdge) -> String {
    let missing = match (edge.source_exists, edge.target_exists) {
        (false, false) => "source and target missing",
        (false, true) => "source missing",
        (true, false) => "target missing",
        (true, true) => "both present",
    };
    format!("{}: {} → {} ({missing})", edge.id, edge.source, edge.target)
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_file_picker(ui, DatasetKind::Entities);
                ui.add_space(4.0);
                self.draw_file_picker(ui, DatasetKind::Relationships);

                ui.separator();
                self.draw_graph_buttons(ui);

                ui.separator();
                self.draw_view_toggles(ui);

                ui.separator();
                self.draw_search(ui);

                ui.separator();
                self.draw_export(ui);

                self.draw_discarded(ui);
            });
    }

    fn draw_file_picker(&mut self, ui: &mut Ui, kind: DatasetKind) {
        let file_name = match kind {
            DatasetKind::Entities => self.entities_file.clone(),
            DatasetKind::Relationships => self.relationships_file.clone(),
        };

        ui.label(RichText::new(kind.label()).strong());
        let mut picked = None;
        ui.horizontal(|ui| {
            if ui
                .button("Choose file...")
                .on_hover_text(format!("Select the {kind} JSON file."))
                .clicked()
            {
                picked = Some(FileDialog::new().add_filter("JSON", &["json"]).pick_file());
            }
            ui.label(file_name.as_deref().unwrap_or("No file chosen"));
        });

        match picked {
            Some(Some(path)) => self.start_load(kind, path),
            Some(None) => self.forget_dataset(kind),
            None => {}
        }
    }

    fn draw_graph_buttons(&mut self, ui: &mut Ui) {
        let loading = self.is_loading();
        ui.horizontal_wrapped(|ui| {
            if ui
                .add_enabled(!loading, Button::new("Generate graph"))
                .on_hover_text("Build the graph from both loaded files.")
                .clicked()
            {
                self.generate();
            }
            if ui
                .add_enabled(!loading, Button::new("Reset"))
                .on_hover_text("Rebuild the graph and drop the current highlight.")
                .clicked()
            {
                self.reset();
            }
            if ui.button("Center").clicked() {
                self.controller.center_graph(&mut self.engine);
            }
            if ui.button("Zoom to fit").clicked() {
                self.controller.zoom_fit(&mut self.engine);
            }
        });
    }

    fn draw_view_toggles(&mut self, ui: &mut Ui) {
        let mut dark_mode = self.controller.dark_mode();
        if ui.checkbox(&mut dark_mode, "Dark mode").changed() {
            self.controller.set_dark_mode(&mut self.engine, dark_mode);
            apply_theme(ui.ctx(), dark_mode);
        }

        let clusters_current = !self.controller.clusters().is_stale();
        let mut cluster_coloring = self.controller.cluster_coloring();
        let cluster_toggle = ui
            .add_enabled(
                clusters_current,
                Checkbox::new(&mut cluster_coloring, "Color by cluster"),
            )
            .on_hover_text("Color each connected component differently.")
            .on_disabled_hover_text("Generate the graph to calculate clusters first.");
        if cluster_toggle.changed()
            && !self
                .controller
                .set_cluster_coloring(&mut self.engine, cluster_coloring)
        {
            self.raise_alert("Clusters have not been calculated yet".to_owned());
        }

        let mut region_mode = self.controller.selection().region_mode();
        if ui
            .checkbox(&mut region_mode, "Region select")
            .on_hover_text("Drag a rectangle on the canvas to highlight the nodes inside it.")
            .changed()
        {
            self.region_drag = None;
            self.controller.set_region_mode(&mut self.engine, region_mode);
        }

        ui.checkbox(&mut self.engine.live_physics, "Live physics simulation")
            .on_hover_text("Keep running the force layout while viewing the graph.");
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Find node")
            .on_hover_text("Fuzzy search over node names and ids.");
        ui.text_edit_singleline(&mut self.search);

        let matches = search_nodes(self.engine.nodes(), &self.search, SEARCH_RESULT_LIMIT);
        if matches.is_empty() {
            if !self.search.trim().is_empty() {
                ui.weak("No matching nodes.");
            }
            return;
        }

        let region_mode = self.controller.selection().region_mode();
        if region_mode {
            ui.weak("Leave region select to focus a result.");
        }

        let mut chosen = None;
        for index in matches {
            let Some(node) = self.engine.nodes().get(index) else {
                continue;
            };
            if ui
                .add_enabled(!region_mode, egui::Link::new(node.name.as_str()))
                .on_hover_text(node.id.as_str())
                .clicked()
            {
                chosen = Some(node.id.clone());
            }
        }

        if let Some(id) = chosen {
            self.controller.pick_search_result(&mut self.engine, &id);
        }
    }

    fn draw_export(&mut self, ui: &mut Ui) {
        let has_highlight = self.controller.selection().has_highlight();
        if ui
            .add_enabled(has_highlight, Button::new("Export highlighted"))
            .on_hover_text("Write highlighted_nodes.json and highlighted_links.json.")
            .on_disabled_hover_text("Highlight nodes or links first.")
            .clicked()
        {
            self.export_highlight();
        }
        ui.small(format!("Last folder: {}", self.export_dir.display()));
    }

    fn draw_discarded(&self, ui: &mut Ui) {
        let discarded = self.controller.discarded();
        if discarded.is_empty() {
            return;
        }

        ui.separator();
        egui::CollapsingHeader::new(format!("Discarded links ({})", discarded.len()))
            .id_salt("discarded_links")
            .show(ui, |ui| {
                for edge in discarded {
                    ui.small(discarded_line(edge));
                }
            });
    }

    fn export_highlight(&mut self) {
        let Some(dir) = FileDialog::new().set_directory(&self.export_dir).pick_folder() else {
            return;
        };

        let written = self
            .controller
            .export_highlighted(&self.engine)
            .and_then(|export| export.write_to_dir(&dir).map(|_| export));
        match written {
            Ok(export) => {
                self.status = Some(format!(
                    "exported {} nodes and {} links",
                    export.node_count, export.link_count
                ));
                self.export_dir = dir;
            }
            Err(export_error) => self.raise_alert(export_error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::fixtures::node;

    fn named(id: &str, name: &str) -> Node {
        let mut node = node(id);
        node.name = name.to_owned();
        node
    }

    #[test]
    fn search_matches_names_and_ids() {
        let nodes = vec![
            named("e-1", "Ada Lovelace"),
            named("e-2", "Charles Babbage"),
            named("lovelace-ref", "Reference"),
        ];

        let matches = search_nodes(&nodes, "lovelace", 8);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains(&0));
        assert!(matches.contains(&2));
        assert!(!matches.contains(&1));
    }

    #[test]
    fn discarded_line_names_the_missing_endpoint() {
        let edge = DiscardedEdge {
            id: "bz".to_owned(),
            source: "b".to_owned(),
            target: "z".to_owned(),
            source_exists: true,
            target_exists: false,
        };
        assert_eq!(discarded_line(&edge), "bz: b → z (target missing)");
    }

    #[test]
    fn blank_query_matches_nothing() {
        let nodes = vec![named("a", "Alpha")];
        assert!(search_nodes(&nodes, "   ", 8).is_empty());
    }

    #[test]
    fn results_are_capped() {
        let nodes = (0..20)
            .map(|index| named(&format!("n{index}"), "Same"))
            .collect::<Vec<_>>();
        assert_eq!(search_nodes(&nodes, "same", 8).len(), 8);
    }
}
