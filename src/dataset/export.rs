use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{DatasetError, Result};
use super::model::{Edge, Node};

pub const NODES_FILE_NAME: &str = "highlighted_nodes.json";
pub const LINKS_FILE_NAME: &str = "highlighted_links.json";

/// Pretty-printed JSON for the current highlight, in canonical node/edge
/// shape with endpoints written as raw ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightExport {
    pub nodes_json: String,
    pub links_json: String,
    pub node_count: usize,
    pub link_count: usize,
}

pub fn export_highlighted<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    links: impl IntoIterator<Item = &'a Edge>,
) -> Result<HighlightExport> {
    let nodes = nodes.into_iter().collect::<Vec<_>>();
    let links = links.into_iter().collect::<Vec<_>>();

    Ok(HighlightExport {
        nodes_json: serde_json::to_string_pretty(&nodes)?,
        links_json: serde_json::to_string_pretty(&links)?,
        node_count: nodes.len(),
        link_count: links.len(),
    })
}

impl HighlightExport {
    pub fn write_to_dir(&self, dir: &Path) -> Result<[PathBuf; 2]> {
        let nodes_path = dir.join(NODES_FILE_NAME);
        let links_path = dir.join(LINKS_FILE_NAME);

        for (path, contents) in [(&nodes_path, &self.nodes_json), (&links_path, &self.links_json)] {
            std::fs::write(path, contents).map_err(|source| DatasetError::Write {
                path: path.clone(),
                source,
            })?;
        }

        info!(
            nodes = self.node_count,
            links = self.link_count,
            dir = %dir.display(),
            "exported highlighted elements"
        );
        Ok([nodes_path, links_path])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value};

    use super::super::model::fixtures::{edge, node};
    use super::*;

    #[test]
    fn exported_records_parse_back_to_the_same_elements() {
        let mut first = node("a");
        first.name = "Alpha".to_owned();
        let mut attributes = Map::new();
        attributes.insert("color".to_owned(), Value::from("red"));
        first.attributes = Some(attributes);
        first.cluster_id = 2;
        let second = node("b");

        let mut link = edge("r1", "a", "b");
        link.source = link.source.resolved(0);
        link.target = link.target.resolved(1);
        link.description = Some("knows".to_owned());

        let export = export_highlighted([&first, &second], [&link]).expect("export");
        let nodes: Vec<Node> = serde_json::from_str(&export.nodes_json).expect("nodes json");
        let links: Vec<Edge> = serde_json::from_str(&export.links_json).expect("links json");

        assert_eq!(nodes, vec![first, second]);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "r1");
        assert_eq!(links[0].source_id(), "a");
        assert_eq!(links[0].target_id(), "b");
        assert_eq!(links[0].source.index(), None);
        assert_eq!(links[0].description.as_deref(), Some("knows"));
    }

    #[test]
    fn export_is_pretty_printed() {
        let export = export_highlighted([&node("a")], Vec::<&Edge>::new()).expect("export");
        assert!(export.nodes_json.contains("\n  {"));
        assert_eq!(export.links_json, "[]");
        assert_eq!(export.link_count, 0);
    }

    #[test]
    fn writes_both_files() {
        let dir = std::env::temp_dir().join(format!("entity-graph-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let export = export_highlighted([&node("a")], [&edge("r1", "a", "a")]).expect("export");
        let [nodes_path, links_path] = export.write_to_dir(&dir).expect("written");

        assert_eq!(
            std::fs::read_to_string(&nodes_path).expect("nodes file"),
            export.nodes_json
        );
        assert!(links_path.ends_with(LINKS_FILE_NAME));
        std::fs::remove_dir_all(&dir).ok();
    }
}
