use std::collections::HashSet;

use eframe::egui::{Pos2, Rect};

use crate::dataset::{Edge, Node};

/// Neighbors of `node_id` (including itself) and the ids of its incident
/// links, gathered in one pass over the link list.
pub(in crate::app) fn incident_links(
    node_id: &str,
    links: &[Edge],
) -> (HashSet<String>, HashSet<String>) {
    let mut nodes = HashSet::from([node_id.to_owned()]);
    let mut incident = HashSet::new();

    for link in links {
        if let Some(other) = link.opposite(node_id) {
            nodes.insert(other.to_owned());
            incident.insert(link.id.clone());
        }
    }

    (nodes, incident)
}

/// Links with at least one endpoint in `node_ids`.
pub(in crate::app) fn links_touching(node_ids: &HashSet<String>, links: &[Edge]) -> HashSet<String> {
    links
        .iter()
        .filter(|link| node_ids.contains(link.source_id()) || node_ids.contains(link.target_id()))
        .map(|link| link.id.clone())
        .collect()
}

/// Nodes whose graph-space position lies inside `region` (edges included).
pub(in crate::app) fn nodes_in_region(
    region: Rect,
    nodes: &[Node],
    position_of: impl Fn(usize) -> Option<Pos2>,
) -> HashSet<String> {
    nodes
        .iter()
        .enumerate()
        .filter(|(index, _)| position_of(*index).is_some_and(|position| region.contains(position)))
        .map(|(_, node)| node.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::fixtures::{edge, node};

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn incident_scan_collects_both_directions() {
        let links = vec![edge("ab", "a", "b"), edge("ca", "c", "a"), edge("bc", "b", "c")];

        let (nodes, incident) = incident_links("a", &links);
        assert_eq!(nodes, ids(&["a", "b", "c"]));
        assert_eq!(incident, ids(&["ab", "ca"]));
    }

    #[test]
    fn isolated_node_only_highlights_itself() {
        let links = vec![edge("bc", "b", "c")];

        let (nodes, incident) = incident_links("a", &links);
        assert_eq!(nodes, ids(&["a"]));
        assert!(incident.is_empty());
    }

    #[test]
    fn region_uses_graph_positions() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let positions = [pos2(0.0, 0.0), pos2(50.0, 50.0), pos2(10.0, 10.0)];
        let region = Rect::from_two_pos(pos2(10.0, 10.0), pos2(-5.0, -5.0));

        let selected = nodes_in_region(region, &nodes, |index| positions.get(index).copied());
        assert_eq!(selected, ids(&["a", "c"]));
    }

    #[test]
    fn touching_links_need_one_selected_endpoint() {
        let links = vec![edge("ab", "a", "b"), edge("bc", "b", "c"), edge("cd", "c", "d")];

        assert_eq!(links_touching(&ids(&["a"]), &links), ids(&["ab"]));
        assert_eq!(links_touching(&ids(&["b"]), &links), ids(&["ab", "bc"]));
    }
}
