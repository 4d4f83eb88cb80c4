mod collect;

use std::collections::HashSet;

use tracing::debug;

use crate::dataset::Edge;

pub(in crate::app) use collect::nodes_in_region;
use collect::{incident_links, links_touching};

/// What the user is currently focused on. Region mode is a separate axis:
/// while it is armed, clicks on the canvas are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) enum Interaction {
    #[default]
    Idle,
    NodeFocused(String),
    LinkFocused(String),
    RegionArmed,
    RegionSelected(HashSet<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Emphasis {
    Apply,
    Restore,
    Keep,
}

/// Side effects a state change asks the caller to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct Transition {
    pub(in crate::app) emphasis: Emphasis,
    pub(in crate::app) hide_panels: bool,
    /// `Some(enabled)` when node drag and pan should be toggled.
    pub(in crate::app) surface_interactions: Option<bool>,
}

impl Transition {
    const fn new(emphasis: Emphasis, hide_panels: bool) -> Self {
        Self {
            emphasis,
            hide_panels,
            surface_interactions: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(in crate::app) struct SelectionState {
    interaction: Interaction,
    highlighted_nodes: HashSet<String>,
    highlighted_links: HashSet<String>,
}

impl SelectionState {
    pub(in crate::app) fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub(in crate::app) fn highlighted_nodes(&self) -> &HashSet<String> {
        &self.highlighted_nodes
    }

    pub(in crate::app) fn highlighted_links(&self) -> &HashSet<String> {
        &self.highlighted_links
    }

    pub(in crate::app) fn region_mode(&self) -> bool {
        matches!(
            self.interaction,
            Interaction::RegionArmed | Interaction::RegionSelected(_)
        )
    }

    pub(in crate::app) fn has_highlight(&self) -> bool {
        !self.highlighted_nodes.is_empty() || !self.highlighted_links.is_empty()
    }

    pub(in crate::app) fn is_node_highlighted(&self, node_id: &str) -> bool {
        self.highlighted_nodes.contains(node_id)
    }

    pub(in crate::app) fn is_link_highlighted(&self, link_id: &str) -> bool {
        self.highlighted_links.contains(link_id)
    }

    /// The clicked node, or any node caught by the selection rectangle.
    pub(in crate::app) fn is_primary(&self, node_id: &str) -> bool {
        match &self.interaction {
            Interaction::NodeFocused(focused) => focused == node_id,
            Interaction::RegionSelected(selected) => selected.contains(node_id),
            _ => false,
        }
    }

    pub(in crate::app) fn focus_node(&mut self, node_id: &str, links: &[Edge]) -> Option<Transition> {
        if self.region_mode() {
            return None;
        }

        let (nodes, incident) = incident_links(node_id, links);
        debug!(
            node = node_id,
            neighbors = nodes.len() - 1,
            links = incident.len(),
            "node focused"
        );
        self.interaction = Interaction::NodeFocused(node_id.to_owned());
        self.highlighted_nodes = nodes;
        self.highlighted_links = incident;
        Some(Transition::new(Emphasis::Apply, false))
    }

    pub(in crate::app) fn focus_link(&mut self, link_id: &str) -> Option<Transition> {
        if self.region_mode() {
            return None;
        }

        debug!(link = link_id, "link focused");
        self.interaction = Interaction::LinkFocused(link_id.to_owned());
        self.highlighted_nodes.clear();
        self.highlighted_links = HashSet::from([link_id.to_owned()]);
        Some(Transition::new(Emphasis::Apply, false))
    }

    /// Background click.
    pub(in crate::app) fn clear(&mut self) -> Option<Transition> {
        if self.region_mode() {
            return None;
        }

        self.reset();
        Some(Transition::new(Emphasis::Restore, true))
    }

    pub(in crate::app) fn enter_region_mode(&mut self) -> Transition {
        debug!("region selection armed");
        self.highlighted_nodes.clear();
        self.highlighted_links.clear();
        self.interaction = Interaction::RegionArmed;
        Transition {
            surface_interactions: Some(false),
            ..Transition::new(Emphasis::Restore, true)
        }
    }

    /// Replaces any previous region selection with `selected`.
    pub(in crate::app) fn select_region(
        &mut self,
        selected: HashSet<String>,
        links: &[Edge],
    ) -> Option<Transition> {
        if !self.region_mode() {
            return None;
        }

        self.highlighted_links = links_touching(&selected, links);
        self.highlighted_nodes = selected.clone();
        debug!(
            nodes = self.highlighted_nodes.len(),
            links = self.highlighted_links.len(),
            "region selected"
        );
        self.interaction = Interaction::RegionSelected(selected);
        Some(Transition::new(Emphasis::Keep, false))
    }

    pub(in crate::app) fn exit_region_mode(&mut self) -> Option<Transition> {
        if !self.region_mode() {
            return None;
        }

        debug!("region selection disarmed");
        self.reset();
        Some(Transition {
            surface_interactions: Some(true),
            ..Transition::new(Emphasis::Keep, true)
        })
    }

    pub(in crate::app) fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.highlighted_nodes.clear();
        self.highlighted_links.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::fixtures::edge;

    fn links() -> Vec<Edge> {
        vec![edge("ab", "a", "b"), edge("bc", "b", "c"), edge("cd", "c", "d")]
    }

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn node_focus_then_background_returns_to_idle() {
        let mut selection = SelectionState::default();

        let focus = selection.focus_node("b", &links());
        assert_eq!(focus.map(|t| t.emphasis), Some(Emphasis::Apply));
        assert_eq!(selection.highlighted_nodes(), &ids(&["a", "b", "c"]));
        assert_eq!(selection.highlighted_links(), &ids(&["ab", "bc"]));
        assert!(selection.is_primary("b"));
        assert!(!selection.is_primary("a"));

        let clear = selection.clear();
        assert_eq!(clear, Some(Transition::new(Emphasis::Restore, true)));
        assert!(!selection.has_highlight());
        assert_eq!(selection.interaction(), &Interaction::Idle);
    }

    #[test]
    fn link_focus_clears_highlighted_nodes() {
        let mut selection = SelectionState::default();
        selection.focus_node("b", &links());

        selection.focus_link("cd");
        assert!(selection.highlighted_nodes().is_empty());
        assert_eq!(selection.highlighted_links(), &ids(&["cd"]));
        assert_eq!(
            selection.interaction(),
            &Interaction::LinkFocused("cd".to_owned())
        );
    }

    #[test]
    fn region_mode_ignores_canvas_clicks() {
        let mut selection = SelectionState::default();
        let enter = selection.enter_region_mode();
        assert_eq!(enter.surface_interactions, Some(false));

        assert_eq!(selection.focus_node("a", &links()), None);
        assert_eq!(selection.focus_link("ab"), None);
        assert_eq!(selection.clear(), None);
        assert_eq!(selection.interaction(), &Interaction::RegionArmed);
    }

    #[test]
    fn entering_region_mode_drops_the_previous_highlight() {
        let mut selection = SelectionState::default();
        selection.focus_node("b", &links());

        let enter = selection.enter_region_mode();
        assert_eq!(enter.emphasis, Emphasis::Restore);
        assert!(!selection.has_highlight());
    }

    #[test]
    fn region_selection_highlights_touching_links() {
        let mut selection = SelectionState::default();
        assert_eq!(selection.select_region(ids(&["a"]), &links()), None);

        selection.enter_region_mode();
        selection.select_region(ids(&["a"]), &links());
        assert_eq!(selection.highlighted_nodes(), &ids(&["a"]));
        assert_eq!(selection.highlighted_links(), &ids(&["ab"]));

        selection.select_region(ids(&["d"]), &links());
        assert_eq!(selection.highlighted_nodes(), &ids(&["d"]));
        assert_eq!(selection.highlighted_links(), &ids(&["cd"]));
        assert!(selection.is_primary("d"));
    }

    #[test]
    fn exiting_region_mode_re_enables_the_surface() {
        let mut selection = SelectionState::default();
        assert_eq!(selection.exit_region_mode(), None);

        selection.enter_region_mode();
        selection.select_region(ids(&["a", "b"]), &links());
        let exit = selection.exit_region_mode();

        assert_eq!(exit.and_then(|t| t.surface_interactions), Some(true));
        assert!(!selection.region_mode());
        assert!(!selection.has_highlight());
    }
}
