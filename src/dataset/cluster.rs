use std::collections::HashMap;

use tracing::debug;

use super::model::{Edge, Node};

const UNASSIGNED: usize = usize::MAX;

/// Connected-component assignment for one generation of the graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterMap {
    assignments: HashMap<String, usize>,
    sizes: Vec<usize>,
}

impl ClusterMap {
    pub fn cluster_of(&self, node_id: &str) -> Option<usize> {
        self.assignments.get(node_id).copied()
    }

    pub fn cluster_count(&self) -> usize {
        self.sizes.len()
    }

    /// Node count per cluster, indexed by cluster id.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    pub fn apply_to(&self, nodes: &mut [Node]) {
        for node in nodes {
            node.cluster_id = self.cluster_of(&node.id).unwrap_or(0);
        }
    }
}

/// Assigns every node a component id, numbering components in the order
/// their first node appears in `nodes`.
pub fn compute_clusters(nodes: &[Node], edges: &[Edge]) -> ClusterMap {
    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect::<HashMap<_, _>>();

    let mut adjacency = vec![Vec::new(); nodes.len()];
    for edge in edges {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(edge.source_id()),
            index_by_id.get(edge.target_id()),
        ) else {
            continue;
        };

        adjacency[source].push(target);
        if source != target {
            adjacency[target].push(source);
        }
    }

    let mut cluster_by_index = vec![UNASSIGNED; nodes.len()];
    let mut sizes = Vec::new();
    let mut stack = Vec::new();

    for start in 0..nodes.len() {
        if cluster_by_index[start] != UNASSIGNED {
            continue;
        }

        let cluster = sizes.len();
        let mut size = 0usize;
        cluster_by_index[start] = cluster;
        stack.push(start);

        while let Some(current) = stack.pop() {
            size += 1;
            for &next in &adjacency[current] {
                if cluster_by_index[next] == UNASSIGNED {
                    cluster_by_index[next] = cluster;
                    stack.push(next);
                }
            }
        }

        sizes.push(size);
    }

    let assignments = nodes
        .iter()
        .zip(cluster_by_index)
        .map(|(node, cluster)| (node.id.clone(), cluster))
        .collect();

    debug!(clusters = sizes.len(), nodes = nodes.len(), "computed clusters");
    ClusterMap { assignments, sizes }
}

/// Latest cluster assignment plus a flag saying whether it still matches
/// the graph on screen.
#[derive(Clone, Debug)]
pub struct ClusterState {
    map: ClusterMap,
    stale: bool,
}

impl Default for ClusterState {
    fn default() -> Self {
        Self {
            map: ClusterMap::default(),
            stale: true,
        }
    }
}

impl ClusterState {
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn recompute(&mut self, nodes: &[Node], edges: &[Edge]) -> &ClusterMap {
        self.map = compute_clusters(nodes, edges);
        self.stale = false;
        &self.map
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The assignment, or `None` while it is out of date.
    pub fn current(&self) -> Option<&ClusterMap> {
        (!self.stale).then_some(&self.map)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::super::model::fixtures::{edge, node};
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| node(id)).collect()
    }

    #[test]
    fn groups_connected_nodes_and_isolates_the_rest() {
        let clusters = compute_clusters(&nodes(&["a", "b", "c"]), &[edge("r1", "a", "b")]);

        assert_eq!(clusters.cluster_of("a"), Some(0));
        assert_eq!(clusters.cluster_of("b"), Some(0));
        assert_eq!(clusters.cluster_of("c"), Some(1));
        assert_eq!(clusters.sizes(), &[2, 1]);
    }

    #[test]
    fn without_edges_every_node_is_a_singleton() {
        let clusters = compute_clusters(&nodes(&["x", "y", "z"]), &[]);

        assert_eq!(clusters.cluster_count(), 3);
        assert_eq!(clusters.cluster_of("x"), Some(0));
        assert_eq!(clusters.cluster_of("y"), Some(1));
        assert_eq!(clusters.cluster_of("z"), Some(2));
        assert_eq!(clusters.largest(), 1);
    }

    #[test]
    fn numbering_follows_input_order() {
        let edges = [edge("r1", "c", "b")];
        let clusters = compute_clusters(&nodes(&["a", "b", "c"]), &edges);

        assert_eq!(clusters.cluster_of("a"), Some(0));
        assert_eq!(clusters.cluster_of("b"), Some(1));
        assert_eq!(clusters.cluster_of("c"), Some(1));
    }

    #[test]
    fn unknown_endpoints_do_not_join_clusters() {
        let edges = [edge("r1", "a", "z"), edge("r2", "z", "b")];
        let clusters = compute_clusters(&nodes(&["a", "b"]), &edges);

        assert_ne!(clusters.cluster_of("a"), clusters.cluster_of("b"));
        assert_eq!(clusters.cluster_of("z"), None);
    }

    #[test]
    fn resolved_endpoints_cluster_like_raw_ids() {
        let graph_nodes = nodes(&["a", "b", "c", "d"]);
        let raw = vec![edge("r1", "a", "c"), edge("r2", "b", "d")];
        let resolved = raw
            .iter()
            .cloned()
            .map(|mut link| {
                link.source = link.source.resolved(99);
                link.target = link.target.resolved(98);
                link
            })
            .collect::<Vec<_>>();

        assert_eq!(
            compute_clusters(&graph_nodes, &raw),
            compute_clusters(&graph_nodes, &resolved)
        );
    }

    #[test]
    fn recomputation_is_idempotent() {
        let graph_nodes = nodes(&["a", "b", "c", "d", "e"]);
        let edges = [edge("r1", "e", "a"), edge("r2", "b", "c")];

        assert_eq!(
            compute_clusters(&graph_nodes, &edges),
            compute_clusters(&graph_nodes, &edges)
        );
    }

    #[test]
    fn long_paths_do_not_exhaust_the_stack() {
        const COUNT: usize = 200_000;
        let ids = (0..COUNT).map(|index| format!("n{index}")).collect::<Vec<_>>();
        let graph_nodes = ids.iter().map(|id| node(id)).collect::<Vec<_>>();
        let edges = ids
            .windows(2)
            .enumerate()
            .map(|(index, pair)| edge(&format!("r{index}"), &pair[0], &pair[1]))
            .collect::<Vec<_>>();

        let clusters = compute_clusters(&graph_nodes, &edges);
        assert_eq!(clusters.cluster_count(), 1);
        assert_eq!(clusters.sizes(), &[COUNT]);
    }

    #[test]
    fn apply_writes_cluster_ids_onto_nodes() {
        let mut graph_nodes = nodes(&["a", "b", "c"]);
        let clusters = compute_clusters(&graph_nodes, &[edge("r1", "b", "c")]);
        clusters.apply_to(&mut graph_nodes);

        let ids = graph_nodes
            .iter()
            .map(|node| node.cluster_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 1, 1]);
    }

    #[test]
    fn state_is_stale_until_recomputed() {
        let graph_nodes = nodes(&["a"]);
        let mut state = ClusterState::default();
        assert!(state.current().is_none());

        state.recompute(&graph_nodes, &[]);
        assert_eq!(state.current().map(ClusterMap::cluster_count), Some(1));

        state.invalidate();
        assert!(state.is_stale());
        assert!(state.current().is_none());
    }

    fn reachable(adjacency: &[Vec<usize>], from: usize, to: usize) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            for &next in &adjacency[current] {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn clusters_partition_by_reachability(
            node_count in 1usize..14,
            pairs in proptest::collection::vec((0usize..14, 0usize..14), 0..24),
        ) {
            let ids = (0..node_count).map(|index| format!("n{index}")).collect::<Vec<_>>();
            let graph_nodes = ids.iter().map(|id| node(id)).collect::<Vec<_>>();
            let pairs = pairs
                .into_iter()
                .filter(|(source, target)| *source < node_count && *target < node_count)
                .collect::<Vec<_>>();
            let edges = pairs
                .iter()
                .enumerate()
                .map(|(index, (source, target))| edge(&format!("r{index}"), &ids[*source], &ids[*target]))
                .collect::<Vec<_>>();

            let mut adjacency = vec![Vec::new(); node_count];
            for &(source, target) in &pairs {
                adjacency[source].push(target);
                adjacency[target].push(source);
            }

            let clusters = compute_clusters(&graph_nodes, &edges);
            for a in 0..node_count {
                for b in 0..node_count {
                    let same = clusters.cluster_of(&ids[a]) == clusters.cluster_of(&ids[b]);
                    prop_assert_eq!(same, reachable(&adjacency, a, b));
                }
            }
        }
    }
}
