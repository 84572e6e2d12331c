use log::error;
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;

use crate::hypergraph::Hypergraph;
use crate::sorted_sets::{contains_sorted, is_subset};
use crate::tree_decomposition::TreeDecomposition;

/// Given a tree decomposition checks if it is a valid tree decomposition of
/// the graph: the bags form a tree, every vertex and every hyperedge is
/// covered by some bag, and for each vertex the bags containing it induce a
/// connected subtree. Returns true if the decomposition is valid, returns
/// false otherwise and logs what is violated.
pub fn check_tree_decomposition(graph: &Hypergraph, decomposition: &TreeDecomposition) -> bool {
    let tree = decomposition.tree();

    if tree.node_count() == 0 {
        error!("the decomposition has no bags");
        return false;
    }
    if tree.edge_count() != tree.node_count() - 1 {
        error!(
            "the decomposition has {} bags but {} edges and cannot be a tree",
            tree.node_count(),
            tree.edge_count()
        );
        return false;
    }
    let reached = reachable_from(decomposition, tree.node_indices().next().unwrap(), |_| true);
    if reached.len() != tree.node_count() {
        error!("the decomposition tree is not connected");
        return false;
    }

    for vertex in graph.vertices() {
        if !tree
            .node_weights()
            .any(|bag| contains_sorted(&bag.vertices, vertex))
        {
            error!("vertex {} is not contained in any bag", vertex);
            return false;
        }
    }

    for (edge_id, members) in graph.hyperedges().iter().enumerate() {
        if !tree
            .node_weights()
            .any(|bag| is_subset(members, &bag.vertices))
        {
            error!(
                "hyperedge {} with members {:?} is not covered by any bag",
                edge_id, members
            );
            return false;
        }
    }

    for vertex in graph.vertices() {
        let containing: Vec<NodeIndex> = tree
            .node_indices()
            .filter(|&node| contains_sorted(&tree[node].vertices, vertex))
            .collect();
        let reached = reachable_from(decomposition, containing[0], |node| {
            contains_sorted(&tree[node].vertices, vertex)
        });
        if reached.len() != containing.len() {
            error!(
                "the {} bags containing vertex {} induce a disconnected subtree, only {} of them are reachable from the first one",
                containing.len(),
                vertex,
                reached.len()
            );
            return false;
        }
    }

    true
}

/// Breadth first search over the decomposition tree restricted to the nodes
/// accepted by the filter.
fn reachable_from(
    decomposition: &TreeDecomposition,
    source: NodeIndex,
    filter: impl Fn(NodeIndex) -> bool,
) -> FxHashSet<NodeIndex> {
    let tree = decomposition.tree();
    let mut seen: FxHashSet<NodeIndex> = FxHashSet::default();
    seen.insert(source);
    let mut next_level = vec![source];

    while !next_level.is_empty() {
        let this_level = std::mem::take(&mut next_level);
        for node in this_level {
            for neighbor in tree.neighbors(node) {
                if filter(neighbor) && !seen.contains(&neighbor) {
                    seen.insert(neighbor);
                    next_level.push(neighbor);
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib_tests::graph_from_edges;
    use crate::tree_decomposition::Bag;

    #[test]
    fn accepts_a_hand_built_path_decomposition() {
        let graph = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let mut decomposition = TreeDecomposition::new();
        let first = decomposition.add_bag(Bag::new(vec![0, 1]));
        let second = decomposition.add_leaf(first, Bag::new(vec![1, 2]));
        decomposition.add_leaf(second, Bag::new(vec![2, 3]));
        assert!(check_tree_decomposition(&graph, &decomposition));
    }

    #[test]
    fn rejects_missing_edge_coverage() {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2), (0, 2)]);
        let mut decomposition = TreeDecomposition::new();
        let first = decomposition.add_bag(Bag::new(vec![0, 1]));
        decomposition.add_leaf(first, Bag::new(vec![1, 2]));
        // The triangle edge {0, 2} is in no bag.
        assert!(!check_tree_decomposition(&graph, &decomposition));
    }

    #[test]
    fn rejects_disconnected_occurrences_of_a_vertex() {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2)]);
        let mut decomposition = TreeDecomposition::new();
        let first = decomposition.add_bag(Bag::new(vec![0, 1]));
        let second = decomposition.add_leaf(first, Bag::new(vec![1]));
        decomposition.add_leaf(second, Bag::new(vec![1, 2]));
        assert!(check_tree_decomposition(&graph, &decomposition));

        // Punch a hole into the middle bag.
        let mut broken = TreeDecomposition::new();
        let first = broken.add_bag(Bag::new(vec![0, 1]));
        let second = broken.add_leaf(first, Bag::new(vec![0]));
        broken.add_leaf(second, Bag::new(vec![1, 2]));
        assert!(!check_tree_decomposition(&graph, &broken));
    }
}
