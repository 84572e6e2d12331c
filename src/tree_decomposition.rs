use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Graph, Undirected};

use crate::hypergraph::Hypergraph;
use crate::sorted_sets::is_subset;

/// The content of a single decomposition node: a sorted vertex list and the
/// ids of the hyperedges induced by it (empty unless induced-edge computation
/// was requested).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bag {
    pub vertices: Vec<usize>,
    pub induced_edges: Vec<usize>,
}

impl Bag {
    pub fn new(vertices: Vec<usize>) -> Self {
        Bag {
            vertices,
            induced_edges: Vec::new(),
        }
    }
}

/// A tree decomposition, represented as an undirected petgraph tree whose
/// node weights are the bags.
///
/// Invariants (verified by [`check_tree_decomposition`]): every input vertex
/// occurs in at least one bag, every input hyperedge is contained in at least
/// one bag, and for every vertex the bags containing it induce a connected
/// subtree.
///
/// [`check_tree_decomposition`]: crate::check_tree_decomposition
#[derive(Clone, Debug, Default)]
pub struct TreeDecomposition {
    tree: Graph<Bag, (), Undirected>,
}

impl TreeDecomposition {
    /// An empty decomposition without any bag, to be filled with [`add_bag`]
    /// and [`add_leaf`].
    ///
    /// [`add_bag`]: TreeDecomposition::add_bag
    /// [`add_leaf`]: TreeDecomposition::add_leaf
    pub fn new() -> Self {
        TreeDecomposition {
            tree: Graph::new_undirected(),
        }
    }

    pub(crate) fn from_tree(tree: Graph<Bag, (), Undirected>) -> Self {
        TreeDecomposition { tree }
    }

    /// The underlying tree. Node weights are the bags.
    pub fn tree(&self) -> &Graph<Bag, (), Undirected> {
        &self.tree
    }

    pub fn bag_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn bag(&self, node: NodeIndex) -> &Bag {
        &self.tree[node]
    }

    /// The width of the decomposition, i.e. the maximum bag size minus one.
    ///
    /// The decomposition of the empty graph consists of a single empty bag
    /// and reports width 0; this crate does not use negative widths.
    pub fn width(&self) -> usize {
        if let Some(bag) = self.tree.node_weights().max_by_key(|bag| bag.vertices.len()) {
            bag.vertices.len().saturating_sub(1)
        } else {
            0
        }
    }

    /// Adds a bag that is not connected to the rest of the tree yet.
    pub fn add_bag(&mut self, bag: Bag) -> NodeIndex {
        self.tree.add_node(bag)
    }

    /// Adds a bag as a new leaf below the given anchor node.
    pub fn add_leaf(&mut self, anchor: NodeIndex, bag: Bag) -> NodeIndex {
        let leaf = self.tree.add_node(bag);
        self.tree.add_edge(leaf, anchor, ());
        leaf
    }

    /// Returns some node whose bag contains all of the given sorted vertices.
    pub(crate) fn find_bag_containing(&self, vertices: &[usize]) -> Option<NodeIndex> {
        self.tree
            .node_indices()
            .find(|&node| is_subset(vertices, &self.tree[node].vertices))
    }

    /// Removes subset-redundant bags: as long as two adjacent bags exist where
    /// one contains the other, the smaller bag is contracted into the larger
    /// one and its remaining neighbors are re-attached there. Applying this
    /// twice yields the same tree as applying it once.
    pub fn compress(&mut self) {
        loop {
            let mut contraction = None;
            for edge in self.tree.edge_references() {
                let (a, b) = (edge.source(), edge.target());
                if is_subset(&self.tree[a].vertices, &self.tree[b].vertices) {
                    contraction = Some((a, b));
                    break;
                }
                if is_subset(&self.tree[b].vertices, &self.tree[a].vertices) {
                    contraction = Some((b, a));
                    break;
                }
            }
            let Some((child, into)) = contraction else {
                break;
            };
            let orphans: Vec<NodeIndex> = self
                .tree
                .neighbors(child)
                .filter(|&neighbor| neighbor != into)
                .collect();
            for orphan in orphans {
                if !self.tree.contains_edge(into, orphan) {
                    self.tree.add_edge(into, orphan, ());
                }
            }
            self.tree.remove_node(child);
        }
    }

    /// Fills in, for every bag, the ids of the hyperedges fully contained in
    /// it.
    pub fn compute_induced_edges(&mut self, graph: &Hypergraph) {
        for bag in self.tree.node_weights_mut() {
            bag.induced_edges = graph.induced_edge_ids(&bag.vertices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_decomposition(bags: &[&[usize]]) -> TreeDecomposition {
        let mut decomposition = TreeDecomposition::new();
        let mut previous = None;
        for bag in bags {
            let node = match previous {
                None => decomposition.add_bag(Bag::new(bag.to_vec())),
                Some(anchor) => decomposition.add_leaf(anchor, Bag::new(bag.to_vec())),
            };
            previous = Some(node);
        }
        decomposition
    }

    #[test]
    fn width_is_maximum_bag_size_minus_one() {
        let decomposition = path_decomposition(&[&[0, 1], &[1, 2, 3], &[3]]);
        assert_eq!(decomposition.width(), 2);

        let mut empty = TreeDecomposition::new();
        empty.add_bag(Bag::default());
        assert_eq!(empty.width(), 0);
    }

    #[test]
    fn compression_contracts_subset_bags() {
        let decomposition = path_decomposition(&[&[0, 1], &[1], &[1, 2]]);
        let mut compressed = decomposition.clone();
        compressed.compress();

        assert_eq!(compressed.bag_count(), 2);
        assert_eq!(compressed.tree().edge_count(), 1);
        let mut bags: Vec<Vec<usize>> = compressed
            .tree()
            .node_weights()
            .map(|bag| bag.vertices.clone())
            .collect();
        bags.sort();
        assert_eq!(bags, vec![vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn compression_is_idempotent() {
        let mut once = path_decomposition(&[&[0, 1, 2], &[1, 2], &[2, 3], &[3]]);
        once.compress();
        let mut twice = once.clone();
        twice.compress();

        let bags = |decomposition: &TreeDecomposition| {
            let mut bags: Vec<Vec<usize>> = decomposition
                .tree()
                .node_weights()
                .map(|bag| bag.vertices.clone())
                .collect();
            bags.sort();
            bags
        };
        assert_eq!(bags(&once), bags(&twice));
        assert_eq!(once.tree().edge_count(), twice.tree().edge_count());
    }

    #[test]
    fn induced_edges_are_attached_to_bags() {
        let mut graph = Hypergraph::new(4);
        let triangle = graph.add_hyperedge(&[0, 1, 2]);
        let pendant = graph.add_hyperedge(&[2, 3]);

        let mut decomposition = path_decomposition(&[&[0, 1, 2], &[2, 3]]);
        decomposition.compute_induced_edges(&graph);

        let mut found: Vec<Vec<usize>> = decomposition
            .tree()
            .node_weights()
            .map(|bag| bag.induced_edges.clone())
            .collect();
        found.sort();
        assert_eq!(found, vec![vec![triangle], vec![pendant]]);
    }
}
