use petgraph::visit::EdgeRef;
use petgraph::{Graph, Undirected};
use rustc_hash::FxHashMap;

use crate::sorted_sets::insert_sorted;

/// An undirected multi-hypergraph with dense vertex and edge ids.
///
/// Vertices are the integers `0..vertex_count()`. Hyperedges are sorted,
/// duplicate-free vertex lists of length at least one; the same vertex set may
/// occur as several hyperedges. The adjacency view (two vertices are adjacent
/// if they share at least one hyperedge) and the per-vertex incidence lists
/// are maintained on insertion, so the graph is cheap to query and read-only
/// for the algorithms operating on it.
#[derive(Clone, Debug, Default)]
pub struct Hypergraph {
    hyperedges: Vec<Vec<usize>>,
    adjacency: Vec<Vec<usize>>,
    incidence: Vec<Vec<usize>>,
}

impl Hypergraph {
    /// Creates a hypergraph with the given number of vertices and no
    /// hyperedges.
    pub fn new(vertex_count: usize) -> Self {
        Hypergraph {
            hyperedges: Vec::new(),
            adjacency: vec![Vec::new(); vertex_count],
            incidence: vec![Vec::new(); vertex_count],
        }
    }

    /// Adds a fresh isolated vertex and returns its id.
    pub fn add_vertex(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.incidence.push(Vec::new());
        self.adjacency.len() - 1
    }

    /// Adds a hyperedge over the given vertices and returns its id.
    ///
    /// The vertex list is sorted and deduplicated internally. Empty hyperedges
    /// and out-of-range vertex ids indicate a bug in the calling parser and
    /// abort.
    pub fn add_hyperedge(&mut self, vertices: &[usize]) -> usize {
        assert!(!vertices.is_empty(), "hyperedges must have at least one member");
        let mut members = vertices.to_vec();
        members.sort_unstable();
        members.dedup();
        for &vertex in &members {
            assert!(
                vertex < self.vertex_count(),
                "hyperedge member {} out of range",
                vertex
            );
        }
        for (index, &u) in members.iter().enumerate() {
            for &w in &members[index + 1..] {
                insert_sorted(&mut self.adjacency[u], w);
                insert_sorted(&mut self.adjacency[w], u);
            }
        }
        let edge_id = self.hyperedges.len();
        for &vertex in &members {
            self.incidence[vertex].push(edge_id);
        }
        self.hyperedges.push(members);
        edge_id
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.vertex_count()
    }

    pub fn hyperedge_count(&self) -> usize {
        self.hyperedges.len()
    }

    pub fn hyperedges(&self) -> &[Vec<usize>] {
        &self.hyperedges
    }

    /// The sorted member list of the hyperedge with the given id.
    pub fn hyperedge(&self, edge_id: usize) -> &[usize] {
        &self.hyperedges[edge_id]
    }

    /// The sorted list of distinct vertices sharing at least one hyperedge
    /// with `vertex`. A vertex never occurs in its own neighbor list.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.adjacency[vertex]
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency[vertex].len()
    }

    /// Returns the ids of all hyperedges whose members are fully contained in
    /// the given sorted bag, in ascending order.
    ///
    /// A hyperedge is contained in the bag exactly when every one of its
    /// members is, so counting how often each hyperedge is hit while walking
    /// the incidence lists of the bag members decides containment. The work is
    /// therefore bounded by the number of hyperedge memberships of the bag's
    /// vertices, which keeps the query cheap even when it is issued once per
    /// bag.
    pub fn induced_edge_ids(&self, bag: &[usize]) -> Vec<usize> {
        let mut hit_members: FxHashMap<usize, usize> = FxHashMap::default();
        for &vertex in bag {
            for &edge_id in &self.incidence[vertex] {
                *hit_members.entry(edge_id).or_insert(0) += 1;
            }
        }
        let mut induced: Vec<usize> = hit_members
            .into_iter()
            .filter(|&(edge_id, hits)| hits == self.hyperedges[edge_id].len())
            .map(|(edge_id, _)| edge_id)
            .collect();
        induced.sort_unstable();
        induced
    }

    /// Builds a hypergraph from a petgraph graph, mapping node indices to
    /// vertex ids in index order. Every graph edge becomes a binary hyperedge;
    /// parallel edges stay parallel.
    pub fn from_graph<N, E>(graph: &Graph<N, E, Undirected>) -> Self {
        let mut result = Hypergraph::new(graph.node_count());
        for edge in graph.edge_references() {
            result.add_hyperedge(&[edge.source().index(), edge.target().index()]);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric_and_deduplicated() {
        let mut graph = Hypergraph::new(4);
        graph.add_hyperedge(&[0, 1]);
        graph.add_hyperedge(&[1, 2, 3]);
        graph.add_hyperedge(&[1, 2]);

        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0, 2, 3]);
        assert_eq!(graph.neighbors(2), &[1, 3]);
        assert_eq!(graph.neighbors(3), &[1, 2]);
        for u in graph.vertices() {
            for &w in graph.neighbors(u) {
                assert!(graph.neighbors(w).contains(&u));
                assert_ne!(u, w);
            }
        }
    }

    #[test]
    fn hyperedges_are_sorted_and_duplicate_free() {
        let mut graph = Hypergraph::new(5);
        let edge_id = graph.add_hyperedge(&[4, 2, 2, 0]);
        assert_eq!(graph.hyperedge(edge_id), &[0, 2, 4]);
    }

    #[test]
    fn induced_edges_are_found_by_membership_counting() {
        let mut graph = Hypergraph::new(5);
        let first = graph.add_hyperedge(&[0, 1, 2]);
        let second = graph.add_hyperedge(&[2, 3]);
        let third = graph.add_hyperedge(&[3, 4]);

        assert_eq!(graph.induced_edge_ids(&[0, 1, 2, 3]), vec![first, second]);
        assert_eq!(graph.induced_edge_ids(&[3, 4]), vec![third]);
        assert_eq!(graph.induced_edge_ids(&[0, 3]), Vec::<usize>::new());
        assert_eq!(graph.induced_edge_ids(&[]), Vec::<usize>::new());
    }

    #[test]
    fn parallel_hyperedges_are_induced_individually() {
        let mut graph = Hypergraph::new(3);
        let first = graph.add_hyperedge(&[0, 1]);
        let second = graph.add_hyperedge(&[0, 1]);
        graph.add_hyperedge(&[1, 2]);

        assert_eq!(graph.induced_edge_ids(&[0, 1]), vec![first, second]);
    }

    #[test]
    fn conversion_from_petgraph_keeps_all_edges() {
        let mut graph: Graph<i32, i32, Undirected> = Graph::new_undirected();
        let nodes = [graph.add_node(0), graph.add_node(0), graph.add_node(0)];
        graph.add_edge(nodes[0], nodes[1], 0);
        graph.add_edge(nodes[1], nodes[2], 0);

        let hypergraph = Hypergraph::from_graph(&graph);
        assert_eq!(hypergraph.vertex_count(), 3);
        assert_eq!(hypergraph.hyperedge_count(), 2);
        assert_eq!(hypergraph.neighbors(1), &[0, 2]);
    }
}
