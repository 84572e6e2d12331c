use rand::rngs::StdRng;
use rand::Rng;

use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::max_cardinality_ordering::compute_max_cardinality_ordering;
use crate::min_degree_ordering::compute_min_degree_ordering;
use crate::min_fill_engine::MinFillEngine;
use crate::min_fill_ordering::compute_min_fill_ordering;
use crate::preprocess_graph::PreprocessedGraph;
use crate::sorted_sets::{contains_sorted, insert_sorted, remove_sorted};

/// The elimination ordering algorithms available to the decomposition loops.
///
/// An ordering is a permutation of the live vertices; bucket elimination turns
/// it into a tree decomposition. All variants poll the cancellation flag
/// between elimination steps and return `None` when interrupted, and all of
/// them consult the seeded PRNG exactly once per step for their tie-break.
#[derive(Clone, Debug)]
pub enum OrderingAlgorithm {
    /// Incremental min-fill (see [`MinFillEngine`]). The default.
    AdvancedMinFill(MinFillEngine),
    /// Min-fill with fill counts recomputed from scratch in every step.
    /// Considerably slower than [`OrderingAlgorithm::AdvancedMinFill`] but
    /// with the same selection rule.
    MinFill,
    /// Greedy minimum degree.
    MinDegree,
    /// Maximum cardinality search, eliminating in reverse visit order.
    MaxCardinality,
}

impl OrderingAlgorithm {
    pub fn advanced_min_fill() -> Self {
        OrderingAlgorithm::AdvancedMinFill(MinFillEngine::new())
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderingAlgorithm::AdvancedMinFill(_) => "min-fill+",
            OrderingAlgorithm::MinFill => "min-fill",
            OrderingAlgorithm::MinDegree => "min-degree",
            OrderingAlgorithm::MaxCardinality => "max-cardinality",
        }
    }

    /// Computes an elimination ordering for the graph, or for its reduced
    /// version when a preprocessed graph is supplied. Returns `None` when the
    /// computation was cancelled.
    pub fn compute_ordering(
        &mut self,
        instance: &mut ManagementInstance,
        graph: &Hypergraph,
        preprocessed: Option<&PreprocessedGraph>,
    ) -> Option<Vec<usize>> {
        match self {
            OrderingAlgorithm::AdvancedMinFill(engine) => {
                engine.compute_ordering(instance, graph, preprocessed)
            }
            OrderingAlgorithm::MinFill => compute_min_fill_ordering(instance, graph, preprocessed),
            OrderingAlgorithm::MinDegree => {
                compute_min_degree_ordering(instance, graph, preprocessed)
            }
            OrderingAlgorithm::MaxCardinality => {
                compute_max_cardinality_ordering(instance, graph, preprocessed)
            }
        }
    }
}

/// The mutable adjacency view the simpler ordering algorithms eliminate on,
/// together with the sorted list of live vertices.
pub(crate) fn working_adjacency(
    graph: &Hypergraph,
    preprocessed: Option<&PreprocessedGraph>,
) -> (Vec<Vec<usize>>, Vec<usize>) {
    match preprocessed {
        Some(preprocessed) => {
            let mut adjacency = vec![Vec::new(); preprocessed.original_vertex_count()];
            for &vertex in preprocessed.live_vertices() {
                adjacency[vertex] = preprocessed.neighbors(vertex).to_vec();
            }
            (adjacency, preprocessed.live_vertices().to_vec())
        }
        None => (
            graph
                .vertices()
                .map(|vertex| graph.neighbors(vertex).to_vec())
                .collect(),
            graph.vertices().collect(),
        ),
    }
}

/// Removes `vertex` from the working graph and turns its neighborhood into a
/// clique, the way simulated elimination demands.
pub(crate) fn eliminate_vertex(adjacency: &mut [Vec<usize>], vertex: usize) {
    let neighbors = std::mem::take(&mut adjacency[vertex]);
    for &neighbor in &neighbors {
        remove_sorted(&mut adjacency[neighbor], vertex);
    }
    for (index, &u) in neighbors.iter().enumerate() {
        for &w in &neighbors[index + 1..] {
            if !contains_sorted(&adjacency[u], w) {
                insert_sorted(&mut adjacency[u], w);
                insert_sorted(&mut adjacency[w], u);
            }
        }
    }
}

/// Picks one of the candidates uniformly at random. Candidates are sorted
/// beforehand so a fixed seed always selects the same vertex.
pub(crate) fn pick_tie_break(candidates: &mut Vec<usize>, rng: &mut StdRng) -> usize {
    debug_assert!(!candidates.is_empty());
    candidates.sort_unstable();
    candidates[rng.gen_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib_tests::{graph_from_edges, setup_test_instance};

    #[test]
    fn every_algorithm_produces_a_permutation() {
        for index in 0..6 {
            let instance_data = setup_test_instance(index);
            let expected: Vec<usize> = instance_data.graph.vertices().collect();
            for mut algorithm in [
                OrderingAlgorithm::advanced_min_fill(),
                OrderingAlgorithm::MinFill,
                OrderingAlgorithm::MinDegree,
                OrderingAlgorithm::MaxCardinality,
            ] {
                let mut management = ManagementInstance::with_seed(13);
                let mut ordering = algorithm
                    .compute_ordering(&mut management, &instance_data.graph, None)
                    .expect("not cancelled");
                ordering.sort_unstable();
                assert_eq!(ordering, expected, "algorithm {}", algorithm.name());
            }
        }
    }

    #[test]
    fn every_algorithm_honors_cancellation() {
        let instance_data = setup_test_instance(0);
        for mut algorithm in [
            OrderingAlgorithm::advanced_min_fill(),
            OrderingAlgorithm::MinFill,
            OrderingAlgorithm::MinDegree,
            OrderingAlgorithm::MaxCardinality,
        ] {
            let mut management = ManagementInstance::with_seed(13);
            management.terminate();
            assert!(algorithm
                .compute_ordering(&mut management, &instance_data.graph, None)
                .is_none());
        }
    }

    #[test]
    fn elimination_turns_the_neighborhood_into_a_clique() {
        let graph = graph_from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let (mut adjacency, _) = working_adjacency(&graph, None);
        eliminate_vertex(&mut adjacency, 0);
        assert!(adjacency[0].is_empty());
        assert_eq!(adjacency[1], vec![2, 3]);
        assert_eq!(adjacency[2], vec![1, 3]);
        assert_eq!(adjacency[3], vec![1, 2]);
    }
}
