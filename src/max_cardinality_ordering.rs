use crate::elimination_ordering::{pick_tie_break, working_adjacency};
use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::PreprocessedGraph;

/// Maximum cardinality search: vertices are visited one by one, always picking
/// a vertex with the largest number of already visited neighbors (seeded
/// random tie-break). Eliminating in reverse visit order reproduces a perfect
/// elimination ordering on chordal graphs, so the visit sequence is reversed
/// before it is returned.
pub(crate) fn compute_max_cardinality_ordering(
    instance: &mut ManagementInstance,
    graph: &Hypergraph,
    preprocessed: Option<&PreprocessedGraph>,
) -> Option<Vec<usize>> {
    let (adjacency, live) = working_adjacency(graph, preprocessed);
    let mut unvisited = vec![false; adjacency.len()];
    for &vertex in &live {
        unvisited[vertex] = true;
    }
    let mut visited_neighbors = vec![0usize; adjacency.len()];

    let mut visit_sequence = Vec::with_capacity(live.len());
    let mut candidates = Vec::new();
    for _ in 0..live.len() {
        if instance.is_terminated() {
            return None;
        }

        let mut max_cardinality = 0;
        candidates.clear();
        for &vertex in &live {
            if !unvisited[vertex] {
                continue;
            }
            let cardinality = visited_neighbors[vertex];
            if cardinality >= max_cardinality {
                if cardinality > max_cardinality {
                    candidates.clear();
                    max_cardinality = cardinality;
                }
                candidates.push(vertex);
            }
        }

        let selected = pick_tie_break(&mut candidates, instance.rng_mut());
        unvisited[selected] = false;
        for &neighbor in &adjacency[selected] {
            if unvisited[neighbor] {
                visited_neighbors[neighbor] += 1;
            }
        }
        visit_sequence.push(selected);
    }

    visit_sequence.reverse();
    Some(visit_sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib_tests::graph_from_edges;

    #[test]
    fn visit_sequence_is_reversed_into_an_elimination_ordering() {
        // On a path the search never jumps: after the start vertex, some
        // neighbor of the visited region is always preferred over a fresh
        // component, so consecutive path vertices stay consecutive.
        let graph = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let mut management = ManagementInstance::with_seed(8);
        let ordering = compute_max_cardinality_ordering(&mut management, &graph, None)
            .expect("not cancelled");
        let mut sorted = ordering.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        // The first visited vertex is eliminated last.
        let first_visited = *ordering.last().unwrap();
        assert!(first_visited < 4);
    }

    #[test]
    fn triangles_count_visited_neighbors() {
        let graph = graph_from_edges(4, &[(0, 1), (0, 2), (1, 2), (2, 3)]);
        let mut management = ManagementInstance::with_seed(6);
        let ordering = compute_max_cardinality_ordering(&mut management, &graph, None)
            .expect("not cancelled");
        assert_eq!(ordering.len(), 4);
    }
}
