use crate::elimination_ordering::{eliminate_vertex, pick_tie_break, working_adjacency};
use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::PreprocessedGraph;

/// Greedy minimum-degree ordering: repeatedly eliminates a vertex of minimum
/// current degree, turning its neighborhood into a clique. Ties are broken
/// uniformly at random with the seeded PRNG, one consultation per step.
pub(crate) fn compute_min_degree_ordering(
    instance: &mut ManagementInstance,
    graph: &Hypergraph,
    preprocessed: Option<&PreprocessedGraph>,
) -> Option<Vec<usize>> {
    let (mut adjacency, live) = working_adjacency(graph, preprocessed);
    let mut alive = vec![false; adjacency.len()];
    for &vertex in &live {
        alive[vertex] = true;
    }

    let mut ordering = Vec::with_capacity(live.len());
    let mut candidates = Vec::new();
    for _ in 0..live.len() {
        if instance.is_terminated() {
            return None;
        }

        let mut min_degree = usize::MAX;
        candidates.clear();
        for &vertex in &live {
            if !alive[vertex] {
                continue;
            }
            let degree = adjacency[vertex].len();
            if degree <= min_degree {
                if degree < min_degree {
                    candidates.clear();
                    min_degree = degree;
                }
                candidates.push(vertex);
            }
        }

        let selected = pick_tie_break(&mut candidates, instance.rng_mut());
        eliminate_vertex(&mut adjacency, selected);
        alive[selected] = false;
        ordering.push(selected);
    }
    Some(ordering)
}
