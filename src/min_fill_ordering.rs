use itertools::Itertools;

use crate::elimination_ordering::{eliminate_vertex, pick_tie_break, working_adjacency};
use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::PreprocessedGraph;
use crate::sorted_sets::contains_sorted;

/// Min-fill ordering with fill counts recomputed from scratch in every step:
/// the number of non-adjacent neighbor pairs is counted for every live vertex
/// before each elimination. Selection matches the incremental engine, minimum
/// fill first, then minimum degree, then a seeded-random tie-break.
///
/// Quadratic per step and mainly useful as a reference point for the
/// incremental engine and for small instances.
pub(crate) fn compute_min_fill_ordering(
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

        let mut min_fill = usize::MAX;
        let mut min_degree = usize::MAX;
        candidates.clear();
        for &vertex in &live {
            if !alive[vertex] {
                continue;
            }
            let fill = fill_count(&adjacency, vertex);
            let degree = adjacency[vertex].len();
            if (fill, degree) <= (min_fill, min_degree) {
                if (fill, degree) < (min_fill, min_degree) {
                    candidates.clear();
                    min_fill = fill;
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

/// The number of fill edges eliminating `vertex` would introduce right now.
fn fill_count(adjacency: &[Vec<usize>], vertex: usize) -> usize {
    adjacency[vertex]
        .iter()
        .tuple_combinations()
        .filter(|(&u, &w)| !contains_sorted(&adjacency[u], w))
        .count()
}
