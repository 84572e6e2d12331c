use log::trace;
use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::PreprocessedGraph;
use crate::sorted_sets::{
    decompose_sets, insert_sorted, merge_union_excluding, remove_sorted, sorted_difference_size,
    sorted_intersection_size,
};

/// The vertex was touched as a direct neighbor of the eliminated vertex.
const DIRECT_NEIGHBOR: u8 = 1;
/// The vertex was touched as a neighbor of a direct neighbor.
const SECOND_ORDER_NEIGHBOR: u8 = 2;
/// The vertex has been eliminated.
const ELIMINATED: u8 = 4;

/// Incremental min-fill ordering: simulated vertex elimination that always
/// eliminates a vertex introducing the fewest fill edges, with fill counters
/// maintained in place.
///
/// Per live vertex `v` the engine keeps the closed neighborhood `N⁺(v)`
/// (a sorted list containing `v` itself) and the fill count, i.e. the number
/// of non-adjacent pairs inside `N(v)`. An elimination step only touches
/// vertices within distance two of the eliminated vertex: their neighborhoods
/// are split against the eliminated one into `additional`, `unaffected` and
/// `existing` parts once, guarded by the status flags, and the fill counts
/// are patched from those parts instead of being recomputed.
///
/// Selection picks the minimum-degree vertex among the pool of minimum-fill
/// vertices, breaking ties uniformly at random; the PRNG is consulted exactly
/// once per elimination step. The pool is a cache: vertices whose fill rises
/// above the known minimum drop out and are rediscovered by a full scan once
/// the pool runs empty.
///
/// All buffers are kept on the engine value, so repeated orderings inside the
/// iterative minimizer reuse their allocations.
#[derive(Clone, Debug, Default)]
pub struct MinFillEngine {
    neighborhood: Vec<Vec<usize>>,
    fill: Vec<usize>,
    status: Vec<u8>,
    alive: Vec<bool>,
    remaining: usize,
    pool: FxHashSet<usize>,
    min_fill: usize,
    additional: Vec<Vec<usize>>,
    unaffected: Vec<Vec<usize>>,
    existing: Vec<Vec<usize>>,
    affected: Vec<usize>,
    min_degree_pool: Vec<usize>,
    merge_scratch: Vec<usize>,
}

impl MinFillEngine {
    pub fn new() -> Self {
        MinFillEngine::default()
    }

    /// Computes a min-fill elimination ordering, a permutation of the live
    /// vertices of the (possibly preprocessed) graph. Returns `None` when the
    /// cancellation flag is observed between elimination steps.
    pub fn compute_ordering(
        &mut self,
        instance: &mut ManagementInstance,
        graph: &Hypergraph,
        preprocessed: Option<&PreprocessedGraph>,
    ) -> Option<Vec<usize>> {
        self.prepare(graph, preprocessed);
        let mut ordering = Vec::with_capacity(self.remaining);
        while self.remaining > 0 {
            if instance.is_terminated() {
                return None;
            }
            ordering.push(self.eliminate_next(instance.rng_mut()));
        }
        Some(ordering)
    }

    fn prepare(&mut self, graph: &Hypergraph, preprocessed: Option<&PreprocessedGraph>) {
        let vertex_count = graph.vertex_count();
        if self.neighborhood.len() < vertex_count {
            self.neighborhood.resize_with(vertex_count, Vec::new);
            self.additional.resize_with(vertex_count, Vec::new);
            self.unaffected.resize_with(vertex_count, Vec::new);
            self.existing.resize_with(vertex_count, Vec::new);
        }
        for vertex in 0..vertex_count {
            self.neighborhood[vertex].clear();
            self.additional[vertex].clear();
            self.unaffected[vertex].clear();
            self.existing[vertex].clear();
        }
        self.fill.clear();
        self.fill.resize(vertex_count, 0);
        self.status.clear();
        self.status.resize(vertex_count, 0);
        self.alive.clear();
        self.alive.resize(vertex_count, false);
        self.pool.clear();
        self.min_fill = usize::MAX;
        self.remaining = 0;
        self.affected.clear();

        match preprocessed {
            Some(preprocessed) => {
                for &vertex in preprocessed.live_vertices() {
                    self.insert_vertex(vertex, preprocessed.neighbors(vertex));
                }
            }
            None => {
                for vertex in graph.vertices() {
                    self.insert_vertex(vertex, graph.neighbors(vertex));
                }
            }
        }

        for vertex in 0..vertex_count {
            if !self.alive[vertex] {
                continue;
            }
            let closed = &self.neighborhood[vertex];
            let fill = closed.len() * (closed.len() - 1) / 2 - self.count_edges_within(closed);
            self.fill[vertex] = fill;
            if fill <= self.min_fill {
                if fill < self.min_fill {
                    self.min_fill = fill;
                    self.pool.clear();
                }
                self.pool.insert(vertex);
            }
        }
    }

    fn insert_vertex(&mut self, vertex: usize, neighbors: &[usize]) {
        self.alive[vertex] = true;
        self.remaining += 1;
        let closed = &mut self.neighborhood[vertex];
        closed.extend_from_slice(neighbors);
        insert_sorted(closed, vertex);
    }

    /// Counts the edges of the working graph between members of the given
    /// sorted vertex set.
    fn count_edges_within(&self, vertices: &[usize]) -> usize {
        let mut count = 0;
        for (index, &vertex) in vertices.iter().enumerate() {
            let rest = &vertices[index + 1..];
            let closed = &self.neighborhood[vertex];
            let above = closed.partition_point(|&other| other <= vertex);
            count += sorted_intersection_size(rest, &closed[above..]);
        }
        count
    }

    /// Performs one elimination step and returns the eliminated vertex.
    /// Requires at least one live vertex.
    fn eliminate_next(&mut self, rng: &mut StdRng) -> usize {
        if self.pool.is_empty() {
            self.rebuild_pool();
        }

        // Minimum degree among the minimum-fill pool; candidates are sorted so
        // the random tie-break is reproducible for a fixed seed.
        {
            let MinFillEngine {
                pool,
                min_degree_pool,
                neighborhood,
                ..
            } = self;
            min_degree_pool.clear();
            let mut min_degree = usize::MAX;
            for &vertex in pool.iter() {
                let degree = neighborhood[vertex].len() - 1;
                if degree <= min_degree {
                    if degree < min_degree {
                        min_degree_pool.clear();
                        min_degree = degree;
                    }
                    min_degree_pool.push(vertex);
                }
            }
            min_degree_pool.sort_unstable();
        }
        let selected = self.min_degree_pool[rng.gen_range(0..self.min_degree_pool.len())];

        self.pool.remove(&selected);
        self.status[selected] = ELIMINATED;
        self.affected.clear();
        let selected_neighborhood = std::mem::take(&mut self.neighborhood[selected]);

        if self.fill[selected] == 0 {
            self.eliminate_clique_neighborhood(selected, &selected_neighborhood);
        } else {
            self.eliminate_general(selected, &selected_neighborhood);
        }

        self.alive[selected] = false;
        self.remaining -= 1;
        trace!("eliminated vertex {}", selected);
        selected
    }

    fn rebuild_pool(&mut self) {
        let MinFillEngine {
            pool,
            alive,
            fill,
            min_fill,
            ..
        } = self;
        *min_fill = usize::MAX;
        for (vertex, &is_alive) in alive.iter().enumerate() {
            if !is_alive {
                continue;
            }
            let amount = fill[vertex];
            if amount <= *min_fill {
                if amount < *min_fill {
                    *min_fill = amount;
                    pool.clear();
                }
                pool.insert(vertex);
            }
        }
    }

    fn update_pool(&mut self, vertex: usize, fill: usize) {
        if fill <= self.min_fill {
            if fill < self.min_fill {
                self.min_fill = fill;
                self.pool.clear();
            }
            self.pool.insert(vertex);
        } else {
            self.pool.remove(&vertex);
        }
    }

    /// Fast path: the neighborhood of the eliminated vertex is already a
    /// clique, so no fill edge appears. Every neighbor `w` only loses the
    /// pairs `{selected, u}` with `u` outside `N⁺(selected)`.
    fn eliminate_clique_neighborhood(&mut self, selected: usize, selected_neighborhood: &[usize]) {
        for &neighbor in selected_neighborhood {
            if neighbor == selected {
                continue;
            }
            let vanished =
                sorted_difference_size(&self.neighborhood[neighbor], selected_neighborhood);
            self.fill[neighbor] -= vanished;
            remove_sorted(&mut self.neighborhood[neighbor], selected);
        }
    }

    fn eliminate_general(&mut self, selected: usize, selected_neighborhood: &[usize]) {
        // Split the neighborhood of every vertex at distance at most two from
        // the eliminated vertex against N⁺(selected). The status flags make
        // sure each vertex is split exactly once.
        for &neighbor in selected_neighborhood {
            if neighbor == selected {
                continue;
            }
            if self.status[neighbor] == 0 {
                self.decompose_into(selected_neighborhood, selected, neighbor);
            }
            self.status[neighbor] |= DIRECT_NEIGHBOR;
            for index in 0..self.neighborhood[neighbor].len() {
                let second_order = self.neighborhood[neighbor][index];
                if self.status[second_order] < SECOND_ORDER_NEIGHBOR {
                    if self.status[second_order] == 0 {
                        self.decompose_into(selected_neighborhood, selected, second_order);
                    }
                    self.affected.push(second_order);
                    self.status[second_order] |= SECOND_ORDER_NEIGHBOR;
                }
            }
        }

        // Merge the fill edges into the direct neighborhoods and patch the
        // fill counts of the direct neighbors.
        for &neighbor in selected_neighborhood {
            if neighbor == selected {
                continue;
            }
            let additional_count = self.additional[neighbor].len();
            self.apply_neighborhood_update(selected, neighbor, additional_count);

            let mut fill = self.fill[neighbor];
            if additional_count == 0 && fill == 0 {
                self.status[neighbor] = 0;
                continue;
            }
            let unaffected_count = self.unaffected[neighbor].len();
            if unaffected_count == 0 {
                // The whole remaining neighborhood lies inside the new clique.
                self.status[neighbor] = 0;
                self.update_pool(neighbor, 0);
                self.fill[neighbor] = 0;
            } else if additional_count == 0 {
                // The neighborhood only lost the eliminated vertex: the pairs
                // {selected, u} over the unaffected part vanish, and pairs of
                // existing neighbors that just became adjacent stop counting.
                fill -= self.count_resolved_existing_pairs(neighbor, fill, unaffected_count);
                fill -= unaffected_count;
                self.status[neighbor] = 0;
                self.update_pool(neighbor, fill);
                self.fill[neighbor] = fill;
            } else {
                // Gained neighbors: every pair of a gained and an unaffected
                // neighbor that are not adjacent starts counting, one pair
                // {selected, u} vanishes per unaffected neighbor. Pairs inside
                // the old neighborhood that became adjacent are settled by the
                // second-order pass below.
                {
                    let MinFillEngine {
                        additional,
                        unaffected,
                        existing,
                        ..
                    } = &*self;
                    let gained = &additional[neighbor];
                    for &untouched in &unaffected[neighbor] {
                        fill += sorted_difference_size(gained, &existing[untouched]);
                        fill -= 1;
                    }
                }
                self.status[neighbor] &= !DIRECT_NEIGHBOR;
                if self.status[neighbor] == 0 {
                    self.update_pool(neighbor, fill);
                }
                self.fill[neighbor] = fill;
            }
        }

        // Second-order neighbors (and direct neighbors that also observed a
        // neighbor's change) lose the pairs of common neighbors with the
        // eliminated vertex that are now connected by fill edges.
        for index in 0..self.affected.len() {
            let vertex = self.affected[index];
            if self.status[vertex] != SECOND_ORDER_NEIGHBOR {
                continue;
            }
            let mut fill = self.fill[vertex];
            if !self.unaffected[vertex].is_empty() && fill > 0 {
                fill -= self.count_resolved_existing_pairs(vertex, fill, 0);
            } else {
                fill = 0;
            }
            self.update_pool(vertex, fill);
            self.fill[vertex] = fill;
        }

        // Reset flags and scratch lists on everything the step touched.
        for &neighbor in selected_neighborhood {
            if neighbor == selected {
                continue;
            }
            self.additional[neighbor].clear();
            self.unaffected[neighbor].clear();
            self.existing[neighbor].clear();
        }
        for index in 0..self.affected.len() {
            let vertex = self.affected[index];
            if self.status[vertex] == SECOND_ORDER_NEIGHBOR {
                self.additional[vertex].clear();
                self.unaffected[vertex].clear();
                self.existing[vertex].clear();
                self.status[vertex] = 0;
            }
        }
    }

    fn decompose_into(&mut self, selected_neighborhood: &[usize], selected: usize, vertex: usize) {
        let MinFillEngine {
            neighborhood,
            additional,
            unaffected,
            existing,
            ..
        } = self;
        decompose_sets(
            selected_neighborhood,
            &neighborhood[vertex],
            selected,
            &mut additional[vertex],
            &mut unaffected[vertex],
            &mut existing[vertex],
        );
    }

    /// Replaces `selected` in `N⁺(neighbor)` by the gained neighbors. A single
    /// gained vertex is spliced in place, larger gains run a full sorted merge
    /// through the scratch buffer.
    fn apply_neighborhood_update(&mut self, selected: usize, neighbor: usize, additional_count: usize) {
        match additional_count {
            0 => remove_sorted(&mut self.neighborhood[neighbor], selected),
            1 => {
                let gained = self.additional[neighbor][0];
                let closed = &mut self.neighborhood[neighbor];
                remove_sorted(closed, selected);
                insert_sorted(closed, gained);
            }
            _ => {
                let MinFillEngine {
                    neighborhood,
                    additional,
                    merge_scratch,
                    ..
                } = self;
                merge_union_excluding(
                    &neighborhood[neighbor],
                    &additional[neighbor],
                    selected,
                    merge_scratch,
                );
                std::mem::swap(&mut neighborhood[neighbor], merge_scratch);
            }
        }
    }

    /// Counts the pairs of `existing` neighbors of `vertex` that were not
    /// adjacent before the elimination but are connected by a fill edge now.
    /// Such a pair `{x, y}` with `x < y` is recognized by `y` occurring in the
    /// gained-neighbor list of `x`. Stops counting once the fill count can no
    /// longer drop below `floor`.
    fn count_resolved_existing_pairs(&self, vertex: usize, fill: usize, floor: usize) -> usize {
        let common = &self.existing[vertex];
        let mut resolved = 0;
        for (index, &lower) in common.iter().enumerate() {
            if fill - resolved <= floor {
                break;
            }
            let rest = &common[index + 1..];
            let gained = &self.additional[lower];
            let above = gained.partition_point(|&other| other <= lower);
            resolved += sorted_intersection_size(rest, &gained[above..]);
        }
        resolved
    }

    #[cfg(test)]
    fn fill_table_matches_ground_truth(&self) -> bool {
        for (vertex, &is_alive) in self.alive.iter().enumerate() {
            if !is_alive {
                continue;
            }
            let closed = &self.neighborhood[vertex];
            let expected =
                closed.len() * (closed.len() - 1) / 2 - self.count_edges_within(closed);
            if self.fill[vertex] != expected {
                return false;
            }
        }
        true
    }

    #[cfg(test)]
    fn flags_are_reset(&self) -> bool {
        self.status
            .iter()
            .enumerate()
            .all(|(vertex, &status)| status == 0 || !self.alive[vertex])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_partial_k_tree::{generate_k_tree, generate_partial_k_tree};
    use crate::lib_tests::{graph_from_edges, setup_test_instance};

    fn is_permutation_of(ordering: &[usize], expected: &[usize]) -> bool {
        let mut sorted = ordering.to_vec();
        sorted.sort_unstable();
        sorted == expected
    }

    #[test]
    fn ordering_is_a_permutation_of_the_vertices() {
        for index in 0..6 {
            let instance_data = setup_test_instance(index);
            let mut management = ManagementInstance::with_seed(21);
            let mut engine = MinFillEngine::new();
            let ordering = engine
                .compute_ordering(&mut management, &instance_data.graph, None)
                .expect("not cancelled");
            let expected: Vec<usize> = instance_data.graph.vertices().collect();
            assert!(is_permutation_of(&ordering, &expected));
        }
    }

    #[test]
    fn empty_graph_yields_empty_ordering() {
        let graph = Hypergraph::new(0);
        let mut management = ManagementInstance::with_seed(0);
        let mut engine = MinFillEngine::new();
        let ordering = engine
            .compute_ordering(&mut management, &graph, None)
            .expect("not cancelled");
        assert!(ordering.is_empty());
    }

    #[test]
    fn isolated_vertices_are_eliminated_first() {
        // Vertices 3 and 4 have no edges and fill 0, so they lead the
        // ordering together with the simplicial path endpoints.
        let graph = graph_from_edges(5, &[(0, 1), (1, 2)]);
        let mut management = ManagementInstance::with_seed(3);
        let mut engine = MinFillEngine::new();
        let ordering = engine
            .compute_ordering(&mut management, &graph, None)
            .expect("not cancelled");
        let last = *ordering.last().unwrap();
        assert!(ordering.iter().position(|&v| v == 3).unwrap() < ordering.len() - 1);
        assert!(ordering.iter().position(|&v| v == 4).unwrap() < ordering.len() - 1);
        // Vertex 1 has the only non-trivial neighborhood and goes last.
        assert_eq!(last, 1);
    }

    #[test]
    fn cancellation_before_the_first_step_returns_none() {
        let instance_data = setup_test_instance(0);
        let mut management = ManagementInstance::with_seed(5);
        management.terminate();
        let mut engine = MinFillEngine::new();
        assert!(engine
            .compute_ordering(&mut management, &instance_data.graph, None)
            .is_none());
    }

    #[test]
    fn fill_table_stays_consistent_on_fixed_graphs() {
        for index in 0..6 {
            let instance_data = setup_test_instance(index);
            let mut management = ManagementInstance::with_seed(11);
            let mut engine = MinFillEngine::new();
            engine.prepare(&instance_data.graph, None);
            assert!(engine.fill_table_matches_ground_truth());
            while engine.remaining > 0 {
                engine.eliminate_next(management.rng_mut());
                assert!(engine.fill_table_matches_ground_truth());
                assert!(engine.flags_are_reset());
            }
        }
    }

    #[test]
    fn fill_table_stays_consistent_on_random_partial_k_trees() {
        let mut management = ManagementInstance::with_seed(42);
        for k in [2, 3, 5] {
            for p in [0, 20, 40] {
                let graph = generate_partial_k_tree(k, 30, p, management.rng_mut())
                    .expect("k is smaller than n");
                let mut engine = MinFillEngine::new();
                engine.prepare(&graph, None);
                while engine.remaining > 0 {
                    engine.eliminate_next(management.rng_mut());
                    assert!(
                        engine.fill_table_matches_ground_truth(),
                        "fill table diverged on a partial {}-tree",
                        k
                    );
                    assert!(engine.flags_are_reset());
                }
            }
        }
    }

    #[test]
    fn k_trees_are_eliminated_without_fill_edges() {
        // k-trees are chordal, so a zero-fill vertex exists in every step and
        // the engine never leaves the fast path.
        let mut management = ManagementInstance::with_seed(99);
        let graph = generate_k_tree(4, 25, management.rng_mut()).expect("k is smaller than n");
        let mut engine = MinFillEngine::new();
        engine.prepare(&graph, None);
        while engine.remaining > 0 {
            if engine.pool.is_empty() {
                engine.rebuild_pool();
            }
            assert_eq!(engine.min_fill, 0);
            engine.eliminate_next(management.rng_mut());
        }
    }

    #[test]
    fn preprocessed_graphs_restrict_the_ordering_to_live_vertices() {
        // The 3x3 rook graph survives preprocessing completely, a pendant
        // vertex attached to it does not.
        let mut edges = Vec::new();
        for row in 0..3 {
            for a in 0..3 {
                for b in (a + 1)..3 {
                    edges.push((row * 3 + a, row * 3 + b));
                    edges.push((a * 3 + row, b * 3 + row));
                }
            }
        }
        edges.push((0, 9));
        let graph = graph_from_edges(10, &edges);
        let preprocessed = crate::preprocess_graph::preprocess_graph(&graph);
        assert_eq!(preprocessed.live_vertices().len(), 9);

        let mut management = ManagementInstance::with_seed(1);
        let mut engine = MinFillEngine::new();
        let ordering = engine
            .compute_ordering(&mut management, &graph, Some(&preprocessed))
            .expect("not cancelled");
        assert!(is_permutation_of(&ordering, preprocessed.live_vertices()));
    }
}
