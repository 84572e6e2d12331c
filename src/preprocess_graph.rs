use std::collections::VecDeque;

use itertools::Itertools;
use log::{debug, warn};

use crate::hypergraph::Hypergraph;
use crate::sorted_sets::{contains_sorted, insert_sorted, remove_sorted};
use crate::tree_decomposition::{Bag, TreeDecomposition};

/// One preprocessor removal: the vertex and its neighbors at removal time.
/// Replaying attaches the bag `{vertex} ∪ neighbors` as a leaf under a bag
/// containing all the neighbors.
#[derive(Clone, Debug)]
struct ReplayEntry {
    vertex: usize,
    neighbors: Vec<usize>,
}

/// The result of [`preprocess_graph`]: a reduced working graph plus the stack
/// of removals needed to later re-attach the removed vertices.
#[derive(Clone, Debug)]
pub struct PreprocessedGraph {
    original_vertex_count: usize,
    live: Vec<usize>,
    adjacency: Vec<Vec<usize>>,
    replay_stack: Vec<ReplayEntry>,
}

impl PreprocessedGraph {
    /// The sorted ids of the vertices surviving preprocessing.
    pub fn live_vertices(&self) -> &[usize] {
        &self.live
    }

    /// Current neighbors of a live vertex in the reduced graph, sorted. The
    /// reduced graph may contain contraction edges absent from the input.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.adjacency[vertex]
    }

    pub fn original_vertex_count(&self) -> usize {
        self.original_vertex_count
    }

    pub fn eliminated_count(&self) -> usize {
        self.replay_stack.len()
    }

    /// Re-attaches all preprocessor-removed vertices to the decomposition,
    /// in reverse removal order so every anchor already exists. When the
    /// reduced graph was empty the first replayed entry becomes the root bag.
    pub fn replay(&self, decomposition: &mut TreeDecomposition) {
        for entry in self.replay_stack.iter().rev() {
            let mut vertices = entry.neighbors.clone();
            insert_sorted(&mut vertices, entry.vertex);
            if decomposition.bag_count() == 0 {
                decomposition.add_bag(Bag::new(vertices));
                continue;
            }
            let anchor = match decomposition.find_bag_containing(&entry.neighbors) {
                Some(anchor) => anchor,
                None => {
                    // Cannot happen for stacks produced by preprocess_graph.
                    warn!(
                        "no bag contains the neighbors of replayed vertex {}, attaching at the first bag",
                        entry.vertex
                    );
                    debug_assert!(false, "missing replay anchor");
                    decomposition.tree().node_indices().next().expect("decomposition has bags")
                }
            };
            decomposition.add_leaf(anchor, Bag::new(vertices));
        }
    }
}

/// Checks whether the given vertices are pairwise adjacent.
fn is_clique(adjacency: &[Vec<usize>], vertices: &[usize]) -> bool {
    vertices
        .iter()
        .tuple_combinations()
        .all(|(&u, &w)| contains_sorted(&adjacency[u], w))
}

struct PreprocessingState {
    adjacency: Vec<Vec<usize>>,
    alive: Vec<bool>,
    queued: Vec<bool>,
    queue: VecDeque<usize>,
    replay_stack: Vec<ReplayEntry>,
}

impl PreprocessingState {
    fn eliminate(&mut self, vertex: usize) {
        let neighbors = std::mem::take(&mut self.adjacency[vertex]);
        for &neighbor in &neighbors {
            remove_sorted(&mut self.adjacency[neighbor], vertex);
            self.enqueue(neighbor);
        }
        self.alive[vertex] = false;
        self.replay_stack.push(ReplayEntry { vertex, neighbors });
    }

    fn enqueue(&mut self, vertex: usize) {
        if !self.queued[vertex] {
            self.queued[vertex] = true;
            self.queue.push_back(vertex);
        }
    }
}

/// Shrinks the graph by repeatedly removing vertices that cannot influence
/// the achievable width: simplicial vertices (their neighborhood is a clique,
/// which covers isolated, pendant and twin-of-a-clique vertices), and, once
/// no simplicial vertex remains anywhere, degree-2 vertices, which are
/// contracted into an edge between their two neighbors.
///
/// A degree-2 vertex with non-adjacent neighbors only survives the simplicial
/// phase when its component contains a cycle, so the contraction bag of size
/// three never raises the achievable width.
///
/// Every removal is recorded on the replay stack; the reduced graph keeps the
/// original vertex ids. In the worst case nothing is removable and the
/// reduced graph equals the input.
pub fn preprocess_graph(graph: &Hypergraph) -> PreprocessedGraph {
    let vertex_count = graph.vertex_count();
    let mut state = PreprocessingState {
        adjacency: graph
            .vertices()
            .map(|vertex| graph.neighbors(vertex).to_vec())
            .collect(),
        alive: vec![true; vertex_count],
        queued: vec![true; vertex_count],
        queue: graph.vertices().collect(),
        replay_stack: Vec::new(),
    };

    loop {
        while let Some(vertex) = state.queue.pop_front() {
            state.queued[vertex] = false;
            if !state.alive[vertex] {
                continue;
            }
            if is_clique(&state.adjacency, &state.adjacency[vertex]) {
                state.eliminate(vertex);
            }
        }
        let degree_two = graph
            .vertices()
            .find(|&vertex| state.alive[vertex] && state.adjacency[vertex].len() == 2);
        let Some(vertex) = degree_two else {
            break;
        };
        let (a, b) = (state.adjacency[vertex][0], state.adjacency[vertex][1]);
        insert_sorted(&mut state.adjacency[a], b);
        insert_sorted(&mut state.adjacency[b], a);
        state.eliminate(vertex);
        // The contraction edge may have made vertices around it simplicial.
        for endpoint in [a, b] {
            state.enqueue(endpoint);
            for index in 0..state.adjacency[endpoint].len() {
                let neighbor = state.adjacency[endpoint][index];
                state.enqueue(neighbor);
            }
        }
    }

    let PreprocessingState {
        adjacency,
        alive,
        replay_stack,
        ..
    } = state;
    let live: Vec<usize> = graph.vertices().filter(|&vertex| alive[vertex]).collect();
    debug!(
        "preprocessing removed {} of {} vertices",
        replay_stack.len(),
        vertex_count
    );
    PreprocessedGraph {
        original_vertex_count: vertex_count,
        live,
        adjacency,
        replay_stack,
    }
}
