//! Heuristic tree decompositions of undirected multi-hypergraphs.
//!
//! The centerpiece is an incremental min-fill elimination engine that keeps
//! per-vertex fill counts up to date while vertices are eliminated, combined
//! with bucket elimination to turn orderings into decompositions, an
//! iterative width minimizer and an adaptive driver racing several base
//! ordering algorithms. Computations are deterministic for a fixed seed and
//! cooperatively cancellable through a [`ManagementInstance`].

mod adaptive_width_minimizing_algorithm;
mod bucket_elimination;
mod check_tree_decomposition;
mod elimination_ordering;
mod fitness;
mod generate_partial_k_tree;
mod hypergraph;
mod management_instance;
mod max_cardinality_ordering;
mod min_degree_ordering;
mod min_fill_engine;
mod min_fill_ordering;
mod parse_graph;
mod preprocess_graph;
mod sorted_sets;
mod tree_decomposition;
mod width_minimizing_algorithm;
mod write_decomposition;

pub use adaptive_width_minimizing_algorithm::AdaptiveWidthMinimizingAlgorithm;
pub use bucket_elimination::{construct_tree_decomposition, DecompositionOptions};
pub use check_tree_decomposition::check_tree_decomposition;
pub use elimination_ordering::OrderingAlgorithm;
pub use fitness::{FitnessEvaluation, FitnessFunction, WidthFitness};
pub use generate_partial_k_tree::{generate_k_tree, generate_partial_k_tree};
pub use hypergraph::Hypergraph;
pub use management_instance::ManagementInstance;
pub use min_fill_engine::MinFillEngine;
pub use parse_graph::{parse_gr, parse_hgr, parse_lp, ParseGraphError};
pub use preprocess_graph::{preprocess_graph, PreprocessedGraph};
pub use tree_decomposition::{Bag, TreeDecomposition};
pub use width_minimizing_algorithm::{ProgressCallback, WidthMinimizingAlgorithm};
pub use write_decomposition::{write_human, write_td, write_width};

/// Shared fixtures for the test modules of this crate.
#[cfg(test)]
pub(crate) mod lib_tests {
    use super::*;

    /// A test graph together with its known treewidth.
    pub struct TestInstance {
        pub graph: Hypergraph,
        pub treewidth: usize,
    }

    pub fn graph_from_edges(vertex_count: usize, edges: &[(usize, usize)]) -> Hypergraph {
        let mut graph = Hypergraph::new(vertex_count);
        for &(u, w) in edges {
            graph.add_hyperedge(&[u, w]);
        }
        graph
    }

    /// Sets up a test instance:
    ///
    /// 0 is the complete graph on four vertices, treewidth 3.
    ///
    /// 1 is the path on five vertices, treewidth 1.
    ///
    /// 2 is the cycle on five vertices, treewidth 2.
    ///
    /// 3 is the path on five vertices plus an isolated vertex, treewidth 1.
    ///
    /// 4 is a ternary hyperedge with a pendant edge, treewidth 2.
    ///
    /// 5 (and higher) is the empty graph, reported with width 0.
    pub fn setup_test_instance(instance_number: usize) -> TestInstance {
        match instance_number {
            0 => TestInstance {
                graph: graph_from_edges(
                    4,
                    &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
                ),
                treewidth: 3,
            },
            1 => TestInstance {
                graph: graph_from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]),
                treewidth: 1,
            },
            2 => TestInstance {
                graph: graph_from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]),
                treewidth: 2,
            },
            3 => TestInstance {
                graph: graph_from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4)]),
                treewidth: 1,
            },
            4 => {
                let mut graph = Hypergraph::new(4);
                graph.add_hyperedge(&[0, 1, 2]);
                graph.add_hyperedge(&[2, 3]);
                TestInstance {
                    graph,
                    treewidth: 2,
                }
            }
            _ => TestInstance {
                graph: Hypergraph::new(0),
                treewidth: 0,
            },
        }
    }
}
