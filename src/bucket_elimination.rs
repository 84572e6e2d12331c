use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};

use crate::hypergraph::Hypergraph;
use crate::preprocess_graph::PreprocessedGraph;
use crate::sorted_sets::{insert_sorted, merge_union_excluding};
use crate::tree_decomposition::{Bag, TreeDecomposition};

/// Configuration of the decomposition build, owned by the builder.
#[derive(Clone, Debug)]
pub struct DecompositionOptions {
    /// Contract subset-redundant adjacent bags after the build.
    pub compress: bool,
    /// Store the induced hyperedge ids on every bag.
    pub compute_induced_edges: bool,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        DecompositionOptions {
            compress: true,
            compute_induced_edges: false,
        }
    }
}

/// Turns an elimination ordering into a tree decomposition via bucket
/// elimination.
///
/// Every ordered vertex starts with the bucket `{v}` plus its later working
/// graph neighbors. Processing the vertices in order, the remainder of the
/// current bucket is merged into the bucket of the parent, the earliest later
/// member; the bucket at processing time becomes the bag of `v`. Bags without
/// a parent (their component ran out) are attached to the bag of the last
/// ordered vertex so a single tree results.
///
/// When a preprocessed graph is supplied the ordering must cover exactly its
/// live vertices; the removed vertices are re-attached by replay afterwards.
/// The build order is: buckets, tree, replay, compression, induced edges.
///
/// A graph without any vertex yields a single empty bag, the documented
/// width-0 decomposition of the empty graph.
pub fn construct_tree_decomposition(
    graph: &Hypergraph,
    preprocessed: Option<&PreprocessedGraph>,
    ordering: &[usize],
    options: &DecompositionOptions,
) -> TreeDecomposition {
    let vertex_count = graph.vertex_count();
    let mut position = vec![usize::MAX; vertex_count];
    for (index, &vertex) in ordering.iter().enumerate() {
        position[vertex] = index;
    }

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for &vertex in ordering {
        let neighbors = match preprocessed {
            Some(preprocessed) => preprocessed.neighbors(vertex),
            None => graph.neighbors(vertex),
        };
        let bucket = &mut buckets[vertex];
        bucket.extend(
            neighbors
                .iter()
                .copied()
                .filter(|&neighbor| position[neighbor] > position[vertex]),
        );
        insert_sorted(bucket, vertex);
    }

    let mut parent = vec![usize::MAX; vertex_count];
    let mut scratch = Vec::new();
    for &vertex in ordering {
        let bag = std::mem::take(&mut buckets[vertex]);
        let earliest_later = bag
            .iter()
            .copied()
            .filter(|&member| member != vertex)
            .min_by_key(|&member| position[member]);
        if let Some(next) = earliest_later {
            parent[vertex] = next;
            merge_union_excluding(&buckets[next], &bag, vertex, &mut scratch);
            std::mem::swap(&mut buckets[next], &mut scratch);
        }
        buckets[vertex] = bag;
    }

    let mut tree: Graph<Bag, (), Undirected> = Graph::new_undirected();
    let mut node_of = vec![NodeIndex::end(); vertex_count];
    for &vertex in ordering {
        node_of[vertex] = tree.add_node(Bag::new(std::mem::take(&mut buckets[vertex])));
    }
    if let Some(&root_vertex) = ordering.last() {
        for &vertex in ordering {
            if parent[vertex] != usize::MAX {
                tree.add_edge(node_of[vertex], node_of[parent[vertex]], ());
            } else if vertex != root_vertex {
                tree.add_edge(node_of[vertex], node_of[root_vertex], ());
            }
        }
    } else if preprocessed.map_or(true, |preprocessed| preprocessed.eliminated_count() == 0) {
        tree.add_node(Bag::default());
    }

    let mut decomposition = TreeDecomposition::from_tree(tree);
    if let Some(preprocessed) = preprocessed {
        preprocessed.replay(&mut decomposition);
    }
    if options.compress {
        decomposition.compress();
    }
    if options.compute_induced_edges {
        decomposition.compute_induced_edges(graph);
    }
    decomposition
}
