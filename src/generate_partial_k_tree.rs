use rand::seq::SliceRandom;
use rand::Rng;

use crate::hypergraph::Hypergraph;

/// Generates a [k-tree](https://en.wikipedia.org/wiki/K-tree) with n vertices.
/// Starts from a complete graph on k vertices and repeatedly attaches a fresh
/// vertex to a randomly chosen k-clique. The resulting graph has treewidth
/// exactly k whenever n > k.
///
/// Returns None if k > n
pub fn generate_k_tree(k: usize, n: usize, rng: &mut impl Rng) -> Option<Hypergraph> {
    if k > n {
        return None;
    }
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for u in 0..k {
        for w in (u + 1)..k {
            edges.push((u, w));
        }
    }
    let mut cliques: Vec<Vec<usize>> = vec![(0..k).collect()];

    // Attach the missing n - k vertices
    for fresh in k..n {
        let chosen = cliques
            .choose(rng)
            .expect("there is at least the initial clique")
            .clone();
        for &member in &chosen {
            edges.push((member, fresh));
            let mut successor = chosen.clone();
            successor.retain(|&other| other != member);
            successor.push(fresh);
            cliques.push(successor);
        }
    }

    let mut graph = Hypergraph::new(n);
    for (u, w) in edges {
        graph.add_hyperedge(&[u, w]);
    }
    Some(graph)
}

/// Generates a k-tree and then randomly removes p percent of the edges to get
/// a [partial k-tree](https://en.wikipedia.org/wiki/Partial_k-tree), a graph
/// of treewidth at most k. If p >= 100 all edges are removed. The Rng is
/// passed in to increase performance when calling the function multiple times
/// in a row.
///
/// The number of edges in a k-tree is k * (k - 1) / 2 + k * (n - k), so the
/// number of removed edges is that value times p / 100, rounded down.
///
/// Returns None if k > n
pub fn generate_partial_k_tree(
    k: usize,
    n: usize,
    p: usize,
    rng: &mut impl Rng,
) -> Option<Hypergraph> {
    let k_tree = generate_k_tree(k, n, rng)?;
    let edge_count = k_tree.hyperedge_count();
    debug_assert_eq!(edge_count, k * (k.saturating_sub(1)) / 2 + k * (n - k));

    let removed_count = ((edge_count * p) / 100).min(edge_count);
    let mut removed = vec![false; edge_count];
    let mut edge_ids: Vec<usize> = (0..edge_count).collect();
    edge_ids.shuffle(rng);
    for &edge_id in edge_ids.iter().take(removed_count) {
        removed[edge_id] = true;
    }

    let mut graph = Hypergraph::new(n);
    for (edge_id, members) in k_tree.hyperedges().iter().enumerate() {
        if !removed[edge_id] {
            graph.add_hyperedge(members);
        }
    }
    Some(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn k_trees_have_the_expected_edge_count() {
        let mut rng = StdRng::seed_from_u64(17);
        for (k, n) in [(1, 10), (3, 12), (5, 6)] {
            let graph = generate_k_tree(k, n, &mut rng).expect("k is at most n");
            assert_eq!(graph.vertex_count(), n);
            assert_eq!(graph.hyperedge_count(), k * (k - 1) / 2 + k * (n - k));
        }
        assert!(generate_k_tree(7, 3, &mut rng).is_none());
    }

    #[test]
    fn partial_k_trees_lose_the_requested_share_of_edges() {
        let mut rng = StdRng::seed_from_u64(18);
        let full_count = 3 * 2 / 2 + 3 * (20 - 3);
        let graph = generate_partial_k_tree(3, 20, 25, &mut rng).expect("k is at most n");
        assert_eq!(graph.vertex_count(), 20);
        assert_eq!(graph.hyperedge_count(), full_count - full_count * 25 / 100);

        let stripped = generate_partial_k_tree(3, 20, 100, &mut rng).expect("k is at most n");
        assert_eq!(stripped.hyperedge_count(), 0);
    }
}
