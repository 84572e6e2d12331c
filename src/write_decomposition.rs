use std::io::{self, Write};

use itertools::Itertools;
use petgraph::visit::EdgeRef;

use crate::hypergraph::Hypergraph;
use crate::tree_decomposition::TreeDecomposition;

/// Writes the PACE-style `td` format: the header
/// `s td <bags> <maxBagSize> <vertices>`, one `b <bagId> <v...>` line per bag
/// and one `<parent> <child>` line per tree edge. Bag and vertex ids are
/// 1-based. The output is byte-identical for equal decompositions.
pub fn write_td<W: Write>(
    writer: &mut W,
    graph: &Hypergraph,
    decomposition: &TreeDecomposition,
) -> io::Result<()> {
    let tree = decomposition.tree();
    let max_bag_size = tree
        .node_weights()
        .map(|bag| bag.vertices.len())
        .max()
        .unwrap_or(0);
    writeln!(
        writer,
        "s td {} {} {}",
        tree.node_count(),
        max_bag_size,
        graph.vertex_count()
    )?;
    for node in tree.node_indices() {
        let members = tree[node]
            .vertices
            .iter()
            .map(|vertex| (vertex + 1).to_string())
            .join(" ");
        if members.is_empty() {
            writeln!(writer, "b {}", node.index() + 1)?;
        } else {
            writeln!(writer, "b {} {}", node.index() + 1, members)?;
        }
    }
    for edge in tree.edge_references() {
        let a = edge.source().index() + 1;
        let b = edge.target().index() + 1;
        writeln!(writer, "{} {}", a.min(b), a.max(b))?;
    }
    Ok(())
}

/// Writes a human-readable multi-line rendering of the decomposition.
pub fn write_human<W: Write>(
    writer: &mut W,
    decomposition: &TreeDecomposition,
) -> io::Result<()> {
    let tree = decomposition.tree();
    writeln!(
        writer,
        "tree decomposition with {} bags and width {}",
        tree.node_count(),
        decomposition.width()
    )?;
    for node in tree.node_indices() {
        let bag = &tree[node];
        writeln!(
            writer,
            "bag {}: {{{}}}",
            node.index() + 1,
            bag.vertices.iter().map(|vertex| vertex + 1).join(", ")
        )?;
        if !bag.induced_edges.is_empty() {
            writeln!(
                writer,
                "  induced hyperedges: {}",
                bag.induced_edges.iter().join(", ")
            )?;
        }
    }
    for edge in tree.edge_references() {
        let a = edge.source().index() + 1;
        let b = edge.target().index() + 1;
        writeln!(writer, "edge {} -- {}", a.min(b), a.max(b))?;
    }
    Ok(())
}

/// Writes only the width of the decomposition on a single line.
pub fn write_width<W: Write>(
    writer: &mut W,
    decomposition: &TreeDecomposition,
) -> io::Result<()> {
    writeln!(writer, "{}", decomposition.width())
}
