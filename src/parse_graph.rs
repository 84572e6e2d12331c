use std::io::BufRead;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::hypergraph::Hypergraph;

/// Errors of the input parsers. Malformed text never panics; the position and
/// the reason are reported instead.
#[derive(Debug, Error)]
pub enum ParseGraphError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

fn malformed(line: usize, message: impl Into<String>) -> ParseGraphError {
    ParseGraphError::Malformed {
        line,
        message: message.into(),
    }
}

/// Parses the PACE-style DIMACS graph format: comment lines starting with
/// `c`, one header `p tw <vertices> <edges>` and one `<u> <v>` line per edge
/// with 1-based vertex ids.
pub fn parse_gr<R: BufRead>(reader: R) -> Result<Hypergraph, ParseGraphError> {
    let mut graph: Option<Hypergraph> = None;
    let mut expected_edges = 0;
    let mut seen_edges = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first() {
            None | Some(&"c") => continue,
            Some(&"p") => {
                if graph.is_some() {
                    return Err(malformed(line_number, "duplicate problem line"));
                }
                if tokens.len() != 4 || tokens[1] != "tw" {
                    return Err(malformed(line_number, "expected problem line 'p tw <n> <m>'"));
                }
                let vertex_count = parse_count(&tokens, 2, line_number)?;
                expected_edges = parse_count(&tokens, 3, line_number)?;
                graph = Some(Hypergraph::new(vertex_count));
            }
            Some(_) => {
                let graph = graph
                    .as_mut()
                    .ok_or_else(|| malformed(line_number, "edge before the problem line"))?;
                if tokens.len() != 2 {
                    return Err(malformed(line_number, "expected an edge line '<u> <v>'"));
                }
                let u = parse_vertex(tokens[0], graph.vertex_count(), line_number)?;
                let v = parse_vertex(tokens[1], graph.vertex_count(), line_number)?;
                if u == v {
                    return Err(malformed(line_number, "self-loops are not allowed"));
                }
                graph.add_hyperedge(&[u, v]);
                seen_edges += 1;
            }
        }
    }

    let graph = graph.ok_or_else(|| malformed(0, "missing problem line"))?;
    if seen_edges != expected_edges {
        return Err(malformed(
            0,
            format!("expected {} edges but found {}", expected_edges, seen_edges),
        ));
    }
    Ok(graph)
}

/// Parses the hypergraph variant of the `gr` format: comment lines starting
/// with `c`, one header `p htd <vertices> <hyperedges>` and one line per
/// hyperedge listing its 1-based members, arbitrary arity at least one.
pub fn parse_hgr<R: BufRead>(reader: R) -> Result<Hypergraph, ParseGraphError> {
    let mut graph: Option<Hypergraph> = None;
    let mut expected_edges = 0;
    let mut seen_edges = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first() {
            None | Some(&"c") => continue,
            Some(&"p") => {
                if graph.is_some() {
                    return Err(malformed(line_number, "duplicate problem line"));
                }
                if tokens.len() != 4 || tokens[1] != "htd" {
                    return Err(malformed(
                        line_number,
                        "expected problem line 'p htd <n> <m>'",
                    ));
                }
                let vertex_count = parse_count(&tokens, 2, line_number)?;
                expected_edges = parse_count(&tokens, 3, line_number)?;
                graph = Some(Hypergraph::new(vertex_count));
            }
            Some(_) => {
                let graph = graph
                    .as_mut()
                    .ok_or_else(|| malformed(line_number, "hyperedge before the problem line"))?;
                let mut members = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    members.push(parse_vertex(token, graph.vertex_count(), line_number)?);
                }
                let distinct: std::collections::BTreeSet<usize> = members.iter().copied().collect();
                if distinct.len() != members.len() {
                    return Err(malformed(line_number, "duplicate members in a hyperedge"));
                }
                graph.add_hyperedge(&members);
                seen_edges += 1;
            }
        }
    }

    let graph = graph.ok_or_else(|| malformed(0, "missing problem line"))?;
    if seen_edges != expected_edges {
        return Err(malformed(
            0,
            format!(
                "expected {} hyperedges but found {}",
                expected_edges, seen_edges
            ),
        ));
    }
    Ok(graph)
}

/// Parses ASP-style ground facts with named vertices: `vertex(<name>).`
/// declares a vertex, `edge(<a>,<b>).` and `hyperedge(<a>,...).` declare
/// hyperedges. `%` starts a comment, facts with other predicate names are
/// skipped. Returns the graph together with the vertex names; ids are
/// assigned in order of first occurrence.
pub fn parse_lp<R: BufRead>(reader: R) -> Result<(Hypergraph, Vec<String>), ParseGraphError> {
    let mut graph = Hypergraph::new(0);
    let mut names: Vec<String> = Vec::new();
    let mut ids: FxHashMap<String, usize> = FxHashMap::default();

    let mut intern = |name: &str, graph: &mut Hypergraph| -> usize {
        match ids.get(name) {
            Some(&id) => id,
            None => {
                let id = graph.add_vertex();
                ids.insert(name.to_string(), id);
                names.push(name.to_string());
                id
            }
        }
    };

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let mut line = line?;
        if let Some(comment) = line.find('%') {
            line.truncate(comment);
        }
        for fact in line.split('.') {
            let fact = fact.trim();
            if fact.is_empty() {
                continue;
            }
            let Some(open) = fact.find('(') else {
                return Err(malformed(line_number, format!("expected a fact, found '{}'", fact)));
            };
            let Some(close) = fact.rfind(')') else {
                return Err(malformed(line_number, "unterminated argument list"));
            };
            if close < open || !fact[close + 1..].trim().is_empty() {
                return Err(malformed(line_number, "malformed fact"));
            }
            let predicate = fact[..open].trim();
            let arguments: Vec<&str> = fact[open + 1..close]
                .split(',')
                .map(|argument| argument.trim())
                .collect();
            if arguments.iter().any(|argument| argument.is_empty()) {
                return Err(malformed(line_number, "empty argument in a fact"));
            }
            match predicate {
                "vertex" => {
                    if arguments.len() != 1 {
                        return Err(malformed(line_number, "vertex facts take one argument"));
                    }
                    intern(arguments[0], &mut graph);
                }
                "edge" | "hyperedge" => {
                    if predicate == "edge" && arguments.len() != 2 {
                        return Err(malformed(line_number, "edge facts take two arguments"));
                    }
                    let members: Vec<usize> = arguments
                        .iter()
                        .map(|argument| intern(argument, &mut graph))
                        .collect();
                    graph.add_hyperedge(&members);
                }
                _ => continue,
            }
        }
    }

    Ok((graph, names))
}

fn parse_count(tokens: &[&str], index: usize, line: usize) -> Result<usize, ParseGraphError> {
    tokens[index]
        .parse()
        .map_err(|_| malformed(line, format!("'{}' is not a count", tokens[index])))
}

fn parse_vertex(token: &str, vertex_count: usize, line: usize) -> Result<usize, ParseGraphError> {
    let id: usize = token
        .parse()
        .map_err(|_| malformed(line, format!("'{}' is not a vertex id", token)))?;
    if id == 0 || id > vertex_count {
        return Err(malformed(
            line,
            format!("vertex id {} out of range 1..={}", id, vertex_count),
        ));
    }
    Ok(id - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gr_files_parse_into_graphs() {
        let input = "c a path on five vertices\np tw 5 4\n1 2\n2 3\n3 4\n4 5\n";
        let graph = parse_gr(input.as_bytes()).expect("well-formed input");
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.hyperedge_count(), 4);
        assert_eq!(graph.neighbors(1), &[0, 2]);
    }

    #[test]
    fn gr_rejects_malformed_input() {
        assert!(parse_gr("1 2\n".as_bytes()).is_err());
        assert!(parse_gr("p tw 2 1\n1 1\n".as_bytes()).is_err());
        assert!(parse_gr("p tw 2 1\n1 3\n".as_bytes()).is_err());
        assert!(parse_gr("p tw 2 2\n1 2\n".as_bytes()).is_err());
        assert!(parse_gr("p tw x 1\n1 2\n".as_bytes()).is_err());
    }

    #[test]
    fn hgr_files_allow_arbitrary_arity() {
        let input = "p htd 4 2\n1 2 3\n3 4\n";
        let graph = parse_hgr(input.as_bytes()).expect("well-formed input");
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.hyperedge(0), &[0, 1, 2]);
        assert_eq!(graph.hyperedge(1), &[2, 3]);
    }

    #[test]
    fn hgr_rejects_duplicate_members() {
        assert!(parse_hgr("p htd 3 1\n1 2 1\n".as_bytes()).is_err());
    }

    #[test]
    fn lp_files_intern_vertex_names() {
        let input = "vertex(a). vertex(isolated).\nedge(a,b). % trailing comment\nhyperedge(b,c,d).\n";
        let (graph, names) = parse_lp(input.as_bytes()).expect("well-formed input");
        assert_eq!(names, vec!["a", "isolated", "b", "c", "d"]);
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.hyperedge_count(), 2);
        assert_eq!(graph.hyperedge(1), &[2, 3, 4]);
        assert!(graph.neighbors(1).is_empty());
    }

    #[test]
    fn lp_skips_unknown_predicates_and_rejects_garbage() {
        let (graph, _) = parse_lp("weight(a,3). vertex(a).\n".as_bytes()).expect("well-formed");
        assert_eq!(graph.vertex_count(), 1);
        assert!(parse_lp("vertex a\n".as_bytes()).is_err());
        assert!(parse_lp("edge(a,b,c).\n".as_bytes()).is_err());
    }
}
