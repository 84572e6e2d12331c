use crate::hypergraph::Hypergraph;
use crate::tree_decomposition::TreeDecomposition;

/// The quality of a candidate decomposition as an ordered list of criteria.
/// Evaluations compare lexicographically and larger is better, so the most
/// important criterion comes first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FitnessEvaluation {
    criteria: Vec<i64>,
}

impl FitnessEvaluation {
    pub fn new(criteria: Vec<i64>) -> Self {
        FitnessEvaluation { criteria }
    }

    pub fn criteria(&self) -> &[i64] {
        &self.criteria
    }
}

/// Scores candidate decompositions for the iterative minimizer. Additional
/// criteria (average bag size, bag count, ...) slot in as further
/// implementations without touching the optimization loops.
pub trait FitnessFunction {
    fn evaluate(&self, graph: &Hypergraph, decomposition: &TreeDecomposition) -> FitnessEvaluation;
}

/// The width-minimizing fitness: a single criterion holding the negated
/// width, so lower widths evaluate as strictly better.
#[derive(Clone, Copy, Debug, Default)]
pub struct WidthFitness;

impl FitnessFunction for WidthFitness {
    fn evaluate(&self, _graph: &Hypergraph, decomposition: &TreeDecomposition) -> FitnessEvaluation {
        FitnessEvaluation::new(vec![-(decomposition.width() as i64)])
    }
}
