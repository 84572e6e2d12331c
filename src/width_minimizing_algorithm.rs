use log::info;

use crate::bucket_elimination::{construct_tree_decomposition, DecompositionOptions};
use crate::elimination_ordering::OrderingAlgorithm;
use crate::fitness::{FitnessEvaluation, FitnessFunction};
use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::{preprocess_graph, PreprocessedGraph};
use crate::tree_decomposition::TreeDecomposition;

/// Callback invoked whenever the minimizer finds a strictly better candidate.
pub type ProgressCallback<'a> =
    &'a mut dyn FnMut(&Hypergraph, &TreeDecomposition, &FitnessEvaluation);

/// Iterative width minimization: builds one candidate decomposition per
/// iteration with a fresh elimination ordering and keeps the fittest one.
///
/// The graph is preprocessed once per call; all iterations share the reduced
/// graph. Cancellation is polled between candidate builds, so interrupting a
/// run returns the best decomposition found so far (`None` only when no
/// iteration completed). A strictly better candidate resets the
/// non-improvement counter and triggers the progress callback.
#[derive(Clone, Debug)]
pub struct WidthMinimizingAlgorithm {
    /// Number of candidate builds; 0 keeps iterating until cancelled.
    pub iterations: usize,
    /// Stop after this many consecutive non-improving iterations; `None`
    /// disables the cutoff.
    pub non_improvement_limit: Option<usize>,
    pub options: DecompositionOptions,
}

impl Default for WidthMinimizingAlgorithm {
    fn default() -> Self {
        WidthMinimizingAlgorithm {
            iterations: 1,
            non_improvement_limit: None,
            options: DecompositionOptions::default(),
        }
    }
}

impl WidthMinimizingAlgorithm {
    /// Runs the optimization loop with the given base ordering algorithm.
    pub fn compute_decomposition(
        &self,
        instance: &mut ManagementInstance,
        graph: &Hypergraph,
        base_algorithm: &mut OrderingAlgorithm,
        fitness: &dyn FitnessFunction,
        progress: Option<ProgressCallback<'_>>,
    ) -> Option<TreeDecomposition> {
        let preprocessed = preprocess_graph(graph);
        self.minimize(
            instance,
            graph,
            &preprocessed,
            base_algorithm,
            fitness,
            None,
            progress,
        )
    }

    /// The loop body, shared with the adaptive driver: optionally starts from
    /// an already evaluated candidate.
    pub(crate) fn minimize(
        &self,
        instance: &mut ManagementInstance,
        graph: &Hypergraph,
        preprocessed: &PreprocessedGraph,
        base_algorithm: &mut OrderingAlgorithm,
        fitness: &dyn FitnessFunction,
        initial: Option<(TreeDecomposition, FitnessEvaluation)>,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Option<TreeDecomposition> {
        let mut best = initial;
        let mut iteration = 0;
        let mut since_improvement = 0;

        while (self.iterations == 0 || iteration < self.iterations)
            && !instance.is_terminated()
            && self
                .non_improvement_limit
                .map_or(true, |limit| since_improvement <= limit)
        {
            let Some(ordering) =
                base_algorithm.compute_ordering(instance, graph, Some(preprocessed))
            else {
                break;
            };
            let candidate =
                construct_tree_decomposition(graph, Some(preprocessed), &ordering, &self.options);
            let evaluation = fitness.evaluate(graph, &candidate);

            let improved = best
                .as_ref()
                .map_or(true, |(_, best_evaluation)| evaluation > *best_evaluation);
            if improved {
                info!(
                    "iteration {} improved the decomposition to width {}",
                    iteration,
                    candidate.width()
                );
                if let Some(callback) = progress.as_mut() {
                    callback(graph, &candidate, &evaluation);
                }
                best = Some((candidate, evaluation));
                since_improvement = 0;
            } else {
                since_improvement += 1;
            }
            iteration += 1;
        }

        best.map(|(decomposition, _)| decomposition)
    }
}
