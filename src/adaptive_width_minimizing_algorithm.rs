use log::info;
use rand::Rng;

use crate::bucket_elimination::{construct_tree_decomposition, DecompositionOptions};
use crate::elimination_ordering::OrderingAlgorithm;
use crate::fitness::{FitnessEvaluation, FitnessFunction};
use crate::hypergraph::Hypergraph;
use crate::management_instance::ManagementInstance;
use crate::preprocess_graph::preprocess_graph;
use crate::tree_decomposition::TreeDecomposition;
use crate::width_minimizing_algorithm::{ProgressCallback, WidthMinimizingAlgorithm};

/// Width minimization over several base ordering algorithms: a number of
/// decision rounds races the algorithms round-robin on the input, then the
/// algorithm with the best observed fitness is exploited for the remaining
/// iterations, seeded with the best candidate of the decision phase.
///
/// Fitness ties during selection go to the algorithm with the lower index, and
/// with zero decision rounds the algorithm is picked uniformly at random, so
/// runs stay reproducible under a fixed seed. Decision rounds are clamped to
/// `iterations - 1` so at least one exploitation iteration remains; the
/// non-improvement counter only starts with the exploitation phase.
#[derive(Clone, Debug)]
pub struct AdaptiveWidthMinimizingAlgorithm {
    pub decision_rounds: usize,
    /// Total number of candidate builds across both phases; 0 keeps the
    /// exploitation phase iterating until cancelled.
    pub iterations: usize,
    pub non_improvement_limit: Option<usize>,
    pub options: DecompositionOptions,
}

impl Default for AdaptiveWidthMinimizingAlgorithm {
    fn default() -> Self {
        AdaptiveWidthMinimizingAlgorithm {
            decision_rounds: 0,
            iterations: 1,
            non_improvement_limit: None,
            options: DecompositionOptions::default(),
        }
    }
}

impl AdaptiveWidthMinimizingAlgorithm {
    /// Runs the decision and exploitation phases over the given base
    /// algorithms. At least one algorithm is required.
    pub fn compute_decomposition(
        &self,
        instance: &mut ManagementInstance,
        graph: &Hypergraph,
        algorithms: &mut [OrderingAlgorithm],
        fitness: &dyn FitnessFunction,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Option<TreeDecomposition> {
        assert!(
            !algorithms.is_empty(),
            "the adaptive driver needs at least one base algorithm"
        );
        let preprocessed = preprocess_graph(graph);
        let decision_rounds = if self.iterations == 0 {
            self.decision_rounds
        } else {
            self.decision_rounds.min(self.iterations - 1)
        };

        let mut best: Option<(TreeDecomposition, FitnessEvaluation)> = None;
        let mut best_per_algorithm: Vec<Option<FitnessEvaluation>> =
            vec![None; algorithms.len()];
        for round in 0..decision_rounds {
            if instance.is_terminated() {
                break;
            }
            let index = round % algorithms.len();
            let Some(ordering) =
                algorithms[index].compute_ordering(instance, graph, Some(&preprocessed))
            else {
                break;
            };
            let candidate =
                construct_tree_decomposition(graph, Some(&preprocessed), &ordering, &self.options);
            let evaluation = fitness.evaluate(graph, &candidate);

            let record = &mut best_per_algorithm[index];
            if record.as_ref().map_or(true, |seen| evaluation > *seen) {
                *record = Some(evaluation.clone());
            }
            if best
                .as_ref()
                .map_or(true, |(_, best_evaluation)| evaluation > *best_evaluation)
            {
                if let Some(callback) = progress.as_mut() {
                    callback(graph, &candidate, &evaluation);
                }
                best = Some((candidate, evaluation));
            }
        }

        let selected = self.select_algorithm(instance, &best_per_algorithm);
        info!(
            "adaptive driver selected the {} ordering",
            algorithms[selected].name()
        );

        let remaining = if self.iterations == 0 {
            0
        } else {
            self.iterations - decision_rounds
        };
        let exploitation = WidthMinimizingAlgorithm {
            iterations: remaining,
            non_improvement_limit: self.non_improvement_limit,
            options: self.options.clone(),
        };
        exploitation.minimize(
            instance,
            graph,
            &preprocessed,
            &mut algorithms[selected],
            fitness,
            best,
            progress,
        )
    }

    /// The algorithm with the best observed fitness, ties broken in favor of
    /// the lower index. Without any scored round the seeded PRNG decides.
    fn select_algorithm(
        &self,
        instance: &mut ManagementInstance,
        best_per_algorithm: &[Option<FitnessEvaluation>],
    ) -> usize {
        let mut selected: Option<(usize, &FitnessEvaluation)> = None;
        for (index, record) in best_per_algorithm.iter().enumerate() {
            let Some(evaluation) = record else {
                continue;
            };
            if selected.map_or(true, |(_, best)| evaluation > best) {
                selected = Some((index, evaluation));
            }
        }
        match selected {
            Some((index, _)) => index,
            None => instance.rng_mut().gen_range(0..best_per_algorithm.len()),
        }
    }
}
