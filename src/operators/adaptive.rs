use rand::{Rng, RngCore};

use crate::core::{MobgaError, ObjectivePair};
use crate::operators::{ParetoDominance, PreferredSolution};

/// The small constant preventing a zero division when an operator collected no reward over the
/// learning period. This is delta in the paper.
const DELTA: f64 = 1e-4;

/// The adaptive operator selection (AOS) mechanism. Instead of recombining with a single fixed
/// crossover operator, the algorithm keeps a probability distribution over the operator pool and
/// updates it every `learning_period` generations from the observed offspring quality: an
/// operator whose children dominate their parents is rewarded and selected more often, one whose
/// children are dominated is penalised.
///
/// Rewards and penalties accumulate into per-generation counters; at the end of each generation
/// the counters are archived into the learning-period history. When the history window is full,
/// the selection probabilities are recomputed from the per-operator success rates and the window
/// restarts.
pub struct AdaptiveOperatorSelector {
    /// The number of generations between two probability updates. This is LP in the paper.
    learning_period: usize,
    /// The current selection probability of each operator. Non-negative, sums to 1.
    probabilities: Vec<f64>,
    /// The reward counts per generation (row) and operator (column) in the current window.
    reward_history: Vec<Vec<f64>>,
    /// The penalty counts per generation (row) and operator (column) in the current window.
    penalty_history: Vec<Vec<f64>>,
    /// The reward counts of the running generation.
    current_rewards: Vec<f64>,
    /// The penalty counts of the running generation.
    current_penalties: Vec<f64>,
    /// The next free row in the history matrices.
    window_position: usize,
}

impl AdaptiveOperatorSelector {
    /// Create the selector with a uniform probability distribution and an empty history.
    ///
    /// # Arguments
    ///
    /// * `number_of_operators`: The size of the operator pool. This is Q in the paper.
    /// * `learning_period`: The number of generations between probability updates. This is LP in
    ///    the paper (5 by convention).
    ///
    /// returns: `Result<AdaptiveOperatorSelector, MobgaError>`
    pub fn new(number_of_operators: usize, learning_period: usize) -> Result<Self, MobgaError> {
        if number_of_operators == 0 {
            return Err(MobgaError::OperatorSelector(
                "The operator pool must contain at least one operator".to_string(),
            ));
        }
        if learning_period == 0 {
            return Err(MobgaError::OperatorSelector(
                "The learning period must be at least 1 generation".to_string(),
            ));
        }
        Ok(Self {
            learning_period,
            probabilities: vec![1.0 / number_of_operators as f64; number_of_operators],
            reward_history: vec![vec![0.0; number_of_operators]; learning_period],
            penalty_history: vec![vec![0.0; number_of_operators]; learning_period],
            current_rewards: vec![0.0; number_of_operators],
            current_penalties: vec![0.0; number_of_operators],
            window_position: 0,
        })
    }

    /// Get the current selection probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Sample an operator index with roulette-wheel selection over the current probabilities.
    ///
    /// # Arguments
    ///
    /// * `rng`: The random number generator.
    ///
    /// returns: `usize`. The index of the operator to apply.
    pub fn select_operator(&self, rng: &mut dyn RngCore) -> usize {
        // renormalise via the total in case of floating-point drift
        let total: f64 = self.probabilities.iter().sum();
        if total <= 0.0 {
            return rng.gen_range(0..self.probabilities.len());
        }

        let mut spin = rng.gen_range(0.0..total);
        for (index, probability) in self.probabilities.iter().enumerate() {
            if spin < *probability {
                return index;
            }
            spin -= probability;
        }
        self.probabilities.len() - 1
    }

    /// Record a reward or penalty for each child produced by one crossover event (Algorithm 2 in
    /// the paper). When one parent dominates the other, a child is rewarded unless the dominating
    /// parent dominates it. When the parents are mutually non-dominated, a child is rewarded only
    /// if neither parent dominates it.
    ///
    /// # Arguments
    ///
    /// * `parent1`: The objective values of the first parent.
    /// * `parent2`: The objective values of the second parent.
    /// * `children`: The objective values of the children produced from the two parents.
    /// * `operator_index`: The operator that produced the children.
    ///
    /// returns: `Result<(), MobgaError>`
    pub fn assign_credit(
        &mut self,
        parent1: &ObjectivePair,
        parent2: &ObjectivePair,
        children: &[ObjectivePair],
        operator_index: usize,
    ) -> Result<(), MobgaError> {
        if operator_index >= self.probabilities.len() {
            return Err(MobgaError::OperatorSelector(format!(
                "The operator index {operator_index} is outside the pool of {} operators",
                self.probabilities.len()
            )));
        }

        match ParetoDominance::compare(parent1, parent2) {
            PreferredSolution::First | PreferredSolution::Second => {
                let better = if ParetoDominance::dominates(parent1, parent2) {
                    parent1
                } else {
                    parent2
                };
                for child in children {
                    if ParetoDominance::dominates(better, child) {
                        self.current_penalties[operator_index] += 1.0;
                    } else {
                        self.current_rewards[operator_index] += 1.0;
                    }
                }
            }
            PreferredSolution::MutuallyPreferred => {
                for child in children {
                    if ParetoDominance::dominates(parent1, child)
                        || ParetoDominance::dominates(parent2, child)
                    {
                        self.current_penalties[operator_index] += 1.0;
                    } else {
                        self.current_rewards[operator_index] += 1.0;
                    }
                }
            }
        }
        Ok(())
    }

    /// Archive the running generation counters into the history window and reset them. When the
    /// window reaches the learning period, the probabilities are recomputed and the window
    /// restarts.
    pub fn end_generation(&mut self) {
        self.reward_history[self.window_position] = std::mem::replace(
            &mut self.current_rewards,
            vec![0.0; self.probabilities.len()],
        );
        self.penalty_history[self.window_position] = std::mem::replace(
            &mut self.current_penalties,
            vec![0.0; self.probabilities.len()],
        );
        self.window_position += 1;

        if self.window_position == self.learning_period {
            self.update_probabilities();
            self.window_position = 0;
        }
    }

    /// Recompute the selection probabilities from the learning-period history (equations 6 to 10
    /// in the paper). For each operator: `S1` is the reward sum, `S2` the penalty sum, `S3` a
    /// small constant when `S1` is zero and `S1` otherwise, and the success rate is
    /// `S1 / (S3 + S2)`. The probabilities are the normalised success rates; when every success
    /// rate is zero, the distribution falls back to uniform. The history is cleared afterwards.
    fn update_probabilities(&mut self) {
        let number_of_operators = self.probabilities.len();
        let mut success_rates = vec![0.0; number_of_operators];
        for operator in 0..number_of_operators {
            let rewards: f64 = self.reward_history.iter().map(|row| row[operator]).sum();
            let penalties: f64 = self.penalty_history.iter().map(|row| row[operator]).sum();
            let s3 = if rewards == 0.0 { DELTA } else { rewards };
            success_rates[operator] = rewards / (s3 + penalties);
        }

        let total: f64 = success_rates.iter().sum();
        if total == 0.0 {
            self.probabilities = vec![1.0 / number_of_operators as f64; number_of_operators];
        } else {
            self.probabilities = success_rates.iter().map(|s| s / total).collect();
        }

        for row in self.reward_history.iter_mut() {
            row.fill(0.0);
        }
        for row in self.penalty_history.iter_mut() {
            row.fill(0.0);
        }
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::operators::AdaptiveOperatorSelector;

    #[test]
    /// The initial distribution is uniform.
    fn test_initial_state() {
        let selector = AdaptiveOperatorSelector::new(5, 5).unwrap();
        for probability in selector.probabilities() {
            assert_approx_eq!(f64, *probability, 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    /// Invalid pool sizes and learning periods are rejected.
    fn test_invalid_args() {
        assert!(AdaptiveOperatorSelector::new(0, 5).is_err());
        assert!(AdaptiveOperatorSelector::new(5, 0).is_err());
    }

    #[test]
    /// A rewarded operator ends the window with a strictly larger probability than a penalised
    /// one.
    fn test_reward_beats_penalty() {
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        // operator 0: child [1, 1] dominates both non-dominated parents three times
        // operator 1: child [9, 9] is dominated three times
        let parent1 = [2.0, 5.0];
        let parent2 = [5.0, 2.0];
        for _ in 0..3 {
            selector
                .assign_credit(&parent1, &parent2, &[[1.0, 1.0]], 0)
                .unwrap();
            selector
                .assign_credit(&parent1, &parent2, &[[9.0, 9.0]], 1)
                .unwrap();
        }
        selector.end_generation();

        let probabilities = selector.probabilities();
        assert!(probabilities[0] > probabilities[1]);
        assert_approx_eq!(f64, probabilities.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    /// When one parent dominates the other, children are scored against the dominating parent.
    fn test_credit_with_dominating_parent() {
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        let better = [1.0, 2.0];
        let worse = [5.0, 6.0];
        // the first child escapes the better parent, the second does not
        selector
            .assign_credit(&worse, &better, &[[0.5, 3.0], [2.0, 3.0]], 0)
            .unwrap();
        assert_eq!(selector.current_rewards[0], 1.0);
        assert_eq!(selector.current_penalties[0], 1.0);
    }

    #[test]
    /// A child tying one parent of a non-dominated pair is rewarded, a dominated child is
    /// penalised.
    fn test_credit_with_non_dominated_parents() {
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        let parent1 = [2.0, 5.0];
        let parent2 = [5.0, 2.0];
        selector
            .assign_credit(&parent1, &parent2, &[[2.0, 5.0], [6.0, 3.0]], 1)
            .unwrap();
        assert_eq!(selector.current_rewards[1], 1.0);
        assert_eq!(selector.current_penalties[1], 1.0);
    }

    #[test]
    /// An out-of-pool operator index is rejected.
    fn test_invalid_operator_index() {
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        assert!(selector
            .assign_credit(&[1.0, 1.0], &[2.0, 2.0], &[[1.5, 1.5]], 2)
            .is_err());
    }

    #[test]
    /// Probabilities only change when the learning period elapses.
    fn test_window_length() {
        let mut selector = AdaptiveOperatorSelector::new(2, 2).unwrap();
        selector
            .assign_credit(&[2.0, 5.0], &[5.0, 2.0], &[[1.0, 1.0]], 0)
            .unwrap();
        selector.end_generation();
        assert_approx_eq!(f64, selector.probabilities()[0], 0.5, epsilon = 1e-12);

        selector.end_generation();
        assert!(selector.probabilities()[0] > selector.probabilities()[1]);
        assert_eq!(selector.window_position, 0);
    }

    #[test]
    /// A window with no reward at all falls back to the uniform distribution.
    fn test_uniform_fallback() {
        let mut selector = AdaptiveOperatorSelector::new(3, 1).unwrap();
        // only penalties: the child is dominated by both parents
        selector
            .assign_credit(&[1.0, 1.0], &[2.0, 2.0], &[[9.0, 9.0]], 1)
            .unwrap();
        selector.end_generation();
        for probability in selector.probabilities() {
            assert_approx_eq!(f64, *probability, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    /// The history is cleared after a probability update: a quiet second window restores the
    /// uniform distribution instead of reusing stale counts.
    fn test_history_cleared_after_update() {
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        selector
            .assign_credit(&[2.0, 5.0], &[5.0, 2.0], &[[1.0, 1.0]], 0)
            .unwrap();
        selector.end_generation();
        assert!(selector.probabilities()[0] > selector.probabilities()[1]);

        selector.end_generation();
        assert_approx_eq!(f64, selector.probabilities()[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    /// Roulette-wheel selection honours a degenerate distribution.
    fn test_roulette_wheel() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut selector = AdaptiveOperatorSelector::new(2, 1).unwrap();
        selector.probabilities = vec![1.0, 0.0];
        for _ in 0..100 {
            assert_eq!(selector.select_operator(&mut rng), 0);
        }
    }
}
