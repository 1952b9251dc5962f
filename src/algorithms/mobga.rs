use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use log::{debug, info};
use rand::seq::index;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::core::utils::{argsort, get_rng, vector_min};
use crate::core::{
    Chromosome, FitnessCache, FitnessOracle, Individual, MobgaError, Population,
    NUMBER_OF_OBJECTIVES,
};
use crate::operators::{
    AdaptiveOperatorSelector, BitFlipMutation, CrossoverOperator, CrossoverPool,
};
use crate::utils::fast_non_dominated_sort;

/// Input arguments for the MOBGA-AOS algorithm.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MOBGAArg {
    /// The number of individuals in the population. This must be a multiple of `2` so that the
    /// offspring batch produced in pairs matches the population size.
    pub population_size: usize,
    /// The number of candidate features, i.e. the chromosome length. This is `D` in the paper.
    pub number_of_features: usize,
    /// The probability that two parents participate in the crossover. The paper uses `0.9`.
    pub crossover_rate: f64,
    /// The probability of flipping each gene during mutation. This defaults to `1` divided by the
    /// number of features, giving one expected flip per individual regardless of the chromosome
    /// length.
    pub mutation_rate: Option<f64>,
    /// The number of generations between two updates of the operator selection probabilities.
    /// This is `LP` in the paper (`5` by convention).
    pub learning_period: usize,
    /// The maximum number of fitness-oracle calls allowed in one run. Cache hits and degenerate
    /// all-zero masks do not count towards this budget.
    pub max_evaluations: usize,
    /// The seed for the random number generator. Two runs with the same seed and the same oracle
    /// produce identical results.
    pub seed: Option<u64>,
}

#[derive(Serialize)]
struct Elapsed {
    hours: i64,
    minutes: i64,
    seconds: i64,
}

/// The struct used to export the algorithm data to a JSON file.
#[derive(Serialize)]
pub struct AlgorithmExport {
    options: MOBGAArg,
    generation: usize,
    number_of_function_evaluations: usize,
    started_at: DateTime<Local>,
    took: Elapsed,
    pareto_front: Vec<Individual>,
}

/// The Multi-Objective Binary Genetic Algorithm with Adaptive Operator Selection (MOBGA-AOS) for
/// feature selection.
///
/// The algorithm evolves binary feature masks to jointly minimise the classification error
/// reported by a user-supplied [`FitnessOracle`] and the number of selected features, and returns
/// the Pareto front of the trade-off. Survivors are chosen with the NSGA2 environmental selection
/// (non-dominated sorting plus crowding distance); the recombination step draws from a pool of
/// five binary crossover operators whose selection probabilities adapt during the search based on
/// the dominance relation between children and parents.
///
/// Implemented based on:
/// > A. Hancer, "Fuzzy kernel feature selection with multi-objective differential evolution
/// > algorithm"-style adaptive pools as formulated in: Q. Al-Tashi et al. and the MOBGA-AOS
/// > paper; environmental selection follows K. Deb, A. Pratap, S. Agarwal and T. Meyarivan,
/// > "A fast and elitist multi-objective genetic algorithm: NSGA-II," IEEE Transactions on
/// > Evolutionary Computation, vol. 6, no. 2, pp. 182-197, April 2002,
/// > doi: 10.1109/4235.996017.
pub struct MOBGA {
    /// The number of individuals in the population.
    population_size: usize,
    /// The chromosome length.
    number_of_features: usize,
    /// The current population.
    population: Population,
    /// The caching layer around the fitness oracle, owning the evaluation budget.
    fitness: FitnessCache,
    /// The adaptive selector choosing which crossover operator to apply.
    operator_selector: AdaptiveOperatorSelector,
    /// The rate-gated dispatcher over the crossover operator pool.
    crossover_pool: CrossoverPool,
    /// The bit-flip mutation operator.
    mutation_operator: BitFlipMutation,
    /// The random number generator.
    rng: Box<dyn RngCore>,
    /// The evolution step number.
    generation: usize,
    /// The time when the algorithm started.
    start_time: DateTime<Local>,
    /// The algorithm options.
    args: MOBGAArg,
}

impl MOBGA {
    /// Initialise the MOBGA-AOS algorithm. A zero evaluation budget is rejected here rather than
    /// silently running zero generations.
    ///
    /// # Arguments
    ///
    /// * `oracle`: The fitness oracle calculating the classification error of a feature mask.
    /// * `options`: The [`MOBGAArg`] arguments to customise the algorithm behaviour.
    ///
    /// returns: `Result<MOBGA, MobgaError>`
    pub fn new(oracle: Box<dyn FitnessOracle>, options: MOBGAArg) -> Result<Self, MobgaError> {
        let name = "MOBGA-AOS".to_string();
        if options.population_size < 3 {
            return Err(MobgaError::AlgorithmInit(
                name,
                "The population size must have at least 3 individuals".to_string(),
            ));
        }
        // force the population size as multiple of 2 so that the number of generated offsprings
        // matches `population_size`
        if options.population_size % 2 != 0 {
            return Err(MobgaError::AlgorithmInit(
                name,
                "The population size must be a multiple of 2".to_string(),
            ));
        }
        if options.number_of_features == 0 {
            return Err(MobgaError::AlgorithmInit(
                name,
                "The problem must have at least 1 candidate feature".to_string(),
            ));
        }

        let mutation_rate = options
            .mutation_rate
            .unwrap_or(1.0 / options.number_of_features as f64);

        let crossover_pool = CrossoverPool::new(options.crossover_rate)?;
        let mutation_operator = BitFlipMutation::new(mutation_rate)?;
        let operator_selector =
            AdaptiveOperatorSelector::new(CrossoverOperator::POOL.len(), options.learning_period)?;
        let fitness = FitnessCache::new(oracle, options.max_evaluations)?;

        info!(
            "Algorithm options are:\n\t* Population size {}\n\t* Number of features {}\n\t* \
             Crossover rate {}\n\t* Mutation rate {}\n\t* Learning period {}\n\t* Evaluation \
             budget {}",
            options.population_size,
            options.number_of_features,
            options.crossover_rate,
            mutation_rate,
            options.learning_period,
            options.max_evaluations
        );

        Ok(Self {
            population_size: options.population_size,
            number_of_features: options.number_of_features,
            population: Population::new(),
            fitness,
            operator_selector,
            crossover_pool,
            mutation_operator,
            rng: get_rng(options.seed),
            generation: 0,
            start_time: Local::now(),
            args: options,
        })
    }

    /// Get the evolution step number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Get the number of oracle calls performed so far.
    pub fn number_of_function_evaluations(&self) -> usize {
        self.fitness.nfe()
    }

    /// Get the current selection probability of each crossover operator.
    pub fn operator_probabilities(&self) -> &[f64] {
        self.operator_selector.probabilities()
    }

    /// Get the current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Get the algorithm options.
    pub fn args(&self) -> &MOBGAArg {
        &self.args
    }

    /// Calculate the crowding distance for the individuals of one non-dominated front
    /// (paragraph 3B in Deb et al. (2002)). Fronts with up to two members get an infinite
    /// distance. Otherwise, for each objective, the two boundary members get an infinite distance
    /// and the interior members accumulate the objective range of their neighbours, normalised by
    /// the front's range on that objective; an objective on which the whole front ties
    /// contributes nothing.
    ///
    /// # Arguments
    ///
    /// * `front`: The individuals in a non-dominated front.
    fn set_crowding_distance(front: &mut [Individual]) {
        let total_individuals = front.len();
        if total_individuals <= 2 {
            for individual in front {
                individual.set_crowding_distance(f64::INFINITY);
            }
            return;
        }

        for individual in front.iter_mut() {
            individual.set_crowding_distance(0.0);
        }

        for objective_index in 0..NUMBER_OF_OBJECTIVES {
            let mut obj_values: Vec<f64> = front
                .iter()
                .map(|individual| individual.objectives()[objective_index])
                .collect();
            let sorted_idx = argsort(&obj_values);
            obj_values.sort_by(|a, b| a.total_cmp(b));

            // all front members tie on this objective, it contributes nothing
            let delta_range = obj_values[total_individuals - 1] - obj_values[0];
            if delta_range.abs() < f64::EPSILON {
                continue;
            }

            // assign infinite distance to the boundary points
            front[sorted_idx[0]].set_crowding_distance(f64::INFINITY);
            front[sorted_idx[total_individuals - 1]].set_crowding_distance(f64::INFINITY);

            for obj_i in 1..(total_individuals - 1) {
                // get the individual corresponding to the sorted objective
                let individual = &mut front[sorted_idx[obj_i]];
                let delta = (obj_values[obj_i + 1] - obj_values[obj_i - 1]) / delta_range;
                let distance = individual.crowding_distance() + delta;
                individual.set_crowding_distance(distance);
            }
        }
    }

    /// Select the individuals forming the next population from the combined pool of parents and
    /// offsprings. The new population is created by adding ranked non-dominated fronts until the
    /// population size almost reaches `number_of_individuals`; when the last front does not fit,
    /// its individuals are added based on their crowding distance, the least crowded first.
    ///
    /// This implements the algorithm at the bottom of page 186 in Deb et al. (2002).
    ///
    /// # Arguments
    ///
    /// * `combined`: The pool of individuals to select from.
    /// * `number_of_individuals`: The target population size.
    ///
    /// returns: `Result<Vec<Individual>, MobgaError>`
    fn environmental_selection(
        combined: &mut [Individual],
        number_of_individuals: usize,
    ) -> Result<Vec<Individual>, MobgaError> {
        let sorting_results = fast_non_dominated_sort(combined, false)?;
        debug!("Collected {} fronts", sorting_results.fronts.len());

        let mut new_population: Vec<Individual> = Vec::new();
        let mut last_front: Option<Vec<Individual>> = None;
        for (fi, front) in sorting_results.fronts.into_iter().enumerate() {
            if new_population.len() + front.len() <= number_of_individuals {
                debug!("Adding front #{} (size: {})", fi + 1, front.len());
                new_population.extend(front);
            } else if new_population.len() == number_of_individuals {
                debug!("Population reached target size");
                break;
            } else {
                debug!("Population almost full ({} individuals)", new_population.len());
                last_front = Some(front);
                break;
            }
        }

        // complete the population with the least crowded members of the last front
        if let Some(mut last_front) = last_front {
            Self::set_crowding_distance(&mut last_front);

            // sort in descending order; the stable sort keeps the original front order on ties
            last_front
                .sort_by(|i, o| o.crowding_distance().total_cmp(&i.crowding_distance()));
            last_front.truncate(number_of_individuals - new_population.len());
            new_population.extend(last_front);
        }

        Ok(new_population)
    }

    /// Create and evaluate the initial random population.
    ///
    /// return: `Result<(), MobgaError>`
    fn initialise(&mut self) -> Result<(), MobgaError> {
        info!("Evaluating initial random population");
        let mut individuals = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size {
            let chromosome = Chromosome::random(self.number_of_features, &mut self.rng);
            let objectives = self.fitness.evaluate(&chromosome)?;
            individuals.push(Individual::new(chromosome, objectives));
        }
        self.population.add_new_individuals(individuals);
        info!(
            "Initial evaluation completed ({} oracle calls)",
            self.fitness.nfe()
        );
        Ok(())
    }

    /// Evolve one generation: produce the offspring batch, run the operator-selector
    /// bookkeeping and select the survivors. This returns `false` when no offspring could be
    /// produced because the evaluation budget ran out.
    ///
    /// return: `Result<bool, MobgaError>`
    fn evolve(&mut self) -> Result<bool, MobgaError> {
        debug!("Generating offsprings (operator selection + crossover + mutation)");
        let mut offsprings: Vec<Individual> = Vec::new();
        while offsprings.len() < self.population_size {
            // the budget is a soft ceiling: it is checked before each new pair, so the pair in
            // flight may overshoot it by at most two evaluations
            if self.fitness.is_budget_exhausted() {
                debug!("Evaluation budget exhausted mid-batch");
                break;
            }

            let operator_index = self.operator_selector.select_operator(&mut self.rng);

            // sample two distinct parents uniformly
            let parent_indexes = index::sample(&mut self.rng, self.population.len(), 2);
            let parent1 = &self.population.individuals()[parent_indexes.index(0)];
            let parent2 = &self.population.individuals()[parent_indexes.index(1)];

            let children = self.crossover_pool.generate_offsprings(
                parent1.chromosome(),
                parent2.chromosome(),
                operator_index,
                &mut self.rng,
            )?;
            let child1 = self
                .mutation_operator
                .mutate_offspring(&children.child1, &mut self.rng);
            let child2 = self
                .mutation_operator
                .mutate_offspring(&children.child2, &mut self.rng);

            let objectives1 = self.fitness.evaluate(&child1)?;
            let objectives2 = self.fitness.evaluate(&child2)?;

            // did this operator help or hurt?
            self.operator_selector.assign_credit(
                &parent1.objectives(),
                &parent2.objectives(),
                &[objectives1, objectives2],
                operator_index,
            )?;

            offsprings.push(Individual::new(child1, objectives1));
            offsprings.push(Individual::new(child2, objectives2));
        }

        // the end-of-generation bookkeeping runs exactly once, even for a short batch
        self.operator_selector.end_generation();
        self.generation += 1;

        if offsprings.is_empty() {
            return Ok(false);
        }

        debug!("Combining parents and offsprings in new population");
        let mut combined = self.population.take();
        combined.extend(offsprings);

        debug!("Selecting the best individuals");
        let survivors = Self::environmental_selection(&mut combined, self.population_size)?;
        self.population.add_new_individuals(survivors);

        let errors: Vec<f64> = self
            .population
            .individuals()
            .iter()
            .map(|i| i.classification_error())
            .collect();
        let features: Vec<f64> = self
            .population
            .individuals()
            .iter()
            .map(|i| i.number_of_selected_features())
            .collect();
        let front_size = self
            .population
            .individuals()
            .iter()
            .filter(|i| i.rank() == 1)
            .count();
        info!(
            "Generation {} - nfe {}/{} - front size {} - best error {:.3}% - fewest features {} \
             - operator probabilities {:?}",
            self.generation,
            self.fitness.nfe(),
            self.fitness.max_nfe(),
            front_size,
            vector_min(&errors)?,
            vector_min(&features)?,
            self.operator_selector.probabilities()
        );

        Ok(true)
    }

    /// Run the algorithm until the evaluation budget is exhausted.
    ///
    /// return: `Result<Vec<Individual>, MobgaError>`. The Pareto front of the final population,
    /// with the feature masks and their objective pairs.
    pub fn run(&mut self) -> Result<Vec<Individual>, MobgaError> {
        info!("Starting MOBGA-AOS");
        self.initialise()?;

        while !self.fitness.is_budget_exhausted() {
            let produced_offsprings = self.evolve()?;
            if !produced_offsprings {
                break;
            }
        }
        info!(
            "Stopping evolution after {} generations, because the evaluation budget ({}) was \
             reached",
            self.generation,
            self.fitness.max_nfe()
        );

        let front = self.pareto_front()?;
        info!("Took {}", self.elapsed_as_string());
        info!("The Pareto front contains {} solutions", front.len());
        Ok(front)
    }

    /// Get the Pareto front of the current population from a fresh non-dominated sort.
    ///
    /// return: `Result<Vec<Individual>, MobgaError>`
    pub fn pareto_front(&self) -> Result<Vec<Individual>, MobgaError> {
        let mut individuals = self.population.individuals().to_vec();
        let results = fast_non_dominated_sort(&mut individuals, true)?;
        Ok(results.fronts.into_iter().next().unwrap_or_default())
    }

    /// Format the elapsed time as string.
    ///
    /// return: `String`.
    fn elapsed_as_string(&self) -> String {
        let [hours, minutes, seconds] = self.elapsed();
        format!("{hours:0>2} hours, {minutes:0>2} minutes and {seconds:0>2} seconds")
    }

    /// Get the elapsed hours, minutes and seconds since the start of the algorithm.
    ///
    /// return: `[i64; 3]`.
    fn elapsed(&self) -> [i64; 3] {
        let duration = Local::now() - self.start_time;
        let seconds = duration.num_seconds() % 60;
        let minutes = (duration.num_seconds() / 60) % 60;
        let hours = (duration.num_seconds() / 60) / 60;
        [hours, minutes, seconds]
    }

    /// Save the algorithm data (the options, the Pareto front with the feature masks and their
    /// objectives, the counters) to a JSON file.
    ///
    /// # Arguments
    ///
    /// * `destination`: The path to the JSON file.
    ///
    /// return `Result<(), MobgaError>`
    pub fn save_to_json(&self, destination: &Path) -> Result<(), MobgaError> {
        let elapsed = self.elapsed();
        let export = AlgorithmExport {
            options: self.args.clone(),
            generation: self.generation,
            number_of_function_evaluations: self.fitness.nfe(),
            started_at: self.start_time,
            took: Elapsed {
                hours: elapsed[0],
                minutes: elapsed[1],
                seconds: elapsed[2],
            },
            pareto_front: self.pareto_front()?,
        };
        let data = serde_json::to_string_pretty(&export)
            .map_err(|e| MobgaError::AlgorithmExport(e.to_string()))?;
        fs::write(destination, data).map_err(|e| MobgaError::AlgorithmExport(e.to_string()))?;
        Ok(())
    }
}


#[cfg(test)]
mod test_selection {
    use std::collections::HashSet;

    use crate::algorithms::MOBGA;
    use crate::core::test_utils::individuals_from_obj_values_dummy;

    #[test]
    /// Selecting N from a 2N pool returns exactly N individuals: the fully fitting fronts plus
    /// the least crowded members of the overflowing one.
    fn test_selection_size_invariant() {
        // front 1: indexes 0-2, front 2: indexes 3-5, front 3: indexes 6-7
        let objectives = vec![
            [1.0, 8.0],
            [2.0, 6.0],
            [3.0, 4.0],
            [2.0, 9.0],
            [3.0, 7.0],
            [4.0, 5.0],
            [5.0, 9.0],
            [6.0, 8.0],
        ];
        let mut combined = individuals_from_obj_values_dummy(&objectives);
        let selected = MOBGA::environmental_selection(&mut combined, 4).unwrap();

        assert_eq!(selected.len(), 4);
        let selected_objectives: HashSet<_> = selected
            .iter()
            .map(|i| (i.objectives()[0] as i64, i.objectives()[1] as i64))
            .collect();
        // the whole first front survives
        for pair in [(1, 8), (2, 6), (3, 4)] {
            assert!(selected_objectives.contains(&pair));
        }
        // the overflowing front is trimmed by crowding distance; [2, 9] is a boundary member of
        // the second front and wins the remaining slot
        assert!(selected_objectives.contains(&(2, 9)));
    }

    #[test]
    /// A pool already at the target size is returned in full.
    fn test_selection_whole_pool() {
        let objectives = vec![[1.0, 8.0], [2.0, 6.0], [2.0, 9.0], [3.0, 7.0]];
        let mut combined = individuals_from_obj_values_dummy(&objectives);
        let selected = MOBGA::environmental_selection(&mut combined, 4).unwrap();
        assert_eq!(selected.len(), 4);
    }
}

#[cfg(test)]
mod test_algorithm {
    use std::error::Error;

    use float_cmp::assert_approx_eq;

    use crate::algorithms::{MOBGAArg, MOBGA};
    use crate::core::{Chromosome, FitnessOracle};
    use crate::operators::ParetoDominance;

    /// A deterministic stand-in for a cross-validated classifier: the first four features are
    /// informative and each missed one costs 20% error, while every selected noisy feature adds
    /// 1%.
    struct SyntheticOracle;

    const INFORMATIVE_FEATURES: usize = 4;

    impl FitnessOracle for SyntheticOracle {
        fn classification_error(&self, chromosome: &Chromosome) -> Result<f64, Box<dyn Error>> {
            let informative_hits = chromosome
                .selected_features()
                .iter()
                .filter(|i| **i < INFORMATIVE_FEATURES)
                .count();
            let noisy_hits = chromosome.number_of_selected_features() - informative_hits;
            Ok(20.0 * (INFORMATIVE_FEATURES - informative_hits) as f64 + noisy_hits as f64)
        }
    }

    fn default_args() -> MOBGAArg {
        MOBGAArg {
            population_size: 10,
            number_of_features: 10,
            crossover_rate: 0.9,
            mutation_rate: None,
            learning_period: 5,
            max_evaluations: 300,
            seed: Some(1),
        }
    }

    #[test]
    /// Invalid construction arguments are rejected.
    fn test_new_errors() {
        let mut args = default_args();
        args.population_size = 5;
        assert!(MOBGA::new(Box::new(SyntheticOracle), args).is_err());

        let mut args = default_args();
        args.population_size = 2;
        assert!(MOBGA::new(Box::new(SyntheticOracle), args).is_err());

        let mut args = default_args();
        args.number_of_features = 0;
        assert!(MOBGA::new(Box::new(SyntheticOracle), args).is_err());

        let mut args = default_args();
        args.max_evaluations = 0;
        assert!(MOBGA::new(Box::new(SyntheticOracle), args).is_err());

        let mut args = default_args();
        args.crossover_rate = 1.2;
        assert!(MOBGA::new(Box::new(SyntheticOracle), args).is_err());
    }

    #[test]
    /// A full run returns a mutually non-dominated front of feasible masks and stays within the
    /// soft evaluation ceiling (the budget plus the pair in flight).
    fn test_run() {
        let mut algorithm = MOBGA::new(Box::new(SyntheticOracle), default_args()).unwrap();
        let front = algorithm.run().unwrap();

        assert!(!front.is_empty());
        assert!(algorithm.number_of_function_evaluations() <= 300 + 2);

        for individual in &front {
            assert!(individual.chromosome().number_of_selected_features() >= 1);
            assert_eq!(
                individual.number_of_selected_features(),
                individual.chromosome().number_of_selected_features() as f64
            );
        }
        for first in &front {
            for second in &front {
                assert!(!ParetoDominance::dominates(
                    &first.objectives(),
                    &second.objectives()
                ));
            }
        }

        // the trivial one-feature extreme of the trade-off is easy to reach with this oracle
        let fewest = front
            .iter()
            .map(|i| i.number_of_selected_features() as usize)
            .min()
            .unwrap();
        assert_eq!(fewest, 1);

        let probabilities = algorithm.operator_probabilities();
        assert_approx_eq!(f64, probabilities.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(probabilities.iter().all(|p| *p >= 0.0));
    }

    #[test]
    /// Two runs with the same seed produce identical fronts.
    fn test_reproducibility() {
        let mut first = MOBGA::new(Box::new(SyntheticOracle), default_args()).unwrap();
        let mut second = MOBGA::new(Box::new(SyntheticOracle), default_args()).unwrap();
        let front_a = first.run().unwrap();
        let front_b = second.run().unwrap();

        assert_eq!(front_a.len(), front_b.len());
        for (a, b) in front_a.iter().zip(&front_b) {
            assert_eq!(a.chromosome(), b.chromosome());
            assert_eq!(a.objectives(), b.objectives());
        }
    }

    #[test]
    /// A tiny budget terminates the run right after the initial population is evaluated.
    fn test_tiny_budget() {
        let mut args = default_args();
        args.max_evaluations = 3;
        let mut algorithm = MOBGA::new(Box::new(SyntheticOracle), args).unwrap();
        let front = algorithm.run().unwrap();
        assert!(!front.is_empty());
        // no pair is started once the budget is exhausted
        assert!(algorithm.number_of_function_evaluations() <= 10 + 2);
    }
}
