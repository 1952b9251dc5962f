use std::collections::HashMap;
use std::error::Error;

use log::debug;

use crate::core::chromosome::Chromosome;
use crate::core::error::MobgaError;
use crate::core::individual::ObjectivePair;

/// The trait the caller implements to assess the quality of a feature mask. The oracle typically
/// wraps a classifier and its training data (for example a k-NN model scored with k-fold cross
/// validation) and returns the classification error as a percentage between 0 and 100.
///
/// The algorithm never calls the oracle with an all-zero mask; such masks are assigned the worst
/// possible error directly. Repeated calls for the same bit pattern are skipped via the
/// [`FitnessCache`], so the oracle only needs to be deterministic within one run.
pub trait FitnessOracle {
    /// Calculate the classification error for the selected features.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The feature mask with at least one selected feature.
    ///
    /// returns: `Result<f64, Box<dyn Error>>`. The error percentage, between 0 and 100.
    fn classification_error(&self, chromosome: &Chromosome) -> Result<f64, Box<dyn Error>>;
}

/// The caching layer wrapping the user-supplied [`FitnessOracle`]. The cache maps exact bit
/// patterns to their objective pair, so a chromosome seen before is returned without calling the
/// oracle and without consuming the evaluation budget. The counter `nfe` increases by exactly one
/// for each distinct, non-degenerate chromosome.
pub struct FitnessCache {
    /// The user-supplied oracle calculating the classification error.
    oracle: Box<dyn FitnessOracle>,
    /// The evaluated bit patterns and their objective pairs.
    cache: HashMap<Chromosome, ObjectivePair>,
    /// The number of oracle calls performed so far.
    nfe: usize,
    /// The maximum number of oracle calls allowed in one run.
    max_nfe: usize,
}

impl FitnessCache {
    /// Create the caching layer.
    ///
    /// # Arguments
    ///
    /// * `oracle`: The fitness oracle to wrap.
    /// * `max_nfe`: The evaluation budget. This must be at least 1.
    ///
    /// returns: `Result<FitnessCache, MobgaError>`
    pub fn new(oracle: Box<dyn FitnessOracle>, max_nfe: usize) -> Result<Self, MobgaError> {
        if max_nfe == 0 {
            return Err(MobgaError::AlgorithmInit(
                "FitnessCache".to_string(),
                "The evaluation budget must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            oracle,
            cache: HashMap::new(),
            nfe: 0,
            max_nfe,
        })
    }

    /// Evaluate a chromosome. A cache hit returns the stored objective pair with no side effect.
    /// On a miss, the feature count is calculated from the mask; a mask with no selected feature
    /// is assigned an error of `100.0` without calling the oracle, otherwise the oracle is called
    /// and the evaluation counter incremented by one. The oracle output is rejected if it is not
    /// finite or falls outside the `[0, 100]` range.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The feature mask to evaluate.
    ///
    /// returns: `Result<ObjectivePair, MobgaError>`
    pub fn evaluate(&mut self, chromosome: &Chromosome) -> Result<ObjectivePair, MobgaError> {
        if let Some(objectives) = self.cache.get(chromosome) {
            debug!("Cache hit for mask {chromosome}");
            return Ok(*objectives);
        }

        let feature_count = chromosome.number_of_selected_features() as f64;
        let error = if feature_count == 0.0 {
            // degenerate mask, there is nothing to classify with
            100.0
        } else {
            let error = self
                .oracle
                .classification_error(chromosome)
                .map_err(|e| MobgaError::Evaluation(e.to_string()))?;
            if !error.is_finite() || !(0.0..=100.0).contains(&error) {
                return Err(MobgaError::Evaluation(format!(
                    "The oracle returned the error {error} for mask {chromosome}, but a finite \
                     percentage between 0 and 100 is expected"
                )));
            }
            self.nfe += 1;
            error
        };

        let objectives = [error, feature_count];
        self.cache.insert(chromosome.clone(), objectives);
        Ok(objectives)
    }

    /// Get the number of oracle calls performed so far.
    pub fn nfe(&self) -> usize {
        self.nfe
    }

    /// Get the evaluation budget.
    pub fn max_nfe(&self) -> usize {
        self.max_nfe
    }

    /// Whether the evaluation budget has been consumed.
    pub fn is_budget_exhausted(&self) -> bool {
        self.nfe >= self.max_nfe
    }

    /// Get the number of distinct bit patterns evaluated so far.
    pub fn number_of_cached_solutions(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::core::{Chromosome, FitnessCache, FitnessOracle};

    /// An oracle whose error is the number of unselected features, scaled to a percentage.
    struct CountingOracle;

    impl FitnessOracle for CountingOracle {
        fn classification_error(&self, chromosome: &Chromosome) -> Result<f64, Box<dyn Error>> {
            let unselected = chromosome.len() - chromosome.number_of_selected_features();
            Ok(100.0 * unselected as f64 / chromosome.len() as f64)
        }
    }

    struct BrokenOracle;

    impl FitnessOracle for BrokenOracle {
        fn classification_error(&self, _: &Chromosome) -> Result<f64, Box<dyn Error>> {
            Ok(f64::NAN)
        }
    }

    #[test]
    /// A repeated bit pattern consumes the budget once, distinct patterns once each.
    fn test_budget_counting() {
        let mut cache = FitnessCache::new(Box::new(CountingOracle), 100).unwrap();
        let a = Chromosome::from_genes(vec![1, 0, 1, 0]).unwrap();
        let b = Chromosome::from_genes(vec![0, 1, 0, 1]).unwrap();

        let first = cache.evaluate(&a).unwrap();
        assert_eq!(cache.nfe(), 1);
        let second = cache.evaluate(&a.clone()).unwrap();
        assert_eq!(cache.nfe(), 1);
        assert_eq!(first, second);

        cache.evaluate(&b).unwrap();
        assert_eq!(cache.nfe(), 2);
        assert_eq!(cache.number_of_cached_solutions(), 2);
    }

    #[test]
    /// An all-zero mask gets the worst error without calling the oracle.
    fn test_zero_feature_short_circuit() {
        let mut cache = FitnessCache::new(Box::new(CountingOracle), 100).unwrap();
        let mut genes = Chromosome::from_genes(vec![1, 0, 0]).unwrap();
        // flip the only set gene to obtain a degenerate mask
        genes.flip(0);

        let objectives = cache.evaluate(&genes).unwrap();
        assert_eq!(objectives, [100.0, 0.0]);
        assert_eq!(cache.nfe(), 0);
    }

    #[test]
    /// The objective pair stores the error and the feature count.
    fn test_objective_pair() {
        let mut cache = FitnessCache::new(Box::new(CountingOracle), 100).unwrap();
        let a = Chromosome::from_genes(vec![1, 1, 1, 0]).unwrap();
        assert_eq!(cache.evaluate(&a).unwrap(), [25.0, 3.0]);
    }

    #[test]
    /// Non-finite oracle output is a contract violation.
    fn test_oracle_contract() {
        let mut cache = FitnessCache::new(Box::new(BrokenOracle), 100).unwrap();
        let a = Chromosome::from_genes(vec![1, 0]).unwrap();
        assert!(cache.evaluate(&a).is_err());
    }

    #[test]
    /// A zero budget is rejected at construction.
    fn test_zero_budget() {
        assert!(FitnessCache::new(Box::new(CountingOracle), 0).is_err());
    }
}
