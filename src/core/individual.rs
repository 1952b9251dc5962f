use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::core::chromosome::Chromosome;

/// The number of objectives being minimised: the classification error and the number of selected
/// features.
pub const NUMBER_OF_OBJECTIVES: usize = 2;

/// The pair of objective values for one chromosome. The first entry is the classification error
/// (as percentage, between 0 and 100) and the second the number of selected features. Both are
/// minimised.
pub type ObjectivePair = [f64; NUMBER_OF_OBJECTIVES];

/// An individual in the population, pairing a chromosome with its objective values. The rank and
/// crowding distance are transient data set during environmental selection and are not exported.
#[derive(Clone, Debug, Serialize)]
pub struct Individual {
    /// The binary feature mask.
    chromosome: Chromosome,
    /// The objective values `[classification error, selected feature count]`.
    objectives: ObjectivePair,
    /// The front rank (1 is the non-dominated front). Zero means not ranked yet.
    #[serde(skip)]
    rank: usize,
    /// The crowding distance within the individual's front.
    #[serde(skip)]
    crowding_distance: f64,
}

impl Individual {
    /// Create a new evaluated individual.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The binary feature mask.
    /// * `objectives`: The objective values for the mask.
    ///
    /// returns: `Individual`
    pub fn new(chromosome: Chromosome, objectives: ObjectivePair) -> Self {
        Self {
            chromosome,
            objectives,
            rank: 0,
            crowding_distance: 0.0,
        }
    }

    /// Get the individual's chromosome.
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    /// Get the objective values.
    pub fn objectives(&self) -> ObjectivePair {
        self.objectives
    }

    /// Get the classification error (first objective).
    pub fn classification_error(&self) -> f64 {
        self.objectives[0]
    }

    /// Get the number of selected features (second objective).
    pub fn number_of_selected_features(&self) -> f64 {
        self.objectives[1]
    }

    /// Get the front rank set by the last non-dominated sort.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    /// Get the crowding distance set by the last environmental selection.
    pub fn crowding_distance(&self) -> f64 {
        self.crowding_distance
    }

    pub(crate) fn set_crowding_distance(&mut self, distance: f64) {
        self.crowding_distance = distance;
    }
}

impl Display for Individual {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Individual(mask={}, error={:.3}%, features={})",
            self.chromosome, self.objectives[0], self.objectives[1]
        )
    }
}

/// The population with the evaluated solutions. The population is replaced wholesale at each
/// generation boundary by the environmental selection output.
#[derive(Default)]
pub struct Population(Vec<Individual>);

impl Population {
    /// Create an empty population.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Get the population individuals.
    pub fn individuals(&self) -> &[Individual] {
        &self.0
    }

    /// Get the population individuals as a mutable slice.
    pub fn individuals_as_mut(&mut self) -> &mut [Individual] {
        &mut self.0
    }

    /// Get the population size.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the population has no individuals.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add new individuals to the population.
    pub fn add_new_individuals(&mut self, individuals: Vec<Individual>) {
        self.0.extend(individuals);
    }

    /// Take the individuals out of the population, leaving it empty.
    pub(crate) fn take(&mut self) -> Vec<Individual> {
        std::mem::take(&mut self.0)
    }
}
