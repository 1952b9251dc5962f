use std::fmt::{Display, Formatter};

use rand::{Rng, RngCore};
use serde::Serialize;

use crate::core::error::MobgaError;

/// A binary feature-selection mask. Each gene maps to one candidate feature; a gene equal to `1`
/// means the feature is selected. A chromosome always contains at least one selected feature: an
/// all-zero mask selects nothing and is repaired with [`Chromosome::force_random_gene`] as soon as
/// it appears (after random initialisation or mutation).
///
/// The bit pattern implements `Hash` and `Eq` so that it can be used as key in the fitness cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Chromosome(Vec<u8>);

impl Chromosome {
    /// Build a chromosome from a vector of genes. This returns an error if the vector is empty or
    /// any gene is not `0` or `1`.
    ///
    /// # Arguments
    ///
    /// * `genes`: The gene values.
    ///
    /// returns: `Result<Chromosome, MobgaError>`
    pub fn from_genes(genes: Vec<u8>) -> Result<Self, MobgaError> {
        if genes.is_empty() {
            return Err(MobgaError::EmptyChromosome);
        }
        if let Some(position) = genes.iter().position(|g| *g > 1) {
            return Err(MobgaError::NonBinaryGene(position));
        }
        Ok(Self(genes))
    }

    /// Generate a random chromosome of the given length. If no gene is set after sampling, one
    /// random gene is forced to `1` so that the mask selects at least one feature.
    ///
    /// # Arguments
    ///
    /// * `length`: The number of genes.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Chromosome`
    pub fn random(length: usize, rng: &mut dyn RngCore) -> Self {
        let genes = (0..length).map(|_| rng.gen_range(0..=1u8)).collect();
        let mut chromosome = Self(genes);
        if chromosome.number_of_selected_features() == 0 {
            chromosome.force_random_gene(rng);
        }
        chromosome
    }

    /// Build a chromosome from genes already known to be binary, e.g. recombined from valid
    /// parents.
    pub(crate) fn from_genes_unchecked(genes: Vec<u8>) -> Self {
        Self(genes)
    }

    /// Get the number of genes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the gene values.
    pub fn genes(&self) -> &[u8] {
        &self.0
    }

    /// Count the selected features (i.e. the genes set to `1`).
    ///
    /// returns: `usize`
    pub fn number_of_selected_features(&self) -> usize {
        self.0.iter().filter(|g| **g == 1).count()
    }

    /// Get the indices of the selected features.
    ///
    /// returns: `Vec<usize>`
    pub fn selected_features(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, g)| (*g == 1).then_some(index))
            .collect()
    }

    /// Flip the gene at the given position.
    pub(crate) fn flip(&mut self, position: usize) {
        self.0[position] ^= 1;
    }

    /// Set one randomly chosen gene to `1`. This repairs a degenerate all-zero mask.
    ///
    /// # Arguments
    ///
    /// * `rng`: The random number generator.
    pub(crate) fn force_random_gene(&mut self, rng: &mut dyn RngCore) {
        let position = rng.gen_range(0..self.0.len());
        self.0[position] = 1;
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for gene in &self.0 {
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::core::Chromosome;

    #[test]
    /// Invalid gene vectors are rejected.
    fn test_invalid_genes() {
        assert!(Chromosome::from_genes(vec![]).is_err());
        assert!(Chromosome::from_genes(vec![0, 1, 2]).is_err());
        assert!(Chromosome::from_genes(vec![0, 1, 0]).is_ok());
    }

    #[test]
    /// Random chromosomes always select at least one feature.
    fn test_random_always_feasible() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let chromosome = Chromosome::random(3, &mut rng);
            assert!(chromosome.number_of_selected_features() >= 1);
        }
    }

    #[test]
    /// Selected-feature helpers count the set genes.
    fn test_selected_features() {
        let chromosome = Chromosome::from_genes(vec![1, 0, 1, 1, 0]).unwrap();
        assert_eq!(chromosome.number_of_selected_features(), 3);
        assert_eq!(chromosome.selected_features(), vec![0, 2, 3]);
        assert_eq!(chromosome.len(), 5);
    }
}
