use rand::{Rng, RngCore};

use crate::core::{Chromosome, MobgaError};

/// The uniform bit-flip mutation operator. Each gene flips independently with the configured
/// rate; the paper convention is a rate of `1/D` so that one gene flips per individual on
/// average, regardless of the chromosome length. A mutation that wipes every selected feature is
/// repaired by forcing one randomly chosen gene back to `1` after the flips.
pub struct BitFlipMutation {
    /// The probability of flipping each gene.
    gene_rate: f64,
}

impl BitFlipMutation {
    /// Initialise the bit-flip mutation operator. This returns an error if the rate is outside
    /// the `[0, 1]` range.
    ///
    /// # Arguments
    ///
    /// * `gene_rate`: The probability of flipping each gene.
    ///
    /// returns: `Result<BitFlipMutation, MobgaError>`
    pub fn new(gene_rate: f64) -> Result<Self, MobgaError> {
        if !(0.0..=1.0).contains(&gene_rate) {
            return Err(MobgaError::MutationOperator(
                "BitFlipMutation".to_string(),
                format!("The gene rate {gene_rate} must be a number between 0 and 1"),
            ));
        }
        Ok(Self { gene_rate })
    }

    /// Mutate an offspring. The input chromosome is not modified.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The chromosome to mutate.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Chromosome`. The mutated chromosome, with at least one selected feature.
    pub fn mutate_offspring(&self, chromosome: &Chromosome, rng: &mut dyn RngCore) -> Chromosome {
        let mut mutated = chromosome.clone();
        for position in 0..mutated.len() {
            if rng.gen_bool(self.gene_rate) {
                mutated.flip(position);
            }
        }
        // feasibility repair, applied after the flips
        if mutated.number_of_selected_features() == 0 {
            mutated.force_random_gene(rng);
        }
        mutated
    }
}
