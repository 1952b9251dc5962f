use std::fmt::{Display, Formatter};

use rand::seq::{index, SliceRandom};
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::core::{Chromosome, MobgaError};

/// Struct containing the offsprings from the crossover operation.
#[derive(Debug)]
pub struct CrossoverChildren {
    /// The first generated child.
    pub child1: Chromosome,
    /// The second generated child.
    pub child2: Chromosome,
}

/// The five binary crossover operators in the pool. The operators differ in how disruptive the
/// recombination is, from the low-disruption single-point crossover to the per-gene uniform
/// crossover. Their order is fixed because the adaptive operator selector addresses them by
/// position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CrossoverOperator {
    /// Swap the suffixes of the parents after one random cut point.
    SinglePoint,
    /// Swap the segment between two random cut points.
    TwoPoint,
    /// Swap each gene between the parents with a fair coin.
    Uniform,
    /// Apply single-point crossover on a randomly permuted view of the parents, then restore the
    /// original gene order. This removes the positional bias of single-point crossover, where
    /// genes at the chromosome ends are rarely separated.
    Shuffle,
    /// Restrict the cut point to positions where the parents differ, so the children always
    /// differ from both parents. Identical parents are returned unmodified.
    ReducedSurrogate,
}

impl CrossoverOperator {
    /// The operator pool in the positional order used by the adaptive operator selector.
    pub const POOL: [CrossoverOperator; 5] = [
        CrossoverOperator::SinglePoint,
        CrossoverOperator::TwoPoint,
        CrossoverOperator::Uniform,
        CrossoverOperator::Shuffle,
        CrossoverOperator::ReducedSurrogate,
    ];

    /// Recombine two parents into two children. The parents are never modified.
    ///
    /// # Arguments
    ///
    /// * `parent1`: The first parent to use for mating.
    /// * `parent2`: The second parent to use for mating.
    /// * `rng`: The random number generator.
    ///
    /// returns: `(Chromosome, Chromosome)`
    fn recombine(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> (Chromosome, Chromosome) {
        let length = parent1.len();
        match self {
            CrossoverOperator::SinglePoint => {
                if length < 2 {
                    return (parent1.clone(), parent2.clone());
                }
                let cut = rng.gen_range(1..length);
                single_point_at(parent1, parent2, cut)
            }
            CrossoverOperator::TwoPoint => {
                // two distinct interior cuts need at least 3 genes
                if length < 3 {
                    return (parent1.clone(), parent2.clone());
                }
                let cuts = index::sample(rng, length - 1, 2);
                let (k1, k2) = (cuts.index(0) + 1, cuts.index(1) + 1);
                two_point_at(parent1, parent2, k1.min(k2), k1.max(k2))
            }
            CrossoverOperator::Uniform => {
                let mut genes_1 = parent1.genes().to_vec();
                let mut genes_2 = parent2.genes().to_vec();
                for position in 0..length {
                    if rng.gen_bool(0.5) {
                        std::mem::swap(&mut genes_1[position], &mut genes_2[position]);
                    }
                }
                (
                    Chromosome::from_genes_unchecked(genes_1),
                    Chromosome::from_genes_unchecked(genes_2),
                )
            }
            CrossoverOperator::Shuffle => {
                if length < 2 {
                    return (parent1.clone(), parent2.clone());
                }
                let mut permutation: Vec<usize> = (0..length).collect();
                permutation.shuffle(rng);

                let shuffled_1: Vec<u8> = permutation.iter().map(|i| parent1.genes()[*i]).collect();
                let shuffled_2: Vec<u8> = permutation.iter().map(|i| parent2.genes()[*i]).collect();
                let cut = rng.gen_range(1..length);
                let (crossed_1, crossed_2) = (
                    recombined_genes(&shuffled_1, &shuffled_2, cut),
                    recombined_genes(&shuffled_2, &shuffled_1, cut),
                );

                // restore the original gene order
                let mut genes_1 = vec![0u8; length];
                let mut genes_2 = vec![0u8; length];
                for (shuffled_position, original_position) in permutation.iter().enumerate() {
                    genes_1[*original_position] = crossed_1[shuffled_position];
                    genes_2[*original_position] = crossed_2[shuffled_position];
                }
                (
                    Chromosome::from_genes_unchecked(genes_1),
                    Chromosome::from_genes_unchecked(genes_2),
                )
            }
            CrossoverOperator::ReducedSurrogate => {
                let differing_positions: Vec<usize> = (0..length)
                    .filter(|i| parent1.genes()[*i] != parent2.genes()[*i])
                    .collect();

                // any cut on identical parents yields identical children
                match differing_positions.choose(rng) {
                    None => (parent1.clone(), parent2.clone()),
                    Some(cut) => single_point_at(parent1, parent2, *cut),
                }
            }
        }
    }
}

impl Display for CrossoverOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrossoverOperator::SinglePoint => "SinglePoint",
            CrossoverOperator::TwoPoint => "TwoPoint",
            CrossoverOperator::Uniform => "Uniform",
            CrossoverOperator::Shuffle => "Shuffle",
            CrossoverOperator::ReducedSurrogate => "ReducedSurrogate",
        };
        f.write_str(name)
    }
}

/// Apply single-point crossover at the given cut. The first child takes the prefix of `parent1`
/// and the suffix of `parent2`, the second child the complementary swap.
fn single_point_at(
    parent1: &Chromosome,
    parent2: &Chromosome,
    cut: usize,
) -> (Chromosome, Chromosome) {
    (
        Chromosome::from_genes_unchecked(recombined_genes(parent1.genes(), parent2.genes(), cut)),
        Chromosome::from_genes_unchecked(recombined_genes(parent2.genes(), parent1.genes(), cut)),
    )
}

/// Build the gene vector taking `prefix_source[..cut]` and `suffix_source[cut..]`.
fn recombined_genes(prefix_source: &[u8], suffix_source: &[u8], cut: usize) -> Vec<u8> {
    let mut genes = prefix_source[..cut].to_vec();
    genes.extend_from_slice(&suffix_source[cut..]);
    genes
}

/// Apply two-point crossover, swapping the `[k1, k2)` segment between the parents.
fn two_point_at(
    parent1: &Chromosome,
    parent2: &Chromosome,
    k1: usize,
    k2: usize,
) -> (Chromosome, Chromosome) {
    let mut genes_1 = parent1.genes().to_vec();
    let mut genes_2 = parent2.genes().to_vec();
    genes_1[k1..k2].copy_from_slice(&parent2.genes()[k1..k2]);
    genes_2[k1..k2].copy_from_slice(&parent1.genes()[k1..k2]);
    (
        Chromosome::from_genes_unchecked(genes_1),
        Chromosome::from_genes_unchecked(genes_2),
    )
}

/// The rate-gated dispatcher over the crossover operator pool. The operator to apply is addressed
/// by its position in [`CrossoverOperator::POOL`]; with probability `1 - crossover_rate` the
/// parents are returned as unmodified copies instead.
pub struct CrossoverPool {
    /// The probability that the parents participate in the crossover.
    crossover_rate: f64,
}

impl CrossoverPool {
    /// Create the dispatcher. This returns an error if the rate is outside the `[0, 1]` range.
    ///
    /// # Arguments
    ///
    /// * `crossover_rate`: The probability that the parents participate in the crossover. The
    ///    paper uses `0.9`.
    ///
    /// returns: `Result<CrossoverPool, MobgaError>`
    pub fn new(crossover_rate: f64) -> Result<Self, MobgaError> {
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(MobgaError::CrossoverOperator(
                "CrossoverPool".to_string(),
                format!("The crossover rate {crossover_rate} must be a number between 0 and 1"),
            ));
        }
        Ok(Self { crossover_rate })
    }

    /// Get the number of operators in the pool.
    pub fn number_of_operators(&self) -> usize {
        CrossoverOperator::POOL.len()
    }

    /// Generate two children from their parents with the operator at `operator_index`. This
    /// returns an error if the parents have different lengths or the index is outside the pool.
    ///
    /// # Arguments
    ///
    /// * `parent1`: The first parent to use for mating.
    /// * `parent2`: The second parent to use for mating.
    /// * `operator_index`: The position of the operator in the pool.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<CrossoverChildren, MobgaError>`
    pub fn generate_offsprings(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        operator_index: usize,
        rng: &mut dyn RngCore,
    ) -> Result<CrossoverChildren, MobgaError> {
        if parent1.len() != parent2.len() {
            return Err(MobgaError::CrossoverOperator(
                "CrossoverPool".to_string(),
                format!(
                    "The parents have different lengths ({} and {})",
                    parent1.len(),
                    parent2.len()
                ),
            ));
        }
        let operator = CrossoverOperator::POOL.get(operator_index).ok_or_else(|| {
            MobgaError::CrossoverOperator(
                "CrossoverPool".to_string(),
                format!(
                    "The operator index {operator_index} is outside the pool of {} operators",
                    CrossoverOperator::POOL.len()
                ),
            )
        })?;

        let (child1, child2) = if rng.gen_bool(self.crossover_rate) {
            operator.recombine(parent1, parent2, rng)
        } else {
            (parent1.clone(), parent2.clone())
        };
        Ok(CrossoverChildren { child1, child2 })
    }
}
