use crate::core::chromosome::Chromosome;
use crate::core::individual::{Individual, ObjectivePair};

/// Build individuals with the given objective values and a placeholder one-gene mask. This is
/// only used in tests exercising the ranking and selection machinery, where the mask content does
/// not matter.
///
/// # Arguments
///
/// * `objectives`: The objective pairs to assign, one individual per pair.
///
/// returns: `Vec<Individual>`
#[doc(hidden)]
pub fn individuals_from_obj_values_dummy(objectives: &[ObjectivePair]) -> Vec<Individual> {
    objectives
        .iter()
        .map(|pair| Individual::new(Chromosome::from_genes_unchecked(vec![1]), *pair))
        .collect()
}
