use thiserror::Error;

#[derive(Error, Debug)]
/// Errors raised by the library.
pub enum MobgaError {
    #[error("The following error occurred: {0}")]
    Generic(String),
    #[error("The chromosome must contain at least one gene")]
    EmptyChromosome,
    #[error("The gene at position {0} is not a binary value")]
    NonBinaryGene(usize),
    #[error("An error occurred in the crossover operator '{0}': {1}")]
    CrossoverOperator(String, String),
    #[error("An error occurred in the mutation operator '{0}': {1}")]
    MutationOperator(String, String),
    #[error("An error occurred in the operator selector: {0}")]
    OperatorSelector(String),
    #[error("An error occurred in the survival operator '{0}': {1}")]
    SurvivalOperator(String, String),
    #[error("An error occurred when evaluating a solution: {0}")]
    Evaluation(String),
    #[error("An error occurred when initialising {0}: {1}")]
    AlgorithmInit(String, String),
    #[error("An error occurred when exporting the algorithm data: {0}")]
    AlgorithmExport(String),
}
