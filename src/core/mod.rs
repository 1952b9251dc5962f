pub use chromosome::Chromosome;
pub use error::MobgaError;
pub use evaluator::{FitnessCache, FitnessOracle};
pub use individual::{Individual, ObjectivePair, Population, NUMBER_OF_OBJECTIVES};

pub mod chromosome;
pub mod error;
pub mod evaluator;
pub mod individual;
pub mod test_utils;
pub mod utils;
