pub use adaptive::AdaptiveOperatorSelector;
pub use comparison::{ParetoDominance, PreferredSolution};
pub use crossover::{CrossoverChildren, CrossoverOperator, CrossoverPool};
pub use mutation::BitFlipMutation;

pub mod adaptive;
pub mod comparison;
pub mod crossover;
pub mod mutation;
