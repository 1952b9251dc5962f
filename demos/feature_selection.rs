use std::env;
use std::error::Error;
use std::path::PathBuf;

use mobga::algorithms::{MOBGAArg, MOBGA};
use mobga::core::{Chromosome, FitnessOracle};

/// A synthetic classification task with 30 candidate features, of which only the first 6 are
/// informative. Each missed informative feature costs 12% error and each selected noisy feature
/// adds 0.5%, so the Pareto front trades accuracy against mask size in a known way.
struct SyntheticClassifier {
    informative_features: usize,
}

impl FitnessOracle for SyntheticClassifier {
    fn classification_error(&self, chromosome: &Chromosome) -> Result<f64, Box<dyn Error>> {
        let informative_hits = chromosome
            .selected_features()
            .iter()
            .filter(|i| **i < self.informative_features)
            .count();
        let noisy_hits = chromosome.number_of_selected_features() - informative_hits;
        let error = 12.0 * (self.informative_features - informative_hits) as f64
            + 0.5 * noisy_hits as f64;
        Ok(error)
    }
}

/// Run the MOBGA-AOS feature selection on the synthetic task. Run it with:
///
///     cargo run --example feature_selection --release
///
/// Set the `RUST_LOG` environment variable to `info` (or `debug`) to follow the evolution.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let oracle = SyntheticClassifier {
        informative_features: 6,
    };
    let args = MOBGAArg {
        population_size: 100,
        number_of_features: 30,
        crossover_rate: 0.9,
        // defaults to one expected flip per mask
        mutation_rate: None,
        learning_period: 5,
        max_evaluations: 10000,
        seed: Some(1),
    };
    let mut algorithm = MOBGA::new(Box::new(oracle), args)?;

    let front = algorithm.run()?;
    println!(
        "Pareto front after {} oracle calls:",
        algorithm.number_of_function_evaluations()
    );
    for individual in &front {
        println!("  {individual}");
    }

    let destination = env::temp_dir().join(PathBuf::from("feature_selection.json"));
    algorithm.save_to_json(&destination)?;
    println!("Results exported to {}", destination.display());

    Ok(())
}
