//! # mobga
//!
//! A Rust library implementing the Multi-Objective Binary Genetic Algorithm with Adaptive
//! Operator Selection (MOBGA-AOS) for feature selection. The algorithm evolves binary feature
//! masks to jointly minimise (1) the classification error reported by a user-supplied fitness
//! oracle and (2) the number of selected features, and returns the Pareto front of the trade-off.
//!
//! The library provides:
//!
//! - a pool of five binary crossover operators (single-point, two-point, uniform, shuffle and
//!   reduced surrogate) whose selection probabilities adapt during the search based on the
//!   dominance relation between children and their parents;
//! - bit-flip mutation with an all-zero repair, so that every evaluated mask selects at least one
//!   feature;
//! - NSGA2-style environmental selection (fast non-dominated sorting and crowding distance);
//! - a caching evaluation layer with an oracle-call budget, so that duplicated masks do not pay
//!   for a second evaluation.
//!
//! Runs are reproducible: all randomness flows from a single seedable generator.
//!
//! ## Example
//! ```rust,no_run
//! use std::error::Error;
//!
//! use mobga::algorithms::{MOBGAArg, MOBGA};
//! use mobga::core::{Chromosome, FitnessOracle};
//!
//! struct MyClassifier;
//!
//! impl FitnessOracle for MyClassifier {
//!     fn classification_error(&self, chromosome: &Chromosome) -> Result<f64, Box<dyn Error>> {
//!         // train and cross-validate a classifier on the features selected by `chromosome`,
//!         // then return the error as a percentage
//!         Ok(12.5)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     env_logger::init();
//!
//!     let args = MOBGAArg {
//!         population_size: 100,
//!         number_of_features: 30,
//!         crossover_rate: 0.9,
//!         mutation_rate: None,
//!         learning_period: 5,
//!         max_evaluations: 10000,
//!         seed: Some(1),
//!     };
//!     let mut algorithm = MOBGA::new(Box::new(MyClassifier), args)?;
//!     for individual in algorithm.run()? {
//!         println!("{individual}");
//!     }
//!     Ok(())
//! }
//! ```
pub mod algorithms;
pub mod core;
pub mod operators;
pub mod utils;
