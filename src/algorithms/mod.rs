pub use mobga::{AlgorithmExport, MOBGAArg, MOBGA};

pub mod mobga;
