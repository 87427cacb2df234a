pub mod classifier;
pub mod clarification;
pub mod engine;
pub mod knowledge;
pub mod lexicon;
pub mod safety;
pub mod types;

pub use engine::TriageEngine;
pub use types::*;
