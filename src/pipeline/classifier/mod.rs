//! Classifier adapter.
//!
//! Turns a symptom set into the model's fixed-width feature vector and asks
//! the model for a single condition label. Model artifacts sit behind an
//! explicitly owned [`ModelHandle`] that loads them lazily on first use.

pub mod features;
pub mod handle;
pub mod mock;
pub mod profile;

#[cfg(feature = "onnx-classifier")]
pub mod onnx;

pub use features::FeatureColumns;
pub use handle::{ModelArtifacts, ModelHandle};
pub use mock::{FailingModel, FixedModel};
pub use profile::{ConditionProfile, ProfileMatchModel};

#[cfg(feature = "onnx-classifier")]
pub use onnx::OnnxConditionModel;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::SymptomSet;

/// Feature-column layout, one JSON array of names.
pub const COLUMNS_FILE: &str = "symptom_columns.json";
/// Portable profile-matching model.
pub const PROFILES_FILE: &str = "condition_profiles.json";
/// Exported classifier and its class labels (feature `onnx-classifier`).
pub const ONNX_MODEL_FILE: &str = "disease_model.onnx";
pub const ONNX_CLASSES_FILE: &str = "classes.json";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model artifacts not available in {0}")]
    NotReady(PathBuf),

    #[error("Failed to read {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact {path}: {reason}")]
    ArtifactParse { path: PathBuf, reason: String },

    #[error("Feature vector width {actual} does not match model width {expected}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("No condition matches the reported symptoms")]
    NoSignal,
}

impl ClassifierError {
    /// Only missing artifacts are expected to resolve by retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

/// A trained multi-class model: one feature row in, one label out.
pub trait ConditionModel: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<String, ClassifierError>;
}

/// Lets a test keep a handle on the model it hands to the engine.
impl<M: ConditionModel + ?Sized> ConditionModel for std::sync::Arc<M> {
    fn predict(&self, features: &[f32]) -> Result<String, ClassifierError> {
        (**self).predict(features)
    }
}

/// Predict a condition label for the given symptoms.
pub fn classify(symptoms: &SymptomSet, artifacts: &ModelArtifacts) -> Result<String, ClassifierError> {
    let vector = artifacts.columns.vectorize(symptoms);
    let label = artifacts.model.predict(&vector)?;

    tracing::debug!(
        active_features = vector.iter().filter(|v| **v > 0.0).count(),
        width = vector.len(),
        prediction = %label,
        "Classifier prediction"
    );

    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymptomId;

    struct EchoWidth;

    impl ConditionModel for EchoWidth {
        fn predict(&self, features: &[f32]) -> Result<String, ClassifierError> {
            let active = features.iter().filter(|v| **v == 1.0).count();
            Ok(format!("{}/{}", active, features.len()))
        }
    }

    #[test]
    fn classify_feeds_vector_sized_to_columns() {
        let artifacts = ModelArtifacts {
            columns: FeatureColumns::new(vec!["cough".into(), "headache".into(), "itching".into()]),
            model: Box::new(EchoWidth),
        };
        let symptoms: SymptomSet = [SymptomId::Cough, SymptomId::Itching, SymptomId::ChestPain]
            .into_iter()
            .collect();
        assert_eq!(classify(&symptoms, &artifacts).unwrap(), "2/3");
    }

    #[test]
    fn only_not_ready_is_transient() {
        assert!(ClassifierError::NotReady(PathBuf::from("/tmp")).is_transient());
        assert!(!ClassifierError::NoSignal.is_transient());
        assert!(!ClassifierError::FeatureWidth { expected: 2, actual: 1 }.is_transient());
    }
}
