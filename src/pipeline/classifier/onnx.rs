//! ONNX Runtime backend for an exported classifier.
//!
//! Expects `disease_model.onnx` with a single `[1, width]` float input whose
//! second output is the class-probability tensor (exported without a zipmap),
//! plus `classes.json` listing class labels in output order.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;

use super::{ClassifierError, ConditionModel, ONNX_CLASSES_FILE, ONNX_MODEL_FILE};

/// Index of the probability tensor among the session outputs.
const PROBABILITY_OUTPUT: usize = 1;

pub struct OnnxConditionModel {
    // ort::Session::run needs `&mut self`; the trait exposes `&self`.
    session: Mutex<Session>,
    classes: Vec<String>,
    width: usize,
}

impl OnnxConditionModel {
    pub fn load(model_dir: &Path, width: usize) -> Result<Self, ClassifierError> {
        let model_path = model_dir.join(ONNX_MODEL_FILE);
        let classes_path = model_dir.join(ONNX_CLASSES_FILE);

        if !model_path.exists() || !classes_path.exists() {
            return Err(ClassifierError::NotReady(model_dir.to_path_buf()));
        }

        let raw = std::fs::read_to_string(&classes_path).map_err(|source| {
            ClassifierError::ArtifactRead {
                path: classes_path.clone(),
                source,
            }
        })?;
        let classes: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| ClassifierError::ArtifactParse {
                path: classes_path.clone(),
                reason: e.to_string(),
            })?;

        let session = Session::builder()
            .map_err(|e: ort::Error| ClassifierError::ArtifactParse {
                path: model_path.clone(),
                reason: e.to_string(),
            })?
            .with_intra_threads(1)
            .map_err(|e: ort::Error| ClassifierError::ArtifactParse {
                path: model_path.clone(),
                reason: e.to_string(),
            })?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| ClassifierError::ArtifactParse {
                path: model_path.clone(),
                reason: format!("ONNX load failed: {e}"),
            })?;

        tracing::info!(
            model = %model_path.display(),
            classes = classes.len(),
            "ONNX classifier loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            classes,
            width,
        })
    }
}

impl ConditionModel for OnnxConditionModel {
    fn predict(&self, features: &[f32]) -> Result<String, ClassifierError> {
        use ort::value::TensorRef;

        if features.len() != self.width {
            return Err(ClassifierError::FeatureWidth {
                expected: self.width,
                actual: features.len(),
            });
        }

        let row = ndarray::Array2::from_shape_vec((1, self.width), features.to_vec())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let input = TensorRef::from_array_view(&row)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        if outputs.len() <= PROBABILITY_OUTPUT {
            return Err(missing_probability_output(outputs.len()));
        }

        let (shape, probabilities) = outputs[PROBABILITY_OUTPUT]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction: {e}")))?;

        if probabilities.len() != self.classes.len() {
            return Err(ClassifierError::Inference(format!(
                "Unexpected output shape: {shape:?}, expected [1, {}]",
                self.classes.len()
            )));
        }

        let best = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or(ClassifierError::NoSignal)?;

        Ok(self.classes[best].clone())
    }
}

fn missing_probability_output(count: usize) -> ClassifierError {
    ClassifierError::Inference(format!(
        "Model has {count} output(s); expected class probabilities at output {PROBABILITY_OUTPUT}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_output_model_is_an_inference_error() {
        let err = missing_probability_output(1);
        assert!(matches!(err, ClassifierError::Inference(_)));
        assert!(err.to_string().contains("1 output(s)"));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_artifacts_are_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OnnxConditionModel::load(dir.path(), 132),
            Err(ClassifierError::NotReady(_))
        ));
    }
}
