use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ClassifierError, ConditionModel};

/// Model that always predicts the same label and counts its invocations.
pub struct FixedModel {
    label: String,
    calls: AtomicUsize,
}

impl FixedModel {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConditionModel for FixedModel {
    fn predict(&self, _features: &[f32]) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label.clone())
    }
}

/// Model whose every prediction fails.
pub struct FailingModel;

impl ConditionModel for FailingModel {
    fn predict(&self, _features: &[f32]) -> Result<String, ClassifierError> {
        Err(ClassifierError::Inference("simulated inference failure".into()))
    }
}
