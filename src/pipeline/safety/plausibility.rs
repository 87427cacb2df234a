//! Safety override: plausibility clamp on classifier output.
//!
//! The classifier can produce a severe label from sparse input. When the
//! label's defining symptoms are missing from the evidence, it is replaced by
//! a milder, more plausible one. Applied only on the classifier path.

use super::{GASTRITIS_OR_ANXIETY, HEART_ATTACK, MIGRAINE, PARALYSIS, VIRAL_FEVER};
use crate::models::{PredictionSource, SymptomId, SymptomSet};
use crate::pipeline::types::Prediction;

static PARALYSIS_DEFINING: &[SymptomId] = &[
    SymptomId::WeaknessOfOneBodySide,
    SymptomId::AlteredSensorium,
];

/// Clamp a classifier label against the symptoms actually reported.
pub fn apply_safety_override(label: &str, symptoms: &SymptomSet) -> Prediction {
    let replacement = if label == PARALYSIS && !symptoms.contains_any(PARALYSIS_DEFINING) {
        Some(if symptoms.contains(SymptomId::Headache) {
            MIGRAINE
        } else {
            VIRAL_FEVER
        })
    } else if label == HEART_ATTACK && !symptoms.contains(SymptomId::ChestPain) {
        Some(GASTRITIS_OR_ANXIETY)
    } else {
        None
    };

    match replacement {
        Some(relabel) => {
            tracing::warn!(
                predicted = label,
                relabelled = relabel,
                "Safety override relabelled classifier output"
            );
            Prediction {
                label: relabel.to_string(),
                source: PredictionSource::SafetyOverride,
            }
        }
        None => Prediction {
            label: label.to_string(),
            source: PredictionSource::Classifier,
        },
    }
}
