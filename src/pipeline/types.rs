use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::ClassifierError;
use crate::models::{ConditionDetail, ConversationState, PredictionSource, SeverityTier, SymptomSet};

pub const REPROMPT_TEXT: &str = "I couldn't detect specific symptoms in that message. Could you describe your symptoms differently? (e.g., 'I have a headache and fever')";
pub const NOT_READY_TEXT: &str = "System is initializing. Please try again in 10 seconds.";
pub const FALLBACK_TEXT: &str =
    "I'm having trouble thinking right now. Please try again in a moment.";

// ═══════════════════════════════════════════════════════════
// Turn boundary
// ═══════════════════════════════════════════════════════════

/// Everything one turn needs. The caller owns persistence and re-supplies
/// the symptom set, state and title on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnInput {
    pub text: String,
    pub symptoms: SymptomSet,
    pub state: ConversationState,
    /// Display title; `None` until the first diagnosis.
    pub title: Option<String>,
}

impl TurnInput {
    /// First turn of a new conversation.
    pub fn fresh(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Engine output for one turn, with the state to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub reply: Reply,
    pub symptoms: SymptomSet,
    pub state: ConversationState,
    pub title: Option<String>,
}

impl TurnResult {
    /// True when the caller must not persist `symptoms`/`state`.
    pub fn is_fallback(&self) -> bool {
        matches!(self.reply, Reply::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Clarifying question; the turn stops before classification.
    Question {
        text: String,
        options: Vec<String>,
        next_state: ConversationState,
    },
    Diagnosis(Diagnosis),
    /// Nothing recognisable yet; ask the user to rephrase.
    Reprompt { text: String },
    /// Model artifacts not available yet; retry shortly.
    NotReady { text: String },
    /// Unexpected failure; nothing from this turn should be persisted.
    Fallback { text: String },
}

impl Reply {
    /// Plain-text rendering used for the stored bot message.
    pub fn display_text(&self) -> String {
        match self {
            Self::Question { text, .. }
            | Self::Reprompt { text }
            | Self::NotReady { text }
            | Self::Fallback { text } => text.clone(),
            Self::Diagnosis(d) => format!(
                "Analysis Result: {}\n\n{}\n\nCauses: {}\nRisk if ignored: {}\nImmediate action: {}\nRecommended specialist: {}\nLearn more: {}",
                d.prediction,
                d.detail.description,
                d.detail.causes,
                d.detail.risk,
                d.detail.recommended_action,
                d.specialist,
                d.detail.reference_link,
            ),
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Self::Question { options, .. } => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub prediction: String,
    pub source: PredictionSource,
    pub detail: ConditionDetail,
    pub specialist: String,
    pub severity: SeverityTier,
}

/// A condition label and the layer that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub source: PredictionSource,
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

impl EngineError {
    /// Transient errors should be retried by the caller, not reported as failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Classifier(e) => e.is_transient(),
        }
    }
}
