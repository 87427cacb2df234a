//! Clarification policy.
//!
//! Ordered table of guarded follow-up questions, first match wins. The
//! orchestrator only asks when the conversation is still in `started`, so a
//! consultation sees at most one question. Answers are read back with a small
//! keyword map owned by the awaiting state.

use serde::Serialize;

use crate::models::{ConversationState, SymptomId, SymptomPattern, SymptomSet};

/// A disambiguating question to put to the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClarifyingQuestion {
    pub rule_id: &'static str,
    pub question: &'static str,
    pub options: &'static [&'static str],
    pub next_state: ConversationState,
}

struct ClarificationRule {
    /// Unique identifier for the audit trail.
    id: &'static str,
    guard: SymptomPattern,
    question: &'static str,
    options: &'static [&'static str],
    next_state: ConversationState,
}

// ── Rule registry ───────────────────────────────────────────

/// Symptoms that already point at a migraine; a headache with one of these
/// needs no location question.
static MIGRAINE_MARKERS: &[SymptomId] = &[
    SymptomId::VisualDisturbances,
    SymptomId::BlurredAndDistortedVision,
];

fn rules() -> Vec<ClarificationRule> {
    vec![
        // CLR-001: chest pain without breathing/sweating detail
        ClarificationRule {
            id: "CLR-001",
            guard: SymptomPattern {
                all_of: &[SymptomId::ChestPain],
                any_of: &[],
                none_of: &[SymptomId::Breathlessness, SymptomId::Sweating],
            },
            question: "Chest pain can be serious. Are you experiencing difficulty breathing or sweating?",
            options: &["Yes Difficulty Breathing", "Yes Sweating", "No just Pain"],
            next_state: ConversationState::AwaitingChestClarification,
        },
        // CLR-002: fever with chills, body aches unknown
        ClarificationRule {
            id: "CLR-002",
            guard: SymptomPattern {
                all_of: &[SymptomId::HighFever, SymptomId::Chills],
                any_of: &[],
                none_of: &[SymptomId::MusclePain],
            },
            question: "With fever and chills, do you also have body aches or excessive sweating?",
            options: &["Yes Body Ache", "Yes Sweating", "No"],
            next_state: ConversationState::AwaitingMalariaClarification,
        },
        // CLR-003: frequent urination or constant hunger
        ClarificationRule {
            id: "CLR-003",
            guard: SymptomPattern {
                all_of: &[],
                any_of: &[SymptomId::Polyuria, SymptomId::ExcessiveHunger],
                none_of: &[],
            },
            question: "Have you noticed sudden weight loss or blurry vision?",
            options: &["Yes Weight Loss", "Yes Blurry Vision", "No"],
            next_state: ConversationState::AwaitingDiabetesClarification,
        },
        // CLR-004: headache with no migraine marker yet
        ClarificationRule {
            id: "CLR-004",
            guard: SymptomPattern {
                all_of: &[SymptomId::Headache],
                any_of: &[],
                none_of: MIGRAINE_MARKERS,
            },
            question: "To help me pinpoint the cause, where exactly is the pain?",
            options: &["Forehead (Sinus)", "One Side (Migraine)", "Back of Head", "All Over"],
            next_state: ConversationState::AwaitingHeadacheClarification,
        },
        // CLR-005: fever without rash
        ClarificationRule {
            id: "CLR-005",
            guard: SymptomPattern {
                all_of: &[SymptomId::HighFever],
                any_of: &[],
                none_of: &[SymptomId::SkinRash],
            },
            question: "Are you also shivering or do you see a rash?",
            options: &["Yes Shivering", "No", "I have a Rash too"],
            next_state: ConversationState::AwaitingFeverClarification,
        },
    ]
}

/// Decide whether the accumulated symptoms call for a follow-up question.
///
/// Pure: the caller decides whether the question is actually asked.
pub fn next_question(symptoms: &SymptomSet) -> Option<ClarifyingQuestion> {
    rules()
        .into_iter()
        .find(|rule| rule.guard.matches(symptoms))
        .map(|rule| ClarifyingQuestion {
            rule_id: rule.id,
            question: rule.question,
            options: rule.options,
            next_state: rule.next_state,
        })
}

// ── Answer mapping ──────────────────────────────────────────

static CHEST_ANSWERS: &[(&str, SymptomId)] = &[
    ("breath", SymptomId::Breathlessness),
    ("sweat", SymptomId::Sweating),
];

static MALARIA_ANSWERS: &[(&str, SymptomId)] = &[
    ("sweat", SymptomId::Sweating),
    ("ache", SymptomId::MusclePain),
];

static DIABETES_ANSWERS: &[(&str, SymptomId)] = &[
    ("weight", SymptomId::WeightLoss),
    ("blur", SymptomId::BlurredAndDistortedVision),
    ("vision", SymptomId::BlurredAndDistortedVision),
];

static HEADACHE_ANSWERS: &[(&str, SymptomId)] = &[
    ("forehead", SymptomId::SinusPressure),
    ("sinus", SymptomId::SinusPressure),
    ("one side", SymptomId::VisualDisturbances),
    ("migraine", SymptomId::VisualDisturbances),
    ("back of head", SymptomId::StiffNeck),
];

static FEVER_ANSWERS: &[(&str, SymptomId)] = &[
    ("shiver", SymptomId::Chills),
    ("rash", SymptomId::SkinRash),
];

fn answer_map(state: ConversationState) -> &'static [(&'static str, SymptomId)] {
    match state {
        ConversationState::AwaitingChestClarification => CHEST_ANSWERS,
        ConversationState::AwaitingMalariaClarification => MALARIA_ANSWERS,
        ConversationState::AwaitingDiabetesClarification => DIABETES_ANSWERS,
        ConversationState::AwaitingHeadacheClarification => HEADACHE_ANSWERS,
        ConversationState::AwaitingFeverClarification => FEVER_ANSWERS,
        ConversationState::Started | ConversationState::Active | ConversationState::Diagnosed => {
            &[]
        }
    }
}

/// Read an answer given while a question is pending.
///
/// Returns the symptoms the answer adds, restricted to `known`. Empty for
/// non-awaiting states and for answers that match nothing ("No").
pub fn apply_clarification_answer(
    state: ConversationState,
    text: &str,
    known: &SymptomSet,
) -> SymptomSet {
    let lower = text.to_lowercase();

    answer_map(state)
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, symptom)| *symptom)
        .filter(|symptom| known.contains(*symptom))
        .collect()
}
