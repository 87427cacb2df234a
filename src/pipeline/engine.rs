//! Conversation orchestrator.
//!
//! One call per user turn. The engine holds no conversation state: the caller
//! supplies the persisted symptom set, state and title, and persists what
//! comes back.
//!
//! Turn order: extract and merge symptoms, read a pending clarification
//! answer, maybe ask a question (only from `started`), re-prompt on an empty
//! set, then critical rules or classifier plus safety override, then the
//! knowledge-base lookup.

use super::classifier::{self, ModelHandle};
use super::clarification::{apply_clarification_answer, next_question};
use super::knowledge::{severity_tier, KnowledgeBase};
use super::lexicon::extract_symptoms;
use super::safety::{apply_safety_override, check_critical};
use super::types::{
    Diagnosis, EngineError, Prediction, Reply, TurnInput, TurnResult, FALLBACK_TEXT,
    NOT_READY_TEXT, REPROMPT_TEXT,
};
use crate::models::{ConversationState, PredictionSource, SymptomSet};

pub struct TriageEngine {
    models: ModelHandle,
    knowledge: KnowledgeBase,
}

impl TriageEngine {
    pub fn new(models: ModelHandle, knowledge: KnowledgeBase) -> Self {
        Self { models, knowledge }
    }

    pub fn is_ready(&self) -> bool {
        self.models.is_ready()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Run one turn, mapping failures onto designed replies.
    ///
    /// Missing model artifacts give a `NotReady` reply that keeps this turn's
    /// symptoms. Any other failure gives a `Fallback` reply carrying the input
    /// symptoms and state untouched, so nothing partial gets persisted.
    pub fn process_turn(&self, input: &TurnInput) -> TurnResult {
        match self.try_process_turn(input) {
            Ok(result) => result,
            Err(e) if e.is_transient() => {
                tracing::info!(error = %e, "Classifier not ready");
                let (symptoms, state) = self.absorb(input);
                TurnResult {
                    reply: Reply::NotReady {
                        text: NOT_READY_TEXT.into(),
                    },
                    symptoms,
                    state,
                    title: input.title.clone(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, state = %input.state, "Triage turn failed");
                TurnResult {
                    reply: Reply::Fallback {
                        text: FALLBACK_TEXT.into(),
                    },
                    symptoms: input.symptoms.clone(),
                    state: input.state,
                    title: input.title.clone(),
                }
            }
        }
    }

    /// Run one turn, returning classifier failures to the caller.
    pub fn try_process_turn(&self, input: &TurnInput) -> Result<TurnResult, EngineError> {
        let (symptoms, state) = self.absorb(input);

        if input.state == ConversationState::Started {
            if let Some(question) = next_question(&symptoms) {
                tracing::info!(
                    rule_id = question.rule_id,
                    next_state = %question.next_state,
                    symptom_count = symptoms.len(),
                    "Asking clarifying question"
                );
                return Ok(TurnResult {
                    reply: Reply::Question {
                        text: question.question.into(),
                        options: question.options.iter().map(|o| o.to_string()).collect(),
                        next_state: question.next_state,
                    },
                    symptoms,
                    state: question.next_state,
                    title: input.title.clone(),
                });
            }
        }

        if symptoms.is_empty() {
            tracing::debug!(state = %state, "No symptoms recognised, asking to rephrase");
            return Ok(TurnResult {
                reply: Reply::Reprompt {
                    text: REPROMPT_TEXT.into(),
                },
                symptoms,
                state,
                title: input.title.clone(),
            });
        }

        let prediction = self.predict(&symptoms)?;
        let diagnosis = self.assemble(prediction);
        let title = input
            .title
            .clone()
            .or_else(|| Some(diagnosis.prediction.clone()));

        tracing::info!(
            prediction = %diagnosis.prediction,
            source = %diagnosis.source,
            severity = %diagnosis.severity,
            symptom_count = symptoms.len(),
            "Triage turn diagnosed"
        );

        Ok(TurnResult {
            reply: Reply::Diagnosis(diagnosis),
            symptoms,
            state: ConversationState::Diagnosed,
            title,
        })
    }

    /// Merge this turn's text into the persisted symptoms and resolve a
    /// pending question. Deterministic in `input`.
    fn absorb(&self, input: &TurnInput) -> (SymptomSet, ConversationState) {
        let known = self.known_symptoms();

        let mut symptoms = input.symptoms.clone();
        let added = symptoms.merge(&extract_symptoms(&input.text, &known));

        let mut state = input.state;
        if state.is_awaiting() {
            let answered = symptoms.merge(&apply_clarification_answer(state, &input.text, &known));
            tracing::debug!(from = %state, answered, "Clarification answer applied");
            state = ConversationState::Active;
        }

        tracing::debug!(added, total = symptoms.len(), "Symptoms merged");
        (symptoms, state)
    }

    /// Columns the model accepts. Before the model is available every
    /// canonical symptom counts, so critical rules still see the evidence.
    fn known_symptoms(&self) -> SymptomSet {
        match self.models.get() {
            Ok(artifacts) => artifacts.columns.known_symptoms(),
            Err(_) => SymptomSet::all(),
        }
    }

    fn predict(&self, symptoms: &SymptomSet) -> Result<Prediction, EngineError> {
        if let Some(finding) = check_critical(symptoms) {
            return Ok(Prediction {
                label: finding.label.to_string(),
                source: PredictionSource::CriticalRule,
            });
        }

        let artifacts = self.models.get()?;
        let label = classifier::classify(symptoms, &artifacts)?;
        Ok(apply_safety_override(&label, symptoms))
    }

    fn assemble(&self, prediction: Prediction) -> Diagnosis {
        let detail = self.knowledge.details_for(&prediction.label);
        let specialist = self.knowledge.specialist_for(&prediction.label).to_string();
        let severity = severity_tier(&prediction.label);

        Diagnosis {
            prediction: prediction.label,
            source: prediction.source,
            detail,
            specialist,
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{SeverityTier, SymptomId};
    use crate::pipeline::classifier::{FailingModel, FeatureColumns, FixedModel};
    use crate::pipeline::lexicon::lexicon;

    fn engine_with(label: &str) -> (TriageEngine, Arc<FixedModel>) {
        let model = Arc::new(FixedModel::new(label));
        let handle = ModelHandle::preloaded(FeatureColumns::reference(), Arc::clone(&model));
        (TriageEngine::new(handle, KnowledgeBase::builtin()), model)
    }

    fn sample_engine() -> TriageEngine {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/model");
        TriageEngine::new(ModelHandle::from_dir(dir), KnowledgeBase::builtin())
    }

    fn set(ids: &[SymptomId]) -> SymptomSet {
        ids.iter().copied().collect()
    }

    fn diagnosis(result: &TurnResult) -> &Diagnosis {
        match &result.reply {
            Reply::Diagnosis(d) => d,
            other => panic!("expected diagnosis, got {other:?}"),
        }
    }

    #[test]
    fn chest_pain_and_sweating_is_heart_attack_without_classifier() {
        let (engine, model) = engine_with("Common Cold");
        let result = engine.process_turn(&TurnInput::fresh("I have chest pain and I'm sweating a lot"));

        assert_eq!(result.symptoms, set(&[SymptomId::ChestPain, SymptomId::Sweating]));
        let d = diagnosis(&result);
        assert_eq!(d.prediction, "Heart attack");
        assert_eq!(d.source, PredictionSource::CriticalRule);
        assert_eq!(d.specialist, "Cardiologist");
        assert_eq!(d.severity, SeverityTier::Critical);
        assert_eq!(model.calls(), 0);
        assert_eq!(result.state, ConversationState::Diagnosed);
        assert_eq!(result.title.as_deref(), Some("Heart attack"));
    }

    #[test]
    fn chest_pain_and_breathlessness_never_consults_classifier() {
        let (engine, model) = engine_with("Common Cold");
        let result = engine.process_turn(&TurnInput::fresh("chest pain and I can't catch my breath"));
        assert_eq!(diagnosis(&result).prediction, "Heart attack");
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn one_sided_weakness_is_paralysis_regardless_of_classifier() {
        let (engine, model) = engine_with("Common Cold");
        let input = TurnInput {
            text: "still the same".into(),
            symptoms: set(&[SymptomId::WeaknessOfOneBodySide]),
            state: ConversationState::Active,
            title: None,
        };
        let result = engine.process_turn(&input);
        assert_eq!(diagnosis(&result).prediction, "Paralysis (brain hemorrhage)");
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn unrecognised_text_reprompts() {
        let (engine, model) = engine_with("Common Cold");
        let result = engine.process_turn(&TurnInput::fresh("I feel a bit off"));
        assert!(matches!(result.reply, Reply::Reprompt { .. }));
        assert!(result.symptoms.is_empty());
        assert_eq!(result.state, ConversationState::Started);
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn fever_and_shivering_asks_malaria_question() {
        let (engine, model) = engine_with("Malaria");
        let result = engine.process_turn(&TurnInput::fresh("I have a fever and I'm shivering"));

        assert_eq!(result.symptoms, set(&[SymptomId::HighFever, SymptomId::Chills]));
        match &result.reply {
            Reply::Question { options, next_state, .. } => {
                assert_eq!(*next_state, ConversationState::AwaitingMalariaClarification);
                assert_eq!(options, &vec!["Yes Body Ache".to_string(), "Yes Sweating".into(), "No".into()]);
            }
            other => panic!("expected question, got {other:?}"),
        }
        assert_eq!(result.state, ConversationState::AwaitingMalariaClarification);
        assert!(result.title.is_none());
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn malaria_answer_adds_muscle_pain_and_classifies_same_turn() {
        let (engine, model) = engine_with("Malaria");
        let input = TurnInput {
            text: "yes I have body ache".into(),
            symptoms: set(&[SymptomId::HighFever, SymptomId::Chills]),
            state: ConversationState::AwaitingMalariaClarification,
            title: None,
        };
        let result = engine.process_turn(&input);

        assert!(result.symptoms.contains(SymptomId::MusclePain));
        assert_eq!(diagnosis(&result).prediction, "Malaria");
        assert_eq!(model.calls(), 1);
        assert_eq!(result.state, ConversationState::Diagnosed);
        assert_eq!(result.title.as_deref(), Some("Malaria"));
    }

    #[test]
    fn negative_answer_still_advances_and_classifies() {
        let (engine, model) = engine_with("Malaria");
        let input = TurnInput {
            text: "No".into(),
            symptoms: set(&[SymptomId::HighFever, SymptomId::Chills]),
            state: ConversationState::AwaitingMalariaClarification,
            title: None,
        };
        let result = engine.process_turn(&input);
        assert_eq!(result.symptoms.len(), 2);
        assert_eq!(diagnosis(&result).prediction, "Malaria");
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn only_one_question_per_conversation() {
        let (engine, model) = engine_with("Migraine");
        let input = TurnInput {
            text: "my head hurts".into(),
            symptoms: set(&[SymptomId::Cough]),
            state: ConversationState::Active,
            title: None,
        };
        let result = engine.process_turn(&input);
        assert_eq!(diagnosis(&result).prediction, "Migraine");
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn heart_attack_without_chest_pain_is_overridden() {
        let (engine, _) = engine_with("Heart attack");
        let result = engine.process_turn(&TurnInput::fresh("I keep vomiting and sweating"));
        let d = diagnosis(&result);
        assert_eq!(d.prediction, "Gastritis or Anxiety");
        assert_eq!(d.source, PredictionSource::SafetyOverride);
        assert_eq!(d.specialist, "Gastroenterologist");
        assert_eq!(d.severity, SeverityTier::Routine);
        assert!(d.detail.reference_link.contains("Gastritis+or+Anxiety"));
    }

    #[test]
    fn title_is_frozen_to_first_diagnosis() {
        let (engine, _) = engine_with("Common Cold");
        let input = TurnInput {
            text: "now I have a cough too".into(),
            symptoms: set(&[SymptomId::HighFever, SymptomId::Chills, SymptomId::MusclePain]),
            state: ConversationState::Diagnosed,
            title: Some("Malaria".into()),
        };
        let result = engine.process_turn(&input);
        assert_eq!(diagnosis(&result).prediction, "Common Cold");
        assert_eq!(result.title.as_deref(), Some("Malaria"));
        assert_eq!(result.state, ConversationState::Diagnosed);
    }

    #[test]
    fn symptom_set_never_shrinks_across_turns() {
        let (engine, _) = engine_with("Malaria");
        let turns = [
            "I have a fever and I'm shivering",
            "yes I have body ache",
            "I feel a bit off",
            "and a cough",
        ];
        let mut input = TurnInput::default();
        let mut previous = 0;
        for text in turns {
            input.text = text.into();
            let result = engine.process_turn(&input);
            assert!(result.symptoms.len() >= previous);
            previous = result.symptoms.len();
            input.symptoms = result.symptoms;
            input.state = result.state;
            input.title = result.title;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn repeating_a_turn_is_idempotent_on_symptoms() {
        let (engine, _) = engine_with("Common Cold");
        let input = TurnInput {
            text: "cough and sneezing".into(),
            symptoms: SymptomSet::new(),
            state: ConversationState::Active,
            title: None,
        };
        let once = engine.process_turn(&input);
        let again = engine.process_turn(&TurnInput {
            symptoms: once.symptoms.clone(),
            ..input
        });
        assert_eq!(once.symptoms, again.symptoms);
    }

    #[test]
    fn missing_model_is_not_ready_and_keeps_symptoms() {
        let engine = TriageEngine::new(ModelHandle::unavailable(), KnowledgeBase::builtin());
        let input = TurnInput {
            text: "I have a cough".into(),
            symptoms: SymptomSet::new(),
            state: ConversationState::Active,
            title: None,
        };
        assert!(engine.try_process_turn(&input).err().unwrap().is_transient());

        let result = engine.process_turn(&input);
        assert!(matches!(result.reply, Reply::NotReady { .. }));
        assert_eq!(result.symptoms, set(&[SymptomId::Cough]));
        assert!(!result.is_fallback());
    }

    #[test]
    fn critical_rules_work_before_model_is_ready() {
        let engine = TriageEngine::new(ModelHandle::unavailable(), KnowledgeBase::builtin());
        let result = engine.process_turn(&TurnInput::fresh("chest pain and sweating"));
        assert_eq!(diagnosis(&result).prediction, "Heart attack");
    }

    #[test]
    fn classifier_failure_falls_back_without_state_change() {
        let handle = ModelHandle::preloaded(FeatureColumns::reference(), FailingModel);
        let engine = TriageEngine::new(handle, KnowledgeBase::builtin());
        let input = TurnInput {
            text: "I have a cough".into(),
            symptoms: set(&[SymptomId::Itching]),
            state: ConversationState::AwaitingFeverClarification,
            title: None,
        };
        let result = engine.process_turn(&input);
        assert!(result.is_fallback());
        assert_eq!(result.symptoms, input.symptoms);
        assert_eq!(result.state, input.state);
    }

    #[test]
    fn extraction_respects_model_columns() {
        let model = Arc::new(FixedModel::new("Common Cold"));
        let handle = ModelHandle::preloaded(
            FeatureColumns::new(vec!["cough".into()]),
            Arc::clone(&model),
        );
        let engine = TriageEngine::new(handle, KnowledgeBase::builtin());
        let input = TurnInput {
            text: "cough and sneezing".into(),
            symptoms: SymptomSet::new(),
            state: ConversationState::Active,
            title: None,
        };
        let result = engine.process_turn(&input);
        assert_eq!(result.symptoms, set(&[SymptomId::Cough]));
        assert_eq!(model.calls(), 1);
    }

    // ── Bundled sample artifacts ────────────────────────────

    #[test]
    fn sample_model_diagnoses_every_lexicon_symptom_alone() {
        let engine = sample_engine();
        for entry in lexicon() {
            let input = TurnInput {
                text: String::new(),
                symptoms: set(&[entry.symptom]),
                state: ConversationState::Active,
                title: None,
            };
            let result = engine.process_turn(&input);
            assert!(
                matches!(result.reply, Reply::Diagnosis(_)),
                "{:?} alone gave {:?}",
                entry.symptom,
                result.reply
            );
            assert_eq!(result.symptoms, input.symptoms);
            assert_eq!(result.state, ConversationState::Diagnosed);
        }
    }

    #[test]
    fn sample_model_keeps_neck_and_weight_reports() {
        let engine = sample_engine();
        let cases = [
            ("my neck hurts", SymptomId::NeckPain, "Cervical spondylosis"),
            ("I gained weight", SymptomId::WeightGain, "Hypothyroidism"),
        ];
        for (text, symptom, label) in cases {
            let result = engine.process_turn(&TurnInput::fresh(text));
            assert_eq!(result.symptoms, set(&[symptom]));
            assert_eq!(diagnosis(&result).prediction, label);
            assert_eq!(diagnosis(&result).source, PredictionSource::Classifier);
            assert_eq!(result.title.as_deref(), Some(label));
        }
    }

    #[test]
    fn sample_model_critical_scenario() {
        let engine = sample_engine();
        let result = engine.process_turn(&TurnInput::fresh("I have chest pain and I'm sweating a lot"));
        assert_eq!(result.symptoms, set(&[SymptomId::ChestPain, SymptomId::Sweating]));
        let d = diagnosis(&result);
        assert_eq!(d.prediction, "Heart attack");
        assert_eq!(d.source, PredictionSource::CriticalRule);
        assert_eq!(d.specialist, "Cardiologist");
        assert_eq!(d.severity, SeverityTier::Critical);
    }

    #[test]
    fn sample_model_reprompts_on_unrecognised_text() {
        let engine = sample_engine();
        let result = engine.process_turn(&TurnInput::fresh("I feel a bit off"));
        assert!(matches!(result.reply, Reply::Reprompt { .. }));
        assert!(result.symptoms.is_empty());
    }

    #[test]
    fn sample_model_malaria_conversation() {
        let engine = sample_engine();
        let first = engine.process_turn(&TurnInput::fresh("I have a fever and I'm shivering"));
        assert_eq!(first.symptoms, set(&[SymptomId::HighFever, SymptomId::Chills]));
        assert_eq!(first.state, ConversationState::AwaitingMalariaClarification);
        assert!(matches!(first.reply, Reply::Question { .. }));

        let second = engine.process_turn(&TurnInput {
            text: "yes I have body ache".into(),
            symptoms: first.symptoms,
            state: first.state,
            title: first.title,
        });
        assert!(second.symptoms.contains(SymptomId::MusclePain));
        let d = diagnosis(&second);
        assert_eq!(d.prediction, "Malaria");
        assert_eq!(d.source, PredictionSource::Classifier);
        assert_eq!(second.state, ConversationState::Diagnosed);
    }
}
