//! Critical rule checker.
//!
//! Hard-coded emergency combinations evaluated before the classifier on every
//! terminal turn. When a rule fires the classifier is not consulted.

use serde::Serialize;

use super::{HEART_ATTACK, PARALYSIS, POTENTIAL_HEART_RISK};
use crate::models::{SymptomId, SymptomPattern, SymptomSet};

/// Which rule fired and the label it imposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalFinding {
    pub rule_id: &'static str,
    pub label: &'static str,
}

struct CriticalRule {
    id: &'static str,
    guard: SymptomPattern,
    label: &'static str,
}

// ── Rule registry ───────────────────────────────────────────

/// Ordered rule set. The combined chest rule precedes chest pain alone.
fn rules() -> Vec<CriticalRule> {
    vec![
        // CR-001: chest pain with breathlessness or sweating
        CriticalRule {
            id: "CR-001",
            guard: SymptomPattern {
                all_of: &[SymptomId::ChestPain],
                any_of: &[SymptomId::Breathlessness, SymptomId::Sweating],
                none_of: &[],
            },
            label: HEART_ATTACK,
        },
        // CR-002: chest pain alone
        CriticalRule {
            id: "CR-002",
            guard: SymptomPattern {
                all_of: &[SymptomId::ChestPain],
                any_of: &[],
                none_of: &[],
            },
            label: POTENTIAL_HEART_RISK,
        },
        // CR-003: one-sided weakness or altered sensorium
        CriticalRule {
            id: "CR-003",
            guard: SymptomPattern {
                all_of: &[],
                any_of: &[SymptomId::WeaknessOfOneBodySide, SymptomId::AlteredSensorium],
                none_of: &[],
            },
            label: PARALYSIS,
        },
    ]
}

/// First matching critical rule, or `None` to defer to the classifier.
pub fn check_critical(symptoms: &SymptomSet) -> Option<CriticalFinding> {
    let rule = rules().into_iter().find(|rule| rule.guard.matches(symptoms))?;

    tracing::warn!(
        rule_id = rule.id,
        prediction = rule.label,
        symptom_count = symptoms.len(),
        "Critical triage rule fired"
    );

    Some(CriticalFinding {
        rule_id: rule.id,
        label: rule.label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[SymptomId]) -> SymptomSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn chest_pain_with_breathlessness_is_heart_attack() {
        let finding = check_critical(&set(&[SymptomId::ChestPain, SymptomId::Breathlessness])).unwrap();
        assert_eq!(finding.rule_id, "CR-001");
        assert_eq!(finding.label, "Heart attack");
    }

    #[test]
    fn chest_pain_with_sweating_is_heart_attack() {
        let finding = check_critical(&set(&[SymptomId::ChestPain, SymptomId::Sweating])).unwrap();
        assert_eq!(finding.label, HEART_ATTACK);
    }

    #[test]
    fn chest_pain_alone_is_potential_risk() {
        let finding = check_critical(&set(&[SymptomId::ChestPain, SymptomId::Cough])).unwrap();
        assert_eq!(finding.rule_id, "CR-002");
        assert_eq!(finding.label, "Potential Heart Risk");
    }

    #[test]
    fn chest_rules_take_precedence_over_paralysis() {
        let finding = check_critical(&set(&[
            SymptomId::ChestPain,
            SymptomId::WeaknessOfOneBodySide,
        ]))
        .unwrap();
        assert_eq!(finding.label, POTENTIAL_HEART_RISK);
    }

    #[test]
    fn one_sided_weakness_is_paralysis() {
        let finding = check_critical(&set(&[SymptomId::WeaknessOfOneBodySide, SymptomId::Headache])).unwrap();
        assert_eq!(finding.rule_id, "CR-003");
        assert_eq!(finding.label, "Paralysis (brain hemorrhage)");
    }

    #[test]
    fn altered_sensorium_is_paralysis() {
        let finding = check_critical(&set(&[SymptomId::AlteredSensorium])).unwrap();
        assert_eq!(finding.label, PARALYSIS);
    }

    #[test]
    fn routine_symptoms_defer_to_classifier() {
        assert!(check_critical(&set(&[SymptomId::Cough, SymptomId::HighFever])).is_none());
        assert!(check_critical(&SymptomSet::new()).is_none());
    }
}
