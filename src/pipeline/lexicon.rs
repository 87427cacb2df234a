//! Symptom lexicon and keyword extractor.
//!
//! Maps free text onto canonical symptom identifiers by case-insensitive
//! substring search. Every phrase list is tried in order; the first phrase
//! found adds the symptom. Symptoms are matched independently, so one word
//! may raise several of them ("burning stomach" raises acidity and
//! stomach_pain).

use crate::models::{SymptomId, SymptomSet};

/// Keyword phrases for one canonical symptom.
pub struct LexiconEntry {
    pub symptom: SymptomId,
    pub phrases: &'static [&'static str],
}

// ── Lexicon table ───────────────────────────────────────────

static LEXICON: &[LexiconEntry] = &[
    // General
    LexiconEntry {
        symptom: SymptomId::HighFever,
        phrases: &["fever", "high temp", "hot", "temperature", "burning up"],
    },
    LexiconEntry {
        symptom: SymptomId::MildFever,
        phrases: &["mild fever", "low fever", "slightly warm"],
    },
    LexiconEntry {
        symptom: SymptomId::Chills,
        phrases: &["chills", "shivering", "cold", "shaking", "freezing"],
    },
    LexiconEntry {
        symptom: SymptomId::Fatigue,
        phrases: &["tired", "exhausted", "drained", "fatigued", "lethargic", "low energy", "weak"],
    },
    LexiconEntry {
        symptom: SymptomId::Malaise,
        phrases: &["unwell", "feeling bad", "sick", "body feels off"],
    },
    LexiconEntry {
        symptom: SymptomId::MusclePain,
        phrases: &["muscle pain", "body ache", "sore muscles", "pain in body", "aches"],
    },
    LexiconEntry {
        symptom: SymptomId::Sweating,
        phrases: &["sweat", "perspiring", "clammy", "soaked", "night sweats"],
    },
    // Head and neuro
    LexiconEntry {
        symptom: SymptomId::Headache,
        phrases: &["head", "migraine", "head hurts", "throbbing", "pounding head"],
    },
    LexiconEntry {
        symptom: SymptomId::Dizziness,
        phrases: &["dizzy", "spin", "lightheaded", "faint", "woozy"],
    },
    LexiconEntry {
        symptom: SymptomId::AlteredSensorium,
        phrases: &["confused", "drowsy", "lost senses", "disoriented", "brain fog"],
    },
    // Stomach
    LexiconEntry {
        symptom: SymptomId::StomachPain,
        phrases: &["stomach", "belly", "pain in tummy", "abdominal", "gut pain", "cramps"],
    },
    LexiconEntry {
        symptom: SymptomId::Acidity,
        phrases: &["acid", "heartburn", "sour", "reflux", "burning stomach"],
    },
    LexiconEntry {
        symptom: SymptomId::Vomiting,
        phrases: &["vomit", "puke", "throw up", "nausea", "queasy", "retching"],
    },
    LexiconEntry {
        symptom: SymptomId::Diarrhoea,
        phrases: &["diarrhea", "loose motion", "runny poop", "the runs", "watery stool"],
    },
    // Respiratory
    LexiconEntry {
        symptom: SymptomId::Cough,
        phrases: &["cough", "coughing", "dry cough"],
    },
    LexiconEntry {
        symptom: SymptomId::Breathlessness,
        phrases: &["breath", "breathing", "short of breath", "cant breathe", "gasping", "panting"],
    },
    LexiconEntry {
        symptom: SymptomId::ChestPain,
        phrases: &["chest", "heart", "ribs", "tightness in chest", "heart pain", "pressure on chest"],
    },
    LexiconEntry {
        symptom: SymptomId::ThroatIrritation,
        phrases: &["sore throat", "itchy throat", "throat hurts", "scratchy throat"],
    },
    LexiconEntry {
        symptom: SymptomId::RunnyNose,
        phrases: &["runny nose", "sniffles", "watery nose"],
    },
    LexiconEntry {
        symptom: SymptomId::Congestion,
        phrases: &["congestion", "stuffy", "blocked nose", "nose block"],
    },
    LexiconEntry {
        symptom: SymptomId::ContinuousSneezing,
        phrases: &["sneeze", "sneezing", "keep sneezing"],
    },
    // Skin
    LexiconEntry {
        symptom: SymptomId::Itching,
        phrases: &["itch", "scratch", "itchy skin"],
    },
    LexiconEntry {
        symptom: SymptomId::SkinRash,
        phrases: &["rash", "spots", "redness", "hives", "bumps", "breakout"],
    },
    LexiconEntry {
        symptom: SymptomId::YellowishSkin,
        phrases: &["yellow skin", "jaundice", "pale", "skin is yellow"],
    },
    // Musculoskeletal
    LexiconEntry {
        symptom: SymptomId::JointPain,
        phrases: &["joint", "knees", "elbows", "wrists", "ankles", "aching joints"],
    },
    LexiconEntry {
        symptom: SymptomId::MuscleWeakness,
        phrases: &["weak muscles", "hard to lift", "weakness", "cant lift"],
    },
    LexiconEntry {
        symptom: SymptomId::NeckPain,
        phrases: &["neck", "stiff neck", "cant turn head"],
    },
    LexiconEntry {
        symptom: SymptomId::WeaknessOfOneBodySide,
        phrases: &[
            "paralysis",
            "cant move one side",
            "numbness on one side",
            "stroke",
            "one side weak",
            "drooping face",
        ],
    },
    // Metabolic
    LexiconEntry {
        symptom: SymptomId::WeightLoss,
        phrases: &["lost weight", "weight loss", "skinny", "thinning"],
    },
    LexiconEntry {
        symptom: SymptomId::WeightGain,
        phrases: &["gained weight", "fat"],
    },
    LexiconEntry {
        symptom: SymptomId::ExcessiveHunger,
        phrases: &["hungry", "starving", "eat a lot", "always hungry"],
    },
    LexiconEntry {
        symptom: SymptomId::Polyuria,
        phrases: &["peeing a lot", "lots of urine"],
    },
];

/// The full lexicon, in evaluation order.
pub fn lexicon() -> &'static [LexiconEntry] {
    LEXICON
}

// ── Extraction ──────────────────────────────────────────────

/// Detect canonical symptoms in free text.
///
/// Only symptoms present in `known` (the classifier's feature columns) are
/// returned, so a lexicon entry the model was not trained on is ignored.
/// Returns an empty set when nothing matches.
pub fn extract_symptoms(text: &str, known: &SymptomSet) -> SymptomSet {
    let lower = text.to_lowercase();

    LEXICON
        .iter()
        .filter(|entry| known.contains(entry.symptom))
        .filter(|entry| entry.phrases.iter().any(|phrase| lower.contains(phrase)))
        .map(|entry| entry.symptom)
        .collect()
}
