//! Deterministic safety layers around the classifier.
//!
//! - `critical`: emergency symptom combinations decided before classification.
//! - `plausibility`: relabels classifier output whose defining symptoms are absent.

pub mod critical;
pub mod plausibility;

pub use critical::{check_critical, CriticalFinding};
pub use plausibility::apply_safety_override;

// ── Labels produced by the safety layers ────────────────────

pub const HEART_ATTACK: &str = "Heart attack";
pub const POTENTIAL_HEART_RISK: &str = "Potential Heart Risk";
pub const PARALYSIS: &str = "Paralysis (brain hemorrhage)";
pub const MIGRAINE: &str = "Migraine";
pub const VIRAL_FEVER: &str = "Viral Fever";
pub const GASTRITIS_OR_ANXIETY: &str = "Gastritis or Anxiety";
