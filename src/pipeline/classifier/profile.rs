//! Profile-matching model.
//!
//! Portable stand-in for the trained classifier: each condition is described
//! by the feature columns it typically shows, and the best Jaccard overlap
//! with the active features wins. Ties go to the profile listed first, so a
//! row that overlaps no profile still gets a label: the first one.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClassifierError, ConditionModel, FeatureColumns};

/// One line of `condition_profiles.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionProfile {
    pub label: String,
    pub symptoms: Vec<String>,
}

#[derive(Debug)]
struct CompiledProfile {
    label: String,
    columns: BTreeSet<usize>,
}

#[derive(Debug)]
pub struct ProfileMatchModel {
    width: usize,
    profiles: Vec<CompiledProfile>,
}

impl ProfileMatchModel {
    /// Resolve profile symptom names against the feature layout. Names with
    /// no column are skipped; profiles left empty are dropped.
    pub fn new(columns: &FeatureColumns, profiles: Vec<ConditionProfile>) -> Self {
        let compiled = profiles
            .into_iter()
            .filter_map(|profile| {
                let resolved: BTreeSet<usize> = profile
                    .symptoms
                    .iter()
                    .filter_map(|name| {
                        let position = columns.position(name);
                        if position.is_none() {
                            tracing::debug!(
                                label = %profile.label,
                                column = %name,
                                "Profile symptom has no feature column"
                            );
                        }
                        position
                    })
                    .collect();
                (!resolved.is_empty()).then_some(CompiledProfile {
                    label: profile.label,
                    columns: resolved,
                })
            })
            .collect();

        Self {
            width: columns.width(),
            profiles: compiled,
        }
    }

    pub fn load(path: &Path, columns: &FeatureColumns) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let profiles: Vec<ConditionProfile> =
            serde_json::from_str(&raw).map_err(|e| ClassifierError::ArtifactParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let model = Self::new(columns, profiles);
        if model.profiles.is_empty() {
            return Err(ClassifierError::ArtifactParse {
                path: path.to_path_buf(),
                reason: "no usable condition profiles".into(),
            });
        }
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ConditionModel for ProfileMatchModel {
    fn predict(&self, features: &[f32]) -> Result<String, ClassifierError> {
        if features.len() != self.width {
            return Err(ClassifierError::FeatureWidth {
                expected: self.width,
                actual: features.len(),
            });
        }

        let active: BTreeSet<usize> = features
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.5)
            .map(|(i, _)| i)
            .collect();

        let mut best: Option<(&CompiledProfile, f32)> = None;
        for profile in &self.profiles {
            let shared = profile.columns.intersection(&active).count();
            let union = profile.columns.union(&active).count();
            let score = shared as f32 / union as f32;
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((profile, score));
            }
        }

        let (profile, score) = best.ok_or(ClassifierError::NoSignal)?;
        if score == 0.0 {
            tracing::debug!(
                active = active.len(),
                label = %profile.label,
                "No profile overlaps the features, using first profile"
            );
        }
        Ok(profile.label.clone())
    }
}
