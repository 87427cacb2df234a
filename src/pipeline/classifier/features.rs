use std::collections::HashMap;
use std::path::Path;

use super::ClassifierError;
use crate::models::{SymptomId, SymptomSet};

/// Ordered feature columns the classifier was trained on.
#[derive(Debug, Clone)]
pub struct FeatureColumns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureColumns {
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    /// The reference dataset's 132-column layout.
    pub fn reference() -> Self {
        Self::new(SymptomId::ALL.iter().map(|id| id.as_str().to_string()).collect())
    }

    /// Load a JSON array of column names.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let names: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| ClassifierError::ArtifactParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if names.is_empty() {
            return Err(ClassifierError::ArtifactParse {
                path: path.to_path_buf(),
                reason: "no feature columns".into(),
            });
        }
        Ok(Self::new(names))
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Columns that are also canonical symptoms. Extraction is restricted to
    /// this set so the lexicon cannot drift past the model.
    pub fn known_symptoms(&self) -> SymptomSet {
        SymptomSet::from_names(self.names.iter().map(String::as_str))
    }

    /// One-hot row: 1.0 at each present symptom's column, 0.0 elsewhere.
    pub fn vectorize(&self, symptoms: &SymptomSet) -> Vec<f32> {
        let mut row = vec![0.0f32; self.names.len()];
        for id in symptoms.iter() {
            if let Some(i) = self.position(id.as_str()) {
                row[i] = 1.0;
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_matches_enumeration() {
        let columns = FeatureColumns::reference();
        assert_eq!(columns.width(), 132);
        assert_eq!(columns.position("itching"), Some(0));
        assert_eq!(columns.position("yellow_crust_ooze"), Some(131));
        assert_eq!(columns.known_symptoms().len(), 132);
    }

    #[test]
    fn vectorize_sets_present_columns() {
        let columns = FeatureColumns::new(vec![
            "chest_pain".into(),
            "sweating".into(),
            "cough".into(),
        ]);
        let symptoms: SymptomSet = [SymptomId::ChestPain, SymptomId::Cough, SymptomId::Headache]
            .into_iter()
            .collect();
        assert_eq!(columns.vectorize(&symptoms), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn known_symptoms_skip_foreign_columns() {
        let columns = FeatureColumns::new(vec!["cough".into(), "age".into()]);
        let known = columns.known_symptoms();
        assert_eq!(known.names(), vec!["cough"]);
    }

    #[test]
    fn load_reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symptom_columns.json");
        std::fs::write(&path, r#"["itching", "skin_rash"]"#).unwrap();
        let columns = FeatureColumns::load(&path).unwrap();
        assert_eq!(columns.width(), 2);
        assert_eq!(columns.names()[1], "skin_rash");
    }

    #[test]
    fn load_rejects_empty_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(matches!(
            FeatureColumns::load(&empty),
            Err(ClassifierError::ArtifactParse { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            FeatureColumns::load(&bad),
            Err(ClassifierError::ArtifactParse { .. })
        ));

        assert!(matches!(
            FeatureColumns::load(&dir.path().join("missing.json")),
            Err(ClassifierError::ArtifactRead { .. })
        ));
    }
}
