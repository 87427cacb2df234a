//! Condition knowledge base.
//!
//! Curated educational records keyed by condition label, a keyword table that
//! maps labels to a specialist, and the presentational severity tier. All
//! tables are data: the bundled copies are compiled in, and a deployment can
//! replace either one from a directory.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConditionDetail, SeverityTier};

pub const CONDITIONS_FILE: &str = "conditions.json";
pub const SPECIALISTS_FILE: &str = "specialists.json";

pub const DEFAULT_SPECIALIST: &str = "General Physician";

static BUNDLED_CONDITIONS: &str = include_str!("../../resources/conditions.json");
static BUNDLED_SPECIALISTS: &str = include_str!("../../resources/specialists.json");

/// Label fragments that mark a result for urgent styling.
static CRITICAL_KEYWORDS: &[&str] = &["heart", "paralysis", "risk", "emergency"];

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Failed to read {0}: {1}")]
    Read(String, String),

    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),
}

/// One row of the specialist table. First matching keyword wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistRule {
    pub keyword: String,
    pub specialist: String,
}

pub struct KnowledgeBase {
    conditions: HashMap<String, ConditionDetail>,
    specialists: Vec<SpecialistRule>,
}

impl KnowledgeBase {
    /// Tables compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_json(BUNDLED_CONDITIONS, BUNDLED_SPECIALISTS)
            .expect("bundled knowledge tables are valid JSON")
    }

    pub fn from_json(conditions_json: &str, specialists_json: &str) -> Result<Self, KnowledgeError> {
        let conditions = parse_table(conditions_json, CONDITIONS_FILE)?;
        let specialists = parse_table(specialists_json, SPECIALISTS_FILE)?;
        Ok(Self::from_tables(conditions, specialists))
    }

    fn from_tables(
        conditions: HashMap<String, ConditionDetail>,
        specialists: Vec<SpecialistRule>,
    ) -> Self {
        Self {
            conditions,
            specialists: specialists
                .into_iter()
                .map(|rule| SpecialistRule {
                    keyword: rule.keyword.to_lowercase(),
                    specialist: rule.specialist,
                })
                .collect(),
        }
    }

    /// Tables from `dir`, each file independently. A table whose file is
    /// absent or invalid stays bundled; invalid files are logged.
    pub fn load(dir: &Path) -> Self {
        let builtin = Self::builtin();
        let conditions = read_table(dir, CONDITIONS_FILE).unwrap_or(builtin.conditions);
        let kb = match read_table(dir, SPECIALISTS_FILE) {
            Some(specialists) => Self::from_tables(conditions, specialists),
            None => Self {
                conditions,
                specialists: builtin.specialists,
            },
        };

        tracing::info!(
            dir = %dir.display(),
            conditions = kb.conditions.len(),
            specialists = kb.specialists.len(),
            "Knowledge base loaded"
        );
        kb
    }

    /// Educational detail for a label. Never fails: unknown labels get the
    /// generic record.
    pub fn details_for(&self, label: &str) -> ConditionDetail {
        let key = label.trim();
        match self.conditions.get(key) {
            Some(detail) => detail.clone(),
            None => {
                tracing::debug!(label = key, "No curated detail, using fallback");
                ConditionDetail::fallback(key)
            }
        }
    }

    pub fn is_curated(&self, label: &str) -> bool {
        self.conditions.contains_key(label.trim())
    }

    /// First specialist whose keyword occurs in the label.
    pub fn specialist_for(&self, label: &str) -> &str {
        let lower = label.to_lowercase();
        self.specialists
            .iter()
            .find(|rule| lower.contains(&rule.keyword))
            .map(|rule| rule.specialist.as_str())
            .unwrap_or(DEFAULT_SPECIALIST)
    }
}

fn parse_table<T: DeserializeOwned>(json: &str, file: &str) -> Result<T, KnowledgeError> {
    serde_json::from_str(json).map_err(|e| KnowledgeError::Parse(file.into(), e.to_string()))
}

/// A custom table from `dir`, or `None` when the file is absent or invalid.
fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Option<T> {
    let path = dir.join(file);
    if !path.exists() {
        return None;
    }

    let table = std::fs::read_to_string(&path)
        .map_err(|e| KnowledgeError::Read(path.display().to_string(), e.to_string()))
        .and_then(|raw| parse_table(&raw, file));
    match table {
        Ok(table) => {
            tracing::info!(path = %path.display(), "Custom knowledge table loaded");
            Some(table)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Custom knowledge table rejected, keeping bundled table");
            None
        }
    }
}

/// Presentational tier: critical when the label mentions heart, paralysis,
/// risk or emergency.
pub fn severity_tier(label: &str) -> SeverityTier {
    let lower = label.to_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        SeverityTier::Critical
    } else {
        SeverityTier::Routine
    }
}
