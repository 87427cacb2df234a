use serde::{Deserialize, Serialize};

/// Educational record for one condition label.
///
/// Fixed shape: a table entry missing any field fails at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionDetail {
    pub description: String,
    pub causes: String,
    pub risk: String,
    pub recommended_action: String,
    pub reference_link: String,
}

impl ConditionDetail {
    /// Generic record for labels outside the curated table.
    pub fn fallback(label: &str) -> Self {
        let query: Vec<&str> = label.split_whitespace().collect();
        Self {
            description: "A medical condition affecting the body's normal functions.".into(),
            causes: "Various factors including infections, genetics, or lifestyle.".into(),
            risk: "Complications may arise if left untreated.".into(),
            recommended_action: "Consult a general physician for a proper diagnosis.".into(),
            reference_link: format!(
                "https://www.google.com/search?q={}+symptoms+treatment",
                query.join("+")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_link_encodes_spaces() {
        let detail = ConditionDetail::fallback("Chronic cholestasis");
        assert_eq!(
            detail.reference_link,
            "https://www.google.com/search?q=Chronic+cholestasis+symptoms+treatment"
        );
        assert!(detail.recommended_action.contains("general physician"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{"description":"d","causes":"c","risk":"r","recommended_action":"a"}"#;
        assert!(serde_json::from_str::<ConditionDetail>(json).is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let json = r#"{"description":"d","causes":"c","risk":"r","recommended_action":"a","reference_link":"l","extra":1}"#;
        assert!(serde_json::from_str::<ConditionDetail>(json).is_err());
    }
}
