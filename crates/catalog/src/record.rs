use serde::{Deserialize, Serialize};

pub const NOT_FOUND_DESCRIPTION: &str = "Disease not found";
pub const NO_RECOMMENDATIONS: &str = "No specific recommendations";

/// One disease entry. Immutable once a catalog is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiseaseRecord {
    /// Lookup key, stored lowercased
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: String,
    pub exercise: String,
    pub sleep_hours: String,
    pub diet: String,
    /// Short lifestyle tip shown next to the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl DiseaseRecord {
    /// Record returned for unknown names. Its empty symptom list is the
    /// not-found signal.
    pub fn not_found() -> Self {
        Self {
            name: String::new(),
            description: NOT_FOUND_DESCRIPTION.to_string(),
            symptoms: Vec::new(),
            treatment: String::new(),
            exercise: NO_RECOMMENDATIONS.to_string(),
            sleep_hours: NO_RECOMMENDATIONS.to_string(),
            diet: NO_RECOMMENDATIONS.to_string(),
            tip: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Case-insensitive symptom membership.
    pub fn has_symptom(&self, symptom: &str) -> bool {
        let symptom = symptom.trim();
        self.symptoms.iter().any(|s| s.eq_ignore_ascii_case(symptom))
    }
}

/// Lookup key normalisation: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
