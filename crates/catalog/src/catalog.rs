use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::builtin;
use crate::errors::CatalogError;
use crate::record::{normalize_name, DiseaseRecord};

pub const DEFAULT_HEALTH_TIP: &str = "No specific health tips available for this disease.";

/// Read-only disease table keyed by normalised name.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: BTreeMap<String, DiseaseRecord>,
    not_found: DiseaseRecord,
}

impl Catalog {
    /// The four records shipped with the service.
    pub fn builtin() -> Self {
        let records = builtin::records()
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();

        Self {
            records,
            not_found: DiseaseRecord::not_found(),
        }
    }

    /// Build a catalog, validating every record. Names are normalised to
    /// their lowercase trimmed form.
    pub fn from_records(records: Vec<DiseaseRecord>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();

        for (index, mut record) in records.into_iter().enumerate() {
            let key = normalize_name(&record.name);
            if key.is_empty() {
                return Err(CatalogError::EmptyName { index });
            }
            if record.description.trim().is_empty() {
                return Err(CatalogError::EmptyDescription(key));
            }
            if record.symptoms.iter().all(|s| s.trim().is_empty()) {
                return Err(CatalogError::NoSymptoms(key));
            }
            if map.contains_key(&key) {
                return Err(CatalogError::DuplicateDisease(key));
            }

            record.name = key.clone();
            record.symptoms.retain(|s| !s.trim().is_empty());
            map.insert(key, record);
        }

        Ok(Self {
            records: map,
            not_found: DiseaseRecord::not_found(),
        })
    }

    /// Load a JSON array of records.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let records: Vec<DiseaseRecord> = serde_json::from_str(&json)?;
        let catalog = Self::from_records(records)?;

        info!(
            "Loaded disease catalog from {} ({} diseases)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Record for `name` in any case, or the not-found sentinel.
    pub fn lookup(&self, name: &str) -> &DiseaseRecord {
        match self.get(name) {
            Some(record) => record,
            None => {
                debug!("Catalog miss for {:?}", name);
                &self.not_found
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DiseaseRecord> {
        self.records.get(&normalize_name(name))
    }

    /// Known disease keys, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    /// Sorted union of every record's symptoms.
    pub fn all_symptoms(&self) -> Vec<&str> {
        self.records
            .values()
            .flat_map(|r| r.symptoms.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records listing `symptom` (any case), sorted by name.
    pub fn diseases_with_symptom(&self, symptom: &str) -> Vec<&DiseaseRecord> {
        self.records
            .values()
            .filter(|r| r.has_symptom(symptom))
            .collect()
    }

    pub fn health_tip(&self, name: &str) -> &str {
        self.get(name)
            .and_then(|r| r.tip.as_deref())
            .unwrap_or(DEFAULT_HEALTH_TIP)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.records.values()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(name: &str, symptoms: &[&str]) -> DiseaseRecord {
        DiseaseRecord {
            name: name.to_string(),
            description: format!("About {name}"),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            treatment: "Rest".to_string(),
            exercise: "Walk".to_string(),
            sleep_hours: "8".to_string(),
            diet: "Balanced".to_string(),
            tip: None,
        }
    }

    #[test]
    fn test_lookup_any_case() {
        let catalog = Catalog::builtin();
        let record = catalog.lookup("DIABETES");

        assert_eq!(
            record.description,
            "A chronic condition that affects how your body processes blood sugar."
        );
        assert_eq!(
            record.symptoms,
            vec!["Frequent urination", "Increased thirst", "Extreme hunger", "Fatigue"]
        );
        assert_eq!(
            record.treatment,
            "Regular exercise, healthy diet, and insulin therapy."
        );
        assert_eq!(catalog.lookup("  Heart Disease ").name, "heart disease");
    }

    #[test]
    fn test_lookup_miss_returns_sentinel() {
        let catalog = Catalog::builtin();
        let record = catalog.lookup("flu");

        assert!(record.is_not_found());
        assert_eq!(record.description, "Disease not found");
        assert_eq!(record.exercise, "No specific recommendations");
        assert_eq!(record.sleep_hours, "No specific recommendations");
        assert!(catalog.get("flu").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.names(),
            vec!["asthma", "diabetes", "heart disease", "hypertension"]
        );
    }

    #[test]
    fn test_symptom_search() {
        let catalog = Catalog::builtin();

        let names: Vec<_> = catalog
            .diseases_with_symptom("shortness of breath")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["asthma", "heart disease", "hypertension"]);

        assert!(catalog.diseases_with_symptom("Sneezing").is_empty());
    }

    #[test]
    fn test_all_symptoms_deduplicated() {
        let catalog = Catalog::builtin();
        let symptoms = catalog.all_symptoms();

        assert_eq!(symptoms.iter().filter(|s| **s == "Fatigue").count(), 1);
        assert_eq!(symptoms.len(), 12);
        assert!(symptoms.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_health_tips() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.health_tip("Asthma"),
            "Avoid triggers, use prescribed inhalers, and maintain good air quality."
        );
        assert_eq!(catalog.health_tip("gout"), DEFAULT_HEALTH_TIP);
    }

    #[test]
    fn test_rejects_duplicates_after_normalising() {
        let err = Catalog::from_records(vec![record("Flu", &["Fever"]), record(" flu", &["Cough"])])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateDisease(name) if name == "flu"));
    }

    #[test]
    fn test_rejects_record_without_symptoms() {
        let err = Catalog::from_records(vec![record("flu", &[])]).unwrap_err();
        assert!(matches!(err, CatalogError::NoSymptoms(_)));

        let err = Catalog::from_records(vec![record("  ", &["Fever"])]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName { index: 0 }));
    }

    #[test]
    fn test_from_json_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        let records = vec![record("Gout", &["Joint pain"])];
        write!(file, "{}", serde_json::to_string(&records)?)?;
        file.flush()?;

        let catalog = Catalog::from_json_file(file.path())?;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("GOUT").symptoms, vec!["Joint pain"]);
        assert_eq!(catalog.health_tip("gout"), DEFAULT_HEALTH_TIP);
        Ok(())
    }
}
