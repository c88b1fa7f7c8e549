//! Per-disease symptom profiles
//!
//! Collapses the training table to one row per label (group by label, max
//! over each symptom column) and keeps the symptoms that were ever present.
//! These sets are the denominator of the diagnosis confidence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::SymptomDataset;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SymptomProfiles {
    profiles: BTreeMap<String, Vec<String>>,
}

impl SymptomProfiles {
    pub fn from_dataset(dataset: &SymptomDataset) -> Self {
        let mut seen: BTreeMap<&str, Vec<bool>> = BTreeMap::new();

        for (row, label) in dataset.features.iter().zip(&dataset.labels) {
            let flags = seen
                .entry(label.as_str())
                .or_insert_with(|| vec![false; dataset.feature_count()]);
            for (flag, &value) in flags.iter_mut().zip(row) {
                *flag |= value > 0;
            }
        }

        let profiles = seen
            .into_iter()
            .map(|(label, flags)| {
                let symptoms = flags
                    .iter()
                    .zip(&dataset.feature_names)
                    .filter(|(present, _)| **present)
                    .map(|(_, name)| name.clone())
                    .collect();
                (label.to_string(), symptoms)
            })
            .collect();

        Self { profiles }
    }

    /// Symptoms associated with `label`, in training column order.
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.profiles.get(label).map(Vec::as_slice)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.profiles.contains_key(label)
    }

    pub fn insert(&mut self, label: impl Into<String>, symptoms: Vec<String>) {
        self.profiles.insert(label.into(), symptoms);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
