//! Disease → provider referral table

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::DatasetError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferralRecord {
    pub disease_name: String,
    pub provider_name: String,
    pub provider_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferralTable {
    records: BTreeMap<String, ReferralRecord>,
}

impl ReferralTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a keyed table with header `disease,provider_name,provider_link`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut table = Self::new();
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            table.insert(ReferralRecord {
                disease_name: field(0),
                provider_name: field(1),
                provider_link: field(2),
            })?;
        }

        Ok(table)
    }

    /// Load a header-less two-column `name,link` table whose rows line up
    /// with the sorted disease labels.
    pub fn from_positional_csv<P: AsRef<Path>>(
        path: P,
        labels: &[String],
    ) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        if rows.len() < labels.len() {
            return Err(DatasetError::ReferralRowsShort {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if rows.len() > labels.len() {
            warn!(
                "Referral table has {} rows for {} labels; ignoring the extra rows",
                rows.len(),
                labels.len()
            );
        }

        let mut table = Self::new();
        for (label, row) in labels.iter().zip(rows) {
            table.insert(ReferralRecord {
                disease_name: label.clone(),
                provider_name: row.get(0).unwrap_or("").to_string(),
                provider_link: row.get(1).unwrap_or("").to_string(),
            })?;
        }

        Ok(table)
    }

    pub fn insert(&mut self, record: ReferralRecord) -> Result<(), DatasetError> {
        if self.records.contains_key(&record.disease_name) {
            return Err(DatasetError::DuplicateReferral(record.disease_name));
        }
        self.records.insert(record.disease_name.clone(), record);
        Ok(())
    }

    pub fn get(&self, disease: &str) -> Option<&ReferralRecord> {
        self.records.get(disease)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferralRecord> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{content}")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_keyed_csv() -> anyhow::Result<()> {
        let file = write_temp(
            "disease,provider_name,provider_link\n\
             Malaria,Dr. Rao,https://example.org/rao\n\
             Flu,Dr. Lee,https://example.org/lee\n",
        )?;

        let table = ReferralTable::from_csv(file.path())?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Flu").unwrap().provider_name, "Dr. Lee");
        assert!(table.get("Allergy").is_none());
        Ok(())
    }

    #[test]
    fn test_keyed_csv_rejects_duplicates() -> anyhow::Result<()> {
        let file = write_temp("disease,provider_name,provider_link\nFlu,A,a\nFlu,B,b\n")?;
        let err = ReferralTable::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateReferral(name) if name == "Flu"));
        Ok(())
    }

    #[test]
    fn test_positional_csv_aligns_with_labels() -> anyhow::Result<()> {
        let file = write_temp("Dr. A,https://a\nDr. B,https://b\nDr. C,https://c\n")?;
        let labels = vec!["Allergy".to_string(), "Flu".to_string()];

        let table = ReferralTable::from_positional_csv(file.path(), &labels)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Allergy").unwrap().provider_link, "https://a");
        assert_eq!(table.get("Flu").unwrap().provider_name, "Dr. B");
        Ok(())
    }

    #[test]
    fn test_positional_csv_too_short() -> anyhow::Result<()> {
        let file = write_temp("Dr. A,https://a\n")?;
        let labels = vec!["Allergy".to_string(), "Flu".to_string()];

        let err = ReferralTable::from_positional_csv(file.path(), &labels).unwrap_err();
        assert!(matches!(err, DatasetError::ReferralRowsShort { rows: 1, labels: 2 }));
        Ok(())
    }
}
