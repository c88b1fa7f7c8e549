//! Symptom matrix loading and preprocessing
//!
//! Reads a one-hot symptom table (one column per symptom, cells 0/1) with a
//! `prognosis` label column, and provides label encoding plus a
//! deterministic shuffle and train/test split.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::deterministic::row_hash;
use crate::errors::DatasetError;

/// Name of the label column in training tables.
pub const LABEL_COLUMN: &str = "prognosis";

/// Labeled symptom-presence matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct SymptomDataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<u8>>,
    pub labels: Vec<String>,
}

impl SymptomDataset {
    /// Load a dataset from a CSV file with a header row.
    ///
    /// The label column is the one named `prognosis` (any case); without it
    /// the last named column is used. Columns with blank headers, such as
    /// the one produced by a trailing comma, are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let label_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(LABEL_COLUMN))
            .or_else(|| {
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(i, _)| i)
                    .last()
            })
            .ok_or_else(|| DatasetError::MissingLabelColumn(LABEL_COLUMN.to_string()))?;

        let feature_columns: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != label_idx && !h.is_empty())
            .map(|(i, _)| i)
            .collect();

        let feature_names: Vec<String> = feature_columns
            .iter()
            .map(|&i| headers[i].to_string())
            .collect();

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (record_idx, record) in reader.records().enumerate() {
            let record = record?;
            // 1-based, counting the header line
            let row = record_idx + 2;

            let mut values = Vec::with_capacity(feature_columns.len());
            for (&col, name) in feature_columns.iter().zip(&feature_names) {
                let cell = record.get(col).unwrap_or("");
                let value = match cell {
                    "0" => 0,
                    "1" => 1,
                    other => {
                        return Err(DatasetError::InvalidCell {
                            row,
                            column: name.clone(),
                            value: other.to_string(),
                        })
                    }
                };
                values.push(value);
            }

            let label = record.get(label_idx).unwrap_or("").trim();
            if label.is_empty() {
                return Err(DatasetError::EmptyLabel(row));
            }

            features.push(values);
            labels.push(label.to_string());
        }

        if features.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Sorted distinct labels; a label's position is its class id.
    pub fn classes(&self) -> Vec<String> {
        self.labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Encode every label against `classes`, failing on unknown labels.
    pub fn encode_labels(&self, classes: &[String]) -> Result<Vec<usize>, DatasetError> {
        self.labels
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .map_err(|_| DatasetError::UnknownLabel(label.clone()))
            })
            .collect()
    }

    /// Deterministically shuffle the dataset using seed
    pub fn shuffle(&mut self, seed: i64) {
        let classes = self.classes();
        let mut order: Vec<(u64, usize)> = (0..self.len())
            .map(|i| {
                let label = classes.binary_search(&self.labels[i]).unwrap_or(0);
                (row_hash(&self.features[i], label, i, seed), i)
            })
            .collect();

        order.sort_unstable();

        let features = order.iter().map(|&(_, i)| self.features[i].clone()).collect();
        let labels = order.iter().map(|&(_, i)| self.labels[i].clone()).collect();

        self.features = features;
        self.labels = labels;
    }

    /// Shuffle a copy with `seed` and split it into `(train, test)`.
    ///
    /// The test part holds `ceil(len * test_ratio)` rows, capped so at least
    /// one training row remains. A ratio of 0 yields an empty test set.
    pub fn train_test_split(
        &self,
        test_ratio: f64,
        seed: i64,
    ) -> Result<(SymptomDataset, SymptomDataset), DatasetError> {
        if !(0.0..1.0).contains(&test_ratio) {
            return Err(DatasetError::InvalidSplit(test_ratio));
        }

        let mut shuffled = self.clone();
        shuffled.shuffle(seed);

        let n_test = ((self.len() as f64) * test_ratio).ceil() as usize;
        let n_test = n_test.min(self.len().saturating_sub(1));

        let test = SymptomDataset {
            feature_names: self.feature_names.clone(),
            features: shuffled.features[..n_test].to_vec(),
            labels: shuffled.labels[..n_test].to_vec(),
        };
        let train = SymptomDataset {
            feature_names: self.feature_names.clone(),
            features: shuffled.features[n_test..].to_vec(),
            labels: shuffled.labels[n_test..].to_vec(),
        };

        Ok((train, test))
    }

    /// Reorder columns to match `feature_names` (e.g. a separate testing
    /// table whose columns come in another order).
    pub fn align_to(&self, feature_names: &[String]) -> Result<SymptomDataset, DatasetError> {
        let mapping: Vec<usize> = feature_names
            .iter()
            .map(|name| {
                self.feature_names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| DatasetError::MissingFeature(name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let features = self
            .features
            .iter()
            .map(|row| mapping.iter().map(|&i| row[i]).collect())
            .collect();

        Ok(SymptomDataset {
            feature_names: feature_names.to_vec(),
            features,
            labels: self.labels.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
itching,skin_rash,cough,prognosis
1,1,0,Fungal infection
1,0,0,Fungal infection
0,0,1,Common Cold
0,1,1,Common Cold
";

    fn create_test_csv() -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{SAMPLE}")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> anyhow::Result<()> {
        let file = create_test_csv()?;
        let dataset = SymptomDataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.feature_names, vec!["itching", "skin_rash", "cough"]);
        assert_eq!(dataset.features[0], vec![1, 1, 0]);
        assert_eq!(dataset.labels[2], "Common Cold");

        Ok(())
    }

    #[test]
    fn test_last_named_column_is_label_without_prognosis() -> anyhow::Result<()> {
        let csv = "itching,cough,disease,\n1,0,Allergy,\n0,1,Cold,\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes())?;

        assert_eq!(dataset.feature_names, vec!["itching", "cough"]);
        assert_eq!(dataset.labels, vec!["Allergy", "Cold"]);
        assert_eq!(dataset.features[1], vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_trailing_blank_column_ignored() -> anyhow::Result<()> {
        let csv = "itching,cough,prognosis,\n1,0,Allergy,\n0,1,Cold,\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes())?;

        assert_eq!(dataset.feature_names, vec!["itching", "cough"]);
        assert_eq!(dataset.labels, vec!["Allergy", "Cold"]);
        Ok(())
    }

    #[test]
    fn test_label_column_found_by_name() -> anyhow::Result<()> {
        let csv = "Prognosis,itching\nAllergy,1\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes())?;

        assert_eq!(dataset.feature_names, vec!["itching"]);
        assert_eq!(dataset.labels, vec!["Allergy"]);
        Ok(())
    }

    #[test]
    fn test_non_binary_cell_rejected() {
        let csv = "itching,prognosis\n2,Allergy\n";
        let err = SymptomDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidCell { row: 2, .. }));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = "itching,prognosis\n";
        let err = SymptomDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_classes_sorted_and_encoded() -> anyhow::Result<()> {
        let dataset = SymptomDataset::from_reader(SAMPLE.as_bytes())?;
        let classes = dataset.classes();

        assert_eq!(classes, vec!["Common Cold", "Fungal infection"]);
        assert_eq!(dataset.encode_labels(&classes)?, vec![1, 1, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_shuffle_determinism() -> anyhow::Result<()> {
        let mut ds1 = SymptomDataset::from_reader(SAMPLE.as_bytes())?;
        let mut ds2 = ds1.clone();

        ds1.shuffle(42);
        ds2.shuffle(42);

        assert_eq!(ds1, ds2);
        Ok(())
    }

    #[test]
    fn test_train_test_split_sizes() -> anyhow::Result<()> {
        let dataset = SymptomDataset::from_reader(SAMPLE.as_bytes())?;

        let (train, test) = dataset.train_test_split(0.25, 0)?;
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 3);

        let (train, test) = dataset.train_test_split(0.0, 0)?;
        assert!(test.is_empty());
        assert_eq!(train.len(), 4);

        assert!(dataset.train_test_split(1.0, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_align_to_reorders_columns() -> anyhow::Result<()> {
        let dataset = SymptomDataset::from_reader(SAMPLE.as_bytes())?;
        let order = vec!["cough".to_string(), "itching".to_string()];
        let aligned = dataset.align_to(&order)?;

        assert_eq!(aligned.features[0], vec![0, 1]);
        assert!(dataset.align_to(&["fever".to_string()]).is_err());
        Ok(())
    }
}
