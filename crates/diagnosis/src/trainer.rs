//! Decision tree trainer
//!
//! Splits the symptom table into train/holdout parts, grows a CART tree on
//! the training part and reports holdout accuracy.

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::SymptomDataset;
use crate::errors::TrainerError;
use crate::tree::SymptomTree;

/// Trainer configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingParams {
    pub tree: TreeConfig,
    /// Share of rows held out for evaluation
    pub test_ratio: f64,
    /// Seed for the deterministic shuffle before splitting
    pub seed: i64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            test_ratio: 0.25,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub tree: SymptomTree,
    pub training_samples: usize,
    pub holdout_samples: usize,
    /// `None` when nothing was held out
    pub holdout_accuracy: Option<f64>,
}

pub struct DecisionTreeTrainer {
    params: TrainingParams,
}

impl DecisionTreeTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Split, fit on the training part, evaluate on the holdout part.
    ///
    /// Classes come from the full table so every label stays encodable.
    pub fn train(&self, dataset: &SymptomDataset) -> Result<TrainingReport, TrainerError> {
        let classes = dataset.classes();
        let (train, holdout) = dataset.train_test_split(self.params.test_ratio, self.params.seed)?;

        tracing::info!(
            "Training on {} samples, holding out {}",
            train.len(),
            holdout.len()
        );

        let tree = self.fit_with_classes(&train, classes)?;

        let holdout_accuracy = if holdout.is_empty() {
            None
        } else {
            Some(accuracy(&tree, &holdout)?)
        };

        Ok(TrainingReport {
            tree,
            training_samples: train.len(),
            holdout_samples: holdout.len(),
            holdout_accuracy,
        })
    }

    /// Fit a tree on every row of `dataset`.
    pub fn fit(&self, dataset: &SymptomDataset) -> Result<SymptomTree, TrainerError> {
        self.fit_with_classes(dataset, dataset.classes())
    }

    fn fit_with_classes(
        &self,
        dataset: &SymptomDataset,
        classes: Vec<String>,
    ) -> Result<SymptomTree, TrainerError> {
        if dataset.is_empty() {
            return Err(TrainerError::Training("no training rows".to_string()));
        }
        if self.params.tree.min_samples_leaf == 0 {
            return Err(TrainerError::Training(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        let targets = dataset.encode_labels(&classes)?;
        let builder = CartBuilder::new(
            &dataset.features,
            &targets,
            classes.len(),
            self.params.tree.clone(),
        );
        let nodes = builder.build();

        let tree = SymptomTree::new(dataset.feature_names.clone(), classes, nodes);
        tree.validate()?;

        tracing::debug!(
            "Grew tree with {} nodes, depth {}, {} leaves",
            tree.nodes.len(),
            tree.depth(),
            tree.reachable_leaves().len()
        );

        Ok(tree)
    }
}

/// Share of rows whose predicted label matches the recorded one.
pub fn accuracy(tree: &SymptomTree, dataset: &SymptomDataset) -> Result<f64, TrainerError> {
    if dataset.is_empty() {
        return Err(TrainerError::Training("empty evaluation set".to_string()));
    }

    let mut correct = 0usize;
    for (row, label) in dataset.features.iter().zip(&dataset.labels) {
        if tree.predict(row)? == label {
            correct += 1;
        }
    }

    Ok(correct as f64 / dataset.len() as f64)
}
