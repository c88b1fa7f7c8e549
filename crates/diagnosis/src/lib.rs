//! MedAssist diagnosis engine
//!
//! Trains a binary symptom decision tree offline, freezes it together with
//! per-disease symptom profiles and a referral table, and walks it one
//! yes/no question at a time in a [`DiagnosisSession`].

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod model;
pub mod profile;
pub mod referral;
pub mod serde_canon;
pub mod session;
pub mod trainer;
pub mod tree;

use std::path::Path;

pub use cart::TreeConfig;
pub use dataset::{SymptomDataset, LABEL_COLUMN};
pub use errors::{DatasetError, ModelError, SessionError, TrainerError};
pub use model::{DiagnosisModel, ModelMetadata, HASH_FILE, MODEL_FILE, MODEL_VERSION};
pub use profile::SymptomProfiles;
pub use referral::{ReferralRecord, ReferralTable};
pub use session::{
    confidence, humanize_symptom, AssessmentAnswer, DiagnosisResult, DiagnosisSession,
    SessionState,
};
pub use trainer::{accuracy, DecisionTreeTrainer, TrainingParams, TrainingReport};
pub use tree::{Node, SymptomTree};

/// Train a tree on `dataset` and freeze it with profiles built from the
/// same rows and the given referral table.
pub fn train_model(
    dataset: &SymptomDataset,
    referrals: ReferralTable,
    params: TrainingParams,
) -> Result<DiagnosisModel, TrainerError> {
    let report = DecisionTreeTrainer::new(params).train(dataset)?;
    let profiles = SymptomProfiles::from_dataset(dataset);
    let metadata = ModelMetadata::new(
        report.training_samples,
        report.holdout_samples,
        report.holdout_accuracy,
    );

    Ok(DiagnosisModel::build(
        metadata,
        report.tree,
        profiles,
        referrals,
    )?)
}

/// Train a model directly from a training CSV and a keyed referral CSV.
pub fn train_model_from_csv(
    training: &Path,
    referrals: &Path,
    params: TrainingParams,
) -> Result<DiagnosisModel, TrainerError> {
    let dataset = SymptomDataset::from_csv(training)?;
    let referrals = ReferralTable::from_csv(referrals)?;
    train_model(&dataset, referrals, params)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
