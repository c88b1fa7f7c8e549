use thiserror::Error;

/// Errors raised while reading symptom matrices and referral tables.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no `{0}` column and no usable last column")]
    MissingLabelColumn(String),

    #[error("row {row}, column `{column}`: expected 0 or 1, got `{value}`")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {0}: empty disease label")]
    EmptyLabel(usize),

    #[error("dataset is empty")]
    Empty,

    #[error("dataset is missing symptom column `{0}`")]
    MissingFeature(String),

    #[error("label `{0}` is not a known class")]
    UnknownLabel(String),

    #[error("test ratio must be within [0, 1), got {0}")]
    InvalidSplit(f64),

    #[error("referral table has {rows} rows but {labels} disease labels need a provider")]
    ReferralRowsShort { rows: usize, labels: usize },

    #[error("duplicate referral for `{0}`")]
    DuplicateReferral(String),
}

/// Errors raised when a frozen model is structurally invalid or violates
/// the leaf/referral/profile integrity rule.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    #[error("leaf label `{0}` has no referral record")]
    MissingReferral(String),

    #[error("leaf label `{0}` has no training symptom profile")]
    MissingProfile(String),

    #[error("unsupported model version: {0}")]
    UnsupportedVersion(u32),

    #[error("model hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by a diagnosis session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session already reached a diagnosis")]
    AlreadyTerminal,

    #[error("session is still asking questions")]
    NotFinished,

    #[error("session points at missing node {0}")]
    InvalidNode(usize),

    #[error("no referral for diagnosed label `{0}`")]
    MissingReferral(String),

    #[error("no symptom profile for diagnosed label `{0}`")]
    MissingProfile(String),
}

/// Errors returned by the offline trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("training error: {0}")]
    Training(String),
}
