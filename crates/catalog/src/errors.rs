use thiserror::Error;

/// Errors raised while loading a catalog table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {index} has an empty name")]
    EmptyName { index: usize },

    #[error("disease `{0}` has an empty description")]
    EmptyDescription(String),

    #[error("disease `{0}` lists no symptoms")]
    NoSymptoms(String),

    #[error("disease `{0}` appears more than once")]
    DuplicateDisease(String),
}
