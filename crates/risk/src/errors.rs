use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("invalid assessment: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
