use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username `{0}` is already taken")]
    DuplicateUser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
