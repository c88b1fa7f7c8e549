//! MedAssist credential store

pub mod errors;
pub mod store;

pub use errors::AccountError;
pub use store::{hash_password, CredentialStore, UserRecord};
