//! MedAssist disease catalog
//!
//! Answers "tell me about disease X" from a static in-memory table.
//! Unknown names resolve to a sentinel record instead of an error.

mod builtin;
pub mod catalog;
pub mod errors;
pub mod record;

pub use catalog::{Catalog, DEFAULT_HEALTH_TIP};
pub use errors::CatalogError;
pub use record::{normalize_name, DiseaseRecord, NOT_FOUND_DESCRIPTION, NO_RECOMMENDATIONS};
