//! MedAssist health risk score
//!
//! Stateless additive scoring of a lifestyle questionnaire into Low,
//! Moderate or High risk.

pub mod assessment;
pub mod errors;
pub mod score;

pub use assessment::{Condition, DietType, Gender, RiskAssessment};
pub use errors::RiskError;
pub use score::{assess, assess_checked, RiskLevel, RiskReport};
