//! Questionnaire inputs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DietType {
    #[default]
    Balanced,
    #[serde(rename = "High in Fat/Sugar", alias = "HighFatSugar")]
    HighFatSugar,
    Vegetarian,
    Vegan,
}

/// Pre-existing conditions the questionnaire offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Diabetes,
    Hypertension,
    #[serde(rename = "Heart Disease", alias = "HeartDisease")]
    HeartDisease,
    Asthma,
}

impl Condition {
    /// Conditions worth the chronic-condition weight.
    pub fn is_chronic_weighted(self) -> bool {
        matches!(self, Condition::Diabetes | Condition::Hypertension)
    }
}

/// One filled-in questionnaire. Gender and diet are recorded but do not
/// contribute to the score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct RiskAssessment {
    #[validate(range(min = 1, max = 100))]
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub smoker: bool,
    /// Days per week with physical activity
    #[validate(range(min = 0, max = 7))]
    pub activity_days: u8,
    #[validate(range(min = 10.0, max = 50.0))]
    pub bmi: f64,
    #[serde(default)]
    pub diet: DietType,
    #[serde(default)]
    pub family_history: bool,
    /// 1 = poor, 10 = excellent
    #[validate(range(min = 1, max = 10))]
    pub sleep_quality: u8,
    /// 1 = low, 10 = high
    #[validate(range(min = 1, max = 10))]
    pub stress_level: u8,
    #[serde(default)]
    pub existing_conditions: BTreeSet<Condition>,
}

impl Default for RiskAssessment {
    /// The questionnaire's starting values.
    fn default() -> Self {
        Self {
            age: 25,
            gender: Gender::default(),
            smoker: false,
            activity_days: 3,
            bmi: 22.5,
            diet: DietType::default(),
            family_history: false,
            sleep_quality: 7,
            stress_level: 5,
            existing_conditions: BTreeSet::new(),
        }
    }
}
