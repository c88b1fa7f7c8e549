//! Additive rule scoring

use serde::Serialize;
use validator::Validate;

use crate::assessment::RiskAssessment;
use crate::errors::RiskError;

pub const LOW_RISK_MESSAGE: &str = "Low Risk: Continue maintaining a healthy lifestyle.";
pub const MODERATE_RISK_MESSAGE: &str =
    "Moderate Risk: Consider regular health check-ups and lifestyle adjustments.";
pub const HIGH_RISK_MESSAGE: &str =
    "High Risk: Consult with a healthcare provider for a detailed evaluation.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=3 => RiskLevel::Low,
            4..=6 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskLevel::Low => LOW_RISK_MESSAGE,
            RiskLevel::Moderate => MODERATE_RISK_MESSAGE,
            RiskLevel::High => HIGH_RISK_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskReport {
    pub score: u32,
    pub level: RiskLevel,
    pub message: &'static str,
    /// Rules that fired, in rule order
    pub factors: Vec<&'static str>,
}

struct Rule {
    factor: &'static str,
    points: u32,
    applies: fn(&RiskAssessment) -> bool,
}

const RULES: [Rule; 8] = [
    Rule {
        factor: "age over 45",
        points: 1,
        applies: |a| a.age > 45,
    },
    Rule {
        factor: "smoker",
        points: 1,
        applies: |a| a.smoker,
    },
    Rule {
        factor: "fewer than 3 active days per week",
        points: 1,
        applies: |a| a.activity_days < 3,
    },
    Rule {
        factor: "BMI of 25 or more",
        points: 1,
        applies: |a| a.bmi >= 25.0,
    },
    Rule {
        factor: "family history of chronic disease",
        points: 1,
        applies: |a| a.family_history,
    },
    Rule {
        factor: "poor sleep quality",
        points: 1,
        applies: |a| a.sleep_quality < 5,
    },
    Rule {
        factor: "high stress",
        points: 1,
        applies: |a| a.stress_level > 7,
    },
    Rule {
        factor: "diabetes or hypertension",
        points: 2,
        applies: |a| a.existing_conditions.iter().any(|c| c.is_chronic_weighted()),
    },
];

/// Score a questionnaire without range checks.
pub fn assess(assessment: &RiskAssessment) -> RiskReport {
    let mut score = 0;
    let mut factors = Vec::new();

    for rule in RULES.iter().filter(|rule| (rule.applies)(assessment)) {
        score += rule.points;
        factors.push(rule.factor);
    }

    let level = RiskLevel::from_score(score);
    RiskReport {
        score,
        level,
        message: level.message(),
        factors,
    }
}

/// Validate input ranges, then score.
pub fn assess_checked(assessment: &RiskAssessment) -> Result<RiskReport, RiskError> {
    assessment.validate()?;
    Ok(assess(assessment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Condition;

    #[test]
    fn test_high_risk_example() {
        let assessment = RiskAssessment {
            age: 50,
            smoker: true,
            activity_days: 2,
            bmi: 27.0,
            family_history: true,
            sleep_quality: 4,
            stress_level: 8,
            ..RiskAssessment::default()
        };

        let report = assess(&assessment);
        assert_eq!(report.score, 7);
        assert_eq!(report.level, RiskLevel::High);
        assert_eq!(report.message, HIGH_RISK_MESSAGE);
        assert_eq!(report.factors.len(), 7);
    }

    #[test]
    fn test_defaults_are_low_risk() {
        let report = assess(&RiskAssessment::default());
        assert_eq!(report.score, 0);
        assert_eq!(report.level, RiskLevel::Low);
        assert!(report.factors.is_empty());
    }

    #[test]
    fn test_chronic_conditions_weigh_two() {
        let mut assessment = RiskAssessment::default();
        assessment.existing_conditions.insert(Condition::Asthma);
        assert_eq!(assess(&assessment).score, 0);

        assessment.existing_conditions.insert(Condition::Diabetes);
        assessment.existing_conditions.insert(Condition::Hypertension);
        assert_eq!(assess(&assessment).score, 2);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(6), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(7), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(9), RiskLevel::High);
    }

    #[test]
    fn test_boundary_values_do_not_fire() {
        let assessment = RiskAssessment {
            age: 45,
            activity_days: 3,
            bmi: 24.9,
            sleep_quality: 5,
            stress_level: 7,
            ..RiskAssessment::default()
        };
        assert_eq!(assess(&assessment).score, 0);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        let assessment = RiskAssessment {
            age: 0,
            ..RiskAssessment::default()
        };
        assert!(matches!(
            assess_checked(&assessment),
            Err(RiskError::Invalid(_))
        ));

        let assessment = RiskAssessment {
            bmi: 60.0,
            ..RiskAssessment::default()
        };
        assert!(assess_checked(&assessment).is_err());

        let assessment = RiskAssessment {
            activity_days: 8,
            ..RiskAssessment::default()
        };
        assert!(assess_checked(&assessment).is_err());

        assert!(assess_checked(&RiskAssessment::default()).is_ok());
    }
}
