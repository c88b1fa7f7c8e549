//! Plain-text rendering of API responses

use std::fmt::Write;

use crate::client::{DiagnosisOutcome, DiseaseInfo, DiseaseSummary, RiskReportView};

/// First letter upper-cased, the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn disease(name: &str, info: &DiseaseInfo, tip: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", capitalize(name.trim()));
    let _ = writeln!(out, "Description: {}", info.description);
    if info.is_not_found() {
        return out;
    }

    let _ = writeln!(out, "Symptoms:");
    for symptom in &info.symptoms {
        let _ = writeln!(out, "  - {symptom}");
    }
    let _ = writeln!(out, "Treatment: {}", info.treatment);
    let _ = writeln!(out, "Recommendations:");
    let _ = writeln!(out, "  Exercise: {}", info.exercise);
    let _ = writeln!(out, "  Sleep hours: {}", info.sleep_hours);
    let _ = writeln!(out, "  Diet: {}", info.diet);
    let _ = writeln!(out, "Health tip: {tip}");
    out
}

pub fn related(symptom: &str, diseases: &[DiseaseSummary]) -> String {
    if diseases.is_empty() {
        return "No related diseases found for this symptom.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Diseases related to symptom '{symptom}'");
    for disease in diseases {
        let _ = writeln!(out, "* {}", capitalize(&disease.name));
        let _ = writeln!(out, "  {}", disease.description);
        let _ = writeln!(out, "  Treatment: {}", disease.treatment);
    }
    out
}

pub fn risk(report: &RiskReportView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Your health risk score is: {} ({})",
        report.score, report.level
    );
    let _ = writeln!(out, "{}", report.message);
    if !report.factors.is_empty() {
        let _ = writeln!(out, "Contributing factors: {}", report.factors.join(", "));
    }
    out
}

pub fn diagnosis(outcome: &DiagnosisOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "You may have: {}", outcome.label);
    let _ = writeln!(out, "Confidence level: {:.2}", outcome.confidence);
    let symptoms: Vec<String> = outcome
        .present_symptoms
        .iter()
        .map(|s| s.replace('_', " "))
        .collect();
    let _ = writeln!(out, "Symptoms present: {}", symptoms.join(", "));
    let _ = writeln!(out, "Consult: {}", outcome.referral.provider_name);
    let _ = writeln!(out, "Visit: {}", outcome.referral.provider_link);
    out
}
