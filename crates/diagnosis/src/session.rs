//! Pull-based yes/no diagnosis session
//!
//! A session starts at the root of a frozen model and asks one symptom per
//! split node. Each answer moves it one step down; once it sits on a leaf it
//! is terminal and can report the diagnosis. Sessions are independent and
//! never modify the model they walk.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;
use crate::model::DiagnosisModel;
use crate::referral::ReferralRecord;
use crate::tree::Node;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Asking,
    Terminal,
}

/// One answered question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssessmentAnswer {
    pub feature_name: String,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisResult {
    pub label: String,
    /// Observed present symptoms over the label's training symptoms, in [0, 1]
    pub confidence: f64,
    pub present_symptoms: Vec<String>,
    pub referral: ReferralRecord,
    pub answers: Vec<AssessmentAnswer>,
}

/// `present / associated`, 0 when the label has no associated symptoms.
/// Capped at 1 since a path can confirm symptoms outside the label's profile.
pub fn confidence(present: usize, associated: usize) -> f64 {
    if associated == 0 {
        return 0.0;
    }
    (present as f64 / associated as f64).min(1.0)
}

/// Turn a column name such as `skin_rash` into `skin rash`.
pub fn humanize_symptom(name: &str) -> String {
    name.trim().replace('_', " ")
}

#[derive(Debug, Clone)]
pub struct DiagnosisSession {
    model: Arc<DiagnosisModel>,
    node: usize,
    answers: Vec<AssessmentAnswer>,
    present: Vec<String>,
}

impl DiagnosisSession {
    pub fn new(model: Arc<DiagnosisModel>) -> Self {
        Self {
            model,
            node: 0,
            answers: Vec::new(),
            present: Vec::new(),
        }
    }

    pub fn model(&self) -> &Arc<DiagnosisModel> {
        &self.model
    }

    pub fn state(&self) -> SessionState {
        match self.model.tree.node(self.node) {
            Some(Node::Split { .. }) => SessionState::Asking,
            _ => SessionState::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state() == SessionState::Terminal
    }

    /// Symptom asked at the current node, `None` once terminal.
    pub fn current_question(&self) -> Option<&str> {
        match self.model.tree.node(self.node) {
            Some(Node::Split { feature_idx, .. }) => self.model.tree.feature_name(*feature_idx),
            _ => None,
        }
    }

    pub fn question_text(&self) -> Option<String> {
        self.current_question()
            .map(|name| format!("Do you experience {}?", humanize_symptom(name)))
    }

    /// Answer the current question. Yes is coded 1, no is coded 0; a coded
    /// value at or below the node threshold goes left, anything above it
    /// marks the symptom present and goes right.
    pub fn answer(&mut self, present: bool) -> Result<SessionState, SessionError> {
        let (feature_idx, threshold, left, right) = match self.model.tree.node(self.node) {
            Some(Node::Split {
                feature_idx,
                threshold,
                left,
                right,
            }) => (*feature_idx, *threshold, *left, *right),
            Some(Node::Leaf { .. }) => return Err(SessionError::AlreadyTerminal),
            None => return Err(SessionError::InvalidNode(self.node)),
        };

        let feature_name = self
            .model
            .tree
            .feature_name(feature_idx)
            .ok_or(SessionError::InvalidNode(self.node))?
            .to_string();

        let coded = if present { 1.0 } else { 0.0 };
        if coded <= threshold {
            self.node = left;
        } else {
            self.present.push(feature_name.clone());
            self.node = right;
        }

        self.answers.push(AssessmentAnswer {
            feature_name,
            present,
        });

        Ok(self.state())
    }

    /// Questions asked so far, root first.
    pub fn asked(&self) -> Vec<&str> {
        self.answers.iter().map(|a| a.feature_name.as_str()).collect()
    }

    pub fn answers(&self) -> &[AssessmentAnswer] {
        &self.answers
    }

    pub fn present_symptoms(&self) -> &[String] {
        &self.present
    }

    /// Diagnosis for a terminal session.
    pub fn result(&self) -> Result<DiagnosisResult, SessionError> {
        match self.model.tree.node(self.node) {
            Some(Node::Leaf { .. }) => {}
            Some(Node::Split { .. }) => return Err(SessionError::NotFinished),
            None => return Err(SessionError::InvalidNode(self.node)),
        }

        let label = self
            .model
            .tree
            .leaf_label(self.node)
            .ok_or(SessionError::InvalidNode(self.node))?;

        let associated = self
            .model
            .profiles
            .get(label)
            .ok_or_else(|| SessionError::MissingProfile(label.to_string()))?;

        let referral = self
            .model
            .referrals
            .get(label)
            .ok_or_else(|| SessionError::MissingReferral(label.to_string()))?;

        Ok(DiagnosisResult {
            label: label.to_string(),
            confidence: confidence(self.present.len(), associated.len()),
            present_symptoms: self.present.clone(),
            referral: referral.clone(),
            answers: self.answers.clone(),
        })
    }
}
