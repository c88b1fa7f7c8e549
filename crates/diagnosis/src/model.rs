//! Frozen diagnosis model
//!
//! Bundles the trained tree with everything a session needs once it lands
//! on a leaf: the per-label symptom profiles and the referral table. A model
//! is only constructed or loaded after the integrity check passes, so every
//! reachable leaf is guaranteed a profile and a referral.
//!
//! On disk the model is canonical JSON (`active.json`) next to the hex
//! Blake3 hash of those exact bytes (`active.hash`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ModelError;
use crate::profile::SymptomProfiles;
use crate::referral::ReferralTable;
use crate::serde_canon::{hash_canonical_hex, hash_hex, to_canonical_json};
use crate::tree::SymptomTree;

/// Current model format version
pub const MODEL_VERSION: u32 = 1;

pub const MODEL_FILE: &str = "active.json";
pub const HASH_FILE: &str = "active.hash";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub version: u32,
    /// Unix seconds
    pub created_at: u64,
    pub training_samples: usize,
    pub holdout_samples: usize,
    pub holdout_accuracy: Option<f64>,
}

impl ModelMetadata {
    pub fn new(
        training_samples: usize,
        holdout_samples: usize,
        holdout_accuracy: Option<f64>,
    ) -> Self {
        Self {
            version: MODEL_VERSION,
            created_at: chrono::Utc::now().timestamp().max(0) as u64,
            training_samples,
            holdout_samples,
            holdout_accuracy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisModel {
    pub metadata: ModelMetadata,
    pub tree: SymptomTree,
    pub profiles: SymptomProfiles,
    pub referrals: ReferralTable,
}

impl DiagnosisModel {
    /// Assemble a model, failing if any reachable leaf lacks a profile or
    /// a referral.
    pub fn build(
        metadata: ModelMetadata,
        tree: SymptomTree,
        profiles: SymptomProfiles,
        referrals: ReferralTable,
    ) -> Result<Self, ModelError> {
        let model = Self {
            metadata,
            tree,
            profiles,
            referrals,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.metadata.version != MODEL_VERSION {
            return Err(ModelError::UnsupportedVersion(self.metadata.version));
        }

        self.tree.validate()?;

        for leaf in self.tree.reachable_leaves() {
            let label = self
                .tree
                .leaf_label(leaf)
                .ok_or_else(|| ModelError::InvalidTree(format!("leaf {leaf} has no label")))?;

            if !self.profiles.contains(label) {
                return Err(ModelError::MissingProfile(label.to_string()));
            }
            if self.referrals.get(label).is_none() {
                return Err(ModelError::MissingReferral(label.to_string()));
            }
        }

        Ok(())
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 hash of the canonical JSON form, hex encoded
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Write `active.json` and `active.hash` into `dir`, creating it if
    /// needed. Returns the model path and the hash.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, String), ModelError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let json = self.to_canonical_json()?;
        let hash = hash_hex(json.as_bytes());

        let model_path = dir.join(MODEL_FILE);
        fs::write(&model_path, &json)?;
        fs::write(dir.join(HASH_FILE), &hash)?;

        debug!("Saved model to {} ({hash})", model_path.display());
        Ok((model_path, hash))
    }

    /// Load and validate a model file. When a sibling `.hash` file exists
    /// the file contents must match it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;

        let hash_path = path.with_extension("hash");
        if hash_path.exists() {
            let expected = fs::read_to_string(&hash_path)?.trim().to_string();
            let computed = hash_hex(json.as_bytes());
            if expected != computed {
                return Err(ModelError::HashMismatch { expected, computed });
            }
        }

        let model: DiagnosisModel = serde_json::from_str(&json)?;
        model.validate()?;

        info!(
            "Loaded diagnosis model from {}: {} symptoms, {} diseases, {} nodes",
            path.display(),
            model.symptom_count(),
            model.disease_count(),
            model.tree.nodes.len()
        );

        Ok(model)
    }

    pub fn symptom_count(&self) -> usize {
        self.tree.feature_names.len()
    }

    pub fn disease_count(&self) -> usize {
        self.tree.classes.len()
    }
}
