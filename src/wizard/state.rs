use super::outcome::Warning;
use super::types::{FieldKey, Step};
use crate::capture::EncodedImage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Everything the rendering layer reads. Only `WizardEngine` mutates it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub(super) current_step: Step,
    pub(super) fields: BTreeMap<FieldKey, String>,
    pub(super) errors: BTreeMap<FieldKey, String>,
    pub(super) signature_artifact: Option<EncodedImage>,
    pub(super) photo_artifact: Option<EncodedImage>,
    pub(super) camera_available: bool,
    pub(super) completed: bool,
    pub(super) warning: Option<Warning>,
}

impl WizardState {
    pub(super) fn new() -> Self {
        Self {
            current_step: Step::PersonalInfo,
            fields: FieldKey::ALL
                .into_iter()
                .map(|key| (key, String::new()))
                .collect(),
            errors: BTreeMap::new(),
            signature_artifact: None,
            photo_artifact: None,
            camera_available: true,
            completed: false,
            warning: None,
        }
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn fields(&self) -> &BTreeMap<FieldKey, String> {
        &self.fields
    }

    pub fn field(&self, key: FieldKey) -> &str {
        self.fields.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn errors(&self) -> &BTreeMap<FieldKey, String> {
        &self.errors
    }

    pub fn error(&self, key: FieldKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    pub fn signature_artifact(&self) -> Option<&EncodedImage> {
        self.signature_artifact.as_ref()
    }

    pub fn photo_artifact(&self) -> Option<&EncodedImage> {
        self.photo_artifact.as_ref()
    }

    pub fn camera_available(&self) -> bool {
        self.camera_available
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn warning(&self) -> Option<Warning> {
        self.warning
    }

    pub fn progress_percent(&self) -> f32 {
        if self.completed {
            100.0
        } else {
            self.current_step.progress_percent()
        }
    }
}

/// The completed intake, produced once every gate has passed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub fields: BTreeMap<FieldKey, String>,
    pub signature: EncodedImage,
    pub photo: EncodedImage,
    pub completed_at: DateTime<Utc>,
}

impl Submission {
    pub const SUCCESS_MESSAGE: &'static str = "Success! Your information has been submitted.";
}
