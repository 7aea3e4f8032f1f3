use super::state::Submission;
use super::types::{FieldKey, Step};
use crate::error::DeviceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Capture artifact a step waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Signature,
    Photo,
}

/// Why an advance was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Blank required fields with their messages
    Validation(BTreeMap<FieldKey, String>),
    MissingArtifact(ArtifactKind),
    Device(DeviceError),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Validation(errors) => {
                let keys: Vec<&str> = errors.keys().map(FieldKey::as_str).collect();
                write!(f, "invalid fields: {}", keys.join(", "))
            }
            BlockReason::MissingArtifact(ArtifactKind::Signature) => write!(f, "missing signature"),
            BlockReason::MissingArtifact(ArtifactKind::Photo) => write!(f, "missing photo"),
            BlockReason::Device(e) => write!(f, "{}", e),
        }
    }
}

/// Result of `WizardEngine::request_advance`
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Advanced(Step),
    Blocked(BlockReason),
    Completed(Submission),
    /// The flow had already completed; nothing changed
    AlreadyCompleted,
}

impl AdvanceOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, AdvanceOutcome::Blocked(_))
    }

    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            AdvanceOutcome::Blocked(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result of pressing Enter in a field
#[derive(Debug, Clone)]
pub enum EnterOutcome {
    /// Focus moved to the next field
    Focus(FieldKey),
    /// Enter in the last field attempted to advance
    Advance(AdvanceOutcome),
}

/// Inline warning text shown while an advance is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    MissingSignature,
    MissingPhoto,
    Device(DeviceError),
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::MissingSignature => {
                "Please provide your digital signature before continuing.".to_string()
            }
            Warning::MissingPhoto => "Please take a picture before continuing.".to_string(),
            Warning::Device(e) => e.user_message(),
        }
    }

    /// Device warnings stay until the camera recovers
    pub fn is_persistent(&self) -> bool {
        matches!(self, Warning::Device(_))
    }
}

impl From<ArtifactKind> for Warning {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Signature => Warning::MissingSignature,
            ArtifactKind::Photo => Warning::MissingPhoto,
        }
    }
}
