use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("Camera device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl IntakeError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a failed camera acquisition
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceError {
    #[error("No camera capture capability on this platform")]
    NotSupported,

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable")]
    Unavailable,
}

impl DeviceError {
    /// Text for the persistent warning banner shown while the Photo step is blocked
    pub fn user_message(&self) -> String {
        match self {
            DeviceError::NotSupported => "No camera detected on this device.".to_string(),
            DeviceError::PermissionDenied => {
                "Camera access was denied. Allow camera access and retry.".to_string()
            }
            DeviceError::Unavailable => "Camera not available. Cannot continue.".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Camera session has no acquired stream")]
    NotAcquired,

    #[error("Camera has not produced a decodable frame yet")]
    NoFrame,

    #[error("Invalid frame data: {details}")]
    InvalidFrame { details: String },

    #[error("Image encoding failed: {details}")]
    Encode { details: String },

    #[error("Invalid data URI: {details}")]
    InvalidDataUri { details: String },
}

#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T, E = IntakeError> = std::result::Result<T, E>;
