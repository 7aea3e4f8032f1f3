use crate::error::{DeviceError, EventBusError};
use crate::wizard::{FieldKey, Step};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events emitted by the intake flow for the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntakeEvent {
    /// The wizard entered a step
    StepEntered { step: Step, timestamp: SystemTime },
    /// A field value changed
    FieldUpdated { key: FieldKey },
    /// An advance attempt was refused
    AdvanceBlocked { step: Step, reason: String },
    /// The signature artifact was set or cleared
    SignatureChanged { present: bool },
    /// A photo was captured from the camera
    PhotoCaptured { width: u32, height: u32 },
    /// Camera availability changed after an acquisition settled
    CameraStatusChanged {
        available: bool,
        error: Option<DeviceError>,
        timestamp: SystemTime,
    },
    /// Every gate passed and the submission was produced
    Completed {
        submission_id: Uuid,
        timestamp: SystemTime,
    },
}

impl IntakeEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            IntakeEvent::StepEntered { step, .. } => format!("Entered step: {}", step.title()),
            IntakeEvent::FieldUpdated { key } => format!("Field updated: {}", key.as_str()),
            IntakeEvent::AdvanceBlocked { step, reason } => {
                format!("Advance blocked at {}: {}", step.title(), reason)
            }
            IntakeEvent::SignatureChanged { present } => format!(
                "Signature {}",
                if *present { "captured" } else { "cleared" }
            ),
            IntakeEvent::PhotoCaptured { width, height } => {
                format!("Photo captured ({}x{})", width, height)
            }
            IntakeEvent::CameraStatusChanged {
                available, error, ..
            } => match error {
                Some(error) => format!("Camera unavailable: {}", error),
                None => format!(
                    "Camera {}",
                    if *available { "available" } else { "unavailable" }
                ),
            },
            IntakeEvent::Completed { submission_id, .. } => {
                format!("Intake completed: {}", submission_id)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            IntakeEvent::StepEntered { .. } => "step_entered",
            IntakeEvent::FieldUpdated { .. } => "field_updated",
            IntakeEvent::AdvanceBlocked { .. } => "advance_blocked",
            IntakeEvent::SignatureChanged { .. } => "signature_changed",
            IntakeEvent::PhotoCaptured { .. } => "photo_captured",
            IntakeEvent::CameraStatusChanged { .. } => "camera_status_changed",
            IntakeEvent::Completed { .. } => "completed",
        }
    }
}

/// Event bus for the rendering layer using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<IntakeEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: IntakeEvent) -> Result<usize, EventBusError> {
        match &event {
            IntakeEvent::CameraStatusChanged { available, .. } => {
                if *available {
                    info!("{}", event.description());
                } else {
                    warn!("{}", event.description());
                }
            }
            IntakeEvent::Completed { .. } => info!("{}", event.description()),
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
