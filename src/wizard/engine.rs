use super::outcome::{AdvanceOutcome, ArtifactKind, BlockReason, EnterOutcome, Warning};
use super::state::{Submission, WizardState};
use super::types::{FieldKey, Step};
use super::validator::StepValidator;
use crate::camera::{Acquisition, DeviceCameraSession};
use crate::config::{IntakeConfig, WizardConfig};
use crate::error::{DeviceError, IntakeError, Result};
use crate::events::{EventBus, IntakeEvent};
use crate::signature::{Point, SignaturePad, SurfaceRect};
use chrono::Utc;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// State machine driving one intake flow.
///
/// All operations are synchronous except [`WizardEngine::settle_camera`].
/// Entering the Photo step starts a camera acquisition on the current tokio
/// runtime; leaving it (in either direction, or by completing) releases the
/// session. The collaborator must call [`WizardEngine::teardown`] when the
/// flow is abandoned.
pub struct WizardEngine {
    id: Uuid,
    config: WizardConfig,
    state: WizardState,
    pad: SignaturePad,
    camera: Arc<DeviceCameraSession>,
    pending_acquire: Option<JoinHandle<std::result::Result<Acquisition, DeviceError>>>,
    events: Arc<EventBus>,
    focused: Option<FieldKey>,
    submission: Option<Submission>,
}

impl WizardEngine {
    pub fn new(
        config: &IntakeConfig,
        camera: Arc<DeviceCameraSession>,
        events: Arc<EventBus>,
    ) -> Result<Self> {
        let pad = SignaturePad::new(&config.signature, &config.capture)?;

        Ok(Self {
            id: Uuid::new_v4(),
            config: config.wizard.clone(),
            state: WizardState::new(),
            pad,
            camera,
            pending_acquire: None,
            events,
            focused: None,
            submission: None,
        })
    }

    /// Enter the first step
    pub fn start(&mut self) {
        info!("Starting intake flow {}", self.id);
        self.focused = FieldKey::ALL.first().copied();
        self.publish(IntakeEvent::StepEntered {
            step: self.state.current_step,
            timestamp: SystemTime::now(),
        });

        if self.config.acquire_camera_on_start {
            self.begin_camera_acquisition();
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn focused_field(&self) -> Option<FieldKey> {
        self.focused
    }

    pub fn signature_pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn update_field(&mut self, key: FieldKey, value: impl Into<String>) {
        if self.ignore_after_completion("update_field") {
            return;
        }

        self.state.fields.insert(key, value.into());
        if self.state.errors.remove(&key).is_some() {
            debug!("Cleared error for {}", key.as_str());
        }
        self.publish(IntakeEvent::FieldUpdated { key });
    }

    /// Enter pressed in `key`: focus the next field, or advance from the last one
    pub fn submit_field(&mut self, key: FieldKey) -> EnterOutcome {
        if self.ignore_after_completion("submit_field") {
            return EnterOutcome::Advance(AdvanceOutcome::AlreadyCompleted);
        }

        match key.next() {
            Some(next) => {
                self.focused = Some(next);
                EnterOutcome::Focus(next)
            }
            None => EnterOutcome::Advance(self.request_advance()),
        }
    }

    pub fn request_advance(&mut self) -> AdvanceOutcome {
        if self.ignore_after_completion("request_advance") {
            return AdvanceOutcome::AlreadyCompleted;
        }

        self.sync_camera_status();
        let step = self.state.current_step;

        if let Err(reason) = self.evaluate_gate(step, self.state.camera_available) {
            return self.block(step, reason);
        }

        self.state.errors.clear();
        self.state.warning = None;

        match step.next() {
            Some(next) => {
                self.transition(next);
                AdvanceOutcome::Advanced(next)
            }
            None => self.complete(),
        }
    }

    pub fn request_back(&mut self) -> bool {
        if self.ignore_after_completion("request_back") {
            return false;
        }

        let Some(previous) = self.state.current_step.previous() else {
            debug!("Back requested on the first step");
            return false;
        };

        self.state.warning = None;
        self.transition(previous);
        true
    }

    /// Whether `request_advance` would pass right now. Never mutates.
    pub fn can_advance(&self) -> bool {
        !self.state.completed
            && self
                .evaluate_gate(self.state.current_step, self.camera.is_available())
                .is_ok()
    }

    pub fn begin_stroke(&mut self, point: Point, bounds: SurfaceRect) {
        if self.accepts_signature_input("begin_stroke") {
            self.pad.begin_stroke(point, bounds);
        }
    }

    pub fn extend_stroke(&mut self, point: Point, bounds: SurfaceRect) -> bool {
        self.accepts_signature_input("extend_stroke") && self.pad.extend_stroke(point, bounds)
    }

    /// Finish the active stroke; the flushed surface becomes the signature artifact.
    /// Returns whether an artifact was produced.
    pub fn end_stroke(&mut self) -> Result<bool> {
        if !self.accepts_signature_input("end_stroke") {
            return Ok(false);
        }

        let Some(artifact) = self.pad.end_stroke()? else {
            return Ok(false);
        };

        self.state.signature_artifact = Some(artifact);
        if self.state.warning == Some(Warning::MissingSignature) {
            self.state.warning = None;
        }
        self.publish(IntakeEvent::SignatureChanged { present: true });
        Ok(true)
    }

    pub fn clear_signature(&mut self) {
        if !self.accepts_signature_input("clear_signature") {
            return;
        }

        self.pad.clear();
        if self.state.signature_artifact.take().is_some() {
            self.publish(IntakeEvent::SignatureChanged { present: false });
        }
    }

    /// Take the photo from the live camera stream
    pub fn capture_photo(&mut self, render_width: u32, render_height: u32) -> Result<()> {
        if self.state.completed {
            return Err(IntakeError::component("wizard", "Flow already completed"));
        }
        if self.state.current_step != Step::Photo {
            return Err(IntakeError::component(
                "wizard",
                "Photo capture is only available on the Photo step",
            ));
        }

        let photo = self.camera.capture_frame(render_width, render_height)?;
        self.pending_acquire = None;

        self.publish(IntakeEvent::PhotoCaptured {
            width: photo.width(),
            height: photo.height(),
        });
        self.state.photo_artifact = Some(photo);
        if self.state.warning == Some(Warning::MissingPhoto) {
            self.state.warning = None;
        }
        Ok(())
    }

    /// Discard the photo and reacquire the camera for another attempt
    pub fn retake_photo(&mut self) {
        if self.ignore_after_completion("retake_photo") || self.state.current_step != Step::Photo {
            return;
        }

        if self.state.photo_artifact.take().is_some() {
            info!("Photo discarded for retake");
        }
        self.begin_camera_acquisition();
    }

    /// User-initiated retry after a device failure
    pub fn retry_camera(&mut self) {
        if self.ignore_after_completion("retry_camera") || self.state.current_step != Step::Photo {
            return;
        }

        info!("Retrying camera acquisition");
        self.begin_camera_acquisition();
    }

    /// Wait for an in-flight acquisition started by the engine and fold its outcome into state
    pub async fn settle_camera(
        &mut self,
    ) -> Option<std::result::Result<Acquisition, DeviceError>> {
        let task = self.pending_acquire.take()?;
        let outcome = task.await.unwrap_or_else(|e| {
            error!("Camera acquisition task failed: {}", e);
            Err(DeviceError::Unavailable)
        });

        self.sync_camera_status();
        Some(outcome)
    }

    /// Copy the session's latest acquisition outcome into state
    pub fn sync_camera_status(&mut self) {
        if self.state.completed {
            return;
        }

        let available = self.camera.is_available();
        if available != self.state.camera_available {
            self.state.camera_available = available;
            self.publish(IntakeEvent::CameraStatusChanged {
                available,
                error: self.camera.last_error(),
                timestamp: SystemTime::now(),
            });
        }

        match (available, self.state.warning) {
            (true, Some(Warning::Device(_))) => self.state.warning = None,
            (false, _) if self.state.current_step == Step::Photo => {
                let error = self.camera.last_error().unwrap_or(DeviceError::Unavailable);
                self.state.warning = Some(Warning::Device(error));
            }
            _ => {}
        }
    }

    /// Release every resource held by the flow. Safe to call more than once.
    pub fn teardown(&mut self) {
        info!("Tearing down intake flow {}", self.id);
        self.pending_acquire = None;
        self.camera.release();
    }

    fn evaluate_gate(
        &self,
        step: Step,
        camera_available: bool,
    ) -> std::result::Result<(), BlockReason> {
        match step {
            Step::PersonalInfo => {
                let errors = StepValidator::validate(step, &self.state.fields);
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(BlockReason::Validation(errors))
                }
            }
            Step::Signature => match self.state.signature_artifact {
                Some(_) => Ok(()),
                None => Err(BlockReason::MissingArtifact(ArtifactKind::Signature)),
            },
            Step::Photo => {
                if !camera_available {
                    let error = self.camera.last_error().unwrap_or(DeviceError::Unavailable);
                    Err(BlockReason::Device(error))
                } else if self.state.photo_artifact.is_none() {
                    Err(BlockReason::MissingArtifact(ArtifactKind::Photo))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn block(&mut self, step: Step, reason: BlockReason) -> AdvanceOutcome {
        match &reason {
            BlockReason::Validation(errors) => self.state.errors = errors.clone(),
            BlockReason::MissingArtifact(kind) => self.state.warning = Some(Warning::from(*kind)),
            BlockReason::Device(e) => self.state.warning = Some(Warning::Device(*e)),
        }

        warn!("Advance from {} blocked: {}", step.title(), reason);
        self.publish(IntakeEvent::AdvanceBlocked {
            step,
            reason: reason.to_string(),
        });
        AdvanceOutcome::Blocked(reason)
    }

    fn complete(&mut self) -> AdvanceOutcome {
        // Earlier gates are re-checked so no partial submission can escape
        for step in Step::ALL {
            if let Err(reason) = self.evaluate_gate(step, self.state.camera_available) {
                return self.block(self.state.current_step, reason);
            }
        }

        let (Some(signature), Some(photo)) = (
            self.state.signature_artifact.clone(),
            self.state.photo_artifact.clone(),
        ) else {
            return self.block(
                self.state.current_step,
                BlockReason::MissingArtifact(ArtifactKind::Signature),
            );
        };

        self.pending_acquire = None;
        self.camera.release();

        let submission = Submission {
            id: Uuid::new_v4(),
            fields: self.state.fields.clone(),
            signature,
            photo,
            completed_at: Utc::now(),
        };

        self.state.completed = true;
        self.focused = None;
        self.submission = Some(submission.clone());

        self.publish(IntakeEvent::Completed {
            submission_id: submission.id,
            timestamp: SystemTime::now(),
        });
        AdvanceOutcome::Completed(submission)
    }

    fn transition(&mut self, next: Step) {
        let from = self.state.current_step;
        if from == Step::Signature && next != Step::Signature && self.pad.cancel_stroke() {
            debug!("Unfinished stroke dropped on leaving the signature step");
        }
        if from == Step::Photo && next != Step::Photo {
            self.pending_acquire = None;
            self.camera.release();
        }

        self.state.current_step = next;
        info!("Step {} -> {}", from.title(), next.title());

        match next {
            Step::PersonalInfo => self.focused = FieldKey::ALL.first().copied(),
            Step::Signature => self.focused = None,
            Step::Photo => {
                self.focused = None;
                self.begin_camera_acquisition();
                self.sync_camera_status();
            }
        }

        self.publish(IntakeEvent::StepEntered {
            step: next,
            timestamp: SystemTime::now(),
        });
    }

    fn begin_camera_acquisition(&mut self) {
        if let Some(task) = &self.pending_acquire {
            if !task.is_finished() {
                debug!("Camera acquisition already in flight");
                return;
            }
        }

        match Handle::try_current() {
            Ok(runtime) => {
                let camera = Arc::clone(&self.camera);
                self.pending_acquire = Some(runtime.spawn(async move { camera.acquire().await }));
            }
            Err(_) => {
                warn!("No async runtime available; camera acquisition not started");
                self.pending_acquire = None;
                self.camera.record_failure(DeviceError::Unavailable);
                self.sync_camera_status();
            }
        }
    }

    fn accepts_signature_input(&self, operation: &str) -> bool {
        if self.ignore_after_completion(operation) {
            return false;
        }
        if self.state.current_step != Step::Signature {
            debug!(
                "Ignoring {} outside the signature step ({})",
                operation,
                self.state.current_step.title()
            );
            return false;
        }
        true
    }

    fn ignore_after_completion(&self, operation: &str) -> bool {
        if self.state.completed {
            warn!("Ignoring {} after the flow completed", operation);
        }
        self.state.completed
    }

    fn publish(&self, event: IntakeEvent) {
        if let Err(e) = self.events.publish(event) {
            trace!("Event not delivered: {}", e);
        }
    }
}
