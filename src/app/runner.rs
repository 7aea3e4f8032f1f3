use super::script::SessionScript;
use crate::camera::{DeviceCameraSession, MediaDevice, SyntheticCamera};
use crate::config::IntakeConfig;
use crate::error::{IntakeError, Result};
use crate::events::EventBus;
use crate::signature::SurfaceRect;
use crate::wizard::{AdvanceOutcome, EnterOutcome, FieldKey, Step, Submission, WizardEngine};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// How a scripted session ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionReport {
    Completed {
        message: String,
        submission: Submission,
    },
    Blocked {
        step: Step,
        reason: String,
        /// Inline warning shown to the user, if any
        warning: Option<String>,
        errors: BTreeMap<FieldKey, String>,
    },
}

impl SessionReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionReport::Completed { .. })
    }
}

/// Replays a [`SessionScript`] through a fresh engine, acting as the rendering layer
pub struct SessionRunner {
    config: IntakeConfig,
    event_bus: Arc<EventBus>,
}

impl SessionRunner {
    pub fn new(config: IntakeConfig) -> Self {
        let event_bus = Arc::new(EventBus::with_debug_logging(
            config.system.event_bus_capacity,
        ));
        Self { config, event_bus }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Drive one session to completion or to the first refused advance.
    /// The camera is released whatever the outcome.
    pub async fn run(&self, script: &SessionScript) -> Result<SessionReport> {
        let device: Arc<dyn MediaDevice> = Arc::new(SyntheticCamera::new(
            script.camera,
            self.config.camera.resolution,
        ));
        let camera = Arc::new(DeviceCameraSession::new(device, &self.config.capture));
        let mut engine = WizardEngine::new(&self.config, camera, self.event_bus())?;

        engine.start();
        let report = self.drive(&mut engine, script).await;
        engine.teardown();

        match &report {
            Ok(SessionReport::Completed { submission, .. }) => {
                info!("Session {} completed as {}", engine.id(), submission.id)
            }
            Ok(SessionReport::Blocked { step, reason, .. }) => {
                warn!("Session {} stopped at {}: {}", engine.id(), step.title(), reason)
            }
            Err(e) => warn!("Session {} failed: {}", engine.id(), e),
        }
        report
    }

    async fn drive(
        &self,
        engine: &mut WizardEngine,
        script: &SessionScript,
    ) -> Result<SessionReport> {
        for (key, value) in script.field_values()? {
            engine.update_field(key, value);
        }
        let outcome = submit_last_field(engine);
        if let Some(report) = Self::settle_outcome(engine, outcome)? {
            return Ok(report);
        }

        let full_surface = SurfaceRect::new(
            0.0,
            0.0,
            self.config.signature.width as f32,
            self.config.signature.height as f32,
        );
        for stroke in &script.strokes {
            let bounds = stroke.bounds.unwrap_or(full_surface);
            let Some((first, rest)) = stroke.points.split_first() else {
                continue;
            };

            engine.begin_stroke(*first, bounds);
            for point in rest {
                engine.extend_stroke(*point, bounds);
            }
            engine.end_stroke()?;
        }
        let outcome = engine.request_advance();
        if let Some(report) = Self::settle_outcome(engine, outcome)? {
            return Ok(report);
        }

        engine.settle_camera().await;
        if script.take_photo && engine.state().camera_available() {
            let (width, height) = script.render_size;
            if let Err(e) = engine.capture_photo(width, height) {
                warn!("Photo capture failed: {}", e);
            }
        }

        let outcome = engine.request_advance();
        Self::settle_outcome(engine, outcome)?.ok_or_else(|| {
            IntakeError::system("Session advanced past the last step without completing")
        })
    }

    /// `None` while the flow keeps moving, otherwise the final report
    fn settle_outcome(
        engine: &WizardEngine,
        outcome: AdvanceOutcome,
    ) -> Result<Option<SessionReport>> {
        match outcome {
            AdvanceOutcome::Advanced(_) => Ok(None),
            AdvanceOutcome::Blocked(reason) => Ok(Some(SessionReport::Blocked {
                step: engine.current_step(),
                reason: reason.to_string(),
                warning: engine.state().warning().map(|w| w.message()),
                errors: engine.state().errors().clone(),
            })),
            AdvanceOutcome::Completed(submission) => Ok(Some(SessionReport::Completed {
                message: Submission::SUCCESS_MESSAGE.to_string(),
                submission,
            })),
            AdvanceOutcome::AlreadyCompleted => engine
                .submission()
                .cloned()
                .map(|submission| {
                    Some(SessionReport::Completed {
                        message: Submission::SUCCESS_MESSAGE.to_string(),
                        submission,
                    })
                })
                .ok_or_else(|| IntakeError::system("Flow completed without a submission")),
        }
    }
}

/// Enter in the last field submits the step, as a keyboard user would
fn submit_last_field(engine: &mut WizardEngine) -> AdvanceOutcome {
    let last = FieldKey::ALL[FieldKey::ALL.len() - 1];
    match engine.submit_field(last) {
        EnterOutcome::Advance(outcome) => outcome,
        EnterOutcome::Focus(_) => engine.request_advance(),
    }
}
