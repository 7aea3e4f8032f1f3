pub mod app;
pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod signature;
pub mod wizard;

pub use app::{ScriptStroke, SessionReport, SessionRunner, SessionScript};
pub use camera::{
    Acquisition, CameraBehavior, DeviceCameraSession, MediaDevice, SyntheticCamera, VideoStream,
};
pub use capture::{CaptureBuffer, EncodedImage, ImageFormat};
pub use config::IntakeConfig;
pub use error::{CaptureError, DeviceError, IntakeError, Result};
pub use events::{EventBus, IntakeEvent};
pub use frame::{FrameData, FrameFormat};
pub use signature::{Point, SignaturePad, SurfaceRect};
pub use wizard::{
    AdvanceOutcome, BlockReason, FieldKey, Step, Submission, Warning, WizardEngine, WizardState,
};
