mod device;
mod session;
mod synthetic;

pub use device::{MediaDevice, VideoStream};
pub use session::{Acquisition, CameraSessionHandle, DeviceCameraSession};
pub use synthetic::{CameraBehavior, SyntheticCamera};
