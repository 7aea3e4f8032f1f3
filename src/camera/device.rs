use crate::error::DeviceError;
use crate::frame::FrameData;
use async_trait::async_trait;

/// Platform capability that hands out live video streams
#[async_trait]
pub trait MediaDevice: Send + Sync {
    /// Whether a capture API exists at all. Must not trigger a permission prompt.
    fn is_supported(&self) -> bool;

    /// Ask the platform for a video stream, suspending until access is granted or denied
    async fn request_video_stream(&self) -> Result<Box<dyn VideoStream>, DeviceError>;
}

/// A live video stream owned by a camera session
pub trait VideoStream: Send {
    /// Most recent frame, or `None` before the source has produced one
    fn latest_frame(&self) -> Option<FrameData>;

    /// Stop every underlying track. Calling twice is harmless.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}
