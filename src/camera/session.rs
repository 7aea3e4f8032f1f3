use super::device::{MediaDevice, VideoStream};
use crate::capture::{CaptureBuffer, EncodedImage, ImageFormat};
use crate::config::CaptureConfig;
use crate::error::{CaptureError, DeviceError};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, error, info, trace, warn};

/// How a settled `acquire()` ended when no device error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// A stream is held by the session
    Live,
    /// `release()` superseded the request; any stream it produced was stopped
    Cancelled,
}

type PendingOutcome = Shared<BoxFuture<'static, Result<Acquisition, DeviceError>>>;

/// Live stream held by a session. Never leaves the session.
pub struct CameraSessionHandle {
    stream: Box<dyn VideoStream>,
    generation: u64,
    acquired_at: SystemTime,
}

impl CameraSessionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn acquired_at(&self) -> SystemTime {
        self.acquired_at
    }

    fn stop(mut self) {
        self.stream.stop();
    }
}

struct SessionState {
    /// Bumped by every request and every release; stale resolutions compare against it
    generation: u64,
    handle: Option<CameraSessionHandle>,
    pending: Option<PendingOutcome>,
    last_error: Option<DeviceError>,
}

/// Owns at most one camera stream and coordinates its acquisition and release.
///
/// `release()` may be called at any point, including while an acquisition is
/// still waiting on the platform. The pending request is invalidated and, if
/// the platform grants it later, the stream is stopped instead of installed.
pub struct DeviceCameraSession {
    device: Arc<dyn MediaDevice>,
    state: Arc<Mutex<SessionState>>,
    format: ImageFormat,
    jpeg_quality: u8,
}

impl DeviceCameraSession {
    pub fn new(device: Arc<dyn MediaDevice>, config: &CaptureConfig) -> Self {
        Self {
            device,
            state: Arc::new(Mutex::new(SessionState {
                generation: 0,
                handle: None,
                pending: None,
                last_error: None,
            })),
            format: config.format,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Obtain a live stream.
    ///
    /// Concurrent callers share the single in-flight request. Must be called
    /// from within a tokio runtime.
    pub async fn acquire(&self) -> Result<Acquisition, DeviceError> {
        let pending = {
            let mut state = self.state.lock();

            if state.handle.is_some() {
                debug!("Camera stream already held");
                return Ok(Acquisition::Live);
            }

            match &state.pending {
                Some(pending) => {
                    debug!("Joining in-flight camera acquisition");
                    pending.clone()
                }
                None => {
                    if !self.device.is_supported() {
                        warn!("No camera capture capability present");
                        state.last_error = Some(DeviceError::NotSupported);
                        return Err(DeviceError::NotSupported);
                    }

                    state.generation += 1;
                    let generation = state.generation;
                    info!("Requesting camera stream (generation {})", generation);

                    let pending = Self::spawn_request(
                        Arc::clone(&self.device),
                        Arc::clone(&self.state),
                        generation,
                    );
                    state.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn spawn_request(
        device: Arc<dyn MediaDevice>,
        state: Arc<Mutex<SessionState>>,
        generation: u64,
    ) -> PendingOutcome {
        let task = tokio::spawn(async move {
            let result = device.request_video_stream().await;

            let mut state = state.lock();
            let current = state.generation == generation;
            if current {
                state.pending = None;
            }

            match result {
                Ok(stream) if current => {
                    state.handle = Some(CameraSessionHandle {
                        stream,
                        generation,
                        acquired_at: SystemTime::now(),
                    });
                    state.last_error = None;
                    info!("Camera stream acquired (generation {})", generation);
                    Ok(Acquisition::Live)
                }
                Ok(mut stream) => {
                    drop(state);
                    stream.stop();
                    debug!(
                        "Camera acquisition {} was superseded; stream stopped",
                        generation
                    );
                    Ok(Acquisition::Cancelled)
                }
                Err(e) if current => {
                    warn!("Camera acquisition failed: {}", e);
                    state.last_error = Some(e);
                    Err(e)
                }
                Err(e) => {
                    debug!(
                        "Ignoring failure of superseded camera acquisition {}: {}",
                        generation, e
                    );
                    Ok(Acquisition::Cancelled)
                }
            }
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                error!("Camera acquisition task failed: {}", e);
                Err(DeviceError::Unavailable)
            })
        })
        .boxed()
        .shared()
    }

    /// Stop the held stream, if any, and invalidate any pending acquisition.
    /// Idempotent.
    pub fn release(&self) {
        let handle = {
            let mut state = self.state.lock();
            state.generation += 1;
            if state.pending.take().is_some() {
                debug!("Pending camera acquisition invalidated");
            }
            state.handle.take()
        };

        match handle {
            Some(handle) => {
                let generation = handle.generation();
                handle.stop();
                info!("Camera stream released (generation {})", generation);
            }
            None => trace!("Camera release requested with no stream held"),
        }
    }

    /// Grab the current frame at the source's natural resolution and encode it.
    ///
    /// The render target size is advisory only. On success the stream is
    /// released; a new photo needs a fresh `acquire()`.
    pub fn capture_frame(
        &self,
        render_target_width: u32,
        render_target_height: u32,
    ) -> Result<EncodedImage, CaptureError> {
        let frame = {
            let state = self.state.lock();
            let handle = state.handle.as_ref().ok_or(CaptureError::NotAcquired)?;
            handle.stream.latest_frame()
        };

        let frame = frame
            .filter(|frame| frame.width > 0 && frame.height > 0)
            .ok_or(CaptureError::NoFrame)?;

        if (render_target_width, render_target_height) != (frame.width, frame.height) {
            debug!(
                "Render target {}x{} differs from source {}x{}; using source resolution",
                render_target_width, render_target_height, frame.width, frame.height
            );
        }

        let artifact = CaptureBuffer::from_frame(&frame)?.encode(self.format, self.jpeg_quality)?;
        info!(
            "Captured frame {} ({}x{}, {} bytes)",
            frame.id,
            artifact.width(),
            artifact.height(),
            artifact.len()
        );

        self.release();
        Ok(artifact)
    }

    /// Record a failure that happened before any request reached the device.
    /// A later successful acquisition clears it.
    pub fn record_failure(&self, error: DeviceError) {
        warn!("Camera acquisition could not start: {}", error);
        self.state.lock().last_error = Some(error);
    }

    /// False once the most recent acquisition failed
    pub fn is_available(&self) -> bool {
        self.state.lock().last_error.is_none()
    }

    pub fn last_error(&self) -> Option<DeviceError> {
        self.state.lock().last_error
    }

    pub fn is_live(&self) -> bool {
        self.state.lock().handle.is_some()
    }

    pub fn is_acquiring(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}
