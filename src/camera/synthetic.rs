use super::device::{MediaDevice, VideoStream};
use crate::error::DeviceError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

/// How the synthetic platform answers a stream request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraBehavior {
    Grant,
    Deny,
    Unsupported,
    Unavailable,
}

/// Software camera producing a test pattern.
///
/// Used by the driver binary in place of a platform camera and by tests,
/// which can hold requests open with [`SyntheticCamera::gated`] and count the
/// streams that were handed out but not yet stopped.
pub struct SyntheticCamera {
    behavior: CameraBehavior,
    resolution: (u32, u32),
    produces_frames: bool,
    gate: Option<Arc<Semaphore>>,
    requests: AtomicUsize,
    live_streams: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    pub fn new(behavior: CameraBehavior, resolution: (u32, u32)) -> Self {
        Self {
            behavior,
            resolution,
            produces_frames: true,
            gate: None,
            requests: AtomicUsize::new(0),
            live_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold every request until [`SyntheticCamera::answer_requests`] is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Streams never produce a frame, like a camera still warming up
    pub fn without_frames(mut self) -> Self {
        self.produces_frames = false;
        self
    }

    /// Let `count` held requests resolve
    pub fn answer_requests(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Number of stream requests that reached the platform
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevice for SyntheticCamera {
    fn is_supported(&self) -> bool {
        self.behavior != CameraBehavior::Unsupported
    }

    async fn request_video_stream(&self) -> Result<Box<dyn VideoStream>, DeviceError> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Synthetic camera request {} ({:?})", request, self.behavior);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| DeviceError::Unavailable)?
                .forget();
        }

        match self.behavior {
            CameraBehavior::Grant => {
                self.live_streams.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(SyntheticStream {
                    resolution: self.resolution,
                    produces_frames: self.produces_frames,
                    frame_counter: AtomicU64::new(0),
                    live: true,
                    live_streams: Arc::clone(&self.live_streams),
                }))
            }
            CameraBehavior::Deny => Err(DeviceError::PermissionDenied),
            CameraBehavior::Unsupported => Err(DeviceError::NotSupported),
            CameraBehavior::Unavailable => Err(DeviceError::Unavailable),
        }
    }
}

struct SyntheticStream {
    resolution: (u32, u32),
    produces_frames: bool,
    frame_counter: AtomicU64,
    live: bool,
    live_streams: Arc<AtomicUsize>,
}

impl VideoStream for SyntheticStream {
    fn latest_frame(&self) -> Option<FrameData> {
        if !self.live || !self.produces_frames {
            return None;
        }

        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let (width, height) = self.resolution;
        let mut data = Vec::with_capacity((width * height * 3) as usize);

        // Gradient test pattern shifted by frame id
        for y in 0..height {
            for x in 0..width {
                let r = ((x * 255) / width.max(1)) as u8;
                let g = ((y * 255) / height.max(1)) as u8;
                let b = (frame_id % 256) as u8;
                data.extend_from_slice(&[r, g, b]);
            }
        }

        trace!("Generated synthetic frame {} ({}x{})", frame_id, width, height);
        Some(FrameData::new(
            frame_id,
            SystemTime::now(),
            data,
            width,
            height,
            FrameFormat::Rgb24,
        ))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.live_streams.fetch_sub(1, Ordering::SeqCst);
            debug!("Synthetic stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
