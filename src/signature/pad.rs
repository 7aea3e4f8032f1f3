use super::geometry::{Point, SurfaceRect};
use crate::capture::{parse_hex_color, CaptureBuffer, EncodedImage, ImageFormat};
use crate::config::{CaptureConfig, SignatureConfig};
use crate::error::{IntakeError, Result};
use image::Rgba;
use tracing::{debug, trace};

/// Pen used for signature strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba<u8>,
    pub line_width: f32,
}

impl StrokeStyle {
    pub fn from_config(config: &SignatureConfig) -> Result<Self> {
        let color = parse_hex_color(&config.stroke_color).ok_or_else(|| {
            IntakeError::component(
                "signature_pad".to_string(),
                format!("Invalid stroke colour '{}'", config.stroke_color),
            )
        })?;

        Ok(Self {
            color,
            line_width: config.line_width,
        })
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba([59, 130, 246, 255]),
            line_width: 3.0,
        }
    }
}

/// Accumulates pointer strokes on a fixed-size surface.
///
/// The pad has no opinion on whether a drawing is "empty": every completed
/// stroke flushes, even if no ink landed on the surface.
pub struct SignaturePad {
    surface: CaptureBuffer,
    style: StrokeStyle,
    format: ImageFormat,
    jpeg_quality: u8,
    /// Last surface-local point of the active stroke
    cursor: Option<Point>,
    strokes: usize,
}

impl SignaturePad {
    pub fn new(signature: &SignatureConfig, capture: &CaptureConfig) -> Result<Self> {
        Ok(Self::with_style(
            signature.width,
            signature.height,
            StrokeStyle::from_config(signature)?,
            capture,
        ))
    }

    pub fn with_style(
        width: u32,
        height: u32,
        style: StrokeStyle,
        capture: &CaptureConfig,
    ) -> Self {
        Self {
            surface: CaptureBuffer::new(width, height),
            style,
            format: capture.format,
            jpeg_quality: capture.jpeg_quality,
            cursor: None,
            strokes: 0,
        }
    }

    pub fn begin_stroke(&mut self, point: Point, bounds: SurfaceRect) {
        let local = self.to_local(point, bounds);
        trace!("Stroke begins at ({:.1}, {:.1})", local.x, local.y);
        self.cursor = Some(local);
    }

    /// Draw to `point`. Returns false when no stroke is active.
    pub fn extend_stroke(&mut self, point: Point, bounds: SurfaceRect) -> bool {
        let Some(from) = self.cursor else {
            return false;
        };

        let to = self.to_local(point, bounds);
        self.surface.draw_segment(
            (from.x, from.y),
            (to.x, to.y),
            self.style.color,
            self.style.line_width,
        );
        self.cursor = Some(to);
        true
    }

    /// Drop the active stroke without flushing. Ink already drawn stays.
    pub fn cancel_stroke(&mut self) -> bool {
        let cancelled = self.cursor.take().is_some();
        if cancelled {
            debug!("Active stroke cancelled");
        }
        cancelled
    }

    /// Finish the active stroke and flush the surface into a new artifact.
    ///
    /// Returns `Ok(None)` when no stroke was active.
    pub fn end_stroke(&mut self) -> Result<Option<EncodedImage>> {
        if self.cursor.take().is_none() {
            return Ok(None);
        }

        self.strokes += 1;
        let artifact = self.surface.encode(self.format, self.jpeg_quality)?;
        debug!(
            "Signature flushed after stroke {} ({} bytes)",
            self.strokes,
            artifact.len()
        );
        Ok(Some(artifact))
    }

    /// Wipe the surface. The caller treats this as "no artifact".
    pub fn clear(&mut self) {
        self.surface.clear();
        self.cursor = None;
        self.strokes = 0;
        debug!("Signature surface cleared");
    }

    pub fn is_stroke_active(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes
    }

    pub fn has_ink(&self) -> bool {
        !self.surface.is_blank()
    }

    pub fn surface(&self) -> &CaptureBuffer {
        &self.surface
    }

    fn to_local(&self, point: Point, bounds: SurfaceRect) -> Point {
        bounds.to_surface(point, self.surface.width(), self.surface.height())
    }
}
