use super::artifact::{EncodedImage, ImageFormat};
use crate::error::CaptureError;
use crate::frame::{FrameData, FrameFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use tracing::{debug, trace};

/// Fully transparent pixel, the blank state of a drawing surface
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Owned RGBA raster that drawing and photographing render into.
pub struct CaptureBuffer {
    pixels: RgbaImage,
}

impl CaptureBuffer {
    /// Blank (transparent) buffer of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, BLANK),
        }
    }

    /// Render a camera frame at its natural resolution
    pub fn from_frame(frame: &FrameData) -> Result<Self, CaptureError> {
        if !frame.is_decodable() {
            return Err(CaptureError::InvalidFrame {
                details: format!(
                    "frame {} is {}x{} with {} bytes of {:?}",
                    frame.id,
                    frame.width,
                    frame.height,
                    frame.data.len(),
                    frame.format
                ),
            });
        }

        let pixels = match frame.format {
            FrameFormat::Rgba32 => {
                RgbaImage::from_raw(frame.width, frame.height, frame.data.to_vec())
            }
            FrameFormat::Rgb24 => {
                image::RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
                    .map(|rgb| DynamicImage::ImageRgb8(rgb).to_rgba8())
            }
        }
        .ok_or_else(|| CaptureError::InvalidFrame {
            details: format!("frame {} does not match its dimensions", frame.id),
        })?;

        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BLANK;
        }
    }

    /// True when nothing has been drawn
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    /// Draw a round-capped line segment of the given width.
    ///
    /// The segment is clipped to the surface widened by the pen radius, so
    /// the work done is bounded by the surface size whatever the input points.
    pub fn draw_segment(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        color: Rgba<u8>,
        width: f32,
    ) {
        let radius = ((width / 2.0).ceil() as i32).max(1);
        let margin = radius as f32;
        let min = (-margin, -margin);
        let max = (self.width() as f32 + margin, self.height() as f32 + margin);

        let Some((from, to)) = clip_segment(from, to, min, max) else {
            trace!(
                "Segment ({:.1},{:.1}) -> ({:.1},{:.1}) misses the surface",
                from.0,
                from.1,
                to.0,
                to.1
            );
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (from.0 + dx * t).round() as i32;
            let y = (from.1 + dy * t).round() as i32;
            draw_filled_circle_mut(&mut self.pixels, (x, y), radius, color);
        }

        trace!(
            "Drew segment ({:.1},{:.1}) -> ({:.1},{:.1}) in {} steps",
            from.0,
            from.1,
            to.0,
            to.1,
            steps
        );
    }

    /// Encode the current raster into a new artifact
    pub fn encode(
        &self,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<EncodedImage, CaptureError> {
        let (width, height) = (self.width(), self.height());
        let mut bytes = Vec::new();

        match format {
            ImageFormat::Png => {
                PngEncoder::new(&mut bytes)
                    .write_image(self.pixels.as_raw(), width, height, ColorType::Rgba8)
                    .map_err(|e| CaptureError::Encode {
                        details: format!("PNG encoding failed: {}", e),
                    })?;
            }
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality);
                encoder
                    .encode_image(&rgb)
                    .map_err(|e| CaptureError::Encode {
                        details: format!("JPEG encoding failed: {}", e),
                    })?;
            }
        }

        debug!(
            "Encoded {}x{} buffer as {} ({} bytes)",
            width,
            height,
            format.as_str(),
            bytes.len()
        );

        Ok(EncodedImage::new(format, width, height, bytes))
    }
}

/// Liang-Barsky clip of a segment against an axis-aligned box.
/// `None` when the segment misses the box or has a non-finite endpoint.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, from.0 - min.0),
        (dx, max.0 - from.0),
        (-dy, from.1 - min.1),
        (dy, max.1 - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (from.0 + dx * t0, from.1 + dy * t0),
        (from.0 + dx * t1, from.1 + dy * t1),
    ))
}

/// Parse a `#rrggbb` colour into an opaque RGBA pixel
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}
