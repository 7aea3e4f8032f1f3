use crate::error::CaptureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Encoding of a capture artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub(crate) fn codec(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Immutable encoded raster produced by the signature pad or the camera.
///
/// The payload is shared, so clones are cheap; there is no way to mutate an
/// artifact once built. A new capture always yields a new instance.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: ImageFormat,
    width: u32,
    height: u32,
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    pub(crate) fn new(format: ImageFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            format,
            width,
            height,
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Self-contained `data:<mime>;base64,<payload>` form
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Parse a data URI produced by [`EncodedImage::to_data_uri`] or a browser canvas
    pub fn from_data_uri(uri: &str) -> Result<Self, CaptureError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CaptureError::InvalidDataUri {
                details: "missing 'data:' scheme".to_string(),
            })?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CaptureError::InvalidDataUri {
                details: "missing ',' separator".to_string(),
            })?;

        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| CaptureError::InvalidDataUri {
                details: "only base64 payloads are supported".to_string(),
            })?;

        let format =
            ImageFormat::from_mime_type(mime).ok_or_else(|| CaptureError::InvalidDataUri {
                details: format!("unsupported media type '{}'", mime),
            })?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| CaptureError::InvalidDataUri {
                details: e.to_string(),
            })?;

        let decoded = image::load_from_memory_with_format(&bytes, format.codec()).map_err(|e| {
            CaptureError::InvalidDataUri {
                details: format!("payload is not a valid {}: {}", format.as_str(), e),
            }
        })?;
        let (width, height) = decoded.dimensions();

        Ok(Self::new(format, width, height, bytes))
    }

    /// Decode back into RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage, CaptureError> {
        image::load_from_memory_with_format(&self.bytes, self.format.codec())
            .map(|img| img.to_rgba8())
            .map_err(|e| CaptureError::Encode {
                details: format!("Failed to decode {} artifact: {}", self.format.as_str(), e),
            })
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl Serialize for EncodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for EncodedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        EncodedImage::from_data_uri(&uri).map_err(serde::de::Error::custom)
    }
}
