use crate::capture::{parse_hex_color, ImageFormat};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IntakeConfig {
    pub wizard: WizardConfig,
    pub signature: SignatureConfig,
    pub capture: CaptureConfig,
    pub camera: CameraConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WizardConfig {
    /// Acquire the camera when the flow starts instead of on entry to the Photo step
    #[serde(default = "default_acquire_camera_on_start")]
    pub acquire_camera_on_start: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignatureConfig {
    /// Drawing surface width in pixels
    #[serde(default = "default_signature_width")]
    pub width: u32,

    /// Drawing surface height in pixels
    #[serde(default = "default_signature_height")]
    pub height: u32,

    /// Ink colour as `#rrggbb`
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    /// Pen width in pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Encoding used for signature and photo artifacts
    #[serde(default = "default_capture_format")]
    pub format: ImageFormat,

    /// JPEG quality (1-100), ignored for PNG
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Resolution of the synthetic camera used by the driver binary
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl IntakeConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("kinzai.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default(
                "wizard.acquire_camera_on_start",
                default_acquire_camera_on_start(),
            )?
            .set_default("signature.width", default_signature_width())?
            .set_default("signature.height", default_signature_height())?
            .set_default("signature.stroke_color", default_stroke_color())?
            .set_default("signature.line_width", default_line_width() as f64)?
            .set_default("capture.format", default_capture_format().as_str())?
            .set_default("capture.jpeg_quality", default_jpeg_quality() as i64)?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            .add_source(Environment::with_prefix("KINZAI").separator("__"))
            .build()?;

        let config: IntakeConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signature.width == 0 || self.signature.height == 0 {
            return Err(ConfigError::Message(
                "Signature surface size must be greater than 0".to_string(),
            ));
        }

        if !(self.signature.line_width > 0.0) {
            return Err(ConfigError::Message(
                "Signature line_width must be greater than 0".to_string(),
            ));
        }

        if parse_hex_color(&self.signature.stroke_color).is_none() {
            return Err(ConfigError::Message(format!(
                "Signature stroke_color '{}' is not a #rrggbb colour",
                self.signature.stroke_color
            )));
        }

        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(ConfigError::Message(
                "Capture jpeg_quality must be between 1 and 100".to_string(),
            ));
        }

        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            wizard: WizardConfig::default(),
            signature: SignatureConfig::default(),
            capture: CaptureConfig::default(),
            camera: CameraConfig {
                resolution: default_camera_resolution(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            acquire_camera_on_start: default_acquire_camera_on_start(),
        }
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            width: default_signature_width(),
            height: default_signature_height(),
            stroke_color: default_stroke_color(),
            line_width: default_line_width(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: default_capture_format(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

// Default value functions
fn default_acquire_camera_on_start() -> bool {
    false
}

fn default_signature_width() -> u32 {
    600
}
fn default_signature_height() -> u32 {
    200
}
fn default_stroke_color() -> String {
    "#3b82f6".to_string()
}
fn default_line_width() -> f32 {
    3.0
}

fn default_capture_format() -> ImageFormat {
    ImageFormat::Png
}
fn default_jpeg_quality() -> u8 {
    90
}

fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}

fn default_event_bus_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = IntakeConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.signature.width, 600);
        assert_eq!(config.signature.height, 200);
        assert_eq!(config.capture.format, ImageFormat::Png);
        assert!(!config.wizard.acquire_camera_on_start);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = IntakeConfig::load_from_file(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, IntakeConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r##"
[wizard]
acquire_camera_on_start = true

[signature]
width = 300
stroke_color = "#000000"

[capture]
format = "jpeg"
jpeg_quality = 75
"##
        )
        .unwrap();

        let config = IntakeConfig::load_from_file(file.path()).unwrap();

        assert!(config.wizard.acquire_camera_on_start);
        assert_eq!(config.signature.width, 300);
        assert_eq!(config.signature.height, 200);
        assert_eq!(config.signature.stroke_color, "#000000");
        assert_eq!(config.capture.format, ImageFormat::Jpeg);
        assert_eq!(config.capture.jpeg_quality, 75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = IntakeConfig::default();

        config.signature.width = 0;
        assert!(config.validate().is_err());
        config.signature.width = 600;

        config.signature.stroke_color = "blue".to_string();
        assert!(config.validate().is_err());
        config.signature.stroke_color = "#3b82f6".to_string();

        config.capture.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.capture.jpeg_quality = 90;

        config.signature.line_width = 0.0;
        assert!(config.validate().is_err());
        config.signature.line_width = 3.0;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&IntakeConfig::default()).unwrap();

        assert!(rendered.contains("[signature]"));
        assert!(rendered.contains("format = \"png\""));
    }
}
