use crate::camera::CameraBehavior;
use crate::error::{IntakeError, Result};
use crate::signature::{Point, SurfaceRect};
use crate::wizard::FieldKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// One pen-down to pen-up gesture in viewport coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStroke {
    pub points: Vec<Point>,
    /// Bounding rectangle of the displayed surface. Defaults to the raster size.
    #[serde(default)]
    pub bounds: Option<SurfaceRect>,
}

/// Recorded user input replayed against a `WizardEngine`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    /// Field values keyed by wire name (`fullName`, `dob`, ...)
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub strokes: Vec<ScriptStroke>,
    #[serde(default = "default_camera")]
    pub camera: CameraBehavior,
    #[serde(default = "default_take_photo")]
    pub take_photo: bool,
    /// Size of the displayed preview element
    #[serde(default = "default_render_size")]
    pub render_size: (u32, u32),
}

fn default_camera() -> CameraBehavior {
    CameraBehavior::Grant
}

fn default_take_photo() -> bool {
    true
}

fn default_render_size() -> (u32, u32) {
    (640, 480)
}

impl SessionScript {
    /// Load a script from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let script: SessionScript = toml::from_str(&content)?;
        info!(
            "Loaded session script from {} ({} fields, {} strokes)",
            path.display(),
            script.fields.len(),
            script.strokes.len()
        );
        Ok(script)
    }

    /// A complete, well-formed session against a granting camera
    pub fn demo() -> Self {
        let fields = [
            (FieldKey::FullName, "Jane Doe"),
            (FieldKey::Dob, "1990-01-01"),
            (FieldKey::Nationality, "Japanese"),
            (FieldKey::Address, "1-2-3 Chiyoda, Tokyo"),
            (FieldKey::GovId, "AB1234567"),
        ]
        .into_iter()
        .map(|(key, value)| (key.as_str().to_string(), value.to_string()))
        .collect();

        let signature = ScriptStroke {
            points: vec![
                Point::new(60.0, 140.0),
                Point::new(140.0, 60.0),
                Point::new(220.0, 150.0),
                Point::new(320.0, 70.0),
                Point::new(420.0, 130.0),
                Point::new(540.0, 90.0),
            ],
            bounds: None,
        };

        Self {
            fields,
            strokes: vec![signature],
            camera: default_camera(),
            take_photo: default_take_photo(),
            render_size: default_render_size(),
        }
    }

    /// Field values resolved to keys, in field order
    pub fn field_values(&self) -> Result<Vec<(FieldKey, String)>> {
        let mut values = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let key = FieldKey::from_str_key(name).ok_or_else(|| {
                IntakeError::component("script".to_string(), format!("Unknown field '{}'", name))
            })?;
            values.push((key, value.clone()));
        }
        values.sort_by_key(|(key, _)| *key);
        Ok(values)
    }
}

impl Default for SessionScript {
    fn default() -> Self {
        Self::demo()
    }
}
