//! Static configuration, loaded once at startup.
//!
//! Every field is optional in the JSON file and falls back to the values in
//! [`crate::defaults`].

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::device::DeviceOptions;
use crate::document::Decoration;
use crate::errors::{ConfigError, LayoutError};
use crate::types::{CanvasSpec, DataRect, Length, Scaler};

/// Physical canvas as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
    pub padding_in: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width_in: defaults::CANVAS_WIDTH.raw(),
            height_in: defaults::CANVAS_HEIGHT.raw(),
            dpi: defaults::DPI,
            padding_in: defaults::CANVAS_PADDING.raw(),
        }
    }
}

impl CanvasConfig {
    pub fn to_spec(&self) -> Result<CanvasSpec, ConfigError> {
        let scaler = Scaler::try_new(self.dpi).map_err(|cause| ConfigError::InvalidDpi {
            dpi: self.dpi,
            cause,
        })?;
        let invalid = || LayoutError::InvalidCanvas {
            width: self.width_in,
            height: self.height_in,
            padding: self.padding_in,
        };
        let width = Length::try_non_negative(self.width_in).map_err(|_| invalid())?;
        let height = Length::try_non_negative(self.height_in).map_err(|_| invalid())?;
        let padding = Length::try_non_negative(self.padding_in).map_err(|_| invalid())?;
        Ok(CanvasSpec { width, height, padding, scaler })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub data_rect: DataRect,
    /// Most recent strokes fetched per run
    pub record_limit: usize,
    pub device: DeviceOptions,
    pub decorations: Vec<Decoration>,
    /// Where `<run>_output.svg` and `<run>_artifact.json` are written
    pub output_dir: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            data_rect: defaults::DATA_RECT,
            record_limit: defaults::RECORD_LIMIT,
            device: DeviceOptions::default(),
            decorations: Vec::new(),
            output_dir: Utf8PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl Config {
    /// Read and validate a JSON config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|cause| ConfigError::Io {
            path: path.to_owned(),
            cause,
        })?;
        let config: Config = serde_json::from_str(&json).map_err(|cause| ConfigError::Format {
            path: path.to_owned(),
            cause,
        })?;
        config.validate()?;
        crate::log::debug!(%path, decorations = config.decorations.len(), "loaded config");
        Ok(config)
    }

    /// Check the parts that can be checked before any data arrives.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.data_rect.validate()?;
        self.canvas.to_spec()?;
        Ok(())
    }
}
