use std::fs;
use std::path::{Path, PathBuf};

use nftr_parser::{ContainerLayout, NftrError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::raster::RasterSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Layout(#[from] NftrError),
}

/// Tool settings, read from TOML:
///
/// ```toml
/// [layout]
/// bitmap_table_offset = 59
/// glyph_count = 541
///
/// [raster]
/// font_path = "fonts/PressStart2P-Regular.ttf"
/// upper_size = 12.0
/// ```
///
/// Anything left out keeps its default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: ContainerLayout,
    pub raster: RasterSettings,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.layout.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config {}", path.display());

        Self::parse(&text)
    }
}
