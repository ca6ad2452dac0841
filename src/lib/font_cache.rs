use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use hashbrown::HashMap;

use super::raster::RasterError;

/// Fonts loaded so far, keyed by path. Failed loads are not remembered.
#[derive(Default)]
pub struct FontCache {
    fonts: HashMap<PathBuf, FontVec>,
}

impl FontCache {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.fonts.contains_key(path)
    }

    pub fn load(&mut self, path: &Path) -> Result<&FontVec, RasterError> {
        if !self.fonts.contains_key(path) {
            let bytes = fs::read(path).map_err(|source| RasterError::FontRead {
                path: path.to_path_buf(),
                source,
            })?;
            let font = FontVec::try_from_vec(bytes).map_err(|e| RasterError::FontParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            log::debug!("loaded font {}", path.display());
            self.fonts.insert(path.to_path_buf(), font);
        }

        Ok(&self.fonts[path])
    }
}
