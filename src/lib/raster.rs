use std::path::PathBuf;

use ab_glyph::{point, Font, PxScale, ScaleFont};
use eg_nftr::GridCanvas;
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use nftr_parser::{ContainerLayout, PixelGrid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::font_cache::FontCache;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot read font '{path}': {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a usable font: {message}")]
    FontParse { path: PathBuf, message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    pub font_path: PathBuf,
    /// Pixel size for upper case letters.
    pub upper_size: f32,
    /// Pixel size for everything else.
    pub lower_size: f32,
    /// Coverage at or above this counts as ink.
    pub threshold: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("fonts/PressStart2P-Regular.ttf"),
            upper_size: 12.0,
            lower_size: 10.0,
            threshold: 0.5,
        }
    }
}

/// Where the glyph lands in the cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    /// Pen at x = 0, ink box two pixels below vertical centre. Matches the game's
    /// baseline.
    #[default]
    FlushLeft,
    /// Ink box centred horizontally, one pixel above vertical centre.
    Centered,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub character: char,
    pub grid: PixelGrid,
    /// Ink bounding box width, for diagnostics only.
    pub ink_width: usize,
}

impl RasterizedGlyph {
    pub fn new(character: char, grid: PixelGrid) -> Self {
        Self {
            character,
            ink_width: grid.ink_width(),
            grid,
        }
    }
}

/// Produces display-order cells for characters.
pub trait GlyphSource {
    fn rasterize(&mut self, character: char) -> Result<RasterizedGlyph, RasterError>;
}

/// Renders characters from a TrueType font into glyph cells.
pub struct GlyphRasterizer {
    settings: RasterSettings,
    width: usize,
    height: usize,
    fonts: FontCache,
}

impl GlyphRasterizer {
    pub fn new(settings: RasterSettings, layout: &ContainerLayout) -> Self {
        Self {
            settings,
            width: layout.cell_width,
            height: layout.cell_height,
            fonts: FontCache::new(),
        }
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    pub fn point_size(&self, character: char) -> f32 {
        if character.is_uppercase() {
            self.settings.upper_size
        } else {
            self.settings.lower_size
        }
    }

    pub fn render(
        &mut self,
        character: char,
        size: f32,
        placement: Placement,
    ) -> Result<RasterizedGlyph, RasterError> {
        let (width, height) = (self.width as f32, self.height as f32);
        let threshold = self.settings.threshold;
        let font = self.fonts.load(&self.settings.font_path)?;

        let scale = em_scale(font, size);
        let scaled = font.as_scaled(scale);
        let glyph_id = scaled.glyph_id(character);
        let ascent = scaled.ascent();
        let mut canvas = GridCanvas::new(self.width, self.height);

        // measure the ink box with the pen at the origin first
        let probe = glyph_id.with_scale_and_position(scale, point(0.0, ascent));
        if let Some(ink) = font.outline_glyph(probe).map(|o| o.px_bounds()) {
            let (x, y) = match placement {
                Placement::FlushLeft => (0.0, (height - ink.height()) / 2.0 + 2.0),
                Placement::Centered => (
                    (width - ink.width()) / 2.0,
                    (height - ink.height()) / 2.0 - 1.0,
                ),
            };

            let glyph = glyph_id.with_scale_and_position(scale, point(x, y + ascent));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let mut pixels = Vec::new();
                outlined.draw(|px, py, coverage| {
                    if coverage >= threshold {
                        let at = Point::new(
                            bounds.min.x as i32 + px as i32,
                            bounds.min.y as i32 + py as i32,
                        );
                        pixels.push(Pixel(at, BinaryColor::On));
                    }
                });

                let _ = canvas.draw_iter(pixels);
            }
        } else {
            log::debug!("'{character}' has no outline, leaving the cell blank");
        }

        Ok(RasterizedGlyph::new(character, canvas.into_grid()))
    }
}

/// `PxScale` spans ascent to descent. Sizes here are em sizes, like a nominal
/// point size, so the line height is stretched to match.
fn em_scale(font: &impl Font, size: f32) -> PxScale {
    let height = font.height_unscaled();
    let em = font.units_per_em().unwrap_or(height);
    PxScale::from(size * height / em)
}

impl GlyphSource for GlyphRasterizer {
    fn rasterize(&mut self, character: char) -> Result<RasterizedGlyph, RasterError> {
        let size = self.point_size(character);
        self.render(character, size, Placement::FlushLeft)
    }
}
