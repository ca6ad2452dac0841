//! Replaces glyph bitmaps in NFTR font containers with characters rendered from a
//! TrueType font.

mod batch;
mod config;
mod font_cache;
mod raster;

use eg_nftr::include_glyph_map;
use nftr_parser::GlyphMapping;

pub use batch::{BatchDriver, BatchReport, GlyphFailure, GlyphOutcome};
pub use config::{Config, ConfigError};
pub use font_cache::FontCache;
pub use raster::{
    GlyphRasterizer, GlyphSource, Placement, RasterError, RasterSettings, RasterizedGlyph,
};

/// Russian capitals on slots 32..=64, small letters on 65..=97.
pub const CYRILLIC: &[(usize, char)] = include_glyph_map!("maps/cyrillic.map");

pub fn cyrillic_mapping() -> GlyphMapping {
    GlyphMapping::from_entries(CYRILLIC)
}
