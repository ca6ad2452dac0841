use serde::{Deserialize, Serialize};

use crate::error::{NftrError, Result};

// Offsets of the stock game font
const CODE_MAP_OFFSET: usize = 15664;
const WIDTH_TABLE_OFFSET: usize = 16746;
const BITMAP_TABLE_OFFSET: usize = 59;
const GLYPH_COUNT: usize = 541;
const RECORD_SIZE: usize = 25;
const CELL_WIDTH: usize = 13;
const CELL_HEIGHT: usize = 15;
const STREAM_SHIFT: usize = 8;

/// Where the fixed tables of a container live and how a glyph cell is shaped.
///
/// Code map entries are 2 bytes (little endian) per slot, width entries 1 byte per
/// slot, bitmap records `record_size` bytes per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerLayout {
    pub code_map_offset: usize,
    pub width_table_offset: usize,
    pub bitmap_table_offset: usize,
    pub glyph_count: usize,
    pub record_size: usize,
    pub cell_width: usize,
    pub cell_height: usize,
    /// Data order runs this many pixels ahead of display order.
    pub stream_shift: usize,
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self {
            code_map_offset: CODE_MAP_OFFSET,
            width_table_offset: WIDTH_TABLE_OFFSET,
            bitmap_table_offset: BITMAP_TABLE_OFFSET,
            glyph_count: GLYPH_COUNT,
            record_size: RECORD_SIZE,
            cell_width: CELL_WIDTH,
            cell_height: CELL_HEIGHT,
            stream_shift: STREAM_SHIFT,
        }
    }
}

impl ContainerLayout {
    pub fn pixel_count(&self) -> usize {
        self.cell_width * self.cell_height
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(NftrError::Layout(format!(
                "cell must not be empty ({}x{})",
                self.cell_width, self.cell_height
            )));
        }

        if self.record_size * 8 < self.pixel_count() {
            return Err(NftrError::Layout(format!(
                "{} byte records cannot hold {} pixels",
                self.record_size,
                self.pixel_count()
            )));
        }

        if self.stream_shift >= self.pixel_count() {
            return Err(NftrError::Layout(format!(
                "stream shift {} swallows the whole {} pixel cell",
                self.stream_shift,
                self.pixel_count()
            )));
        }

        Ok(())
    }

    pub fn code_offset(&self, index: usize) -> usize {
        self.code_map_offset + 2 * index
    }

    pub fn width_offset(&self, index: usize) -> usize {
        self.width_table_offset + index
    }

    pub fn bitmap_offset(&self, index: usize) -> usize {
        self.bitmap_table_offset + self.record_size * index
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.glyph_count {
            Ok(())
        } else {
            Err(NftrError::GlyphIndex {
                index,
                count: self.glyph_count,
            })
        }
    }
}
