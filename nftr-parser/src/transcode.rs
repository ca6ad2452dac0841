use crate::error::{NftrError, Result};
use crate::layout::ContainerLayout;

/// Monochrome glyph cell, row-major, `true` is ink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<bool>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(NftrError::PixelCount {
                width,
                height,
                actual: pixels.len(),
                expected: width * height,
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Pixels outside the cell read as blank.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    /// Pixels outside the cell are dropped.
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = on;
        }
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| !p)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(self.width.max(1))
    }

    /// Width of the ink bounding box, 0 for a blank cell.
    pub fn ink_width(&self) -> usize {
        let mut min_x = self.width;
        let mut max_x = None;

        for row in self.rows() {
            for (x, _) in row.iter().enumerate().filter(|(_, on)| **on) {
                min_x = min_x.min(x);
                max_x = Some(max_x.map_or(x, |m: usize| m.max(x)));
            }
        }

        max_x.map_or(0, |max_x| max_x - min_x + 1)
    }
}

/// Converts glyph cells between display order and the container's packed data order.
///
/// Data order is display order read `stream_shift` pixels further along the
/// row-major pixel stream. For the stock 13x15 cell with a shift of 8, display
/// columns 0..5 of row `y` come from data row `y` columns 8..13, and display columns
/// 5..13 come from data row `y + 1` columns 0..8. The last `stream_shift` display
/// pixels have no data source and the first `stream_shift` data pixels have no
/// display target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transcoder {
    width: usize,
    height: usize,
    shift: usize,
    record_size: usize,
}

impl Transcoder {
    /// Fails when records of the layout cannot hold a whole cell.
    pub fn new(layout: &ContainerLayout) -> Result<Self> {
        layout.validate()?;

        Ok(Self {
            width: layout.cell_width,
            height: layout.cell_height,
            shift: layout.stream_shift,
            record_size: layout.record_size,
        })
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn display_to_data(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let linear = y * self.width + x + self.shift;
        (linear < self.pixel_count()).then(|| (linear % self.width, linear / self.width))
    }

    pub fn data_to_display(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        if x >= self.width || y >= self.height {
            return None;
        }

        (y * self.width + x)
            .checked_sub(self.shift)
            .map(|linear| (linear % self.width, linear / self.width))
    }

    fn check_grid(&self, grid: &PixelGrid) -> Result<()> {
        if grid.width() != self.width || grid.height() != self.height {
            return Err(NftrError::PixelCount {
                width: grid.width(),
                height: grid.height(),
                actual: grid.len(),
                expected: self.pixel_count(),
            });
        }

        Ok(())
    }

    pub fn to_data_order(&self, display: &PixelGrid) -> Result<PixelGrid> {
        self.check_grid(display)?;

        let mut data = PixelGrid::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some((data_x, data_y)) = self.display_to_data(x, y) {
                    data.set(data_x, data_y, display.get(x, y));
                }
            }
        }

        Ok(data)
    }

    pub fn to_display_order(&self, data: &PixelGrid) -> Result<PixelGrid> {
        self.check_grid(data)?;

        let mut display = PixelGrid::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some((data_x, data_y)) = self.display_to_data(x, y) {
                    display.set(x, y, data.get(data_x, data_y));
                }
            }
        }

        Ok(display)
    }

    /// Most significant bit first, zero padded up to `record_size` bytes.
    pub fn pack(&self, data: &PixelGrid) -> Result<Vec<u8>> {
        self.check_grid(data)?;

        let mut bytes: Vec<u8> = data
            .pixels()
            .chunks(8)
            .map(|bits| {
                bits.iter()
                    .enumerate()
                    .filter(|(_, on)| **on)
                    .fold(0u8, |byte, (i, _)| byte | (0x80 >> i))
            })
            .collect();
        bytes.resize(self.record_size, 0);

        Ok(bytes)
    }

    pub fn unpack(&self, record: &[u8]) -> Result<PixelGrid> {
        if record.len() != self.record_size {
            return Err(NftrError::RecordLength {
                actual: record.len(),
                expected: self.record_size,
            });
        }

        let pixels = (0..self.pixel_count())
            .map(|i| record[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect();

        PixelGrid::from_pixels(self.width, self.height, pixels)
    }

    pub fn encode(&self, display: &PixelGrid) -> Result<Vec<u8>> {
        let data = self.to_data_order(display)?;
        self.pack(&data)
    }

    pub fn decode(&self, record: &[u8]) -> Result<PixelGrid> {
        let data = self.unpack(record)?;

        if (0..self.shift).any(|i| data.pixels()[i]) {
            log::debug!("record carries ink in {} unreachable leading bits", self.shift);
        }

        self.to_display_order(&data)
    }
}
