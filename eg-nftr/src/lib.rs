use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use nftr_parser::PixelGrid;

pub use eg_nftr_macros::include_glyph_map;

/// Draw target backed by a glyph cell.
///
/// Anything drawn outside the cell is dropped without notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCanvas {
    grid: PixelGrid,
}

impl GridCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: PixelGrid::new(width, height),
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn into_grid(self) -> PixelGrid {
        self.grid
    }
}

impl OriginDimensions for GridCanvas {
    fn size(&self) -> Size {
        Size::new(self.grid.width() as u32, self.grid.height() as u32)
    }
}

impl DrawTarget for GridCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.grid.set(x, y, color.is_on());
            }
        }

        Ok(())
    }
}
