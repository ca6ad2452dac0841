use std::fmt::{self, Write};

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::SHIFT_JIS;

use crate::error::{NftrError, Result};
use crate::layout::ContainerLayout;
use crate::transcode::{PixelGrid, Transcoder};

const PIXEL_ON: &str = "██";
const PIXEL_OFF: &str = "  ";

/// How a code map entry reads as a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharCode {
    Unset,
    Ascii(char),
    ShiftJis(char),
    Unknown,
}

impl CharCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Unset,
            0x20..=0x7E => Self::Ascii(char::from(code as u8)),
            _ => decode_shift_jis(code).map_or(Self::Unknown, Self::ShiftJis),
        }
    }
}

fn decode_shift_jis(code: u16) -> Option<char> {
    let bytes = code.to_be_bytes();
    let bytes = if code <= 0xFF { &bytes[1..] } else { &bytes[..] };
    let text = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes)?;

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

/// Everything the container says about one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphInfo {
    pub index: usize,
    pub code: u16,
    pub code_offset: usize,
    pub width: u8,
    pub width_offset: usize,
    pub bitmap_offset: usize,
    pub record: Vec<u8>,
    pub grid: PixelGrid,
}

impl GlyphInfo {
    pub fn char_code(&self) -> CharCode {
        CharCode::from_code(self.code)
    }

    /// No bit set among the record's pixel bits, including the leading ones that
    /// never reach the display grid.
    pub fn is_empty(&self) -> bool {
        (0..self.grid.len()).all(|i| {
            self.record
                .get(i / 8)
                .map_or(true, |byte| byte & (0x80 >> (i % 8)) == 0)
        })
    }
}

impl fmt::Display for GlyphInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self.char_code() {
            CharCode::Unset => format!("(code 0x{:X})", self.code),
            CharCode::Ascii(c) => format!("'{c}' (ASCII 0x{:X})", self.code),
            CharCode::ShiftJis(c) => format!("'{c}' (Shift_JIS 0x{:X})", self.code),
            CharCode::Unknown => format!("(unknown code 0x{:X})", self.code),
        };

        writeln!(f, "--- glyph {} ---", self.index)?;
        writeln!(
            f,
            "code:   {code:<30} | offset {0} (0x{0:X})",
            self.code_offset
        )?;
        writeln!(
            f,
            "width:  {:<30} | offset {1} (0x{1:X})",
            format!("{} px", self.width),
            self.width_offset
        )?;
        writeln!(
            f,
            "bitmap: {:<30} | offset {1} (0x{1:X})",
            format!("{} bytes", self.record.len()),
            self.bitmap_offset
        )?;
        writeln!(
            f,
            "{}x{} cell{}",
            self.grid.width(),
            self.grid.height(),
            if self.is_empty() { " (empty)" } else { "" }
        )?;
        f.write_str(&render_grid(&self.grid))
    }
}

/// Reads slots without ever writing to the container.
#[derive(Clone, Copy, Debug)]
pub struct Inspector {
    layout: ContainerLayout,
    transcoder: Transcoder,
}

impl Inspector {
    pub fn new(layout: ContainerLayout) -> Result<Self> {
        Ok(Self {
            layout,
            transcoder: Transcoder::new(&layout)?,
        })
    }

    pub fn inspect(&self, buffer: &[u8], index: usize) -> Result<GlyphInfo> {
        self.layout.check_index(index)?;

        let code_offset = self.layout.code_offset(index);
        let code = LittleEndian::read_u16(table_slice(buffer, code_offset, 2)?);

        let width_offset = self.layout.width_offset(index);
        let width = table_slice(buffer, width_offset, 1)?[0];

        let bitmap_offset = self.layout.bitmap_offset(index);
        let end = bitmap_offset + self.layout.record_size;
        let record = buffer
            .get(bitmap_offset..end)
            .ok_or(NftrError::BitmapRange {
                start: bitmap_offset,
                end,
                len: buffer.len(),
            })?
            .to_vec();
        let grid = self.transcoder.decode(&record)?;

        Ok(GlyphInfo {
            index,
            code,
            code_offset,
            width,
            width_offset,
            bitmap_offset,
            record,
            grid,
        })
    }
}

fn table_slice(buffer: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    buffer.get(start..start + len).ok_or(NftrError::TableRange {
        start,
        end: start + len,
        len: buffer.len(),
    })
}

/// Bordered preview, two columns per pixel.
pub fn render_grid(grid: &PixelGrid) -> String {
    let border = format!("+{}+\n", "-".repeat(grid.width() * 2));
    let mut out = border.clone();

    for row in grid.rows() {
        out.push('|');
        for on in row {
            out.push_str(if *on { PIXEL_ON } else { PIXEL_OFF });
        }
        out.push_str("|\n");
    }

    out.push_str(&border);
    out
}

/// Compact preview with column numbers above and row numbers on the left.
pub fn render_numbered(grid: &PixelGrid) -> String {
    let width = grid.width();
    let mut out = String::new();

    let tens: String = (0..width)
        .map(|x| char::from_digit((x / 10 % 10) as u32, 10).filter(|_| x >= 10).unwrap_or(' '))
        .collect();
    let units: String = (0..width)
        .map(|x| char::from_digit((x % 10) as u32, 10).unwrap_or(' '))
        .collect();
    let border = format!("  +{}+", "-".repeat(width));

    let _ = writeln!(out, "   {tens}");
    let _ = writeln!(out, "   {units}");
    let _ = writeln!(out, "{border}");
    for (y, row) in grid.rows().enumerate() {
        let line: String = row.iter().map(|on| if *on { '█' } else { '·' }).collect();
        let _ = writeln!(out, "{y:2}|{line}|");
    }
    let _ = writeln!(out, "{border}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(layout: &ContainerLayout) -> Vec<u8> {
        vec![0u8; layout.width_offset(layout.glyph_count)]
    }

    #[test]
    fn it_reads_code_width_and_bitmap() {
        let layout = ContainerLayout::default();
        let mut bytes = container(&layout);
        let code_at = layout.code_offset(32);
        bytes[code_at] = 0x41;
        bytes[layout.width_offset(32)] = 7;
        bytes[layout.bitmap_offset(32) + 1] = 0b1000_0000;

        let before = bytes.clone();
        let info = Inspector::new(layout).unwrap().inspect(&bytes, 32).unwrap();

        assert_eq!(0x41, info.code);
        assert_eq!(CharCode::Ascii('A'), info.char_code());
        assert_eq!(7, info.width);
        assert_eq!(layout.bitmap_offset(32), info.bitmap_offset);
        assert!(info.grid.get(0, 0));
        assert_eq!(1, info.grid.pixels().iter().filter(|p| **p).count());
        assert_eq!(before, bytes);
    }

    #[test]
    fn it_reads_the_code_little_endian() {
        let layout = ContainerLayout::default();
        let mut bytes = container(&layout);
        let code_at = layout.code_offset(5);
        bytes[code_at] = 0xA0;
        bytes[code_at + 1] = 0x82;

        let info = Inspector::new(layout).unwrap().inspect(&bytes, 5).unwrap();
        assert_eq!(0x82A0, info.code);
        assert_eq!(CharCode::ShiftJis('あ'), info.char_code());
    }

    #[test]
    fn it_interprets_character_codes() {
        assert_eq!(CharCode::Unset, CharCode::from_code(0));
        assert_eq!(CharCode::Ascii(' '), CharCode::from_code(0x20));
        assert_eq!(CharCode::Ascii('~'), CharCode::from_code(0x7E));
        assert_eq!(CharCode::ShiftJis('ｱ'), CharCode::from_code(0xB1));
        assert_eq!(CharCode::Unknown, CharCode::from_code(0x0A));
        assert_eq!(CharCode::Unknown, CharCode::from_code(0xFFFF));
    }

    #[test]
    fn it_rejects_slots_outside_the_table() {
        let layout = ContainerLayout::default();
        let bytes = container(&layout);
        let inspector = Inspector::new(layout).unwrap();

        assert!(inspector.inspect(&bytes, 541).unwrap_err().is_bounds());
        assert!(inspector.inspect(&bytes[..100], 0).unwrap_err().is_bounds());
    }

    #[test]
    fn it_renders_a_bordered_grid() {
        let mut grid = PixelGrid::new(13, 15);
        grid.set(0, 0, true);
        let rendered = render_grid(&grid);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(17, lines.len());
        assert_eq!(format!("+{}+", "-".repeat(26)), lines[0]);
        assert_eq!(format!("|██{}|", " ".repeat(24)), lines[1]);
        assert_eq!(lines[0], lines[16]);
    }

    #[test]
    fn it_renders_a_numbered_grid() {
        let mut grid = PixelGrid::new(13, 15);
        grid.set(12, 14, true);
        let rendered = render_numbered(&grid);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!("             111", lines[0]);
        assert_eq!("   0123456789012", lines[1]);
        assert_eq!(" 0|·············|", lines[3]);
        assert_eq!("14|············█|", lines[17]);
    }

    #[test]
    fn it_marks_empty_glyphs() {
        let layout = ContainerLayout::default();
        let bytes = container(&layout);
        let info = Inspector::new(layout).unwrap().inspect(&bytes, 0).unwrap();
        assert!(info.is_empty());
        assert!(info.to_string().contains("(empty)"));
    }

    #[test]
    fn it_counts_leading_bits_as_ink() {
        let layout = ContainerLayout::default();
        let mut bytes = container(&layout);
        bytes[layout.bitmap_offset(3)] = 0b0001_0000;

        let info = Inspector::new(layout).unwrap().inspect(&bytes, 3).unwrap();
        assert!(info.grid.is_blank());
        assert!(!info.is_empty());
        assert!(!info.to_string().contains("(empty)"));
    }

    #[test]
    fn it_ignores_padding_bits_when_marking_empty() {
        let layout = ContainerLayout::default();
        let mut bytes = container(&layout);
        bytes[layout.bitmap_offset(3) + 24] = 0b0001_1111;

        let info = Inspector::new(layout).unwrap().inspect(&bytes, 3).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn it_refuses_a_layout_too_small_for_its_cell() {
        let layout = ContainerLayout {
            record_size: 24,
            ..Default::default()
        };
        assert!(matches!(Inspector::new(layout), Err(NftrError::Layout(_))));
    }
}
