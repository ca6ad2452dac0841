use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NftrError>;

#[derive(Debug, Error)]
pub enum NftrError {
    #[error("pixel grid is {width}x{height} ({actual} pixels), expected {expected} pixels")]
    PixelCount {
        width: usize,
        height: usize,
        actual: usize,
        expected: usize,
    },

    #[error("packed record is {actual} bytes, expected {expected}")]
    RecordLength { actual: usize, expected: usize },

    #[error("glyph index {index} is outside 0..{count}")]
    GlyphIndex { index: usize, count: usize },

    #[error("bitmap bytes {start}..{end} exceed container length {len}")]
    BitmapRange { start: usize, end: usize, len: usize },

    #[error("table entry {start}..{end} exceeds container length {len}")]
    TableRange { start: usize, end: usize, len: usize },

    #[error("mapping line {line}: {message}")]
    Mapping { line: usize, message: String },

    #[error("invalid container layout: {0}")]
    Layout(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NftrError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Storage failures abort a run; everything else only costs one glyph.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// True for index and byte-range violations.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            Self::GlyphIndex { .. } | Self::BitmapRange { .. } | Self::TableRange { .. }
        )
    }
}
