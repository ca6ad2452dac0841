use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{NftrError, Result};
use crate::layout::ContainerLayout;

/// Overwrites single bitmap records in a container buffer.
///
/// The first successful patch snapshots the still untouched buffer to the backup
/// path, unless a backup is already there. Code map and width tables are never
/// written.
#[derive(Debug)]
pub struct GlyphPatcher {
    layout: ContainerLayout,
    backup: Option<PathBuf>,
    backed_up: bool,
}

impl GlyphPatcher {
    pub fn new(layout: ContainerLayout) -> Self {
        Self {
            layout,
            backup: None,
            backed_up: false,
        }
    }

    pub fn with_backup(layout: ContainerLayout, backup: impl Into<PathBuf>) -> Self {
        Self {
            backup: Some(backup.into()),
            ..Self::new(layout)
        }
    }

    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    pub fn bitmap_range(&self, index: usize, buffer_len: usize) -> Result<Range<usize>> {
        self.layout.check_index(index)?;

        let start = self.layout.bitmap_offset(index);
        let end = start + self.layout.record_size;
        if end > buffer_len {
            return Err(NftrError::BitmapRange {
                start,
                end,
                len: buffer_len,
            });
        }

        Ok(start..end)
    }

    /// Writes all of `record` into slot `index` or nothing at all.
    pub fn patch(&mut self, buffer: &mut [u8], index: usize, record: &[u8]) -> Result<()> {
        if record.len() != self.layout.record_size {
            return Err(NftrError::RecordLength {
                actual: record.len(),
                expected: self.layout.record_size,
            });
        }

        let range = self.bitmap_range(index, buffer.len())?;
        self.ensure_backup(buffer)?;

        log::debug!("slot {index}: writing bytes {}..{}", range.start, range.end);
        buffer[range].copy_from_slice(record);

        Ok(())
    }

    fn ensure_backup(&mut self, pristine: &[u8]) -> Result<()> {
        if self.backed_up {
            return Ok(());
        }

        if let Some(path) = &self.backup {
            write_new(path, pristine)?;
        }
        self.backed_up = true;

        Ok(())
    }
}

fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            log::debug!("keeping existing backup {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(NftrError::io(path, e)),
    };

    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(NftrError::io(path, e));
    }

    log::info!("created backup {}", path.display());
    Ok(())
}
