use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NftrError, Result};

const BACKUP_SUFFIX: &str = ".backup";

/// `font.nftr` is backed up to `font.nftr.backup` next to it.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// A container file loaded whole into memory.
///
/// Everything outside the bitmap records is carried through untouched.
#[derive(Debug)]
pub struct Container {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl Container {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|e| NftrError::io(&path, e))?;
        log::debug!("loaded {} bytes from {}", bytes.len(), path.display());

        Ok(Self { path, bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.bytes).map_err(|e| NftrError::io(&self.path, e))?;
        log::debug!("wrote {} bytes to {}", self.bytes.len(), self.path.display());

        Ok(())
    }
}
