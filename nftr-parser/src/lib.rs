//! Glyph bitmap codec and in-place patcher for NFTR-style bitmap font containers.
//!
//! A container holds three fixed tables addressed by glyph slot: a code map, a
//! width table, and packed bitmap records. Only bitmap records are ever written.

mod container;
mod error;
mod inspect;
mod layout;
mod mapping;
mod patch;
mod transcode;

pub use container::{backup_path_for, Container};
pub use error::{NftrError, Result};
pub use inspect::{render_grid, render_numbered, CharCode, GlyphInfo, Inspector};
pub use layout::ContainerLayout;
pub use mapping::GlyphMapping;
pub use patch::GlyphPatcher;
pub use transcode::{PixelGrid, Transcoder};
