//! Overlay configuration
//!
//! Options recognized at enable time. Storage and export format feed the
//! data path; `debug` gates diagnostic logging only and `theme` is purely
//! visual, neither affects positioning.

use pagepin_core::ExportFormat;
use std::path::{Path, PathBuf};
use storage::StorageKind;

/// Visual theme for pins and the editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Options accepted by `Overlay::enable`.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    /// Which storage backend to select (memory unless asked otherwise).
    pub storage: StorageKind,

    /// Format produced by `export()`.
    pub export_format: ExportFormat,

    /// Emit diagnostic log events for store mutations and pin transitions.
    pub debug: bool,

    /// Visual theme; no effect on positioning logic.
    pub theme: Theme,

    /// Override the durable storage directory. Intended for tests; the
    /// platform data directory is used when unset.
    pub storage_root: Option<PathBuf>,
}

impl OverlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, kind: StorageKind) -> Self {
        self.storage = kind;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_storage_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.storage_root = Some(root.as_ref().to_path_buf());
        self
    }
}
