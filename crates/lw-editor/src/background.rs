//! Background reference image slot.
//!
//! Decoding and drawing images is the host's business. The editor only
//! keeps the opaque handle the host returns and the visibility toggle the
//! `b` shortcut flips.

use std::path::{Path, PathBuf};

/// Opaque token for an image the host has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: u64,
    pub path: PathBuf,
}

/// Host-provided background image loader.
pub trait BackgroundImage {
    /// Load the image at `path`. Errors are reported to the user; the
    /// document is never touched.
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, String>;

    /// Show or hide the current image.
    fn toggle_visible(&mut self);

    fn is_visible(&self) -> bool;
}

/// A `BackgroundImage` that only checks the file exists. Used by headless
/// hosts and tests.
#[derive(Debug, Default)]
pub struct FileBackground {
    current: Option<ImageHandle>,
    next_id: u64,
    visible: bool,
}

impl FileBackground {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ImageHandle> {
        self.current.as_ref()
    }
}

impl BackgroundImage for FileBackground {
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, String> {
        if !path.is_file() {
            return Err(format!("background image not found: {}", path.display()));
        }
        self.next_id += 1;
        let handle = ImageHandle {
            id: self.next_id,
            path: path.to_path_buf(),
        };
        log::debug!("background image #{} from {}", handle.id, path.display());
        self.current = Some(handle.clone());
        self.visible = true;
        Ok(handle)
    }

    fn toggle_visible(&mut self) {
        // Nothing to show without an image.
        if self.current.is_some() {
            self.visible = !self.visible;
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
