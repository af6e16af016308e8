//! Share collaborator: where rendered snapshots go.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Share errors.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("IO error: {0}")]
    Io(String),
}

/// PNG-encoded snapshot ready for sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Platform share action (share sheet, file export, clipboard...).
pub trait ShareSink: Send {
    fn share(&mut self, image: &SharedImage) -> Result<(), ShareError>;
}

/// Keeps the most recent shared image for the host to pick up.
#[derive(Debug, Default)]
pub struct ShareBuffer {
    last: Option<SharedImage>,
}

impl ShareBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SharedImage> {
        self.last.as_ref()
    }

    pub fn take(&mut self) -> Option<SharedImage> {
        self.last.take()
    }
}

impl ShareSink for ShareBuffer {
    fn share(&mut self, image: &SharedImage) -> Result<(), ShareError> {
        self.last = Some(image.clone());
        Ok(())
    }
}

/// Writes each shared snapshot to a PNG file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct FileShareSink {
    path: PathBuf,
}

impl FileShareSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ShareSink for FileShareSink {
    fn share(&mut self, image: &SharedImage) -> Result<(), ShareError> {
        std::fs::write(&self.path, &image.png)
            .map_err(|e| ShareError::Io(format!("{}: {}", self.path.display(), e)))?;
        log::info!(
            "Snapshot {}x{} written to {}",
            image.width,
            image.height,
            self.path.display()
        );
        Ok(())
    }
}
