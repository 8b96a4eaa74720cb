//! Storage sink seam.
//!
//! The pipeline only needs "open, write, close" over hierarchical paths plus
//! directory listing/creation for session selection. Handles are scoped to a
//! single record: [`persist`] opens, writes and closes on every path, so no
//! handle is held across loop iterations.

pub mod fs;

use std::path::Path;

use crate::error::Result;

pub use fs::FsStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Append,
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

pub trait StorageHandle {
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;
    fn close(self) -> Result<()>;
}

pub trait StorageSink: Send + Sync {
    type Handle: StorageHandle;

    fn open_append(&self, path: &Path) -> Result<Self::Handle>;
    fn open_write(&self, path: &Path) -> Result<Self::Handle>;
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;
    fn create_dir(&self, path: &Path) -> Result<()>;

    fn open(&self, path: &Path, mode: OpenMode) -> Result<Self::Handle> {
        match mode {
            OpenMode::Append => self.open_append(path),
            OpenMode::Truncate => self.open_write(path),
        }
    }
}

/// Open → write → close. If the write fails the handle is still dropped
/// (closed) before the error is returned.
pub fn persist<S: StorageSink + ?Sized>(
    sink: &S,
    path: &Path,
    mode: OpenMode,
    bytes: &[u8],
) -> Result<usize> {
    let mut handle = sink.open(path, mode)?;
    let written = handle.write(bytes)?;
    handle.close()?;
    Ok(written)
}
