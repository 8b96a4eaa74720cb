//! Host filesystem sink.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::warn;

use crate::{
    error::{PipelineError, Result},
    storage::{DirEntryInfo, StorageHandle, StorageSink},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

pub struct FsHandle {
    path: PathBuf,
    file: BufWriter<File>,
}

impl StorageHandle for FsHandle {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.file
            .write_all(bytes)
            .map_err(|e| PipelineError::storage(&self.path, e))?;
        Ok(bytes.len())
    }

    fn close(mut self) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| PipelineError::storage(&self.path, e))
    }
}

impl StorageSink for FsStorage {
    type Handle = FsHandle;

    fn open_append(&self, path: &Path) -> Result<FsHandle> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PipelineError::storage(path, e))?;
        Ok(FsHandle {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
        })
    }

    fn open_write(&self, path: &Path) -> Result<FsHandle> {
        let file = File::create(path).map_err(|e| PipelineError::storage(path, e))?;
        Ok(FsHandle {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
        })
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let dir = fs::read_dir(path).map_err(|e| PipelineError::storage(path, e))?;
        let entries = dir.map(|entry| {
            entry.map(|entry| DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
            })
        });
        Ok(readable_entries(path, entries))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| PipelineError::storage(path, e))
    }
}

/// Keeps every entry that could be read; a bad entry is skipped so the rest
/// of the listing still counts.
fn readable_entries<I>(path: &Path, entries: I) -> Vec<DirEntryInfo>
where
    I: IntoIterator<Item = io::Result<DirEntryInfo>>,
{
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", path, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{OpenMode, persist};

    #[test]
    fn append_accumulates_and_write_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let fs = FsStorage::new();

        assert_eq!(persist(&fs, &path, OpenMode::Append, b"a\n").unwrap(), 2);
        persist(&fs, &path, OpenMode::Append, b"b\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"a\nb\n");

        persist(&fs, &path, OpenMode::Truncate, b"c").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"c");
    }

    #[test]
    fn open_in_missing_directory_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.gs");
        let err = persist(&FsStorage, &path, OpenMode::Truncate, b"x").unwrap_err();
        assert!(matches!(err, PipelineError::StorageUnavailable { .. }));
    }

    #[test]
    fn lists_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("00003")).unwrap();
        std::fs::write(dir.path().join("00004"), b"").unwrap();

        let mut entries = FsStorage.list_dir(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![
                DirEntryInfo { name: "00003".into(), is_dir: true },
                DirEntryInfo { name: "00004".into(), is_dir: false },
            ]
        );
    }

    #[test]
    fn unreadable_entry_does_not_hide_the_rest() {
        let dir = Path::new("/sdcard");
        let entries = vec![
            Ok(DirEntryInfo { name: "00041".into(), is_dir: true }),
            Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt dirent")),
            Ok(DirEntryInfo { name: "00042".into(), is_dir: true }),
        ];

        let kept = readable_entries(dir, entries);
        let names: Vec<_> = kept.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["00041", "00042"]);
    }
}
