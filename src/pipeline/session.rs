//! Session directory selection.
//!
//! At startup the mount point is scanned once; the next session number is one
//! past the highest all-digit directory name (never below 2), wrapped modulo
//! [`SESSION_MODULO`] and zero-padded to five digits. After the wrap, new
//! sessions may land in old directories.
//!
//! The scan-then-create sequence is not atomic: one session manager per
//! process, and no other process sharing the mount point.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::{
    config::{CAPTURE_EXTENSION, CAPTURE_PREFIX, IMU_LOG_FILE, SESSION_MODULO},
    pipeline::timestamp::Timestamp,
    storage::StorageSink,
};

/// Floor for the running maximum; an empty mount yields session 2.
const FIRST_SESSION_FLOOR: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPath {
    number: u64,
    dir: PathBuf,
}

impl SessionPath {
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Five-digit directory name, e.g. `00100`.
    pub fn name(&self) -> String {
        format_session(self.number)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn imu_log(&self) -> PathBuf {
        self.dir.join(IMU_LOG_FILE)
    }

    pub fn capture_file(&self, timestamp: &Timestamp) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", CAPTURE_PREFIX, timestamp, CAPTURE_EXTENSION))
    }
}

fn format_session(number: u64) -> String {
    format!("{:05}", number)
}

/// Parses a directory name that consists solely of decimal digits.
pub fn session_number(name: &str) -> Option<u64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Chooses (and optionally creates) the session directory for this run.
///
/// A failed scan is treated as an empty mount; a failed create is logged and
/// later writes into the missing directory simply fail.
pub fn init_session<S: StorageSink + ?Sized>(
    storage: &S,
    mount_point: &Path,
    create: bool,
) -> SessionPath {
    let highest = match storage.list_dir(mount_point) {
        Ok(entries) => entries
            .iter()
            .filter(|e| e.is_dir)
            .filter_map(|e| session_number(&e.name))
            .fold(FIRST_SESSION_FLOOR, u64::max),
        Err(e) => {
            warn!("Could not scan {:?} for sessions: {}", mount_point, e);
            FIRST_SESSION_FLOOR
        }
    };

    let number = highest.wrapping_add(1) % SESSION_MODULO;
    let session = SessionPath {
        number,
        dir: mount_point.join(format_session(number)),
    };

    if create {
        match storage.create_dir(&session.dir) {
            Ok(()) => info!("Session directory created: {:?}", session.dir),
            Err(e) => error!("Failed to create session directory: {}", e),
        }
    }

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;
    use std::fs;

    fn mount_with(dirs: &[&str]) -> tempfile::TempDir {
        let mount = tempfile::tempdir().unwrap();
        for d in dirs {
            fs::create_dir(mount.path().join(d)).unwrap();
        }
        mount
    }

    #[test]
    fn picks_one_past_highest_numeric_dir() {
        let mount = mount_with(&["00001", "00042", "abc", "00099"]);
        let session = init_session(&FsStorage, mount.path(), false);
        assert_eq!(session.name(), "00100");
        assert_eq!(session.dir(), mount.path().join("00100"));
        assert!(!session.dir().exists());
    }

    #[test]
    fn empty_mount_starts_at_two() {
        let mount = mount_with(&["notes", "raw-7"]);
        assert_eq!(init_session(&FsStorage, mount.path(), false).name(), "00002");
    }

    #[test]
    fn numeric_files_are_not_sessions() {
        let mount = mount_with(&["00005"]);
        fs::write(mount.path().join("00777"), b"").unwrap();
        assert_eq!(init_session(&FsStorage, mount.path(), false).name(), "00006");
    }

    #[test]
    fn wraps_modulo_ten_thousand() {
        let mount = mount_with(&["09999"]);
        assert_eq!(init_session(&FsStorage, mount.path(), false).name(), "00000");
    }

    #[test]
    fn create_makes_the_directory() {
        let mount = mount_with(&["00002"]);
        let session = init_session(&FsStorage, mount.path(), true);
        assert_eq!(session.number(), 3);
        assert!(session.dir().is_dir());
    }

    #[test]
    fn missing_mount_falls_back_and_create_failure_is_not_fatal() {
        let mount = tempfile::tempdir().unwrap();
        let gone = mount.path().join("not-mounted");
        let session = init_session(&FsStorage, &gone, true);
        assert_eq!(session.name(), "00002");
        assert!(!session.dir().exists());
    }

    #[test]
    fn file_names_follow_layout() {
        let mount = mount_with(&[]);
        let session = init_session(&FsStorage, mount.path(), false);
        let stamp = Timestamp::from_millis(90_061_123);
        assert!(session.imu_log().ends_with("00002/gyrodata.csv"));
        assert!(session.capture_file(&stamp).ends_with("00002/capture_010101123.gs"));
    }

    #[test]
    fn session_number_rejects_non_digits() {
        assert_eq!(session_number("00042"), Some(42));
        assert_eq!(session_number(""), None);
        assert_eq!(session_number("-1"), None);
        assert_eq!(session_number("1a"), None);
        assert_eq!(session_number("99999999999999999999999"), None);
    }
}
