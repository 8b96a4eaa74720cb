//! Offline reader for a recorded session directory.
//!
//! Loads `gyrodata.csv` and the `capture_*.gs` frames back into samples so a
//! session can be inspected or replayed on the host.

use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};

use crate::{
    config::{CAPTURE_EXTENSION, CAPTURE_PREFIX, IMU_LOG_FILE},
    error::{PipelineError, Result},
    pipeline::{
        sample::{Axes, CameraSample, ImuSample, Sample},
        timestamp::Timestamp,
    },
};

const IMU_FIELDS: usize = 7;

fn field<T: std::str::FromStr>(record: &StringRecord, idx: usize, line: u64) -> Result<T> {
    let raw = record
        .get(idx)
        .ok_or_else(|| PipelineError::MalformedRecord(format!("line {}: missing field {}", line, idx)))?;
    raw.trim()
        .parse()
        .map_err(|_| PipelineError::MalformedRecord(format!("line {}: bad value {:?}", line, raw)))
}

fn parse_imu(record: &StringRecord, line: u64) -> Result<ImuSample> {
    if record.len() != IMU_FIELDS {
        return Err(PipelineError::MalformedRecord(format!(
            "line {}: expected {} fields, got {}",
            line,
            IMU_FIELDS,
            record.len()
        )));
    }
    let timestamp: Timestamp = field(record, 0, line)?;
    let acceleration = Axes::new(field(record, 1, line)?, field(record, 2, line)?, field(record, 3, line)?);
    let rotation = Axes::new(field(record, 4, line)?, field(record, 5, line)?, field(record, 6, line)?);
    Ok(ImuSample {
        acceleration,
        rotation,
        timestamp,
    })
}

/// Parses a `timestamp;ax;ay;az;gx;gy;gz` log. Any malformed row fails the load.
pub fn read_imu_log(path: &Path) -> Result<Vec<ImuSample>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut samples = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let record = row?;
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        samples.push(parse_imu(&record, line)?);
    }
    debug!("{} IMU records read from {:?}", samples.len(), path);
    Ok(samples)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    pub timestamp: Timestamp,
    pub path: PathBuf,
}

/// Extracts the timestamp from a `capture_<HHMMSSmmm>.gs` file name.
pub fn capture_timestamp(file_name: &str) -> Option<Timestamp> {
    file_name
        .strip_prefix(CAPTURE_PREFIX)?
        .strip_suffix(CAPTURE_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

/// Capture files in a session directory, oldest first. Other files are ignored.
pub fn list_captures(dir: &Path) -> Result<Vec<CaptureFile>> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::storage(dir, e))?;

    let mut captures = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(timestamp) = name.to_str().and_then(capture_timestamp) else {
            continue;
        };
        captures.push(CaptureFile {
            timestamp,
            path: entry.path(),
        });
    }
    captures.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
    Ok(captures)
}

/// Splits a raw grayscale file into rows of `width` pixels. A trailing
/// partial row is dropped.
pub fn read_grayscale(path: &Path, width: usize) -> Result<Vec<Vec<u8>>> {
    if width == 0 {
        return Err(PipelineError::MalformedRecord("row width must be non-zero".into()));
    }
    let bytes = fs::read(path).map_err(|e| PipelineError::storage(path, e))?;
    let rows: Vec<Vec<u8>> = bytes.chunks_exact(width).map(<[u8]>::to_vec).collect();
    let leftover = bytes.len() % width;
    if leftover != 0 {
        warn!("{:?}: dropping {} trailing bytes", path, leftover);
    }
    Ok(rows)
}

/// Every IMU record and frame in a session, merged in timestamp order.
/// Equal timestamps keep IMU records ahead of frames.
pub fn load_session(dir: &Path) -> Result<Vec<Sample>> {
    let log = dir.join(IMU_LOG_FILE);
    let mut samples: Vec<Sample> = if log.is_file() {
        read_imu_log(&log)?.into_iter().map(Sample::from).collect()
    } else {
        Vec::new()
    };

    for capture in list_captures(dir)? {
        let frame = fs::read(&capture.path).map_err(|e| PipelineError::storage(&capture.path, e))?;
        samples.push(Sample::from(CameraSample {
            frame,
            timestamp: capture.timestamp,
        }));
    }

    samples.sort_by_key(|s| (s.timestamp(), matches!(s, Sample::Camera(_))));
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn reads_semicolon_log() {
        let dir = session_dir();
        let log = dir.path().join(IMU_LOG_FILE);
        fs::write(&log, "000000020;-12;40;8190;1;-2;3\n000000040;0;0;8192;0;0;0\n").unwrap();

        let samples = read_imu_log(&log).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp.as_str(), "000000020");
        assert_eq!(samples[0].acceleration, Axes::new(-12, 40, 8190));
        assert_eq!(samples[0].rotation, Axes::new(1, -2, 3));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let dir = session_dir();
        let log = dir.path().join(IMU_LOG_FILE);

        fs::write(&log, "000000020;1;2;3\n").unwrap();
        assert!(matches!(read_imu_log(&log), Err(PipelineError::MalformedRecord(_))));

        fs::write(&log, "12:00;1;2;3;4;5;6\n").unwrap();
        assert!(matches!(read_imu_log(&log), Err(PipelineError::MalformedRecord(_))));

        fs::write(&log, "000000020;1;2;x;4;5;6\n").unwrap();
        assert!(matches!(read_imu_log(&log), Err(PipelineError::MalformedRecord(_))));
    }

    #[test]
    fn captures_listed_in_time_order() {
        let dir = session_dir();
        for name in ["capture_120000500.gs", "capture_090000000.gs", "notes.txt", "capture_bad.gs"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<_> = list_captures(dir.path())
            .unwrap()
            .into_iter()
            .map(|c| c.timestamp.to_string())
            .collect();
        assert_eq!(names, vec!["090000000", "120000500"]);
    }

    #[test]
    fn capture_name_parsing() {
        assert_eq!(capture_timestamp("capture_010101123.gs").map(|t| t.to_string()), Some("010101123".into()));
        assert_eq!(capture_timestamp("capture_010101123.csv"), None);
        assert_eq!(capture_timestamp("frame_010101123.gs"), None);
    }

    #[test]
    fn grayscale_drops_partial_row() {
        let dir = session_dir();
        let path = dir.path().join("capture_000000001.gs");
        fs::write(&path, [1u8, 2, 3, 4, 5, 6, 7]).unwrap();

        let rows = read_grayscale(&path, 3).unwrap();
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert!(read_grayscale(&path, 0).is_err());
    }

    #[test]
    fn session_merges_by_timestamp() {
        let dir = session_dir();
        fs::write(dir.path().join(IMU_LOG_FILE), "000000010;0;0;0;0;0;0\n000000030;0;0;0;0;0;0\n").unwrap();
        fs::write(dir.path().join("capture_000000020.gs"), [9u8; 4]).unwrap();
        fs::write(dir.path().join("capture_000000030.gs"), [8u8; 4]).unwrap();

        let kinds: Vec<_> = load_session(dir.path())
            .unwrap()
            .iter()
            .map(|s| match s {
                Sample::Imu(_) => 'i',
                Sample::Camera(_) => 'c',
            })
            .collect();
        assert_eq!(kinds, vec!['i', 'c', 'i', 'c']);
    }
}
