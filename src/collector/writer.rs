//! Storage writer: the single consumer of both collector queues.
//!
//! Per iteration:
//! 1. If IMU recording is on, up to `imu_burst` non-blocking receives, each
//!    appended as one line to `gyrodata.csv` (open → write → close per line).
//! 2. One non-blocking receive from the camera queue, written to its own
//!    `capture_<timestamp>.gs` file.
//!
//! No file handle survives an iteration, so a power cut loses at most the
//! record being written. Failed writes are logged and dropped, never requeued.

use std::{io, path::Path, sync::Arc, thread};

use csv::{Terminator, WriterBuilder};
use log::{error, info, trace};

use crate::{
    collector::CollectorContext,
    config::WRITER_IDLE_SLEEP,
    error::{PipelineError, Result},
    pipeline::{
        sample::{CameraSample, ImuRecord, ImuSample},
        session::{SessionPath, init_session},
    },
    storage::{OpenMode, StorageSink, persist},
};

/// What one writer iteration did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub imu_written: usize,
    pub imu_failed: usize,
    pub frames_written: usize,
    pub frames_failed: usize,
}

impl DrainReport {
    pub fn is_idle(&self) -> bool {
        self.imu_written + self.imu_failed + self.frames_written + self.frames_failed == 0
    }
}

/// Formats one `timestamp;ax;ay;az;gx;gy;gz\n` line.
pub fn format_imu_record(record: &ImuRecord) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(56));
    wtr.serialize(record)?;
    wtr.into_inner()
        .map_err(|e| PipelineError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
}

pub struct Writer<S: StorageSink> {
    storage: S,
    session: SessionPath,
    ctx: Arc<CollectorContext>,
}

impl<S: StorageSink> Writer<S> {
    pub fn new(storage: S, session: SessionPath, ctx: Arc<CollectorContext>) -> Self {
        Self {
            storage,
            session,
            ctx,
        }
    }

    /// Selects and creates this run's session directory under the mount point.
    pub fn open_session(storage: S, ctx: Arc<CollectorContext>) -> Self {
        let session = init_session(&storage, &ctx.config.mount_point, true);
        info!("Writing session {} to {:?}", session.name(), session.dir());
        Self::new(storage, session, ctx)
    }

    pub fn session(&self) -> &SessionPath {
        &self.session
    }

    pub fn drain_once(&mut self) -> DrainReport {
        let mut report = DrainReport::default();

        if self.ctx.config.record_imu {
            for _ in 0..self.ctx.config.imu_burst {
                let Some(sample) = self.ctx.imu_queue.try_receive() else {
                    break;
                };
                match self.write_imu(&sample) {
                    Ok(_) => {
                        report.imu_written += 1;
                        self.ctx.stats.record_imu_written();
                    }
                    Err(e) => {
                        report.imu_failed += 1;
                        self.ctx.stats.record_storage_failure();
                        error!("Dropping IMU record {}: {}", sample.timestamp, e);
                    }
                }
            }
        }

        if let Some(sample) = self.ctx.camera_queue.try_receive() {
            match self.write_frame(&sample) {
                Ok(bytes) => {
                    report.frames_written += 1;
                    self.ctx.stats.record_frame_written();
                    trace!("Frame {} written ({} bytes)", sample.timestamp, bytes);
                }
                Err(e) => {
                    report.frames_failed += 1;
                    self.ctx.stats.record_storage_failure();
                    error!("Dropping frame {}: {}", sample.timestamp, e);
                }
            }
        }

        report
    }

    fn write_imu(&self, sample: &ImuSample) -> Result<usize> {
        let line = format_imu_record(&sample.record())?;
        self.persist(&self.session.imu_log(), OpenMode::Append, &line)
    }

    fn write_frame(&self, sample: &CameraSample) -> Result<usize> {
        let path = self.session.capture_file(&sample.timestamp);
        self.persist(&path, OpenMode::Truncate, &sample.frame)
    }

    fn persist(&self, path: &Path, mode: OpenMode, bytes: &[u8]) -> Result<usize> {
        persist(&self.storage, path, mode, bytes)
    }

    /// Runs for the life of the process.
    pub fn run(mut self) {
        info!(
            "Writer running (imu recording: {}, burst {})",
            self.ctx.config.record_imu, self.ctx.config.imu_burst
        );
        loop {
            if self.drain_once().is_idle() {
                thread::sleep(WRITER_IDLE_SLEEP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CollectorConfig,
        pipeline::{sample::Axes, timestamp::to_timestamp},
        storage::{DirEntryInfo, FsStorage, StorageHandle},
    };
    use std::fs;

    fn imu(ms: u64, v: i16) -> ImuSample {
        ImuSample {
            acceleration: Axes::new(v, -v, 8192),
            rotation: Axes::new(1, 2, 3),
            timestamp: to_timestamp(ms),
        }
    }

    fn ctx_at(mount: &Path, burst: usize) -> Arc<CollectorContext> {
        CollectorContext::new(CollectorConfig {
            mount_point: mount.to_path_buf(),
            imu_burst: burst,
            ..CollectorConfig::default()
        })
    }

    #[test]
    fn formats_semicolon_line() {
        let line = format_imu_record(&imu(90_061_123, -5).record()).unwrap();
        assert_eq!(line, b"010101123;-5;5;8192;1;2;3\n");
    }

    #[test]
    fn burst_limits_imu_per_iteration() {
        let mount = tempfile::tempdir().unwrap();
        let ctx = ctx_at(mount.path(), 2);
        for i in 0..5 {
            assert!(ctx.imu_queue.try_send(imu(i, i as i16)));
        }

        let mut writer = Writer::open_session(FsStorage, ctx.clone());
        assert_eq!(writer.drain_once().imu_written, 2);
        assert_eq!(writer.drain_once().imu_written, 2);
        assert_eq!(writer.drain_once().imu_written, 1);
        assert!(writer.drain_once().is_idle());

        let log = fs::read_to_string(writer.session().imu_log()).unwrap();
        assert_eq!(log.lines().count(), 5);
    }

    #[test]
    fn camera_is_serviced_even_without_imu_data() {
        let mount = tempfile::tempdir().unwrap();
        let ctx = ctx_at(mount.path(), 50);
        let stamp = to_timestamp(1_234);
        ctx.camera_queue.try_send(CameraSample { frame: vec![1, 2], timestamp: stamp });

        let mut writer = Writer::open_session(FsStorage, ctx);
        let report = writer.drain_once();
        assert_eq!(report.frames_written, 1);
        assert_eq!(fs::read(writer.session().capture_file(&stamp)).unwrap(), vec![1, 2]);
    }

    #[test]
    fn imu_left_queued_when_recording_disabled() {
        let mount = tempfile::tempdir().unwrap();
        let ctx = CollectorContext::new(CollectorConfig {
            mount_point: mount.path().to_path_buf(),
            record_imu: false,
            ..CollectorConfig::default()
        });
        ctx.imu_queue.try_send(imu(0, 0));

        let mut writer = Writer::open_session(FsStorage, ctx.clone());
        assert!(writer.drain_once().is_idle());
        assert_eq!(ctx.imu_queue.len(), 1);
    }

    struct UnmountedCard;

    struct NeverHandle;

    impl StorageHandle for NeverHandle {
        fn write(&mut self, _bytes: &[u8]) -> Result<usize> {
            unreachable!("no handle is ever opened")
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    fn unavailable(path: &Path) -> PipelineError {
        PipelineError::storage(path, io::Error::new(io::ErrorKind::NotFound, "card removed"))
    }

    impl StorageSink for UnmountedCard {
        type Handle = NeverHandle;

        fn open_append(&self, path: &Path) -> Result<NeverHandle> {
            Err(unavailable(path))
        }

        fn open_write(&self, path: &Path) -> Result<NeverHandle> {
            Err(unavailable(path))
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
            Err(unavailable(path))
        }

        fn create_dir(&self, path: &Path) -> Result<()> {
            Err(unavailable(path))
        }
    }

    #[test]
    fn storage_failure_drops_without_requeue() {
        let ctx = ctx_at(Path::new("/sdcard"), 50);
        ctx.imu_queue.try_send(imu(1, 1));
        ctx.imu_queue.try_send(imu(2, 2));
        ctx.camera_queue.try_send(CameraSample { frame: vec![0; 4], timestamp: to_timestamp(3) });

        let mut writer = Writer::open_session(UnmountedCard, ctx.clone());
        assert_eq!(writer.session().name(), "00002");

        let report = writer.drain_once();
        assert_eq!((report.imu_failed, report.frames_failed), (2, 1));
        assert!(ctx.imu_queue.is_empty());
        assert!(ctx.camera_queue.is_empty());
        assert_eq!(ctx.stats.snapshot().storage_failures, 3);
    }
}
