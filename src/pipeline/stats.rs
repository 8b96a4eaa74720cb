//! Lock-free pipeline counters.
//!
//! Producers and consumers only ever `fetch_add`; nobody waits on a lock in
//! the sampling path. Counts are diagnostics, not an ordering mechanism.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
pub struct PipelineStats {
    imu_enqueued: AtomicU64,
    imu_dropped: AtomicU64,
    frames_enqueued: AtomicU64,
    frames_dropped: AtomicU64,
    capture_failures: AtomicU64,
    imu_written: AtomicU64,
    frames_written: AtomicU64,
    storage_failures: AtomicU64,
    inferences: AtomicU64,
    inference_failures: AtomicU64,
    actuator_changes: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub imu_enqueued: u64,
    pub imu_dropped: u64,
    pub frames_enqueued: u64,
    pub frames_dropped: u64,
    pub capture_failures: u64,
    pub imu_written: u64,
    pub frames_written: u64,
    pub storage_failures: u64,
    pub inferences: u64,
    pub inference_failures: u64,
    pub actuator_changes: u64,
}

#[inline]
fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_imu_send(&self, enqueued: bool) {
        bump(if enqueued { &self.imu_enqueued } else { &self.imu_dropped });
    }

    pub fn record_frame_send(&self, enqueued: bool) {
        bump(if enqueued { &self.frames_enqueued } else { &self.frames_dropped });
    }

    pub fn record_capture_failure(&self) {
        bump(&self.capture_failures);
    }

    pub fn record_imu_written(&self) {
        bump(&self.imu_written);
    }

    pub fn record_frame_written(&self) {
        bump(&self.frames_written);
    }

    pub fn record_storage_failure(&self) {
        bump(&self.storage_failures);
    }

    pub fn record_inference(&self, ok: bool) {
        bump(if ok { &self.inferences } else { &self.inference_failures });
    }

    pub fn record_actuator_change(&self) {
        bump(&self.actuator_changes);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            imu_enqueued: load(&self.imu_enqueued),
            imu_dropped: load(&self.imu_dropped),
            frames_enqueued: load(&self.frames_enqueued),
            frames_dropped: load(&self.frames_dropped),
            capture_failures: load(&self.capture_failures),
            imu_written: load(&self.imu_written),
            frames_written: load(&self.frames_written),
            storage_failures: load(&self.storage_failures),
            inferences: load(&self.inferences),
            inference_failures: load(&self.inference_failures),
            actuator_changes: load(&self.actuator_changes),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "imu {}/{} dropped, frames {}/{} dropped, capture_fail {}, written imu={} frames={}, storage_fail {}, inferences {} (fail {}), actuator changes {}",
            self.imu_dropped,
            self.imu_enqueued + self.imu_dropped,
            self.frames_dropped,
            self.frames_enqueued + self.frames_dropped,
            self.capture_failures,
            self.imu_written,
            self.frames_written,
            self.storage_failures,
            self.inferences,
            self.inference_failures,
            self.actuator_changes,
        )
    }
}
