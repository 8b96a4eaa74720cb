//! Compiled-in configuration.
//!
//! Sampling rates, queue depths and thresholds are fixed at build time. The
//! config structs only bundle these constants so each task receives its own
//! copy at spawn time; nothing is reconfigured while the pipeline runs.

use std::{path::PathBuf, time::Duration};

use crate::pipeline::task::TaskSpec;

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------
pub const IMU_QUEUE_LEN: usize = 200;
pub const CAMERA_QUEUE_LEN: usize = 5;
pub const SCORE_QUEUE_LEN: usize = 1;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
/// Scheduler tick used to express bounded queue waits.
pub const TICK: Duration = Duration::from_millis(10);
pub const CAMERA_SEND_TIMEOUT_TICKS: u32 = 10;
pub const IMU_SAMPLE_INTERVAL: Duration = Duration::from_millis(20); // 50 Hz
pub const WRITER_IDLE_SLEEP: Duration = Duration::from_millis(1);
pub const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------
pub const RECORD_IMU_DATA: bool = true;
/// Max IMU receives per writer iteration before the camera queue is serviced.
pub const IMU_BURST: usize = 50;
pub const MOUNT_POINT: &str = "sdcard";
pub const IMU_LOG_FILE: &str = "gyrodata.csv";
pub const CAPTURE_PREFIX: &str = "capture_";
pub const CAPTURE_EXTENSION: &str = "gs";
pub const SESSION_MODULO: u64 = 10_000;

// ---------------------------------------------------------------------------
// Camera / model
// ---------------------------------------------------------------------------
pub const FRAME_WIDTH: usize = 96;
pub const FRAME_HEIGHT: usize = 96;
pub const FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT; // 9216 bytes, grayscale
pub const FRAME_POOL_SIZE: usize = 2;
/// Offset mapping unsigned 8-bit pixels into the model's signed 8-bit domain.
pub const INPUT_ZERO_OFFSET: i16 = 128;
pub const POSITIVE_CLASS_INDEX: usize = 1;
pub const ACTUATOR_THRESHOLD: f32 = 0.5;

// ---------------------------------------------------------------------------
// Task placement (core, priority)
// ---------------------------------------------------------------------------
pub const WRITER_TASK: TaskSpec = TaskSpec::new("write_data", 0, 1);
pub const IMU_TASK: TaskSpec = TaskSpec::new("data_capture_imu", 1, 2);
pub const CAMERA_TASK: TaskSpec = TaskSpec::new("data_capture_camera", 1, 1);
pub const INFERENCE_TASK: TaskSpec = TaskSpec::new("run_inference", 0, 1);
pub const ACTUATOR_TASK: TaskSpec = TaskSpec::new("run_actuator", 1, 1);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub mount_point: PathBuf,
    pub record_imu: bool,
    pub imu_queue_len: usize,
    pub camera_queue_len: usize,
    pub imu_interval: Duration,
    pub imu_burst: usize,
    pub camera_send_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from(MOUNT_POINT),
            record_imu: RECORD_IMU_DATA,
            imu_queue_len: IMU_QUEUE_LEN,
            camera_queue_len: CAMERA_QUEUE_LEN,
            imu_interval: IMU_SAMPLE_INTERVAL,
            imu_burst: IMU_BURST,
            camera_send_timeout: TICK * CAMERA_SEND_TIMEOUT_TICKS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InferencerConfig {
    pub threshold: f32,
    pub positive_class: usize,
}

impl Default for InferencerConfig {
    fn default() -> Self {
        Self {
            threshold: ACTUATOR_THRESHOLD,
            positive_class: POSITIVE_CLASS_INDEX,
        }
    }
}
