//! Collector deployment: sensors → bounded queues → storage.
//!
//! Core 1 hosts the producers (IMU sampler, frame sampler); core 0 hosts the
//! single writer. The context is built once in `main` and shared by `Arc`
//! with every task; it is never rebuilt.

pub mod frame_sampler;
pub mod imu_sampler;
pub mod writer;

use std::sync::Arc;

use crate::{
    config::CollectorConfig,
    pipeline::{
        clock::BootClock,
        queue::BoundedQueue,
        sample::{CameraSample, ImuSample},
        stats::PipelineStats,
    },
};

pub use frame_sampler::{CaptureOutcome, FrameSampler};
pub use imu_sampler::ImuSampler;
pub use writer::{DrainReport, Writer};

pub struct CollectorContext {
    pub config: CollectorConfig,
    pub imu_queue: BoundedQueue<ImuSample>,
    pub camera_queue: BoundedQueue<CameraSample>,
    pub stats: PipelineStats,
    pub clock: BootClock,
}

impl CollectorContext {
    pub fn new(config: CollectorConfig) -> Arc<Self> {
        Arc::new(Self {
            imu_queue: BoundedQueue::new("imu_queue", config.imu_queue_len),
            camera_queue: BoundedQueue::new("camera_queue", config.camera_queue_len),
            stats: PipelineStats::new(),
            clock: BootClock::start(),
            config,
        })
    }
}
