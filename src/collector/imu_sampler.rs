//! Periodic IMU producer.
//!
//! Every interval: read acceleration + rotation, stamp with time since boot,
//! `try_send`. A full queue drops the new sample so sampling never stalls.

use std::sync::Arc;

use log::{error, info};
use spin_sleep::{SpinSleeper, SpinStrategy};

use crate::{
    collector::CollectorContext,
    pipeline::{sample::ImuSample, timestamp::to_timestamp},
    sources::ImuSource,
};

pub struct ImuSampler<S: ImuSource> {
    source: S,
    ctx: Arc<CollectorContext>,
}

impl<S: ImuSource> ImuSampler<S> {
    pub fn new(source: S, ctx: Arc<CollectorContext>) -> Self {
        Self { source, ctx }
    }

    /// One reading. Returns whether it was enqueued.
    pub fn sample_once(&mut self) -> bool {
        let sample = ImuSample {
            acceleration: self.source.read_acceleration(),
            rotation: self.source.read_rotation(),
            timestamp: to_timestamp(self.ctx.clock.millis_since_boot()),
        };

        let enqueued = self.ctx.imu_queue.try_send(sample);
        self.ctx.stats.record_imu_send(enqueued);
        enqueued
    }

    /// Runs for the life of the process; returns only if the IMU fails to init.
    pub fn run(mut self) {
        if let Err(e) = self.source.init() {
            error!("IMU init failed, IMU sampling disabled: {}", e);
            return;
        }

        let interval = self.ctx.config.imu_interval;
        let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
        info!("IMU sampler running every {:?}", interval);

        loop {
            sleeper.sleep(interval);
            self.sample_once();
        }
    }
}
