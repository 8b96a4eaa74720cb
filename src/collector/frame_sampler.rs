//! Camera producer.
//!
//! Each cycle leases a frame, copies its bytes into a [`CameraSample`]
//! stamped with the frame's own capture time, gives the buffer back, then
//! offers the sample to the camera queue with a bounded wait. The lease is
//! released on every path, before the (possibly slow) send.

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    collector::CollectorContext,
    pipeline::sample::CameraSample,
    sources::{CameraSource, FrameLease},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Enqueued,
    /// Queue stayed full for the whole timeout.
    Dropped,
    /// Source produced nothing usable this cycle.
    NoFrame,
}

pub struct FrameSampler<C: CameraSource> {
    camera: C,
    ctx: Arc<CollectorContext>,
}

impl<C: CameraSource> FrameSampler<C> {
    pub fn new(camera: C, ctx: Arc<CollectorContext>) -> Self {
        Self { camera, ctx }
    }

    pub fn capture_once(&mut self) -> CaptureOutcome {
        let sample = match FrameLease::acquire(&mut self.camera) {
            Ok(lease) => CameraSample {
                frame: lease.bytes().to_vec(),
                timestamp: lease.captured_at.timestamp(),
            },
            Err(e) => {
                warn!("Frame capture failed: {}", e);
                self.ctx.stats.record_capture_failure();
                return CaptureOutcome::NoFrame;
            }
        };

        let stamp = sample.timestamp;
        let enqueued = self
            .ctx
            .camera_queue
            .send_with_timeout(sample, self.ctx.config.camera_send_timeout);
        self.ctx.stats.record_frame_send(enqueued);

        if enqueued {
            debug!("Frame {} queued", stamp);
            CaptureOutcome::Enqueued
        } else {
            CaptureOutcome::Dropped
        }
    }

    /// Runs for the life of the process; returns only if the camera fails to init.
    pub fn run(mut self) {
        if let Err(e) = self.camera.init() {
            error!("Camera init failed, frame capture disabled: {}", e);
            return;
        }
        info!("Frame sampler running");

        loop {
            self.capture_once();
        }
    }
}
