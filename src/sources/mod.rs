//! External collaborators consumed by the pipeline.
//!
//! Camera, IMU, classifier and actuator are opaque capabilities. Frames are
//! owned by the camera's internal buffer pool: a task borrows one through a
//! [`FrameLease`], which hands the buffer back to the source when dropped,
//! on every exit path.

pub mod simulated;

use std::ops::Deref;

use crate::{
    error::Result,
    pipeline::{sample::Axes, timestamp::Timestamp},
};

pub use simulated::{IntensityClassifier, LineActuator, SimulatedCamera, SimulatedImu};

/// Capture clock value attached to a frame by the camera driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureTime {
    pub secs: u64,
    pub micros: u32,
}

impl CaptureTime {
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_capture_time(self.secs, self.micros)
    }
}

/// A buffer from the camera pool. `len` may be shorter than the buffer.
#[derive(Debug, Default)]
pub struct Frame {
    pub buf: Vec<u8>,
    pub len: usize,
    pub captured_at: CaptureTime,
}

impl Frame {
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len.min(self.buf.len())]
    }
}

pub trait CameraSource: Send {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// May block waiting for hardware. Errors are transient capture failures.
    fn fetch(&mut self) -> Result<Frame>;

    /// Returns a buffer obtained from [`CameraSource::fetch`] to the pool.
    fn release(&mut self, frame: Frame);
}

/// Scoped borrow of one camera frame: exactly one `release` per successful
/// `fetch`, performed on drop.
pub struct FrameLease<'a, C: CameraSource + ?Sized> {
    source: &'a mut C,
    frame: Frame,
}

impl<'a, C: CameraSource + ?Sized> FrameLease<'a, C> {
    pub fn acquire(source: &'a mut C) -> Result<Self> {
        let frame = source.fetch()?;
        Ok(Self { source, frame })
    }
}

impl<C: CameraSource + ?Sized> Deref for FrameLease<'_, C> {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl<C: CameraSource + ?Sized> Drop for FrameLease<'_, C> {
    fn drop(&mut self) {
        let frame = std::mem::take(&mut self.frame);
        self.source.release(frame);
    }
}

pub trait ImuSource: Send {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Latest register snapshot; never blocks.
    fn read_acceleration(&mut self) -> Axes;
    fn read_rotation(&mut self) -> Axes;
}

/// Affine int8 quantization published alongside a model tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
}

impl QuantParams {
    pub fn dequantize(&self, q: i8) -> f32 {
        (i32::from(q) - self.zero_point) as f32 * self.scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    pub data: Vec<i8>,
    pub quant: QuantParams,
}

pub trait Classifier: Send {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn input_len(&self) -> usize;

    /// Synchronous and comparatively slow.
    fn infer(&mut self, input: &[i8]) -> Result<OutputTensor>;
}

/// One digital output line.
pub trait Actuator: Send {
    fn set(&mut self, on: bool);
}
