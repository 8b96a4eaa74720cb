//! Sample types carried through the queues.

use serde::Serialize;

use crate::pipeline::timestamp::Timestamp;

/// Raw three-axis register snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Axes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Axes {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl From<(i16, i16, i16)> for Axes {
    fn from((x, y, z): (i16, i16, i16)) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImuSample {
    pub acceleration: Axes,
    pub rotation: Axes,
    pub timestamp: Timestamp,
}

impl ImuSample {
    /// Flattened row in `gyrodata.csv` column order.
    pub fn record(&self) -> ImuRecord {
        ImuRecord {
            timestamp: self.timestamp,
            ax: self.acceleration.x,
            ay: self.acceleration.y,
            az: self.acceleration.z,
            gx: self.rotation.x,
            gy: self.rotation.y,
            gz: self.rotation.z,
        }
    }
}

/// One `timestamp;ax;ay;az;gx;gy;gz` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImuRecord {
    pub timestamp: Timestamp,
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

/// Owned copy of a camera frame; the source's buffer has already been
/// released by the time this is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSample {
    pub frame: Vec<u8>,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sample {
    Imu(ImuSample),
    Camera(CameraSample),
}

impl Sample {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Sample::Imu(s) => s.timestamp,
            Sample::Camera(s) => s.timestamp,
        }
    }
}

impl From<ImuSample> for Sample {
    fn from(s: ImuSample) -> Self {
        Sample::Imu(s)
    }
}

impl From<CameraSample> for Sample {
    fn from(s: CameraSample) -> Self {
        Sample::Camera(s)
    }
}
