//! # Sensor Pipeline
//!
//! Real-time producer/consumer pipeline for a dual-core capture device.
//!
//! Two deployments share one architecture:
//! - **Collector:** IMU + camera producers → bounded queues → storage writer
//!   (`MOUNT/NNNNN/gyrodata.csv`, `MOUNT/NNNNN/capture_<timestamp>.gs`).
//! - **Inferencer:** camera → classifier → single-slot score queue → actuator.
//!
//! ## Concurrency
//! - Every task is a long-lived thread pinned to one of two cores.
//! - Tasks share nothing mutable; all hand-off is by value through bounded queues.
//! - Backpressure is always "drop the newest item", never an unbounded block.
//! - Camera frames are leased from the source and released on every path.

pub mod collector;
pub mod config;
pub mod error;
pub mod inferencer;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod utils;

pub use error::{PipelineError, Result};
