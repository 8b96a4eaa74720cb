//! Inferencer deployment: camera → classifier → score slot → actuator.
//!
//! Inference runs on core 0; the actuator poll loop owns core 1 alone. The
//! only link between them is the single-slot score queue.

pub mod actuator;
pub mod inference;

use std::sync::Arc;

use crate::{
    config::InferencerConfig,
    pipeline::{queue::LatestSlot, stats::PipelineStats},
};

pub use actuator::ActuatorTask;
pub use inference::{InferenceTask, probability, quantize_input};

pub struct InferencerContext {
    pub config: InferencerConfig,
    /// Latest positive-class probability; an unread score is overwritten.
    pub scores: LatestSlot<f32>,
    pub stats: PipelineStats,
}

impl InferencerContext {
    pub fn new(config: InferencerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            scores: LatestSlot::new(),
            stats: PipelineStats::new(),
        })
    }
}
