//! Capture → quantize → classify → publish.
//!
//! The frame buffer goes back to the camera as soon as its pixels have been
//! converted, so the pool is never held during the classifier call.

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    config::INPUT_ZERO_OFFSET,
    error::{PipelineError, Result},
    inferencer::InferencerContext,
    sources::{CameraSource, Classifier, FrameLease, OutputTensor},
};

/// Maps unsigned 8-bit pixels into the model's signed 8-bit input domain.
pub fn quantize_input(pixels: &[u8], out: &mut Vec<i8>) {
    out.clear();
    out.extend(pixels.iter().map(|&p| (i16::from(p) - INPUT_ZERO_OFFSET) as i8));
}

/// Dequantized probability of `class` from a quantized output tensor.
pub fn probability(output: &OutputTensor, class: usize) -> Result<f32> {
    output
        .data
        .get(class)
        .map(|&q| output.quant.dequantize(q))
        .ok_or_else(|| {
            PipelineError::InferenceFailed(format!(
                "output has {} classes, wanted index {}",
                output.data.len(),
                class
            ))
        })
}

pub struct InferenceTask<C: CameraSource, M: Classifier> {
    camera: C,
    model: M,
    ctx: Arc<InferencerContext>,
    input: Vec<i8>,
}

impl<C: CameraSource, M: Classifier> InferenceTask<C, M> {
    pub fn new(camera: C, model: M, ctx: Arc<InferencerContext>) -> Self {
        let input = Vec::with_capacity(model.input_len());
        Self {
            camera,
            model,
            ctx,
            input,
        }
    }

    /// One capture + inference. On success the score has been published.
    pub fn infer_once(&mut self) -> Result<f32> {
        {
            let lease = FrameLease::acquire(&mut self.camera)?;
            quantize_input(lease.bytes(), &mut self.input);
        }

        let expected = self.model.input_len();
        if self.input.len() != expected {
            return Err(PipelineError::FrameSizeMismatch {
                expected,
                actual: self.input.len(),
            });
        }

        let output = self.model.infer(&self.input)?;
        let p = probability(&output, self.ctx.config.positive_class)?;

        if self.ctx.scores.publish(p) {
            debug!("Unread score overwritten");
        }
        Ok(p)
    }

    /// Runs for the life of the process; returns only if camera or model
    /// fail to initialise.
    pub fn run(mut self) {
        if let Err(e) = self.model.init() {
            error!("Model init failed, inference disabled: {}", e);
            return;
        }
        if let Err(e) = self.camera.init() {
            error!("Camera init failed, inference disabled: {}", e);
            return;
        }
        info!("Inference running (input {} values)", self.model.input_len());

        loop {
            match self.infer_once() {
                Ok(p) => {
                    self.ctx.stats.record_inference(true);
                    debug!("p(positive): {:.3}", p);
                }
                Err(e) => {
                    self.ctx.stats.record_inference(false);
                    warn!("Inference cycle skipped: {}", e);
                }
            }
        }
    }
}
