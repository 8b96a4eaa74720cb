//! Actuator poll loop.
//!
//! Busy-polls the score slot without sleeping: this task has its core to
//! itself, so latency wins over utilisation. A score above the threshold
//! asserts the line; anything else deasserts it.

use std::{hint, sync::Arc};

use log::info;

use crate::{inferencer::InferencerContext, sources::Actuator};

pub struct ActuatorTask<A: Actuator> {
    actuator: A,
    ctx: Arc<InferencerContext>,
    level: Option<bool>,
}

impl<A: Actuator> ActuatorTask<A> {
    pub fn new(actuator: A, ctx: Arc<InferencerContext>) -> Self {
        Self {
            actuator,
            ctx,
            level: None,
        }
    }

    /// Applies a fresh score, if any. Returns the level that was set.
    pub fn poll_once(&mut self) -> Option<bool> {
        let score = self.ctx.scores.try_receive()?;
        let on = score > self.ctx.config.threshold;
        self.actuator.set(on);

        if self.level != Some(on) {
            self.ctx.stats.record_actuator_change();
            self.level = Some(on);
        }
        Some(on)
    }

    /// Runs for the life of the process.
    pub fn run(mut self) {
        info!("Actuator polling (threshold {:.2})", self.ctx.config.threshold);
        loop {
            if self.poll_once().is_none() {
                hint::spin_loop();
            }
        }
    }
}
