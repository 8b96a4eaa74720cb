//! On-device classifier: camera → model on core 0, actuator line on core 1.

use std::thread;

use anyhow::{Context, Result};
use log::info;

use sensor_pipeline::{
    config::{ACTUATOR_TASK, INFERENCE_TASK, InferencerConfig, STATS_LOG_INTERVAL},
    inferencer::{ActuatorTask, InferenceTask, InferencerContext},
    pipeline::task::spawn_pinned,
    sources::{IntensityClassifier, LineActuator, SimulatedCamera},
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ctx = InferencerContext::new(InferencerConfig::default());
    info!(
        "=== INFERENCER START (class {}, threshold {:.2}) ===",
        ctx.config.positive_class, ctx.config.threshold
    );

    let inference = InferenceTask::new(SimulatedCamera::default(), IntensityClassifier::default(), ctx.clone());
    let actuator = ActuatorTask::new(LineActuator::new("buzzer"), ctx.clone());

    let handles = [
        spawn_pinned(INFERENCE_TASK, move || inference.run()).context("spawning inference")?,
        spawn_pinned(ACTUATOR_TASK, move || actuator.run()).context("spawning actuator")?,
    ];

    // The actuator never exits; stop reporting once inference has given up.
    while !handles[0].is_finished() {
        thread::sleep(STATS_LOG_INTERVAL);
        info!("{}", ctx.stats.snapshot());
    }
    info!("=== INFERENCE STOPPED ===");
    Ok(())
}
