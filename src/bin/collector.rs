//! Data collector: samples the IMU and camera on core 1 and writes a new
//! numbered session under the mount point from core 0.
//!
//! Usage: `collector [MOUNT_POINT]` (defaults to `./sdcard`).

use std::{env, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use log::info;

use sensor_pipeline::{
    collector::{CollectorContext, FrameSampler, ImuSampler, Writer},
    config::{CAMERA_TASK, CollectorConfig, IMU_TASK, STATS_LOG_INTERVAL, WRITER_TASK},
    pipeline::task::spawn_pinned,
    sources::{SimulatedCamera, SimulatedImu},
    storage::FsStorage,
};

/// Roughly the sensor's 25 fps at 96x96.
const SIMULATED_FRAME_INTERVAL: Duration = Duration::from_millis(40);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = CollectorConfig::default();
    if let Some(mount) = env::args().nth(1) {
        config.mount_point = PathBuf::from(mount);
    }
    std::fs::create_dir_all(&config.mount_point)
        .with_context(|| format!("mount point {:?} unavailable", config.mount_point))?;

    info!("=== COLLECTOR START ({:?}) ===", config.mount_point);
    let ctx = CollectorContext::new(config);

    let writer = Writer::open_session(FsStorage, ctx.clone());
    let mut handles = vec![spawn_pinned(WRITER_TASK, move || writer.run()).context("spawning writer")?];

    if ctx.config.record_imu {
        let imu = ImuSampler::new(SimulatedImu::new(), ctx.clone());
        handles.push(spawn_pinned(IMU_TASK, move || imu.run()).context("spawning IMU sampler")?);
    } else {
        info!("IMU recording disabled");
    }

    let camera = SimulatedCamera::default()
        .with_clock(ctx.clock)
        .with_frame_interval(SIMULATED_FRAME_INTERVAL);
    let frames = FrameSampler::new(camera, ctx.clone());
    handles.push(spawn_pinned(CAMERA_TASK, move || frames.run()).context("spawning frame sampler")?);

    // Tasks run forever; a finished handle means its init failed.
    while handles.iter().any(|h| !h.is_finished()) {
        thread::sleep(STATS_LOG_INTERVAL);
        info!("{}", ctx.stats.snapshot());
    }
    info!("=== COLLECTOR STOPPED: all tasks exited ===");
    Ok(())
}
