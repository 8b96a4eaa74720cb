//! Host stand-ins for the camera, IMU, classifier and actuator line.
//!
//! Readings are synthetic (noise around a base value), in the same raw units
//! the hardware reports, so the rest of the pipeline is unchanged.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread,
    time::Duration,
};

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::{FRAME_HEIGHT, FRAME_LEN, FRAME_POOL_SIZE, FRAME_WIDTH, INPUT_ZERO_OFFSET},
    error::{PipelineError, Result},
    pipeline::{clock::BootClock, sample::Axes},
    sources::{
        Actuator, CameraSource, CaptureTime, Classifier, Frame, ImuSource, OutputTensor,
        QuantParams,
    },
};

// ---------------------------------------------------------------------------
// IMU
// ---------------------------------------------------------------------------

/// Raw LSB per g at ±4 g full scale.
const ACCEL_LSB_PER_G: i16 = 8192;
const ACCEL_NOISE: i16 = 200;
const GYRO_NOISE: i16 = 50;

pub struct SimulatedImu {
    rng: StdRng,
}

impl SimulatedImu {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn noise(&mut self, amplitude: i16) -> i16 {
        self.rng.random_range(-amplitude..=amplitude)
    }
}

impl Default for SimulatedImu {
    fn default() -> Self {
        Self::new()
    }
}

impl ImuSource for SimulatedImu {
    fn init(&mut self) -> Result<()> {
        info!("Simulated IMU ready (±4g, ±500°/s)");
        Ok(())
    }

    fn read_acceleration(&mut self) -> Axes {
        Axes::new(
            self.noise(ACCEL_NOISE),
            self.noise(ACCEL_NOISE),
            ACCEL_LSB_PER_G + self.noise(ACCEL_NOISE),
        )
    }

    fn read_rotation(&mut self) -> Axes {
        Axes::new(
            self.noise(GYRO_NOISE),
            self.noise(GYRO_NOISE),
            self.noise(GYRO_NOISE),
        )
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePattern {
    /// Diagonal gradient that shifts by one each frame.
    Gradient,
    Constant(u8),
}

/// Fetch/release accounting, shared so it stays observable after the
/// camera moves into its task.
#[derive(Debug, Default)]
pub struct CameraCounters {
    fetched: AtomicU64,
    released: AtomicU64,
}

impl CameraCounters {
    pub fn fetched(&self) -> u64 {
        self.fetched.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    pub fn outstanding(&self) -> u64 {
        self.fetched().saturating_sub(self.released())
    }
}

/// Grayscale camera with a fixed pool of frame buffers. When every buffer is
/// out on loan, `fetch` fails instead of blocking forever.
pub struct SimulatedCamera {
    width: usize,
    height: usize,
    pool: Vec<Vec<u8>>,
    pattern: FramePattern,
    frame_interval: Duration,
    fail_init: bool,
    seq: u64,
    clock: BootClock,
    counters: Arc<CameraCounters>,
}

impl SimulatedCamera {
    pub fn new(width: usize, height: usize, pool_size: usize) -> Self {
        Self {
            width,
            height,
            pool: (0..pool_size).map(|_| vec![0u8; width * height]).collect(),
            pattern: FramePattern::Gradient,
            frame_interval: Duration::ZERO,
            fail_init: false,
            seq: 0,
            clock: BootClock::start(),
            counters: Arc::new(CameraCounters::default()),
        }
    }

    /// Time `fetch` blocks to mimic the sensor's frame rate.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_pattern(mut self, pattern: FramePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Capture times count from `clock`'s boot instead of this camera's
    /// construction, e.g. to share a base with the IMU sampler.
    pub fn with_clock(mut self, clock: BootClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_init_failure(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn counters(&self) -> Arc<CameraCounters> {
        self.counters.clone()
    }

    pub fn available(&self) -> usize {
        self.pool.len()
    }

    fn paint(&self, buf: &mut [u8]) {
        match self.pattern {
            FramePattern::Constant(v) => buf.fill(v),
            FramePattern::Gradient => {
                for (i, px) in buf.iter_mut().enumerate() {
                    let (row, col) = (i / self.width.max(1), i % self.width.max(1));
                    *px = (row + col + self.seq as usize) as u8;
                }
            }
        }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new(FRAME_WIDTH, FRAME_HEIGHT, FRAME_POOL_SIZE)
    }
}

fn capture_time(clock: &BootClock) -> CaptureTime {
    let since_boot = clock.since_boot();
    CaptureTime {
        secs: since_boot.as_secs(),
        micros: since_boot.subsec_micros(),
    }
}

impl CameraSource for SimulatedCamera {
    fn init(&mut self) -> Result<()> {
        if self.fail_init {
            return Err(PipelineError::init("camera", "sensor did not respond"));
        }
        info!(
            "Simulated camera ready ({}x{} grayscale, {} buffers)",
            self.width,
            self.height,
            self.pool.len()
        );
        Ok(())
    }

    fn fetch(&mut self) -> Result<Frame> {
        if !self.frame_interval.is_zero() {
            thread::sleep(self.frame_interval);
        }

        let mut buf = self
            .pool
            .pop()
            .ok_or_else(|| PipelineError::CaptureFailed("frame buffer pool exhausted".into()))?;
        self.paint(&mut buf);
        self.seq = self.seq.wrapping_add(1);
        self.counters.fetched.fetch_add(1, Ordering::Relaxed);

        Ok(Frame {
            len: buf.len(),
            buf,
            captured_at: capture_time(&self.clock),
        })
    }

    fn release(&mut self, frame: Frame) {
        self.counters.released.fetch_add(1, Ordering::Relaxed);
        self.pool.push(frame.buf);
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Softmax-style int8 output: scale 1/256, zero point -128.
pub const OUTPUT_QUANT: QuantParams = QuantParams {
    scale: 1.0 / 256.0,
    zero_point: -128,
};

/// Two-class classifier scoring darker frames as the positive class.
pub struct IntensityClassifier {
    input_len: usize,
}

impl IntensityClassifier {
    pub fn new(input_len: usize) -> Self {
        Self { input_len }
    }
}

impl Default for IntensityClassifier {
    fn default() -> Self {
        Self::new(FRAME_LEN)
    }
}

fn quantize_probability(p: f32) -> i8 {
    let q = (p / OUTPUT_QUANT.scale).round() as i32 + OUTPUT_QUANT.zero_point;
    q.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

impl Classifier for IntensityClassifier {
    fn init(&mut self) -> Result<()> {
        if self.input_len == 0 {
            return Err(PipelineError::init("model", "input tensor has zero length"));
        }
        Ok(())
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn infer(&mut self, input: &[i8]) -> Result<OutputTensor> {
        if input.len() != self.input_len {
            return Err(PipelineError::FrameSizeMismatch {
                expected: self.input_len,
                actual: input.len(),
            });
        }

        let sum: i64 = input
            .iter()
            .map(|&q| i64::from(i16::from(q) + INPUT_ZERO_OFFSET))
            .sum();
        let brightness = sum as f32 / (input.len() as f32 * 255.0);
        let positive = (1.0 - brightness).clamp(0.0, 1.0);

        Ok(OutputTensor {
            data: vec![quantize_probability(1.0 - positive), quantize_probability(positive)],
            quant: OUTPUT_QUANT,
        })
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// Digital output line; logs level transitions.
pub struct LineActuator {
    name: &'static str,
    level: Arc<AtomicBool>,
}

impl LineActuator {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared view of the current output level.
    pub fn probe(&self) -> Arc<AtomicBool> {
        self.level.clone()
    }
}

impl Actuator for LineActuator {
    fn set(&mut self, on: bool) {
        let previous = self.level.swap(on, Ordering::Relaxed);
        if previous != on {
            info!("[{}] {}", self.name, if on { "ON" } else { "off" });
        }
    }
}
