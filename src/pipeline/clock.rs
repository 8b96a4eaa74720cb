//! Time-since-boot source. IMU stamps and simulated camera capture times
//! share one clock so both streams order on the same base.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BootClock {
    boot: Instant,
}

impl BootClock {
    pub fn start() -> Self {
        Self {
            boot: Instant::now(),
        }
    }

    #[inline]
    pub fn since_boot(&self) -> Duration {
        self.boot.elapsed()
    }

    #[inline]
    pub fn millis_since_boot(&self) -> u64 {
        self.since_boot().as_millis() as u64
    }
}

impl Default for BootClock {
    fn default() -> Self {
        Self::start()
    }
}
