//! Shared pipeline core: codec, samples, queues, sessions and task plumbing.

pub mod clock;
pub mod queue;
pub mod sample;
pub mod session;
pub mod stats;
pub mod task;
pub mod timestamp;
