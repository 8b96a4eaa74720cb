//! Error taxonomy for the pipeline.
//!
//! Queue saturation is deliberately absent: a full queue is a policy outcome
//! reported as `false` from the send call, not an error.

use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Sensor produced nothing usable this cycle; the next cycle retries.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// Open/create/write on the storage sink failed; the record is dropped.
    #[error("storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Camera/IMU/model bring-up failed; the owning task stops.
    #[error("{component} init failed: {reason}")]
    InitFailed {
        component: &'static str,
        reason: String,
    },

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn init(component: &'static str, reason: impl Into<String>) -> Self {
        Self::InitFailed {
            component,
            reason: reason.into(),
        }
    }
}
