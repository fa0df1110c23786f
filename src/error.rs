use thiserror::Error;

use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::source::SourceError;

/// Failures a run can surface. Statistical edge cases are never errors;
/// they are absorbed by the detector.
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("source: {0}")]
    Source(#[from] SourceError),
    #[error("sink: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, RadarError>;
