use crate::frame::{FrameError, PixelFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreshError {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Only reachable if a frame in an already-converted format is fed back in.
    #[error("No conversion from {0:?} to a threshold representation")]
    ConversionUnsupported(PixelFormat),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
