pub mod colorspace;
pub mod convert;
pub mod engine;
pub mod error;
pub mod frame;

pub use colorspace::{ColorspaceEntry, Conversion, Direction, Transform};
pub use engine::{
    ChannelBounds, Edge, Mask, RangeMode, ThresholdConfig, ThresholdEngine, ThresholdSnapshot,
    Thresholded, BACKGROUND, CHANNEL_SLOTS, FOREGROUND, PIXEL_MAX, PIXEL_MIN,
};
pub use error::ThreshError;
pub use frame::{Frame, FrameConfig, FrameError, PixelFormat};
