//! Threshold state and the per-frame convert / split / range-test / combine
//! algorithm.

use crate::colorspace::{self, ColorspaceEntry, Direction};
use crate::error::ThreshError;
use crate::frame::{Frame, FrameError};
use ndarray::{Array2, ArrayView3, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

pub const CHANNEL_SLOTS: usize = 3;
pub const PIXEL_MIN: i32 = 0;
pub const PIXEL_MAX: i32 = 255;

/// A binary image: `FOREGROUND` or `BACKGROUND` per pixel, indexed `[[y, x]]`.
pub type Mask = Array2<u8>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Low,
    High,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Low => f.write_str("low"),
            Edge::High => f.write_str("high"),
        }
    }
}

impl FromStr for Edge {
    type Err = ThreshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Edge::Low),
            "high" => Ok(Edge::High),
            other => Err(ThreshError::InvalidArgument(format!(
                "edge must be \"low\" or \"high\", got {other:?}"
            ))),
        }
    }
}

/// Whether a value sitting exactly on a bound passes the range test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    /// `low < v < high`
    #[default]
    Exclusive,
    /// `low <= v <= high`
    Inclusive,
}

impl RangeMode {
    #[inline]
    pub fn contains(self, low: u8, high: u8, value: u8) -> bool {
        match self {
            RangeMode::Exclusive => low < value && value < high,
            RangeMode::Inclusive => low <= value && value <= high,
        }
    }

    /// True when no 8-bit value can pass.
    pub fn is_empty(self, low: u8, high: u8) -> bool {
        match self {
            RangeMode::Exclusive => (high as i32 - low as i32) <= 1,
            RangeMode::Inclusive => low > high,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBounds {
    pub low: u8,
    pub high: u8,
}

impl Default for ChannelBounds {
    fn default() -> Self {
        Self {
            low: PIXEL_MIN as u8,
            high: PIXEL_MAX as u8,
        }
    }
}

impl ChannelBounds {
    pub fn get(&self, edge: Edge) -> u8 {
        match edge {
            Edge::Low => self.low,
            Edge::High => self.high,
        }
    }

    fn set(&mut self, edge: Edge, value: u8) {
        match edge {
            Edge::Low => self.low = value,
            Edge::High => self.high = value,
        }
    }
}

/// The mutable session state: active representation plus six bounds.
///
/// Bounds are never reordered or clamped; a low above its high is legal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdConfig {
    representation_index: usize,
    bounds: [ChannelBounds; CHANNEL_SLOTS],
}

impl ThresholdConfig {
    pub fn representation_index(&self) -> usize {
        self.representation_index
    }

    pub fn bounds(&self) -> &[ChannelBounds; CHANNEL_SLOTS] {
        &self.bounds
    }

    /// Validates a slot and raw value without touching any state.
    pub fn check_bound(slot: usize, value: i32) -> Result<u8, ThreshError> {
        if slot >= CHANNEL_SLOTS {
            return Err(ThreshError::InvalidArgument(format!(
                "channel slot must be 0..{CHANNEL_SLOTS}, got {slot}"
            )));
        }
        if !(PIXEL_MIN..=PIXEL_MAX).contains(&value) {
            return Err(ThreshError::InvalidArgument(format!(
                "bound must be in {PIXEL_MIN}..={PIXEL_MAX}, got {value}"
            )));
        }
        Ok(value as u8)
    }

    pub fn set_bound(&mut self, slot: usize, edge: Edge, value: i32) -> Result<(), ThreshError> {
        let value = Self::check_bound(slot, value)?;
        self.bounds[slot].set(edge, value);
        Ok(())
    }

    pub fn bound(&self, slot: usize, edge: Edge) -> Result<u8, ThreshError> {
        self.bounds
            .get(slot)
            .map(|pair| pair.get(edge))
            .ok_or_else(|| {
                ThreshError::InvalidArgument(format!(
                    "channel slot must be 0..{CHANNEL_SLOTS}, got {slot}"
                ))
            })
    }

    pub fn cycle(&mut self, direction: Direction) {
        self.representation_index = colorspace::cycled_index(self.representation_index, direction);
    }

    /// Jumps straight to a catalog entry by name (case-insensitive).
    pub fn select(&mut self, name: &str) -> Result<(), ThreshError> {
        self.representation_index = colorspace::index_of(name).ok_or_else(|| {
            ThreshError::InvalidArgument(format!("unknown colorspace {name:?}"))
        })?;
        Ok(())
    }
}

/// Output of one `process_frame` call.
#[derive(Clone, Debug)]
pub struct Thresholded {
    /// The input after color conversion, before thresholding.
    pub converted: Frame,
    pub mask: Mask,
}

/// Flat record of the current settings, printed when a session ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSnapshot {
    pub colorspace: String,
    pub ch0_low: u8,
    pub ch0_high: u8,
    pub ch1_low: u8,
    pub ch1_high: u8,
    pub ch2_low: u8,
    pub ch2_high: u8,
}

#[derive(Debug, Default)]
pub struct ThresholdEngine {
    config: ThresholdConfig,
    range_mode: RangeMode,
}

impl ThresholdEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range_mode(range_mode: RangeMode) -> Self {
        Self {
            config: ThresholdConfig::default(),
            range_mode,
        }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn range_mode(&self) -> RangeMode {
        self.range_mode
    }

    /// Overwrites one bound. Rejected values leave the state untouched.
    pub fn set_bound(&mut self, slot: usize, edge: Edge, value: i32) -> Result<(), ThreshError> {
        self.config.set_bound(slot, edge, value)?;
        tracing::debug!(slot, %edge, value, "bound updated");

        let pair = self.config.bounds[slot];
        if self.range_mode.is_empty(pair.low, pair.high) {
            tracing::warn!(
                slot,
                low = pair.low,
                high = pair.high,
                "bounds leave no passing values; channel mask will be empty"
            );
        }
        Ok(())
    }

    pub fn bound(&self, slot: usize, edge: Edge) -> Result<u8, ThreshError> {
        self.config.bound(slot, edge)
    }

    pub fn cycle_representation(&mut self, direction: Direction) {
        self.config.cycle(direction);
        tracing::info!(
            colorspace = self.current_representation_name(),
            "representation changed"
        );
    }

    /// Starts from a named representation instead of the first one.
    pub fn select_representation(&mut self, name: &str) -> Result<(), ThreshError> {
        self.config.select(name)?;
        tracing::info!(
            colorspace = self.current_representation_name(),
            "representation selected"
        );
        Ok(())
    }

    pub fn current_representation(&self) -> &'static ColorspaceEntry {
        colorspace::representation_at(self.config.representation_index)
    }

    pub fn current_representation_name(&self) -> &'static str {
        self.current_representation().name
    }

    /// Converts `frame` into the active representation and thresholds it.
    ///
    /// Pure with respect to the engine: calling it twice with the same frame
    /// and no mutation in between yields identical output.
    pub fn process_frame(&self, frame: &Frame) -> Result<Thresholded, ThreshError> {
        let expected = frame.pixel_count() * frame.channels();
        if frame.data.len() != expected {
            return Err(FrameError::InvalidDimensions {
                expected,
                actual: frame.data.len(),
            }
            .into());
        }

        let entry = self.current_representation();
        let converted = entry.apply(frame).map_err(|err| match err {
            FrameError::NotRgbConvertible(format) => ThreshError::ConversionUnsupported(format),
            other => other.into(),
        })?;
        let mask = self.mask_for(&converted, entry.channel_count())?;

        Ok(Thresholded { converted, mask })
    }

    // Only the first `channel_count` slots contribute; with a single channel
    // the slot 1 and 2 bounds are ignored.
    fn mask_for(&self, converted: &Frame, channel_count: usize) -> Result<Mask, ThreshError> {
        let height = converted.height as usize;
        let width = converted.width as usize;
        let pixels = ArrayView3::from_shape((height, width, channel_count), &converted.data[..])
            .map_err(|_| FrameError::InvalidDimensions {
                expected: height * width * channel_count,
                actual: converted.data.len(),
            })?;

        let mut mask = Mask::from_elem((height, width), FOREGROUND);
        for slot in 0..channel_count {
            let ChannelBounds { low, high } = self.config.bounds[slot];
            let mode = self.range_mode;
            Zip::from(&mut mask)
                .and(pixels.index_axis(Axis(2), slot))
                .for_each(|m, &v| {
                    if !mode.contains(low, high, v) {
                        *m = BACKGROUND;
                    }
                });
        }
        Ok(mask)
    }

    pub fn snapshot(&self) -> ThresholdSnapshot {
        let [ch0, ch1, ch2] = self.config.bounds;
        ThresholdSnapshot {
            colorspace: self.current_representation_name().to_string(),
            ch0_low: ch0.low,
            ch0_high: ch0.high,
            ch1_low: ch1.low,
            ch1_high: ch1.high,
            ch2_low: ch2.low,
            ch2_high: ch2.high,
        }
    }
}
