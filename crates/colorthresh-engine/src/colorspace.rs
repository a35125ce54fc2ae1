//! The fixed, ordered catalog of color representations a frame can be
//! thresholded in. Catalog order is the cycling order.

use crate::convert::{rgb_to_gray, rgb_to_hsv, rgb_to_lab, rgb_to_luv, rgb_to_ycrcb, rgb_to_yuv};
use crate::frame::{Frame, FrameError, PixelFormat};
use serde::{Deserialize, Serialize};

/// How a catalog entry derives its pixels from canonical RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Pass-through: the representation *is* the source.
    Identity,
    /// Single-channel luma.
    Luma,
    /// A three-channel forward transform.
    Transform(Transform),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Hsv,
    Lab,
    Luv,
    YCrCb,
    Yuv,
}

impl Transform {
    fn apply(self, r: u8, g: u8, b: u8) -> [u8; 3] {
        match self {
            Transform::Hsv => rgb_to_hsv(r, g, b),
            Transform::Lab => rgb_to_lab(r, g, b),
            Transform::Luv => rgb_to_luv(r, g, b),
            Transform::YCrCb => rgb_to_ycrcb(r, g, b),
            Transform::Yuv => rgb_to_yuv(r, g, b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorspaceEntry {
    pub name: &'static str,
    pub conversion: Conversion,
    /// Layout of the converted frame.
    pub format: PixelFormat,
}

impl ColorspaceEntry {
    pub const fn channel_count(&self) -> usize {
        self.format.bytes_per_pixel() as usize
    }

    /// Converts a source frame into this representation.
    ///
    /// Identity hands three-channel sources back untouched, so its slots
    /// follow the source's own channel order (B, G, R for BGR video). Every
    /// other conversion reads the pixels as RGB first.
    pub fn apply(&self, source: &Frame) -> Result<Frame, FrameError> {
        if self.conversion == Conversion::Identity
            && source.format.is_source()
            && source.channels() == 3
        {
            return Ok(source.clone());
        }
        let rgb = source.as_rgb8()?;
        Ok(self.convert(&rgb))
    }

    /// Display name for a frame this entry produced.
    pub fn label_for(&self, format: PixelFormat) -> &'static str {
        match (self.conversion, format) {
            (Conversion::Identity, PixelFormat::BGR8) => "BGR",
            _ => self.name,
        }
    }

    /// Converts a canonical RGB8 frame into this representation.
    ///
    /// The caller guarantees `rgb.format == PixelFormat::RGB8`.
    pub fn convert(&self, rgb: &Frame) -> Frame {
        let data = match self.conversion {
            Conversion::Identity => rgb.data.clone(),
            Conversion::Luma => rgb
                .data
                .chunks_exact(3)
                .map(|p| rgb_to_gray(p[0], p[1], p[2]))
                .collect(),
            Conversion::Transform(transform) => {
                let mut data = Vec::with_capacity(rgb.data.len());
                for p in rgb.data.chunks_exact(3) {
                    data.extend(transform.apply(p[0], p[1], p[2]));
                }
                data
            }
        };

        Frame {
            data,
            width: rgb.width,
            height: rgb.height,
            format: self.format,
        }
    }
}

pub const CATALOG: [ColorspaceEntry; 7] = [
    ColorspaceEntry {
        name: "RGB",
        conversion: Conversion::Identity,
        format: PixelFormat::RGB8,
    },
    ColorspaceEntry {
        name: "GRAY",
        conversion: Conversion::Luma,
        format: PixelFormat::GRAY8,
    },
    ColorspaceEntry {
        name: "HSV",
        conversion: Conversion::Transform(Transform::Hsv),
        format: PixelFormat::HSV,
    },
    ColorspaceEntry {
        name: "Lab",
        conversion: Conversion::Transform(Transform::Lab),
        format: PixelFormat::LAB,
    },
    ColorspaceEntry {
        name: "Luv",
        conversion: Conversion::Transform(Transform::Luv),
        format: PixelFormat::LUV,
    },
    ColorspaceEntry {
        name: "YCrCb",
        conversion: Conversion::Transform(Transform::YCrCb),
        format: PixelFormat::YCRCB,
    },
    ColorspaceEntry {
        name: "YUV",
        conversion: Conversion::Transform(Transform::Yuv),
        format: PixelFormat::YUV,
    },
];

/// Which way to step through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Backward),
            other => Err(other),
        }
    }
}

/// Callers validate `index < count()` before lookup.
pub fn representation_at(index: usize) -> &'static ColorspaceEntry {
    &CATALOG[index]
}

pub const fn count() -> usize {
    CATALOG.len()
}

pub fn cycled_index(current: usize, direction: Direction) -> usize {
    (current as isize + direction.step()).rem_euclid(count() as isize) as usize
}

/// Looks an entry up by name, ignoring ASCII case.
pub fn index_of(name: &str) -> Option<usize> {
    CATALOG
        .iter()
        .position(|entry| entry.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_seven_entries_and_one_luma() {
        assert_eq!(count(), 7);
        let single: Vec<_> = CATALOG.iter().filter(|e| e.channel_count() == 1).collect();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].conversion, Conversion::Luma);
    }

    #[test]
    fn identity_keeps_bgr_sources_as_they_are() {
        let bgr = Frame::new(crate::frame::FrameConfig {
            data: vec![30, 20, 10, 3, 2, 1],
            width: 2,
            height: 1,
            format: PixelFormat::BGR8,
        })
        .unwrap();
        let identity = representation_at(0);

        let out = identity.apply(&bgr).unwrap();
        assert_eq!(out, bgr);
        assert_eq!(identity.label_for(out.format), "BGR");
        assert_eq!(identity.label_for(PixelFormat::RGB8), "RGB");
    }

    #[test]
    fn identity_widens_gray_sources_to_three_channels() {
        let gray = Frame::new(crate::frame::FrameConfig {
            data: vec![7, 9],
            width: 2,
            height: 1,
            format: PixelFormat::GRAY8,
        })
        .unwrap();

        let out = representation_at(0).apply(&gray).unwrap();
        assert_eq!(out.format, PixelFormat::RGB8);
        assert_eq!(out.data, vec![7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn identity_is_first() {
        assert_eq!(representation_at(0).conversion, Conversion::Identity);
        assert_eq!(representation_at(0).name, "RGB");
    }

    #[test]
    fn backward_from_zero_wraps_to_last() {
        assert_eq!(cycled_index(0, Direction::Backward), count() - 1);
        assert_eq!(cycled_index(count() - 1, Direction::Forward), 0);
    }

    #[test]
    fn full_cycle_returns_home() {
        for start in 0..count() {
            let mut forward = start;
            let mut backward = start;
            for _ in 0..count() {
                forward = cycled_index(forward, Direction::Forward);
                backward = cycled_index(backward, Direction::Backward);
            }
            assert_eq!(forward, start);
            assert_eq!(backward, start);
        }
    }

    #[test]
    fn direction_from_signed_step() {
        assert_eq!(Direction::try_from(1), Ok(Direction::Forward));
        assert_eq!(Direction::try_from(-1), Ok(Direction::Backward));
        assert_eq!(Direction::try_from(2), Err(2));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(index_of("hsv"), Some(2));
        assert_eq!(index_of("YCrCb"), Some(5));
        assert_eq!(index_of("CMYK"), None);
    }

    #[test]
    fn luma_conversion_produces_one_channel() {
        let rgb = Frame::uniform(2, 2, [255, 255, 255]).unwrap();
        let gray = representation_at(1).convert(&rgb);
        assert_eq!(gray.format, PixelFormat::GRAY8);
        assert_eq!(gray.data, vec![255; 4]);
    }
}
