use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
// Represents an image frame with raw pixel data and dimensions.
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
// Describes how pixels are laid out and how many bytes each uses.
pub enum PixelFormat {
    RGB8,  // 3 bytes per pixel (R, G, B)
    RGBA8, // 4 bytes per pixel (R, G, B, A)
    BGR8,  // 3 bytes per pixel (B, G, R)
    GRAY8, // 1 byte per pixel (grayscale)
    HSV,   // 3 bytes per pixel (H/2, S, V)
    LAB,   // 3 bytes per pixel (L, a, b)
    LUV,   // 3 bytes per pixel (L, u, v)
    YCRCB, // 3 bytes per pixel (Y, Cr, Cb)
    YUV,   // 3 bytes per pixel (Y, U, V)
}

impl PixelFormat {
    // Returns how many bytes each pixel uses for this format.
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::GRAY8 => 1,
            PixelFormat::RGBA8 => 4,
            PixelFormat::RGB8
            | PixelFormat::BGR8
            | PixelFormat::HSV
            | PixelFormat::LAB
            | PixelFormat::LUV
            | PixelFormat::YCRCB
            | PixelFormat::YUV => 3,
        }
    }

    // Formats a frame source can hand us; everything else is a conversion output.
    pub const fn is_source(&self) -> bool {
        matches!(
            self,
            PixelFormat::RGB8 | PixelFormat::RGBA8 | PixelFormat::BGR8 | PixelFormat::GRAY8
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("Buffer size doesn't match: expected {expected} bytes, got {actual}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("Provided dimensions are zero")]
    ZeroDimensions,

    #[error("Can't read RGB out of a {0:?} frame")]
    NotRgbConvertible(PixelFormat),
}

pub struct FrameConfig {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl Frame {
    // Validates buffer size against dimensions and constructs a frame.
    pub fn new(config: FrameConfig) -> Result<Self, FrameError> {
        if config.width == 0 || config.height == 0 {
            return Err(FrameError::ZeroDimensions);
        }

        let expected = config.width as usize
            * config.height as usize
            * config.format.bytes_per_pixel() as usize;
        if config.data.len() != expected {
            return Err(FrameError::InvalidDimensions {
                expected,
                actual: config.data.len(),
            });
        }

        Ok(Self {
            data: config.data,
            width: config.width,
            height: config.height,
            format: config.format,
        })
    }

    /// A frame where every pixel holds the same RGB triple.
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, FrameError> {
        let pixel_count = width as usize * height as usize;
        Frame::new(FrameConfig {
            data: rgb.repeat(pixel_count),
            width,
            height,
            format: PixelFormat::RGB8,
        })
    }

    pub fn channels(&self) -> usize {
        self.format.bytes_per_pixel() as usize
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    // Packs the frame into 0RGB words for a window buffer. Non-RGB layouts are
    // shown channel 0/1/2 as R/G/B, so only RGB and gray look "right".
    pub fn to_u32_buffer(&self) -> Vec<u32> {
        let pack = |a: u8, b: u8, c: u8| ((a as u32) << 16) | ((b as u32) << 8) | (c as u32);
        match self.format {
            PixelFormat::GRAY8 => self.data.iter().map(|&g| pack(g, g, g)).collect(),
            PixelFormat::BGR8 => self
                .data
                .chunks_exact(3)
                .map(|p| pack(p[2], p[1], p[0]))
                .collect(),
            _ => self
                .data
                .chunks_exact(self.channels())
                .map(|p| pack(p[0], p[1], p[2]))
                .collect(),
        }
    }

    // Borrows the frame if it's already RGB8, otherwise builds an RGB8 copy.
    pub fn as_rgb8(&self) -> Result<Cow<'_, Frame>, FrameError> {
        if self.format == PixelFormat::RGB8 {
            return Ok(Cow::Borrowed(self));
        }
        if !self.format.is_source() {
            return Err(FrameError::NotRgbConvertible(self.format));
        }

        let mut new_data = Vec::with_capacity(self.pixel_count() * 3);
        for pixel in self.data.chunks_exact(self.channels()) {
            let (r, g, b) = self.extract_rgb(pixel);
            new_data.extend([r, g, b]);
        }

        Ok(Cow::Owned(Frame {
            data: new_data,
            width: self.width,
            height: self.height,
            format: PixelFormat::RGB8,
        }))
    }

    // Normalizes a pixel into (r, g, b) ordering regardless of source format.
    fn extract_rgb(&self, pixel: &[u8]) -> (u8, u8, u8) {
        match self.format {
            PixelFormat::BGR8 => (pixel[2], pixel[1], pixel[0]),
            PixelFormat::GRAY8 => (pixel[0], pixel[0], pixel[0]),
            _ => (pixel[0], pixel[1], pixel[2]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        let result = Frame::new(FrameConfig {
            data: vec![],
            width: 0,
            height: 4,
            format: PixelFormat::RGB8,
        });
        assert_eq!(result, Err(FrameError::ZeroDimensions));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let result = Frame::new(FrameConfig {
            data: vec![0; 10],
            width: 2,
            height: 2,
            format: PixelFormat::RGB8,
        });
        assert_eq!(
            result,
            Err(FrameError::InvalidDimensions {
                expected: 12,
                actual: 10
            })
        );
    }

    #[test]
    fn bgr_and_rgba_canonicalize_to_rgb() {
        let bgr = Frame::new(FrameConfig {
            data: vec![1, 2, 3, 4, 5, 6],
            width: 2,
            height: 1,
            format: PixelFormat::BGR8,
        })
        .unwrap();
        assert_eq!(bgr.as_rgb8().unwrap().data, vec![3, 2, 1, 6, 5, 4]);

        let rgba = Frame::new(FrameConfig {
            data: vec![10, 20, 30, 255],
            width: 1,
            height: 1,
            format: PixelFormat::RGBA8,
        })
        .unwrap();
        let rgb = rgba.as_rgb8().unwrap();
        assert_eq!(rgb.data, vec![10, 20, 30]);
        assert_eq!(rgb.format, PixelFormat::RGB8);
    }

    #[test]
    fn rgb_is_borrowed_not_copied() {
        let frame = Frame::uniform(3, 2, [7, 8, 9]).unwrap();
        assert!(matches!(frame.as_rgb8().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn converted_formats_cannot_be_canonicalized() {
        let hsv = Frame::new(FrameConfig {
            data: vec![0, 0, 0],
            width: 1,
            height: 1,
            format: PixelFormat::HSV,
        })
        .unwrap();
        assert_eq!(
            hsv.as_rgb8().unwrap_err(),
            FrameError::NotRgbConvertible(PixelFormat::HSV)
        );
    }

    #[test]
    fn packs_gray_and_bgr_for_display() {
        let gray = Frame::new(FrameConfig {
            data: vec![0x12],
            width: 1,
            height: 1,
            format: PixelFormat::GRAY8,
        })
        .unwrap();
        assert_eq!(gray.to_u32_buffer(), vec![0x00121212]);

        let bgr = Frame::new(FrameConfig {
            data: vec![0x01, 0x02, 0x03],
            width: 1,
            height: 1,
            format: PixelFormat::BGR8,
        })
        .unwrap();
        assert_eq!(bgr.to_u32_buffer(), vec![0x00030201]);
    }
}
