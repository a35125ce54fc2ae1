use colorthresh_engine::{Frame, PixelFormat};
use std::borrow::Cow;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GrayImage, ImageBuffer};
use ndarray::ArrayView2;

const JPEG_QUALITY: u8 = 60;

// Convert a mask to JPEG bytes
pub fn mask_to_jpeg(mask: ArrayView2<u8>) -> Option<Vec<u8>> {
    let (height, width) = mask.dim();
    let img: GrayImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        image::Luma([mask[[y as usize, x as usize]]])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(&img)
        .ok()?;
    Some(buf)
}

/// Encodes the converted image with its channels shown as R, G, B.
/// BGR frames are swapped back so they look like the camera saw them.
pub fn frame_to_jpeg(frame: &Frame) -> Option<Vec<u8>> {
    let frame = match frame.format {
        PixelFormat::BGR8 => frame.as_rgb8().ok()?,
        _ => Cow::Borrowed(frame),
    };
    let color = match frame.channels() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        _ => return None,
    };
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode(&frame.data, frame.width, frame.height, color)
        .ok()?;
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorthresh_engine::FrameConfig;
    use ndarray::Array2;

    const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

    #[test]
    fn encodes_mask() {
        let mask = Array2::from_elem((4, 6), 255u8);
        let jpeg = mask_to_jpeg(mask.view()).unwrap();
        assert_eq!(jpeg[..2], JPEG_MAGIC);
    }

    #[test]
    fn encodes_gray_and_three_channel_frames() {
        let hsv = Frame::new(FrameConfig {
            data: vec![10; 4 * 4 * 3],
            width: 4,
            height: 4,
            format: PixelFormat::HSV,
        })
        .unwrap();
        let gray = Frame::new(FrameConfig {
            data: vec![10; 16],
            width: 4,
            height: 4,
            format: PixelFormat::GRAY8,
        })
        .unwrap();

        assert_eq!(frame_to_jpeg(&hsv).unwrap()[..2], JPEG_MAGIC);
        assert_eq!(frame_to_jpeg(&gray).unwrap()[..2], JPEG_MAGIC);
    }

    #[test]
    fn bgr_frames_encode_after_swapping() {
        let bgr = Frame::new(FrameConfig {
            data: vec![255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 0],
            width: 2,
            height: 2,
            format: PixelFormat::BGR8,
        })
        .unwrap();
        assert_eq!(frame_to_jpeg(&bgr).unwrap()[..2], JPEG_MAGIC);
    }

    #[test]
    fn four_channel_frames_are_skipped() {
        let rgba = Frame::new(FrameConfig {
            data: vec![0; 2 * 2 * 4],
            width: 2,
            height: 2,
            format: PixelFormat::RGBA8,
        })
        .unwrap();
        assert!(frame_to_jpeg(&rgba).is_none());
    }
}
