use crate::cli::SourceSelection;
use crate::config::CameraConfig;
use colorthresh_engine::{Frame, FrameConfig, PixelFormat, ThreshError};
use std::path::Path;

/// How the session should drive a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// One frame, kept and re-thresholded on every change.
    Still,
    /// A new frame every iteration until the stream ends.
    Continuous,
}

pub trait FrameSource {
    fn mode(&self) -> SourceMode;

    /// `None` once the stream is exhausted. Read failures also end the stream.
    fn next_frame(&mut self) -> Option<Frame>;
}

pub fn open_source(
    selection: &SourceSelection,
    camera_config: &CameraConfig,
) -> Result<Box<dyn FrameSource>, ThreshError> {
    let source: Box<dyn FrameSource> = match selection {
        SourceSelection::Image(path) => Box::new(ImageSource::open(path)?),
        SourceSelection::Video(path) => Box::new(video::VideoSource::open(path)?),
        SourceSelection::Camera(index) => {
            Box::new(camera::CameraSource::open(*index, camera_config)?)
        }
    };
    tracing::info!(?selection, "Frame source opened");
    Ok(source)
}

/// A single still image, yielded once.
pub struct ImageSource {
    frame: Option<Frame>,
}

impl ImageSource {
    pub fn open(path: &Path) -> Result<Self, ThreshError> {
        let decoded = image::open(path)
            .map_err(|e| ThreshError::SourceUnavailable(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        let frame = Frame::new(FrameConfig {
            data: decoded.into_raw(),
            width,
            height,
            format: PixelFormat::RGB8,
        })?;
        Ok(Self::from_frame(frame))
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }
}

impl FrameSource for ImageSource {
    fn mode(&self) -> SourceMode {
        SourceMode::Still
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }
}

#[cfg(feature = "camera")]
mod camera {
    use super::{FrameSource, SourceMode};
    use crate::config::CameraConfig;
    use colorthresh_engine::{Frame, FrameConfig, PixelFormat, ThreshError};
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType};
    use nokhwa::Camera;

    pub struct CameraSource {
        camera: Camera,
    }

    impl CameraSource {
        pub fn open(device_id: u32, config: &CameraConfig) -> Result<Self, ThreshError> {
            let unavailable = |e: nokhwa::NokhwaError| {
                ThreshError::SourceUnavailable(format!("camera {device_id}: {e}"))
            };
            let index = CameraIndex::Index(device_id);
            let format = CameraFormat::new_from(
                config.width,
                config.height,
                FrameFormat::MJPEG,
                config.fps,
            );
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

            let mut camera = Camera::new(index, requested).map_err(unavailable)?;
            camera.open_stream().map_err(unavailable)?;
            Ok(Self { camera })
        }
    }

    impl FrameSource for CameraSource {
        fn mode(&self) -> SourceMode {
            SourceMode::Continuous
        }

        fn next_frame(&mut self) -> Option<Frame> {
            let decoded = match self
                .camera
                .frame()
                .and_then(|buffer| buffer.decode_image::<RgbFormat>())
            {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!(error = %e, "Camera read failed; ending stream");
                    return None;
                }
            };

            let (width, height) = decoded.dimensions();
            Frame::new(FrameConfig {
                data: decoded.into_raw(),
                width,
                height,
                format: PixelFormat::RGB8,
            })
            .map_err(|e| tracing::warn!(error = %e, "Camera produced a malformed frame"))
            .ok()
        }
    }

    impl Drop for CameraSource {
        fn drop(&mut self) {
            if let Err(e) = self.camera.stop_stream() {
                tracing::debug!(error = %e, "Camera stream did not stop cleanly");
            }
        }
    }
}

#[cfg(not(feature = "camera"))]
mod camera {
    use super::{FrameSource, SourceMode};
    use crate::config::CameraConfig;
    use colorthresh_engine::{Frame, ThreshError};

    pub enum CameraSource {}

    impl CameraSource {
        pub fn open(device_id: u32, _config: &CameraConfig) -> Result<Self, ThreshError> {
            Err(ThreshError::SourceUnavailable(format!(
                "camera {device_id}: built without the `camera` feature"
            )))
        }
    }

    impl FrameSource for CameraSource {
        fn mode(&self) -> SourceMode {
            match *self {}
        }

        fn next_frame(&mut self) -> Option<Frame> {
            match *self {}
        }
    }
}

#[cfg(feature = "video")]
mod video {
    use super::{FrameSource, SourceMode};
    use colorthresh_engine::{Frame, FrameConfig, PixelFormat, ThreshError};
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio::{self, VideoCapture};
    use std::path::Path;

    pub struct VideoSource {
        capture: VideoCapture,
        frame: Mat,
    }

    impl VideoSource {
        pub fn open(path: &Path) -> Result<Self, ThreshError> {
            let unavailable =
                |e: String| ThreshError::SourceUnavailable(format!("{}: {e}", path.display()));

            let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
                .map_err(|e| unavailable(e.to_string()))?;
            if !capture.is_opened().map_err(|e| unavailable(e.to_string()))? {
                return Err(unavailable("Error opening video file".to_string()));
            }

            Ok(Self {
                capture,
                frame: Mat::default(),
            })
        }

        fn to_frame(mat: &Mat) -> opencv::Result<Option<Frame>> {
            let format = match mat.channels() {
                1 => PixelFormat::GRAY8,
                3 => PixelFormat::BGR8,
                other => {
                    tracing::warn!(channels = other, "Unsupported video channel count");
                    return Ok(None);
                }
            };
            let owned;
            let mat = if mat.is_continuous() {
                mat
            } else {
                owned = mat.try_clone()?;
                &owned
            };

            let frame = Frame::new(FrameConfig {
                data: mat.data_bytes()?.to_vec(),
                width: mat.cols() as u32,
                height: mat.rows() as u32,
                format,
            });
            Ok(frame.ok())
        }
    }

    impl FrameSource for VideoSource {
        fn mode(&self) -> SourceMode {
            SourceMode::Continuous
        }

        fn next_frame(&mut self) -> Option<Frame> {
            match self.capture.read(&mut self.frame) {
                Ok(true) if !self.frame.empty() => Self::to_frame(&self.frame)
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Could not copy video frame");
                        None
                    }),
                // End of video
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Error reading frame");
                    None
                }
            }
        }
    }
}

#[cfg(not(feature = "video"))]
mod video {
    use super::{FrameSource, SourceMode};
    use colorthresh_engine::{Frame, ThreshError};
    use std::path::Path;

    pub enum VideoSource {}

    impl VideoSource {
        pub fn open(path: &Path) -> Result<Self, ThreshError> {
            Err(ThreshError::SourceUnavailable(format!(
                "{}: built without the `video` feature",
                path.display()
            )))
        }
    }

    impl FrameSource for VideoSource {
        fn mode(&self) -> SourceMode {
            match *self {}
        }

        fn next_frame(&mut self) -> Option<Frame> {
            match *self {}
        }
    }
}
