use crate::{app::FrameSource, config::VideoConfig, Error, Result};
use log::info;
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

/// Frames from a webcam or a video file
pub struct CameraSource {
    capture: VideoCapture,
    mirror: bool,
}

impl CameraSource {
    /// Open the configured video source
    ///
    /// # Errors
    ///
    /// Returns `ServiceInit` if the device or file cannot be opened.
    pub fn open(config: &VideoConfig) -> Result<Self> {
        let capture = match &config.video_file {
            Some(path) => {
                info!("Opening video file: {}", path.display());
                VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?
            }
            None => {
                info!("Opening camera {}", config.camera_index);
                let mut cap = VideoCapture::new(config.camera_index, videoio::CAP_ANY)?;

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
        };

        if !capture.is_opened()? {
            return Err(Error::ServiceInit("Could not open video source".to_string()));
        }

        Ok(Self {
            capture,
            mirror: config.mirror,
        })
    }
}

impl FrameSource for CameraSource {
    type Frame = Mat;

    fn read(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        if !self.mirror {
            return Ok(Some(frame));
        }

        // Mirror for user-friendly interaction
        let mut mirrored = Mat::default();
        core::flip(&frame, &mut mirrored, 1)?;
        Ok(Some(mirrored))
    }
}
