use crate::{
    app::{FrameView, LoopControl},
    constants::FEEDBACK_ROW_SPACING,
    feedback,
    gesture_classifier::GestureSignals,
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

const ESC_KEY: i32 = 27;

/// Camera window with gesture feedback; `q` or Esc ends the session
pub struct PreviewWindow {
    name: String,
}

impl PreviewWindow {
    /// Create the window
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created (e.g. no display).
    pub fn new(name: &str) -> Result<Self> {
        highgui::named_window(name, WINDOW_NORMAL)?;
        Ok(Self { name: name.to_string() })
    }
}

impl FrameView<Mat> for PreviewWindow {
    fn show(&mut self, frame: &Mat, signals: Option<&GestureSignals>) -> Result<LoopControl> {
        let mut display_frame = frame.try_clone()?;

        if let Some(signals) = signals {
            for label in feedback::labels(signals) {
                let (b, g, r) = label.color;
                imgproc::put_text(
                    &mut display_frame,
                    &label.text,
                    Point::new(FEEDBACK_ROW_SPACING, label.y),
                    FONT_HERSHEY_SIMPLEX,
                    1.0,
                    Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0),
                    2,
                    LINE_8,
                    false,
                )?;
            }
        }

        highgui::imshow(&self.name, &display_frame)?;

        let key = highgui::wait_key(1)?;
        if key == ESC_KEY || key == i32::from(b'q') {
            return Ok(LoopControl::Quit);
        }
        Ok(LoopControl::Continue)
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            log::debug!("Failed to close preview window: {e}");
        }
    }
}
