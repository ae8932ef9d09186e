//! On-screen feedback for active gestures.

use crate::{
    constants::FEEDBACK_ROW_SPACING,
    gesture_classifier::{GestureSignals, HeadTilt},
};

/// BGR color of a label
pub type Bgr = (u8, u8, u8);

const RED: Bgr = (0, 0, 255);
const GREEN: Bgr = (0, 255, 0);
const CYAN: Bgr = (255, 255, 0);
const MAGENTA: Bgr = (255, 0, 255);

/// One line of overlay text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackLabel {
    pub text: String,
    /// Baseline y in pixels; x is fixed at one row spacing
    pub y: i32,
    pub color: Bgr,
}

/// Labels for the gestures active in a frame, top to bottom
#[must_use]
pub fn labels(signals: &GestureSignals) -> Vec<FeedbackLabel> {
    let rows = [
        (signals.mouth_open, "EMERGENCY MODE".to_string(), RED),
        (signals.both_eyes_closed(), "LIGHT CONTROL".to_string(), GREEN),
        (signals.any_eyebrow_raised(), "NAVIGATION".to_string(), CYAN),
        (
            signals.head_tilt != HeadTilt::Center,
            format!("HEAD TILT: {}", signals.head_tilt.as_str().to_uppercase()),
            MAGENTA,
        ),
    ];

    rows.into_iter()
        .zip(1..)
        .filter(|((active, _, _), _)| *active)
        .map(|((_, text, color), row)| FeedbackLabel {
            text,
            y: row * FEEDBACK_ROW_SPACING,
            color,
        })
        .collect()
}
