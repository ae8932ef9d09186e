//! Landmark classifier turning face-mesh geometry into gesture signals.
//!
//! Every signal is a plain threshold on one landmark-pair distance (or on the
//! nose-tip position for head tilt), so classification is deterministic and
//! free of side effects. A frame without a face produces no signal set at all.

use crate::{
    constants::{
        DEFAULT_EYEBROW_RAISE_THRESHOLD, DEFAULT_EYE_CLOSED_THRESHOLD, DEFAULT_MOUTH_OPEN_THRESHOLD,
        HEAD_TILT_LEFT_BOUND, HEAD_TILT_RIGHT_BOUND,
    },
    landmarks::{LandmarkRole, LandmarkSet},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric cutoffs for the distance-based gestures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Lip gap above which the mouth counts as open
    pub mouth_open: f32,
    /// Eyelid gap below which an eye counts as closed
    pub eye_closed: f32,
    /// Eyebrow gap above which an eyebrow counts as raised
    pub eyebrow_raise: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            mouth_open: DEFAULT_MOUTH_OPEN_THRESHOLD,
            eye_closed: DEFAULT_EYE_CLOSED_THRESHOLD,
            eyebrow_raise: DEFAULT_EYEBROW_RAISE_THRESHOLD,
        }
    }
}

impl GestureThresholds {
    /// Check that every threshold is a finite, non-negative number
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the offending threshold.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("mouth_open", self.mouth_open),
            ("eye_closed", self.eye_closed),
            ("eyebrow_raise", self.eyebrow_raise),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "Gesture threshold {name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Horizontal head position derived from the nose tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadTilt {
    /// Nose tip in the left part of the frame
    Left,
    /// Nose tip near the middle
    #[default]
    Center,
    /// Nose tip in the right part of the frame
    Right,
}

impl HeadTilt {
    /// Classify a normalized nose-tip x coordinate; the bounds themselves are center
    #[must_use]
    pub fn from_nose_x(x: f32) -> Self {
        if x < HEAD_TILT_LEFT_BOUND {
            Self::Left
        } else if x > HEAD_TILT_RIGHT_BOUND {
            Self::Right
        } else {
            Self::Center
        }
    }

    /// Lowercase name of the tilt
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for HeadTilt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gesture signals for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GestureSignals {
    /// Lip gap above `mouth_open`
    pub mouth_open: bool,
    /// Left eyelid gap below `eye_closed`
    pub left_eye_closed: bool,
    /// Right eyelid gap below `eye_closed`
    pub right_eye_closed: bool,
    /// Left brow gap above `eyebrow_raise`
    pub left_eyebrow_raise: bool,
    /// Right brow gap above `eyebrow_raise`
    pub right_eyebrow_raise: bool,
    /// Head position from the nose tip
    pub head_tilt: HeadTilt,
}

impl GestureSignals {
    /// Both eyes closed in the same frame
    #[must_use]
    pub const fn both_eyes_closed(&self) -> bool {
        self.left_eye_closed && self.right_eye_closed
    }

    /// At least one eyebrow raised
    #[must_use]
    pub const fn any_eyebrow_raised(&self) -> bool {
        self.left_eyebrow_raise || self.right_eyebrow_raise
    }
}

/// Threshold-based gesture classifier
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    /// Create a classifier with fixed thresholds
    #[must_use]
    pub const fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Derive gesture signals from one face's landmarks
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the set is missing any index the layout needs.
    pub fn classify(&self, landmarks: &LandmarkSet) -> Result<GestureSignals> {
        use LandmarkRole::{
            LeftEyeLower, LeftEyeUpper, LeftEyebrowLower, LeftEyebrowUpper, MouthLower, MouthUpper, NoseTip,
            RightEyeLower, RightEyeUpper, RightEyebrowLower, RightEyebrowUpper,
        };

        let t = &self.thresholds;

        let mouth_gap = landmarks.vertical_distance(MouthUpper, MouthLower)?;
        let left_eye_gap = landmarks.vertical_distance(LeftEyeUpper, LeftEyeLower)?;
        let right_eye_gap = landmarks.vertical_distance(RightEyeUpper, RightEyeLower)?;
        let left_brow_gap = landmarks.vertical_distance(LeftEyebrowLower, LeftEyebrowUpper)?;
        let right_brow_gap = landmarks.vertical_distance(RightEyebrowLower, RightEyebrowUpper)?;
        let nose_x = landmarks.role(NoseTip)?.x;

        Ok(GestureSignals {
            mouth_open: mouth_gap > t.mouth_open,
            left_eye_closed: left_eye_gap < t.eye_closed,
            right_eye_closed: right_eye_gap < t.eye_closed,
            left_eyebrow_raise: left_brow_gap > t.eyebrow_raise,
            right_eyebrow_raise: right_brow_gap > t.eyebrow_raise,
            head_tilt: HeadTilt::from_nose_x(nose_x),
        })
    }

    /// Classify a frame that may not contain a face
    ///
    /// # Errors
    ///
    /// Propagates `classify` errors for frames that do contain a face.
    pub fn classify_frame(&self, landmarks: Option<&LandmarkSet>) -> Result<Option<GestureSignals>> {
        landmarks.map(|set| self.classify(set)).transpose()
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::FACE_MESH_LANDMARKS, landmarks::Landmark};

    fn neutral_face() -> Vec<Landmark> {
        let mut points = vec![Landmark::planar(0.5, 0.5); FACE_MESH_LANDMARKS];
        // Eyes wide open relative to any sane eye threshold
        points[LandmarkRole::LeftEyeLower.index()] = Landmark::planar(0.4, 0.5);
        points[LandmarkRole::LeftEyeUpper.index()] = Landmark::planar(0.4, 0.5 - 0.9);
        points[LandmarkRole::RightEyeLower.index()] = Landmark::planar(0.6, 0.5);
        points[LandmarkRole::RightEyeUpper.index()] = Landmark::planar(0.6, 0.5 - 0.9);
        points
    }

    #[test]
    fn test_neutral_face_has_no_gestures() {
        let classifier = GestureClassifier::default();
        let signals = classifier.classify(&LandmarkSet::new(neutral_face())).unwrap();
        assert_eq!(signals, GestureSignals::default());
    }

    #[test]
    fn test_head_tilt_bounds() {
        assert_eq!(HeadTilt::from_nose_x(0.35), HeadTilt::Left);
        assert_eq!(HeadTilt::from_nose_x(0.4), HeadTilt::Center);
        assert_eq!(HeadTilt::from_nose_x(0.5), HeadTilt::Center);
        assert_eq!(HeadTilt::from_nose_x(0.6), HeadTilt::Center);
        assert_eq!(HeadTilt::from_nose_x(0.65), HeadTilt::Right);
    }

    #[test]
    fn test_no_face_yields_no_signals() {
        let classifier = GestureClassifier::default();
        assert_eq!(classifier.classify_frame(None).unwrap(), None);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(GestureThresholds::default().validate().is_ok());

        let bad = GestureThresholds {
            mouth_open: f32::NAN,
            ..GestureThresholds::default()
        };
        assert!(bad.validate().is_err());

        let negative = GestureThresholds {
            eyebrow_raise: -0.1,
            ..GestureThresholds::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_head_tilt_display() {
        assert_eq!(HeadTilt::Left.to_string(), "left");
        assert_eq!(HeadTilt::Right.as_str(), "right");
    }
}
