//! Landmark sets and the face-mesh index layout used by the classifier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single normalized facial landmark
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0.0 at the left edge and 1.0 at the right edge
    pub x: f32,
    /// Vertical position, 0.0 at the top and 1.0 at the bottom
    pub y: f32,
    /// Relative depth (0.0 for 2D sources)
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Create a 3D landmark
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a 2D landmark with zero depth
    #[must_use]
    pub const fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// All landmarks detected on one face in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Wrap an ordered list of landmarks
    #[must_use]
    pub const fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Number of landmarks in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no landmarks at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at a model-defined index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Landmark playing a named role in the layout
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the set is too short for the role's index.
    pub fn role(&self, role: LandmarkRole) -> Result<&Landmark> {
        self.get(role.index()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "landmark set has {} points, {:?} needs index {}",
                self.len(),
                role,
                role.index()
            ))
        })
    }

    /// Absolute vertical distance between two roles
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either index is out of range.
    pub fn vertical_distance(&self, a: LandmarkRole, b: LandmarkRole) -> Result<f32> {
        Ok((self.role(a)?.y - self.role(b)?.y).abs())
    }

    /// Borrow the landmarks in model order
    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/// Gesture-relevant landmark positions in the face-mesh index scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkRole {
    /// Inner upper lip
    MouthUpper,
    /// Inner lower lip
    MouthLower,
    /// Left upper eyelid
    LeftEyeUpper,
    /// Left lower eyelid
    LeftEyeLower,
    /// Right upper eyelid
    RightEyeUpper,
    /// Right lower eyelid
    RightEyeLower,
    /// Left eyebrow, lower edge
    LeftEyebrowLower,
    /// Left eyebrow, upper edge
    LeftEyebrowUpper,
    /// Right eyebrow, lower edge
    RightEyebrowLower,
    /// Right eyebrow, upper edge
    RightEyebrowUpper,
    /// Tip of the nose
    NoseTip,
}

impl LandmarkRole {
    /// Every role the classifier reads
    pub const ALL: [Self; 11] = [
        Self::MouthUpper,
        Self::MouthLower,
        Self::LeftEyeUpper,
        Self::LeftEyeLower,
        Self::RightEyeUpper,
        Self::RightEyeLower,
        Self::LeftEyebrowLower,
        Self::LeftEyebrowUpper,
        Self::RightEyebrowLower,
        Self::RightEyebrowUpper,
        Self::NoseTip,
    ];

    /// Model index for this role
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::MouthUpper => 13,
            Self::MouthLower => 14,
            Self::LeftEyeUpper => 159,
            Self::LeftEyeLower => 145,
            Self::RightEyeUpper => 386,
            Self::RightEyeLower => 374,
            Self::LeftEyebrowLower => 70,
            Self::LeftEyebrowUpper => 63,
            Self::RightEyebrowLower => 300,
            Self::RightEyebrowUpper => 293,
            Self::NoseTip => 4,
        }
    }

    /// Smallest landmark count that covers every role
    #[must_use]
    pub fn required_landmarks() -> usize {
        Self::ALL.iter().map(|role| role.index()).max().unwrap_or(0) + 1
    }
}

/// Check the role table against the number of points a model produces
///
/// # Errors
///
/// Returns `ConfigError` naming the first role whose index the model cannot
/// provide.
pub fn validate_layout(model_landmarks: usize) -> Result<()> {
    for role in LandmarkRole::ALL {
        if role.index() >= model_landmarks {
            return Err(Error::ConfigError(format!(
                "model yields {model_landmarks} landmarks but {role:?} uses index {}",
                role.index()
            )));
        }
    }

    log::debug!("Landmark layout validated against {model_landmarks} model points");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FACE_MESH_LANDMARKS, FACE_MESH_REFINED_LANDMARKS};

    #[test]
    fn test_required_landmarks() {
        assert_eq!(LandmarkRole::required_landmarks(), 387);
    }

    #[test]
    fn test_layout_fits_face_mesh() {
        assert!(validate_layout(FACE_MESH_LANDMARKS).is_ok());
        assert!(validate_layout(FACE_MESH_REFINED_LANDMARKS).is_ok());
    }

    #[test]
    fn test_layout_rejects_68_point_model() {
        match validate_layout(68) {
            Err(Error::ConfigError(msg)) => assert!(msg.contains("68")),
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_vertical_distance_is_absolute() {
        let mut points = vec![Landmark::default(); FACE_MESH_LANDMARKS];
        points[13] = Landmark::planar(0.5, 0.40);
        points[14] = Landmark::planar(0.5, 0.45);
        let set = LandmarkSet::new(points);

        let d = set
            .vertical_distance(LandmarkRole::MouthUpper, LandmarkRole::MouthLower)
            .unwrap();
        assert!((d - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_short_set_is_an_input_error() {
        let set = LandmarkSet::new(vec![Landmark::default(); 10]);
        assert!(matches!(
            set.role(LandmarkRole::MouthUpper),
            Err(Error::InvalidInput(_))
        ));
        assert!(set.role(LandmarkRole::NoseTip).is_ok());
    }
}
