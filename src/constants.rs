//! Constants used throughout the application

/// Landmarks produced by the face-mesh model without iris refinement
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Landmarks produced by the face-mesh model with iris refinement
pub const FACE_MESH_REFINED_LANDMARKS: usize = 478;

/// Nose-tip x below this value means the head is tilted left
pub const HEAD_TILT_LEFT_BOUND: f32 = 0.4;

/// Nose-tip x above this value means the head is tilted right
pub const HEAD_TILT_RIGHT_BOUND: f32 = 0.6;

/// Default gesture thresholds
pub const DEFAULT_MOUTH_OPEN_THRESHOLD: f32 = 0.03;
pub const DEFAULT_EYE_CLOSED_THRESHOLD: f32 = 0.7;
pub const DEFAULT_EYEBROW_RAISE_THRESHOLD: f32 = 0.15;

/// Default minimum time between two dispatched commands, in seconds
pub const DEFAULT_COOLDOWN_SECS: f64 = 2.0;

/// Face-mesh model square input size in pixels
pub const FACE_MESH_INPUT_SIZE: i32 = 192;

/// Default minimum face-presence probability
pub const DEFAULT_MIN_FACE_PRESENCE: f32 = 0.5;

/// Default device identity for smart-home commands
pub const DEFAULT_IOT_DEVICE_ID: &str = "gesture_assist_device";

/// Default emergency text message
pub const DEFAULT_EMERGENCY_MESSAGE: &str = "URGENT: gesture-assist user needs immediate assistance!";

/// Spoken on startup and shutdown
pub const DEFAULT_STARTUP_MESSAGE: &str = "Gesture control initialized. Ready for commands.";
pub const DEFAULT_SHUTDOWN_MESSAGE: &str = "Gesture control shutting down";

/// Timeout applied to every outbound HTTP request, in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Vertical spacing between feedback labels in the preview window, in pixels
pub const FEEDBACK_ROW_SPACING: i32 = 50;
