//! Helper functions and utilities for tests

#![allow(dead_code)]

use gesture_assist::{
    actions::{ActionError, ActionHandlers, ActionResult, IotHandler, SmsHandler, SpeechHandler, UiHandler},
    constants::FACE_MESH_LANDMARKS,
    landmarks::{Landmark, LandmarkRole, LandmarkSet},
};
use std::sync::{Arc, Mutex};

/// Eyelid gap that no sane `eye_closed` threshold calls closed
pub const WIDE_OPEN_EYE: f32 = 0.9;

/// Builder for face-mesh landmark sets with controlled gesture distances
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    points: Vec<Landmark>,
}

impl FaceBuilder {
    /// Neutral face: mouth closed, eyes wide open, brows down, nose centered
    pub fn neutral() -> Self {
        let mut builder = Self {
            points: vec![Landmark::planar(0.5, 0.5); FACE_MESH_LANDMARKS],
        };
        builder = builder.left_eye_gap(WIDE_OPEN_EYE).right_eye_gap(WIDE_OPEN_EYE);
        builder
    }

    fn gap(mut self, upper: LandmarkRole, lower: LandmarkRole, distance: f32) -> Self {
        self.points[upper.index()].y = 0.0;
        self.points[lower.index()].y = distance;
        self
    }

    pub fn mouth_gap(self, distance: f32) -> Self {
        self.gap(LandmarkRole::MouthUpper, LandmarkRole::MouthLower, distance)
    }

    pub fn left_eye_gap(self, distance: f32) -> Self {
        self.gap(LandmarkRole::LeftEyeUpper, LandmarkRole::LeftEyeLower, distance)
    }

    pub fn right_eye_gap(self, distance: f32) -> Self {
        self.gap(LandmarkRole::RightEyeUpper, LandmarkRole::RightEyeLower, distance)
    }

    pub fn eyes_gap(self, distance: f32) -> Self {
        self.left_eye_gap(distance).right_eye_gap(distance)
    }

    pub fn left_brow_gap(self, distance: f32) -> Self {
        self.gap(LandmarkRole::LeftEyebrowUpper, LandmarkRole::LeftEyebrowLower, distance)
    }

    pub fn right_brow_gap(self, distance: f32) -> Self {
        self.gap(LandmarkRole::RightEyebrowUpper, LandmarkRole::RightEyebrowLower, distance)
    }

    pub fn nose_x(mut self, x: f32) -> Self {
        self.points[LandmarkRole::NoseTip.index()].x = x;
        self
    }

    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points)
    }

    pub fn points(self) -> Vec<Landmark> {
        self.points
    }
}

/// Calls seen by the recording handlers, in order
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Handler that records every call and optionally fails
pub struct RecordingHandler {
    log: CallLog,
    fail: bool,
}

impl RecordingHandler {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: true,
        }
    }

    fn record(&self, call: String) -> ActionResult {
        self.log.push(call);
        if self.fail {
            Err(ActionError::Other("simulated failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SpeechHandler for RecordingHandler {
    fn speak(&mut self, text: &str) -> ActionResult {
        self.record(format!("speak:{text}"))
    }
}

impl IotHandler for RecordingHandler {
    fn send_command(&mut self, command: &str) -> ActionResult {
        self.record(format!("iot:{command}"))
    }
}

impl SmsHandler for RecordingHandler {
    fn send_emergency(&mut self) -> ActionResult {
        self.record("sms".to_string())
    }
}

impl UiHandler for RecordingHandler {
    fn navigate(&mut self, command: &str) -> ActionResult {
        self.record(format!("ui:{command}"))
    }
}

/// All four handlers recording into one log
pub fn recording_handlers(log: &CallLog) -> ActionHandlers {
    ActionHandlers {
        speech: Box::new(RecordingHandler::new(log)),
        iot: Some(Box::new(RecordingHandler::new(log))),
        sms: Some(Box::new(RecordingHandler::new(log))),
        ui: Box::new(RecordingHandler::new(log)),
    }
}

/// Recording handlers whose SMS call always fails
pub fn failing_sms_handlers(log: &CallLog) -> ActionHandlers {
    ActionHandlers {
        sms: Some(Box::new(RecordingHandler::failing(log))),
        ..recording_handlers(log)
    }
}
