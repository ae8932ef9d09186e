//! Facial gesture control for assistive technology.
//!
//! This library turns facial landmarks into commands:
//! - A face-mesh model (external, ONNX Runtime behind the `camera` feature)
//!   yields normalized landmarks per frame
//! - The gesture classifier thresholds a few landmark distances into gesture
//!   signals (mouth open, eyes closed, eyebrow raise, head tilt)
//! - The command dispatcher maps signals to commands behind a global cooldown
//!   and hands them to speech, smart-home, SMS and UI handlers
//!
//! # Examples
//!
//! ## Classify and dispatch one face
//!
//! ```
//! use gesture_assist::{
//!     actions::ActionHandlers,
//!     command::CommandNames,
//!     dispatcher::CommandDispatcher,
//!     gesture_classifier::GestureClassifier,
//!     landmarks::{Landmark, LandmarkSet},
//! };
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut points = vec![Landmark::planar(0.5, 0.5); 468];
//! points[14] = Landmark::planar(0.5, 0.56); // lower lip well below the upper lip
//!
//! let classifier = GestureClassifier::default();
//! let signals = classifier.classify(&LandmarkSet::new(points))?;
//! assert!(signals.mouth_open);
//!
//! let mut dispatcher = CommandDispatcher::new(
//!     Duration::from_secs(2),
//!     CommandNames::default(),
//!     ActionHandlers::logging(),
//! );
//! let outcomes = dispatcher.process(&signals);
//! assert!(outcomes[0].is_dispatched());
//! # Ok(())
//! # }
//! ```
//!
//! ## Replay a recording
//!
//! ```no_run
//! use gesture_assist::{
//!     actions::ActionHandlers,
//!     app::{Announcements, GestureApp, HeadlessView},
//!     config::Config,
//!     dispatcher::CommandDispatcher,
//!     gesture_classifier::GestureClassifier,
//!     replay::{PrecomputedLandmarks, ReplaySource},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let source = ReplaySource::open("session.jsonl", true)?;
//! let model = PrecomputedLandmarks::new(config.model.landmark_count);
//! let dispatcher = CommandDispatcher::from_config(&config.dispatch, ActionHandlers::logging())?;
//!
//! let mut app = GestureApp::new(
//!     source,
//!     model,
//!     HeadlessView,
//!     GestureClassifier::new(config.gestures),
//!     dispatcher,
//!     Announcements::default(),
//! )?;
//! let stats = app.run()?;
//! println!("{} commands dispatched", stats.dispatched);
//! # Ok(())
//! # }
//! ```

/// Normalized landmarks and the index layout
pub mod landmarks;

/// Landmark thresholds to gesture signals
pub mod gesture_classifier;

/// Command enumeration and external names
pub mod command;

/// Cooldown-gated command dispatch
pub mod dispatcher;

/// Speech, smart-home, SMS and UI handlers
pub mod actions;

/// Frame loop and its boundary traits
pub mod app;

/// Overlay labels for active gestures
pub mod feedback;

/// Recorded landmark streams
pub mod replay;

/// Webcam capture, face-mesh inference and preview
#[cfg(feature = "camera")]
pub mod camera;

/// Command-line arguments
pub mod cli;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
