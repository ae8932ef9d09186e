//! Main application module: the per-frame perception and dispatch loop.

use crate::{
    config::SpeechConfig,
    constants::{DEFAULT_SHUTDOWN_MESSAGE, DEFAULT_STARTUP_MESSAGE},
    dispatcher::{CommandDispatcher, DispatchOutcome},
    feedback,
    gesture_classifier::{GestureClassifier, GestureSignals},
    landmarks::{validate_layout, LandmarkSet},
    Result,
};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

/// Source of video frames
pub trait FrameSource {
    type Frame;

    /// Next frame, or `None` once the stream has ended
    ///
    /// # Errors
    ///
    /// A read failure ends the loop the same way end of stream does.
    fn read(&mut self) -> Result<Option<Self::Frame>>;
}

/// External facial-landmark model
pub trait LandmarkModel<F> {
    /// Number of landmarks the model yields per face
    fn expected_landmarks(&self) -> usize;

    /// Landmarks of the first face in the frame, or `None` when no face is seen
    ///
    /// # Errors
    ///
    /// Returns an error when inference itself fails.
    fn detect(&mut self, frame: &F) -> Result<Option<LandmarkSet>>;
}

/// Whether the loop should keep going after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Visual feedback and the user's stop signal
pub trait FrameView<F> {
    /// Present a processed frame
    ///
    /// # Errors
    ///
    /// Returns an error when the display fails.
    fn show(&mut self, frame: &F, signals: Option<&GestureSignals>) -> Result<LoopControl>;
}

/// View for headless runs; logs feedback labels and never asks to quit
#[derive(Debug, Default)]
pub struct HeadlessView;

impl<F> FrameView<F> for HeadlessView {
    fn show(&mut self, _frame: &F, signals: Option<&GestureSignals>) -> Result<LoopControl> {
        if let Some(signals) = signals {
            for label in feedback::labels(signals) {
                debug!("Feedback: {}", label.text);
            }
        }
        Ok(LoopControl::Continue)
    }
}

/// Messages spoken around the frame loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcements {
    pub startup: String,
    pub shutdown: String,
}

impl Default for Announcements {
    fn default() -> Self {
        Self {
            startup: DEFAULT_STARTUP_MESSAGE.to_string(),
            shutdown: DEFAULT_SHUTDOWN_MESSAGE.to_string(),
        }
    }
}

impl From<&SpeechConfig> for Announcements {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            startup: config.startup_message.clone(),
            shutdown: config.shutdown_message.clone(),
        }
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames read from the source
    pub frames: u64,
    /// Frames in which a face was found
    pub faces: u64,
    /// Attempts that passed the cooldown gate
    pub dispatched: u64,
    /// Attempts dropped by the cooldown gate
    pub dropped: u64,
}

/// Result of processing one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameResult {
    /// Signals for the frame; `None` when no face was detected
    pub signals: Option<GestureSignals>,
    /// Dispatch attempts made for the frame
    pub outcomes: Vec<DispatchOutcome>,
}

/// Gesture control application
pub struct GestureApp<S, M, V>
where
    S: FrameSource,
    M: LandmarkModel<S::Frame>,
    V: FrameView<S::Frame>,
{
    source: S,
    model: M,
    view: V,
    classifier: GestureClassifier,
    dispatcher: CommandDispatcher,
    announcements: Announcements,
    stats: RunStats,
}

impl<S, M, V> GestureApp<S, M, V>
where
    S: FrameSource,
    M: LandmarkModel<S::Frame>,
    V: FrameView<S::Frame>,
{
    /// Create the application and announce readiness
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the model cannot supply every landmark the
    /// classifier reads.
    pub fn new(
        source: S,
        model: M,
        view: V,
        classifier: GestureClassifier,
        dispatcher: CommandDispatcher,
        announcements: Announcements,
    ) -> Result<Self> {
        info!("Initializing gesture control application");
        validate_layout(model.expected_landmarks())?;

        let mut app = Self {
            source,
            model,
            view,
            classifier,
            dispatcher,
            announcements,
            stats: RunStats::default(),
        };

        app.dispatcher.announce(&app.announcements.startup);

        Ok(app)
    }

    /// Counters so far
    #[must_use]
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Run until the stream ends, a read fails or the view asks to quit
    ///
    /// # Errors
    ///
    /// Returns an error only if the view fails; source and model failures are
    /// logged and handled in the loop.
    pub fn run(&mut self) -> Result<RunStats> {
        info!("Starting main application loop");

        let start_time = Instant::now();
        let mut last_report = Instant::now();

        let outcome = loop {
            let frame = match self.source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("End of video stream reached");
                    break Ok(());
                }
                Err(e) => {
                    error!("Failed to read frame: {e}");
                    break Ok(());
                }
            };

            let result = self.process_frame(&frame);

            match self.view.show(&frame, result.signals.as_ref()) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Quit) => {
                    info!("Exit requested by user");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }

            if last_report.elapsed() >= Duration::from_secs(5) {
                #[allow(clippy::cast_precision_loss)]
                let fps = self.stats.frames as f64 / start_time.elapsed().as_secs_f64();
                debug!("Processing at {fps:.1} FPS");
                last_report = Instant::now();
            }
        };

        info!(
            "Application shutting down after {} frames ({} with a face, {} commands dispatched, {} dropped)",
            self.stats.frames, self.stats.faces, self.stats.dispatched, self.stats.dropped
        );
        self.dispatcher.announce(&self.announcements.shutdown);

        outcome.map(|()| self.stats)
    }

    /// Classify and dispatch a single frame
    pub fn process_frame(&mut self, frame: &S::Frame) -> FrameResult {
        self.stats.frames += 1;

        let landmarks = match self.model.detect(frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("Landmark detection failed, skipping frame: {e}");
                None
            }
        };

        let signals = match self.classifier.classify_frame(landmarks.as_ref()) {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Classification failed, skipping frame: {e}");
                None
            }
        };

        let Some(signals) = signals else {
            return FrameResult::default();
        };
        self.stats.faces += 1;

        let outcomes = self.dispatcher.process(&signals);
        for outcome in &outcomes {
            if outcome.is_dispatched() {
                self.stats.dispatched += 1;
            } else {
                self.stats.dropped += 1;
            }
        }

        FrameResult {
            signals: Some(signals),
            outcomes,
        }
    }
}
