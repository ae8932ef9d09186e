//! Recorded landmark streams for headless runs.
//!
//! A recording is a JSON-lines file, one frame per line:
//!
//! ```text
//! {"t": 0.00, "landmarks": [[0.51, 0.43, -0.02], [0.50, 0.47], ...]}
//! {"t": 0.03, "landmarks": null}
//! ```
//!
//! `t` is optional and counts seconds from the start of the recording; a
//! `null` (or missing) landmark list means no face was detected.
//!
//! [`ReplaySource::clock`] hands out a [`ReplayClock`] that follows the
//! recorded timestamps, so the dispatcher cooldown sees the recorded session
//! whether or not playback is paced.

use crate::{
    app::{FrameSource, LandmarkModel},
    dispatcher::Clock,
    landmarks::{Landmark, LandmarkSet},
    Error, Result,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    landmarks: Option<Vec<Vec<f32>>>,
}

/// One frame from a recording
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    /// Offset from the start of the recording
    pub timestamp: Option<Duration>,
    /// Detected face, if any
    pub landmarks: Option<LandmarkSet>,
}

/// Parse a single recorded line
///
/// # Errors
///
/// Returns `Json` for malformed lines and `InvalidInput` for points that are
/// not 2 or 3 coordinates or timestamps that are negative.
pub fn parse_frame(line: &str) -> Result<ReplayFrame> {
    let recorded: RecordedFrame = serde_json::from_str(line)?;

    let timestamp = recorded
        .t
        .map(|t| {
            Duration::try_from_secs_f64(t).map_err(|e| Error::InvalidInput(format!("Invalid frame time {t}: {e}")))
        })
        .transpose()?;

    let landmarks = recorded
        .landmarks
        .map(|points| {
            points
                .iter()
                .map(|p| match p.as_slice() {
                    [x, y] => Ok(Landmark::planar(*x, *y)),
                    [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
                    other => Err(Error::InvalidInput(format!(
                        "Landmark must have 2 or 3 coordinates, got {}",
                        other.len()
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(LandmarkSet::new)
        })
        .transpose()?;

    Ok(ReplayFrame { timestamp, landmarks })
}

#[derive(Debug, Clone, Copy)]
struct ClockState {
    /// Last recorded timestamp seen
    recorded: Duration,
    /// When that timestamp was seen
    anchor: Instant,
    /// Whether the current frame carried its own timestamp
    timed: bool,
}

/// Clock driven by recorded frame timestamps
///
/// Reads the current frame's `t` when it has one. Frames without `t` run on
/// wall time from the last recorded timestamp (from zero before any).
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ReplayClock {
    state: Arc<Mutex<ClockState>>,
}

impl ReplayClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                recorded: Duration::ZERO,
                anchor: Instant::now(),
                timed: false,
            })),
        }
    }

    /// Advance to the frame being emitted
    pub fn mark(&self, timestamp: Option<Duration>) {
        if let Ok(mut state) = self.state.lock() {
            match timestamp {
                Some(t) => {
                    state.recorded = t;
                    state.anchor = Instant::now();
                    state.timed = true;
                }
                None => state.timed = false,
            }
        }
    }
}

impl Default for ReplayClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> Duration {
        self.state
            .lock()
            .map(|state| {
                if state.timed {
                    state.recorded
                } else {
                    state.recorded + state.anchor.elapsed()
                }
            })
            .unwrap_or_default()
    }
}

/// Frame source reading a JSON-lines recording
pub struct ReplaySource<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
    realtime: bool,
    /// Wall time and recorded time of the first timed frame
    origin: Option<(Instant, Duration)>,
    clock: ReplayClock,
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, realtime: bool) -> Result<Self> {
        log::info!("Replaying landmarks from {}", path.as_ref().display());
        Ok(Self::from_reader(BufReader::new(File::open(path)?), realtime))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Read a recording from any buffered reader
    pub fn from_reader(reader: R, realtime: bool) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            realtime,
            origin: None,
            clock: ReplayClock::new(),
        }
    }

    /// Clock following this recording, for the dispatcher
    #[must_use]
    pub fn clock(&self) -> ReplayClock {
        self.clock.clone()
    }

    /// Sleep until `timestamp` is due, counting from the first timed frame
    fn pace(&mut self, timestamp: Option<Duration>) {
        if !self.realtime {
            return;
        }
        let Some(t) = timestamp else {
            return;
        };
        let (started, first) = *self.origin.get_or_insert_with(|| (Instant::now(), t));
        let offset = t.saturating_sub(first);
        let elapsed = started.elapsed();
        if offset > elapsed {
            std::thread::sleep(offset - elapsed);
        }
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    type Frame = ReplayFrame;

    fn read(&mut self) -> Result<Option<ReplayFrame>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let line_number = self.line_number;
            let frame = parse_frame(trimmed)
                .map_err(|e| Error::InvalidInput(format!("Recording line {line_number}: {e}")))?;
            self.pace(frame.timestamp);
            self.clock.mark(frame.timestamp);
            return Ok(Some(frame));
        }
    }
}

/// Pass-through model for frames that already carry landmarks
#[derive(Debug, Clone, Copy)]
pub struct PrecomputedLandmarks {
    landmark_count: usize,
}

impl PrecomputedLandmarks {
    /// `landmark_count` is the size every recorded face must have
    #[must_use]
    pub const fn new(landmark_count: usize) -> Self {
        Self { landmark_count }
    }
}

impl LandmarkModel<ReplayFrame> for PrecomputedLandmarks {
    fn expected_landmarks(&self) -> usize {
        self.landmark_count
    }

    fn detect(&mut self, frame: &ReplayFrame) -> Result<Option<LandmarkSet>> {
        match &frame.landmarks {
            Some(set) if set.len() != self.landmark_count => Err(Error::ModelValidationError(format!(
                "Recorded face has {} landmarks, expected {}",
                set.len(),
                self.landmark_count
            ))),
            other => Ok(other.clone()),
        }
    }
}
