//! Command dispatcher with a global cooldown gate.
//!
//! Gesture signals are turned into dispatch attempts in a fixed order:
//! mouth open, both eyes closed, either eyebrow raised, head tilt left, head
//! tilt right. Every true condition makes its own attempt and each attempt
//! checks the cooldown on its own, so within one cooldown window only the
//! first attempt reaches a handler. The rest are dropped, never queued.

use crate::{
    actions::{ActionHandlers, ActionResult},
    command::{spoken, Command, CommandNames, Route},
    config::DispatchConfig,
    gesture_classifier::{GestureSignals, HeadTilt},
    Result,
};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic time for the cooldown gate
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.lock().map(|guard| *guard).unwrap_or_default()
    }
}

/// Remembers the last successful dispatch and enforces the cooldown
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_dispatch: Option<Duration>,
}

impl CooldownGate {
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_dispatch: None,
        }
    }

    /// Configured cooldown
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time of the last successful dispatch, if any
    #[must_use]
    pub const fn last_dispatch(&self) -> Option<Duration> {
        self.last_dispatch
    }

    /// Time left before the gate opens again; zero when open
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.last_dispatch.map_or(Duration::ZERO, |last| {
            self.cooldown.saturating_sub(now.saturating_sub(last))
        })
    }

    /// Claim the gate at `now`; records `now` as the last dispatch on success
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        let open = match self.last_dispatch {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.cooldown,
        };

        if open {
            self.last_dispatch = Some(now);
        }
        open
    }
}

/// Result of one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Passed the gate and reached its handler
    Dispatched {
        command: Command,
        /// Whether the primary handler reported success
        delivered: bool,
    },
    /// Blocked by the cooldown
    Dropped { command: Command, remaining: Duration },
}

impl DispatchOutcome {
    /// Command this attempt was for
    #[must_use]
    pub const fn command(&self) -> Command {
        match self {
            Self::Dispatched { command, .. } | Self::Dropped { command, .. } => *command,
        }
    }

    /// Whether the attempt passed the gate
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

/// Commands whose gesture condition holds, in evaluation order
#[must_use]
pub fn commands_for(signals: &GestureSignals) -> Vec<Command> {
    let mut commands = Vec::with_capacity(Command::ALL.len());

    if signals.mouth_open {
        commands.push(Command::EmergencyAlert);
    }
    if signals.both_eyes_closed() {
        commands.push(Command::ToggleLights);
    }
    if signals.any_eyebrow_raised() {
        commands.push(Command::NextItem);
    }
    match signals.head_tilt {
        HeadTilt::Left => commands.push(Command::ScrollLeft),
        HeadTilt::Right => commands.push(Command::ScrollRight),
        HeadTilt::Center => {}
    }

    commands
}

/// Maps gesture signals to commands and hands them to action handlers
pub struct CommandDispatcher {
    gate: CooldownGate,
    names: CommandNames,
    handlers: ActionHandlers,
    clock: Box<dyn Clock>,
}

impl CommandDispatcher {
    /// Create a dispatcher on the monotonic clock
    #[must_use]
    pub fn new(cooldown: Duration, names: CommandNames, handlers: ActionHandlers) -> Self {
        Self::with_clock(cooldown, names, handlers, Box::new(MonotonicClock::new()))
    }

    /// Create a dispatcher on a caller-supplied clock
    #[must_use]
    pub fn with_clock(
        cooldown: Duration,
        names: CommandNames,
        handlers: ActionHandlers,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            gate: CooldownGate::new(cooldown),
            names,
            handlers,
            clock,
        }
    }

    /// Create a dispatcher from the dispatch section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the cooldown is invalid.
    pub fn from_config(config: &DispatchConfig, handlers: ActionHandlers) -> Result<Self> {
        Ok(Self::new(config.cooldown()?, config.command_names.clone(), handlers))
    }

    /// Cooldown state
    #[must_use]
    pub const fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    /// Make one attempt per active gesture, in evaluation order
    pub fn process(&mut self, signals: &GestureSignals) -> Vec<DispatchOutcome> {
        commands_for(signals)
            .into_iter()
            .map(|command| self.dispatch(command))
            .collect()
    }

    /// Attempt to dispatch a single command now
    pub fn dispatch(&mut self, command: Command) -> DispatchOutcome {
        let now = self.clock.now();

        if !self.gate.try_acquire(now) {
            let remaining = self.gate.remaining(now);
            debug!("Dropping {command}: cooling down for another {remaining:?}");
            return DispatchOutcome::Dropped { command, remaining };
        }

        info!("Dispatching {command}");
        let delivered = self.execute(command);
        DispatchOutcome::Dispatched { command, delivered }
    }

    /// Speak a message, logging any failure
    pub fn announce(&mut self, text: &str) {
        let result = self.handlers.speech.speak(text);
        report("Speech", &result);
    }

    fn execute(&mut self, command: Command) -> bool {
        let name = self.names.name_for(command).to_string();

        match command.route() {
            Route::Sms => {
                let Some(sms) = self.handlers.sms.as_mut() else {
                    warn!("{command} not delivered: no SMS handler configured");
                    return false;
                };
                let result = sms.send_emergency();
                let delivered = report("SMS", &result);
                if delivered {
                    self.announce("Emergency alert sent to your contacts");
                }
                delivered
            }
            Route::Iot => {
                let Some(iot) = self.handlers.iot.as_mut() else {
                    warn!("{command} not delivered: no IoT handler configured");
                    return false;
                };
                let result = iot.send_command(&name);
                let delivered = report("IoT", &result);
                if delivered {
                    self.announce(&format!("Command {} executed", spoken(&name)));
                }
                delivered
            }
            Route::Ui => {
                let result = self.handlers.ui.navigate(&name);
                let delivered = report("UI", &result);
                self.announce(&format!("Navigating {}", spoken(&name)));
                delivered
            }
        }
    }
}

/// Log a failed handler call; true when the call succeeded
fn report(handler: &str, result: &ActionResult) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("{handler} error: {e}");
            false
        }
    }
}
