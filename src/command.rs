//! Commands issued by gestures and the external names they are sent under.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Symbolic command triggered by a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Text the caregiver
    EmergencyAlert,
    /// Flip the smart-home lights
    ToggleLights,
    /// Select the next UI item
    NextItem,
    /// Scroll the UI left
    ScrollLeft,
    /// Scroll the UI right
    ScrollRight,
}

/// Which external handler carries out a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Sms,
    Iot,
    Ui,
}

impl Command {
    /// Every command, in dispatch evaluation order
    pub const ALL: [Self; 5] = [
        Self::EmergencyAlert,
        Self::ToggleLights,
        Self::NextItem,
        Self::ScrollLeft,
        Self::ScrollRight,
    ];

    /// Canonical upper-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmergencyAlert => "EMERGENCY_ALERT",
            Self::ToggleLights => "TOGGLE_LIGHTS",
            Self::NextItem => "NEXT_ITEM",
            Self::ScrollLeft => "SCROLL_LEFT",
            Self::ScrollRight => "SCROLL_RIGHT",
        }
    }

    /// Handler responsible for this command
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::EmergencyAlert => Route::Sms,
            Self::ToggleLights => Route::Iot,
            Self::NextItem | Self::ScrollLeft | Self::ScrollRight => Route::Ui,
        }
    }

    /// Name sent to the handler when no override is configured
    #[must_use]
    pub const fn default_external_name(self) -> &'static str {
        match self {
            Self::EmergencyAlert => "EMERGENCY_ALERT",
            Self::ToggleLights => "LIGHTS_TOGGLE",
            Self::NextItem => "SELECT_NEXT",
            Self::ScrollLeft => "SCROLL_LEFT",
            Self::ScrollRight => "SCROLL_RIGHT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown command: {s}")))
    }
}

/// Per-command overrides of the external command name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandNames {
    overrides: BTreeMap<Command, String>,
}

impl CommandNames {
    /// Build from explicit overrides
    #[must_use]
    pub fn new(overrides: BTreeMap<Command, String>) -> Self {
        Self { overrides }
    }

    /// External name for a command
    #[must_use]
    pub fn name_for(&self, command: Command) -> &str {
        self.overrides
            .get(&command)
            .map_or_else(|| command.default_external_name(), String::as_str)
    }

    /// Reject blank overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for the first command mapped to an empty name.
    pub fn validate(&self) -> Result<()> {
        if let Some((command, _)) = self.overrides.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(Error::ConfigError(format!("Command name for {command} must not be empty")));
        }
        Ok(())
    }
}

/// Turn an external command name into speakable text
#[must_use]
pub fn spoken(name: &str) -> String {
    name.replace('_', " ")
}
