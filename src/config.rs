//! Configuration management for the gesture control application

use crate::{
    command::CommandNames,
    constants::{
        DEFAULT_COOLDOWN_SECS, DEFAULT_EMERGENCY_MESSAGE, DEFAULT_IOT_DEVICE_ID, DEFAULT_MIN_FACE_PRESENCE,
        DEFAULT_SHUTDOWN_MESSAGE, DEFAULT_STARTUP_MESSAGE, FACE_MESH_LANDMARKS,
    },
    gesture_classifier::GestureThresholds,
    landmarks::validate_layout,
    Error, Result,
};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gesture thresholds
    pub gestures: GestureThresholds,

    /// Cooldown and command naming
    pub dispatch: DispatchConfig,

    /// Video input and preview
    pub video: VideoConfig,

    /// Landmark model
    pub model: ModelConfig,

    /// Speech output
    pub speech: SpeechConfig,

    /// Smart-home gateway
    pub iot: IotConfig,

    /// Emergency text messages
    pub sms: SmsConfig,
}

/// Command dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Minimum seconds between two dispatched commands
    pub cooldown_secs: f64,

    /// External name overrides, keyed by command
    pub command_names: CommandNames,
}

/// Video source and preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Webcam index
    pub camera_index: i32,

    /// Video file to read instead of the webcam
    pub video_file: Option<PathBuf>,

    /// Mirror frames horizontally before detection
    pub mirror: bool,

    /// Show the preview window
    pub display: bool,

    /// Pace recorded landmark streams by their timestamps
    pub realtime_replay: bool,
}

/// Landmark model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the face-mesh ONNX model
    pub face_mesh: PathBuf,

    /// Number of landmarks the model produces
    pub landmark_count: usize,

    /// Face-presence probability below which a frame has no face
    pub min_face_presence: f32,
}

/// Speech synthesis backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Write spoken text to the log only
    #[default]
    Log,
    /// Run a local text-to-speech program
    Command,
    /// Azure Cognitive Services text-to-speech
    Azure,
}

/// Speech output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Backend used for speech
    pub backend: SpeechBackend,

    /// Local TTS program (command backend)
    pub program: String,

    /// Arguments placed before the text (command backend)
    pub args: Vec<String>,

    /// Azure region, e.g. "eastus" (azure backend)
    pub region: String,

    /// Azure neural voice name (azure backend)
    pub voice: String,

    /// Audio player reading WAV on stdin (azure backend)
    pub player: Vec<String>,

    /// Spoken once the system is ready
    pub startup_message: String,

    /// Spoken when the frame loop ends
    pub shutdown_message: String,
}

/// Smart-home gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IotConfig {
    /// Gateway URL; no IoT handler when unset
    pub endpoint: Option<String>,

    /// Registered device that receives every command
    pub device_id: String,
}

/// Emergency SMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Gateway URL; no SMS handler when unset
    pub endpoint: Option<String>,

    /// Provisioned sender number
    pub from: String,

    /// Caregiver number
    pub to: String,

    /// Fixed emergency message
    pub message: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            command_names: CommandNames::default(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            video_file: None,
            mirror: true,
            display: true,
            realtime_replay: true,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_mesh: PathBuf::from("assets/face_mesh.onnx"),
            landmark_count: FACE_MESH_LANDMARKS,
            min_face_presence: DEFAULT_MIN_FACE_PRESENCE,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::Log,
            program: "espeak-ng".to_string(),
            args: Vec::new(),
            region: "eastus".to_string(),
            voice: "en-US-JennyNeural".to_string(),
            player: vec!["aplay".to_string(), "-q".to_string()],
            startup_message: DEFAULT_STARTUP_MESSAGE.to_string(),
            shutdown_message: DEFAULT_SHUTDOWN_MESSAGE.to_string(),
        }
    }
}

impl Default for IotConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            device_id: DEFAULT_IOT_DEVICE_ID.to_string(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            from: String::new(),
            to: String::new(),
            message: DEFAULT_EMERGENCY_MESSAGE.to_string(),
        }
    }
}

impl DispatchConfig {
    /// Cooldown as a duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the seconds value is negative or not finite.
    pub fn cooldown(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.cooldown_secs)
            .map_err(|e| Error::ConfigError(format!("Invalid cooldown {}: {e}", self.cooldown_secs)))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text does not parse.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.gestures.validate()?;
        self.dispatch.cooldown()?;
        self.dispatch.command_names.validate()?;

        validate_layout(self.model.landmark_count)?;
        if !(0.0..=1.0).contains(&self.model.min_face_presence) {
            return Err(Error::ConfigError(
                "Minimum face presence must be between 0.0 and 1.0".to_string(),
            ));
        }

        match self.speech.backend {
            SpeechBackend::Log => {}
            SpeechBackend::Command => {
                if self.speech.program.trim().is_empty() {
                    return Err(Error::ConfigError("Speech program must not be empty".to_string()));
                }
            }
            SpeechBackend::Azure => {
                if self.speech.region.trim().is_empty() {
                    return Err(Error::ConfigError("Azure speech region must not be empty".to_string()));
                }
                if self.speech.player.is_empty() {
                    return Err(Error::ConfigError("Azure speech needs an audio player command".to_string()));
                }
            }
        }

        if self.iot.endpoint.is_some() && self.iot.device_id.trim().is_empty() {
            return Err(Error::ConfigError("IoT device id must not be empty".to_string()));
        }

        if self.sms.endpoint.is_some() {
            if self.sms.from.trim().is_empty() || self.sms.to.trim().is_empty() {
                return Err(Error::ConfigError(
                    "SMS sender and recipient numbers are required when SMS is enabled".to_string(),
                ));
            }
            if self.sms.message.trim().is_empty() {
                return Err(Error::ConfigError("Emergency message must not be empty".to_string()));
            }
        }

        Ok(())
    }
}

/// Service credentials read from the environment
#[derive(Debug, Default)]
pub struct Credentials {
    /// Azure speech subscription key (`SPEECH_KEY`)
    pub speech_key: Option<SecretBox<String>>,
    /// Bearer token for the IoT gateway (`IOT_TOKEN`)
    pub iot_token: Option<SecretBox<String>>,
    /// Bearer token for the SMS gateway (`SMS_TOKEN`)
    pub sms_token: Option<SecretBox<String>>,
}

impl Credentials {
    /// Load credentials, reading a `.env` file first when present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            speech_key: Self::load_secret("SPEECH_KEY"),
            iot_token: Self::load_secret("IOT_TOKEN"),
            sms_token: Self::load_secret("SMS_TOKEN"),
        }
    }

    fn load_secret(var: &str) -> Option<SecretBox<String>> {
        env::var(var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretBox::new(Box::new(value)))
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gesture Assist Configuration

# Gesture thresholds (normalized landmark distances)
gestures:
  mouth_open: 0.03
  eye_closed: 0.7
  eyebrow_raise: 0.15

# Command dispatch
dispatch:
  cooldown_secs: 2.0
  command_names:
    TOGGLE_LIGHTS: LIGHTS_TOGGLE
    NEXT_ITEM: SELECT_NEXT
    SCROLL_LEFT: SCROLL_LEFT
    SCROLL_RIGHT: SCROLL_RIGHT

# Video input
video:
  camera_index: 0
  mirror: true
  display: true
  realtime_replay: true

# Face-mesh model
model:
  face_mesh: "assets/face_mesh.onnx"
  landmark_count: 468
  min_face_presence: 0.5

# Speech output: log, command or azure (azure reads SPEECH_KEY)
speech:
  backend: log
  program: "espeak-ng"
  args: []
  region: "eastus"
  voice: "en-US-JennyNeural"
  player: ["aplay", "-q"]
  startup_message: "Gesture control initialized. Ready for commands."
  shutdown_message: "Gesture control shutting down"

# Smart-home gateway (reads IOT_TOKEN)
iot:
  endpoint: null
  device_id: "gesture_assist_device"

# Emergency SMS gateway (reads SMS_TOKEN)
sms:
  endpoint: null
  from: ""
  to: ""
  message: "URGENT: gesture-assist user needs immediate assistance!"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn test_example_config_parses_and_validates() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.dispatch.cooldown().unwrap(), Duration::from_secs(2));
        assert_eq!(config.dispatch.command_names.name_for(Command::NextItem), "SELECT_NEXT");
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("dispatch:\n  cooldown_secs: 0.5\n").unwrap();
        assert_eq!(config.dispatch.cooldown().unwrap(), Duration::from_millis(500));
        assert_eq!(config.gestures, GestureThresholds::default());
        assert_eq!(config.speech.backend, SpeechBackend::Log);
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut config = Config::default();
        config.dispatch.cooldown_secs = -1.0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_sms_requires_numbers() {
        let mut config = Config::default();
        config.sms.endpoint = Some("https://sms.example.test/send".to_string());
        assert!(config.validate().is_err());

        config.sms.from = "+15550100".to_string();
        config.sms.to = "+15550199".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_model_rejected() {
        let mut config = Config::default();
        config.model.landmark_count = 68;
        assert!(config.validate().is_err());
    }
}
