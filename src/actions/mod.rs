//! External action handlers reached by dispatched commands.
//!
//! Each handler reports its outcome as an [`ActionResult`]; the dispatcher
//! logs failures and carries on, so nothing here may bring the frame loop
//! down.

pub mod gateway;
pub mod speech;

use crate::{
    config::{Config, Credentials, SpeechBackend},
    constants::HTTP_TIMEOUT_SECS,
    Error, Result,
};
use log::info;
use std::time::Duration;
use thiserror::Error;

pub use gateway::{HttpIotGateway, HttpSmsGateway};
pub use speech::{AzureSpeech, CommandSpeech, LogSpeech};

/// Failure of a single handler invocation
#[derive(Error, Debug)]
pub enum ActionError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Local helper program failed
    #[error("Process error: {0}")]
    Process(String),

    /// Pipe or file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other handler failure
    #[error("{0}")]
    Other(String),
}

/// Outcome of one handler invocation
pub type ActionResult = std::result::Result<(), ActionError>;

/// Text-to-speech output
pub trait SpeechHandler {
    /// Synthesize and play `text`, blocking until playback ends
    fn speak(&mut self, text: &str) -> ActionResult;
}

/// Smart-home command delivery to one registered device
pub trait IotHandler {
    /// Deliver a command name to the device
    fn send_command(&mut self, command: &str) -> ActionResult;
}

/// Emergency text message to the caregiver
pub trait SmsHandler {
    /// Send the fixed emergency message
    fn send_emergency(&mut self) -> ActionResult;
}

/// UI navigation hook
pub trait UiHandler {
    /// Perform a navigation command
    fn navigate(&mut self, command: &str) -> ActionResult;
}

/// UI handler that only records navigation in the log
#[derive(Debug, Default)]
pub struct LogUi;

impl UiHandler for LogUi {
    fn navigate(&mut self, command: &str) -> ActionResult {
        info!("UI command: {command}");
        Ok(())
    }
}

/// Every handler the dispatcher may call
pub struct ActionHandlers {
    pub speech: Box<dyn SpeechHandler>,
    pub iot: Option<Box<dyn IotHandler>>,
    pub sms: Option<Box<dyn SmsHandler>>,
    pub ui: Box<dyn UiHandler>,
}

impl ActionHandlers {
    /// Log-only speech and UI, no IoT or SMS
    #[must_use]
    pub fn logging() -> Self {
        Self {
            speech: Box::new(LogSpeech),
            iot: None,
            sms: None,
            ui: Box::new(LogUi),
        }
    }
}

impl Default for ActionHandlers {
    fn default() -> Self {
        Self::logging()
    }
}

/// Build the HTTP client shared by the network handlers
///
/// # Errors
///
/// Returns `ServiceInit` if the client cannot be created.
pub fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::ServiceInit(format!("Failed to create HTTP client: {e}")))
}

/// Construct the handlers described by the configuration
///
/// # Errors
///
/// Returns `ServiceInit` if a configured service is missing credentials or
/// cannot be set up. Startup must abort in that case.
pub fn build_handlers(config: &Config, credentials: Credentials) -> Result<ActionHandlers> {
    let Credentials {
        speech_key,
        iot_token,
        sms_token,
    } = credentials;

    let speech: Box<dyn SpeechHandler> = match config.speech.backend {
        SpeechBackend::Log => Box::new(LogSpeech),
        SpeechBackend::Command => Box::new(CommandSpeech::new(&config.speech.program, config.speech.args.clone())),
        SpeechBackend::Azure => {
            let key = speech_key
                .ok_or_else(|| Error::ServiceInit("Azure speech needs the SPEECH_KEY variable".to_string()))?;
            Box::new(AzureSpeech::new(http_client()?, &config.speech, key)?)
        }
    };
    info!("Speech backend: {:?}", config.speech.backend);

    let iot: Option<Box<dyn IotHandler>> = match &config.iot.endpoint {
        Some(endpoint) => {
            info!("IoT gateway enabled for device {}", config.iot.device_id);
            Some(Box::new(HttpIotGateway::new(
                http_client()?,
                endpoint,
                &config.iot.device_id,
                iot_token,
            )?))
        }
        None => None,
    };

    let sms: Option<Box<dyn SmsHandler>> = match &config.sms.endpoint {
        Some(endpoint) => {
            info!("SMS gateway enabled");
            Some(Box::new(HttpSmsGateway::new(http_client()?, endpoint, &config.sms, sms_token)?))
        }
        None => None,
    };

    Ok(ActionHandlers {
        speech,
        iot,
        sms,
        ui: Box::new(LogUi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_handlers_never_fail() {
        let mut handlers = ActionHandlers::logging();
        assert!(handlers.speech.speak("hello").is_ok());
        assert!(handlers.ui.navigate("SCROLL_LEFT").is_ok());
        assert!(handlers.iot.is_none());
        assert!(handlers.sms.is_none());
    }

    #[test]
    fn test_azure_without_key_is_fatal() {
        let mut config = Config::default();
        config.speech.backend = SpeechBackend::Azure;
        let result = build_handlers(&config, Credentials::default());
        assert!(matches!(result, Err(Error::ServiceInit(_))));
    }

    #[test]
    fn test_default_config_builds_log_handlers() {
        let handlers = build_handlers(&Config::default(), Credentials::default()).unwrap();
        assert!(handlers.iot.is_none());
        assert!(handlers.sms.is_none());
    }

    #[test]
    fn test_bad_gateway_url_is_fatal() {
        let mut config = Config::default();
        config.iot.endpoint = Some("not a url".to_string());
        assert!(matches!(
            build_handlers(&config, Credentials::default()),
            Err(Error::ServiceInit(_))
        ));
    }
}
