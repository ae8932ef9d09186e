//! Speech output backends.

use super::{ActionError, ActionResult, SpeechHandler};
use crate::{config::SpeechConfig, Error, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretBox};
use std::io::Write;
use std::process::{Command, Stdio};

/// Output format requested from Azure; plain WAV so any player can read it
const AZURE_OUTPUT_FORMAT: &str = "riff-16khz-16bit-mono-pcm";

/// Speech that only writes the text to the log
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechHandler for LogSpeech {
    fn speak(&mut self, text: &str) -> ActionResult {
        info!("Speech: {text}");
        Ok(())
    }
}

/// Speech through a local TTS program such as `espeak-ng` or `say`
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    /// The text is passed as the last argument after `args`
    #[must_use]
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }
}

impl SpeechHandler for CommandSpeech {
    fn speak(&mut self, text: &str) -> ActionResult {
        debug!("Speaking via {}: {text}", self.program);

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| ActionError::Process(format!("Failed to run {}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(ActionError::Process(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Azure Cognitive Services text-to-speech played through a local player
pub struct AzureSpeech {
    client: Client,
    endpoint: reqwest::Url,
    key: SecretBox<String>,
    voice: String,
    player: Vec<String>,
}

impl AzureSpeech {
    /// Create the backend for the configured region and voice
    ///
    /// # Errors
    ///
    /// Returns `ServiceInit` if the region does not form a valid endpoint or
    /// no player command is configured.
    pub fn new(client: Client, config: &SpeechConfig, key: SecretBox<String>) -> Result<Self> {
        let endpoint = reqwest::Url::parse(&format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            config.region.trim()
        ))
        .map_err(|e| Error::ServiceInit(format!("Invalid Azure speech region {}: {e}", config.region)))?;

        if config.player.is_empty() {
            return Err(Error::ServiceInit("Azure speech needs an audio player command".to_string()));
        }

        info!("Azure speech endpoint: {endpoint}");

        Ok(Self {
            client,
            endpoint,
            key,
            voice: config.voice.clone(),
            player: config.player.clone(),
        })
    }

    /// Fetch synthesized WAV audio for `text`
    ///
    /// # Errors
    ///
    /// Returns `Request` or `Api` when the service call fails.
    pub fn synthesize(&self, text: &str) -> std::result::Result<Vec<u8>, ActionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Ocp-Apim-Subscription-Key", self.key.expose_secret().as_str())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)
            .header("User-Agent", env!("CARGO_PKG_NAME"))
            .body(ssml(&self.voice, text))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ActionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl SpeechHandler for AzureSpeech {
    fn speak(&mut self, text: &str) -> ActionResult {
        let audio = self.synthesize(text)?;
        debug!("Synthesized {} bytes of audio", audio.len());
        play_through(&self.player, &audio)
    }
}

/// Pipe audio into a player command and wait for it to finish
fn play_through(player: &[String], audio: &[u8]) -> ActionResult {
    let (program, args) = player
        .split_first()
        .ok_or_else(|| ActionError::Process("No audio player configured".to_string()))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| ActionError::Process(format!("Failed to run {program}: {e}")))?;

    // stdin is closed at the end of the closure so the player sees EOF
    let written = child.stdin.take().map_or(Ok(()), |mut stdin| stdin.write_all(audio));

    // Reap the player even when it stopped reading early
    let status = child.wait()?;
    written?;

    if status.success() {
        Ok(())
    } else {
        Err(ActionError::Process(format!("{program} exited with {status}")))
    }
}

/// SSML document for a single utterance
fn ssml(voice: &str, text: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='en-US'><voice name='{}'>{}</voice></speak>",
        escape_xml(voice),
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssml_escapes_text() {
        let doc = ssml("en-US-JennyNeural", "Lights <on> & off");
        assert!(doc.contains("Lights &lt;on&gt; &amp; off"));
        assert!(doc.contains("name='en-US-JennyNeural'"));
    }

    #[cfg(unix)]
    #[test]
    fn test_player_that_exits_early_reports_write_error() {
        // `true` never reads stdin, so a payload larger than the pipe buffer fails to write
        let player = vec!["true".to_string()];
        let audio = vec![0u8; 1 << 20];
        assert!(matches!(play_through(&player, &audio), Err(ActionError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_player_consumes_audio() {
        let player = vec!["sh".to_string(), "-c".to_string(), "cat > /dev/null".to_string()];
        assert!(play_through(&player, &[0u8; 4096]).is_ok());
    }

    #[test]
    fn test_empty_player_is_a_process_error() {
        assert!(matches!(play_through(&[], b"RIFF"), Err(ActionError::Process(_))));
    }

    #[test]
    fn test_missing_program_is_a_process_error() {
        let mut speech = CommandSpeech::new("definitely-not-a-tts-program", Vec::new());
        assert!(matches!(speech.speak("hello"), Err(ActionError::Process(_))));
    }

    #[test]
    fn test_azure_rejects_bad_region() {
        let config = SpeechConfig {
            region: "east us/".to_string(),
            ..SpeechConfig::default()
        };
        let key = SecretBox::new(Box::new("key".to_string()));
        let client = Client::new();
        assert!(AzureSpeech::new(client, &config, key).is_err());
    }
}
