//! HTTP gateways for smart-home commands and emergency text messages.

use super::{ActionError, ActionResult, IotHandler, SmsHandler};
use crate::{config::SmsConfig, Error, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretBox};
use serde_json::json;

fn parse_endpoint(endpoint: &str, service: &str) -> Result<Url> {
    Url::parse(endpoint).map_err(|e| Error::ServiceInit(format!("Invalid {service} endpoint {endpoint}: {e}")))
}

fn with_token(request: RequestBuilder, token: Option<&SecretBox<String>>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token.expose_secret()),
        None => request,
    }
}

fn check_status(response: reqwest::blocking::Response) -> ActionResult {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
    Err(ActionError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Posts commands for a single registered device to a smart-home gateway
pub struct HttpIotGateway {
    client: Client,
    endpoint: Url,
    device_id: String,
    token: Option<SecretBox<String>>,
}

impl HttpIotGateway {
    /// Create a gateway client bound to one device
    ///
    /// # Errors
    ///
    /// Returns `ServiceInit` if the endpoint is not a valid URL.
    pub fn new(client: Client, endpoint: &str, device_id: &str, token: Option<SecretBox<String>>) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: parse_endpoint(endpoint, "IoT")?,
            device_id: device_id.to_string(),
            token,
        })
    }
}

impl IotHandler for HttpIotGateway {
    fn send_command(&mut self, command: &str) -> ActionResult {
        debug!("Sending {command} to device {}", self.device_id);

        let request = self.client.post(self.endpoint.clone()).json(&json!({
            "device_id": self.device_id,
            "command": command,
        }));

        check_status(with_token(request, self.token.as_ref()).send()?)
    }
}

/// Posts the fixed emergency message to an SMS gateway
pub struct HttpSmsGateway {
    client: Client,
    endpoint: Url,
    from: String,
    to: String,
    message: String,
    token: Option<SecretBox<String>>,
}

impl HttpSmsGateway {
    /// Create a gateway client with fixed sender, recipient and message
    ///
    /// # Errors
    ///
    /// Returns `ServiceInit` if the endpoint is not a valid URL or a number is
    /// missing.
    pub fn new(client: Client, endpoint: &str, config: &SmsConfig, token: Option<SecretBox<String>>) -> Result<Self> {
        if config.from.trim().is_empty() || config.to.trim().is_empty() {
            return Err(Error::ServiceInit(
                "SMS gateway needs both sender and recipient numbers".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint: parse_endpoint(endpoint, "SMS")?,
            from: config.from.clone(),
            to: config.to.clone(),
            message: config.message.clone(),
            token,
        })
    }
}

impl SmsHandler for HttpSmsGateway {
    fn send_emergency(&mut self) -> ActionResult {
        debug!("Sending emergency SMS to {}", self.to);

        let request = self.client.post(self.endpoint.clone()).json(&json!({
            "from": self.from,
            "to": self.to,
            "message": self.message,
        }));

        check_status(with_token(request, self.token.as_ref()).send()?)
    }
}
