//! SMS channel: Twilio Messages API.
//!
//! Messages are addressed either from a phone number (`From`) or through a
//! messaging service (`MessagingServiceSid`); the service wins when both
//! are configured.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::channels::channel::{ChannelAdapter, require, wrong_variant};
use crate::config::{ChannelKind, TwilioSettings};
use crate::error::ChannelError;
use crate::format::RenderedMessage;

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// How the outgoing message identifies its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sender<'a> {
    Number(&'a str),
    MessagingService(&'a str),
}

impl<'a> Sender<'a> {
    fn form_field(&self) -> (&'static str, &'a str) {
        match *self {
            Sender::Number(n) => ("From", n),
            Sender::MessagingService(sid) => ("MessagingServiceSid", sid),
        }
    }
}

/// Sends lead SMS through `POST /2010-04-01/Accounts/{sid}/Messages.json`.
pub struct TwilioChannel {
    settings: TwilioSettings,
    client: reqwest::Client,
}

impl TwilioChannel {
    pub fn new(settings: TwilioSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    fn api_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{account_sid}/Messages.json",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    fn sender(&self) -> Result<Sender<'_>, ChannelError> {
        if let Some(sid) = self.settings.messaging_service_sid.as_deref() {
            return Ok(Sender::MessagingService(sid));
        }
        require(self.settings.from.as_deref(), "sms", "TWILIO_FROM").map(Sender::Number)
    }
}

#[async_trait]
impl ChannelAdapter for TwilioChannel {
    fn name(&self) -> &str {
        "twilio"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, message: &RenderedMessage) -> Result<(), ChannelError> {
        let RenderedMessage::Sms { body } = message else {
            return Err(wrong_variant(self.name(), message));
        };

        let account_sid = require(self.settings.account_sid.as_deref(), "sms", "TWILIO_ACCOUNT_SID")?;
        let auth_token = require(self.settings.auth_token.as_ref(), "sms", "TWILIO_AUTH_TOKEN")?;
        let to = require(self.settings.to.as_deref(), "sms", "SMS_TO")?;
        let sender = self.sender()?;

        let form = [("To", to), sender.form_field(), ("Body", body.as_str())];

        let resp = self
            .client
            .post(self.api_url(account_sid))
            .basic_auth(account_sid, Some(auth_token.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Twilio request failed");
                ChannelError::SendFailed {
                    name: "twilio".into(),
                    reason: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %err, "Twilio error");
            return Err(ChannelError::SendFailed {
                name: "twilio".into(),
                reason: format!("HTTP {status}"),
            });
        }

        let accepted: MessageResource =
            resp.json().await.map_err(|e| ChannelError::InvalidResponse {
                name: "twilio".into(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            message_sid = %accepted.sid,
            status = accepted.status.as_deref().unwrap_or("unknown"),
            "Lead SMS accepted by Twilio"
        );
        Ok(())
    }
}
