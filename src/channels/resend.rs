//! Email channel: Resend HTTP API.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::channels::channel::{ChannelAdapter, require, wrong_variant};
use crate::config::{ChannelKind, ResendSettings};
use crate::error::ChannelError;
use crate::format::RenderedMessage;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Sends lead emails through `POST /emails`.
pub struct ResendChannel {
    settings: ResendSettings,
    client: reqwest::Client,
}

impl ResendChannel {
    pub fn new(settings: ResendSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    fn api_url(&self) -> String {
        format!("{}/emails", self.settings.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChannelAdapter for ResendChannel {
    fn name(&self) -> &str {
        "resend"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, message: &RenderedMessage) -> Result<(), ChannelError> {
        let RenderedMessage::Email { subject, html } = message else {
            return Err(wrong_variant(self.name(), message));
        };

        let api_key = require(self.settings.api_key.as_ref(), "email", "RESEND_API_KEY")?;
        let to = require(self.settings.to.as_deref(), "email", "EMAIL_TO")?;
        let from = require(self.settings.from.as_deref(), "email", "EMAIL_FROM")?;

        let body = SendEmailRequest {
            to,
            from,
            subject,
            html,
        };

        let resp = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Resend request failed");
                ChannelError::SendFailed {
                    name: "resend".into(),
                    reason: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %err, "Resend error");
            return Err(ChannelError::SendFailed {
                name: "resend".into(),
                reason: format!("HTTP {status}"),
            });
        }

        let accepted: SendEmailResponse =
            resp.json().await.map_err(|e| ChannelError::InvalidResponse {
                name: "resend".into(),
                reason: e.to_string(),
            })?;

        tracing::info!(email_id = %accepted.id, "Lead email accepted by Resend");
        Ok(())
    }
}
