//! Email channel: SMTP relay via lettre.

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::channels::channel::{ChannelAdapter, require, wrong_variant};
use crate::config::{ChannelKind, SmtpSettings};
use crate::error::ChannelError;
use crate::format::RenderedMessage;

/// Sends lead emails through an authenticated SMTP relay.
pub struct SmtpChannel {
    settings: SmtpSettings,
}

impl SmtpChannel {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, subject: &str, html: &str) -> Result<Message, ChannelError> {
        let from = require(self.settings.from.as_deref(), "email", "EMAIL_FROM")?;
        let to = require(self.settings.to.as_deref(), "email", "EMAIL_TO")?;

        Message::builder()
            .from(parse_mailbox(from, "EMAIL_FROM")?)
            .to(parse_mailbox(to, "EMAIL_TO")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| ChannelError::Internal {
                name: "smtp".into(),
                reason: format!("Failed to build email: {e}"),
            })
    }
}

fn parse_mailbox(address: &str, key: &str) -> Result<Mailbox, ChannelError> {
    address
        .parse()
        .map_err(|e: AddressError| ChannelError::InvalidConfiguration {
            channel: "email".into(),
            key: key.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl ChannelAdapter for SmtpChannel {
    fn name(&self) -> &str {
        "smtp"
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, message: &RenderedMessage) -> Result<(), ChannelError> {
        let RenderedMessage::Email { subject, html } = message else {
            return Err(wrong_variant(self.name(), message));
        };

        let host = require(self.settings.host.as_deref(), "email", "SMTP_HOST")?;
        let username = require(self.settings.username.as_deref(), "email", "SMTP_USERNAME")?;
        let password = require(self.settings.password.as_ref(), "email", "SMTP_PASSWORD")?;
        let email = self.build_message(subject, html)?;

        let transport = SmtpTransport::relay(host)
            .map_err(|e| ChannelError::SendFailed {
                name: "smtp".into(),
                reason: format!("SMTP relay error: {e}"),
            })?
            .port(self.settings.port)
            .credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().to_string(),
            ))
            .build();

        // lettre's SmtpTransport is blocking.
        let result = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| ChannelError::Internal {
                name: "smtp".into(),
                reason: format!("SMTP task failed: {e}"),
            })?;

        match result {
            Ok(response) => {
                tracing::info!(code = %response.code(), "Lead email accepted by SMTP relay");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "SMTP send failed");
                Err(ChannelError::SendFailed {
                    name: "smtp".into(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
