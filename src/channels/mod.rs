//! Delivery channels for lead notifications.

pub mod channel;
pub mod resend;
pub mod smtp;
pub mod twilio;

use std::sync::Arc;

pub use channel::ChannelAdapter;
pub use resend::ResendChannel;
pub use smtp::SmtpChannel;
pub use twilio::TwilioChannel;

use crate::config::{AppConfig, ChannelKind, EmailProvider};

/// Pick the adapter for the configured channel and provider.
pub fn build_adapter(config: &AppConfig, client: reqwest::Client) -> Arc<dyn ChannelAdapter> {
    match (config.channel, config.email_provider) {
        (ChannelKind::Sms, _) => Arc::new(TwilioChannel::new(config.twilio.clone(), client)),
        (ChannelKind::Email, EmailProvider::Resend) => {
            Arc::new(ResendChannel::new(config.resend.clone(), client))
        }
        (ChannelKind::Email, EmailProvider::Smtp) => Arc::new(SmtpChannel::new(config.smtp.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn selects_adapter_from_configuration() {
        let client = reqwest::Client::new();
        assert_eq!(build_adapter(&config(&[]), client.clone()).name(), "resend");
        assert_eq!(
            build_adapter(&config(&[("EMAIL_PROVIDER", "smtp")]), client.clone()).name(),
            "smtp"
        );
        let sms = build_adapter(&config(&[("LEAD_CHANNEL", "sms")]), client);
        assert_eq!(sms.name(), "twilio");
        assert_eq!(sms.kind(), ChannelKind::Sms);
    }
}
