//! Configuration types.
//!
//! Everything is read once at startup into an immutable [`AppConfig`].
//! Channel credentials stay optional here: a missing key is reported per
//! request by the adapter that needs it, not at boot.

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_BUSINESS_NAME: &str = "Jairo’s Flooring";
const DEFAULT_RESEND_API_BASE: &str = "https://api.resend.com";
const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Delivery channel targeted by this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Email,
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider carries the email channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Resend,
    Smtp,
}

/// Resend HTTP API settings.
#[derive(Debug, Clone)]
pub struct ResendSettings {
    pub api_key: Option<SecretString>,
    /// Verified sender address.
    pub from: Option<String>,
    /// Business owner's inbox.
    pub to: Option<String>,
    pub api_base: String,
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Twilio Messages API settings.
#[derive(Debug, Clone)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    /// Sender phone number. Ignored when `messaging_service_sid` is set.
    pub from: Option<String>,
    pub messaging_service_sid: Option<String>,
    /// Business owner's phone number.
    pub to: Option<String>,
    pub api_base: String,
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Allowed CORS origin. `None` allows any origin.
    pub site_origin: Option<String>,
    pub channel: ChannelKind,
    pub email_provider: EmailProvider,
    /// Business name used in subjects and SMS headers.
    pub business_name: String,
    pub resend: ResendSettings,
    pub smtp: SmtpSettings,
    pub twilio: TwilioSettings,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secret = |key: &str| get(key).map(SecretString::from);

        let port = parse_port(get("PORT"), "PORT", DEFAULT_PORT)?;

        let channel = match get("LEAD_CHANNEL").map(|v| v.to_lowercase()).as_deref() {
            None | Some("email") => ChannelKind::Email,
            Some("sms") => ChannelKind::Sms,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "LEAD_CHANNEL".into(),
                    message: format!("expected \"email\" or \"sms\", got \"{other}\""),
                });
            }
        };

        let email_provider = match get("EMAIL_PROVIDER").map(|v| v.to_lowercase()).as_deref() {
            None | Some("resend") => EmailProvider::Resend,
            Some("smtp") => EmailProvider::Smtp,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "EMAIL_PROVIDER".into(),
                    message: format!("expected \"resend\" or \"smtp\", got \"{other}\""),
                });
            }
        };

        let resend = ResendSettings {
            api_key: secret("RESEND_API_KEY"),
            from: get("EMAIL_FROM"),
            to: get("EMAIL_TO"),
            api_base: get("RESEND_API_BASE").unwrap_or_else(|| DEFAULT_RESEND_API_BASE.to_string()),
        };

        let smtp = SmtpSettings {
            host: get("SMTP_HOST"),
            port: parse_port(get("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            username: get("SMTP_USERNAME"),
            password: secret("SMTP_PASSWORD"),
            from: get("EMAIL_FROM"),
            to: get("EMAIL_TO"),
        };

        let twilio = TwilioSettings {
            account_sid: get("TWILIO_ACCOUNT_SID"),
            auth_token: secret("TWILIO_AUTH_TOKEN"),
            from: get("TWILIO_FROM"),
            messaging_service_sid: get("TWILIO_MESSAGING_SERVICE_SID"),
            to: get("SMS_TO"),
            api_base: get("TWILIO_API_BASE").unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        };

        let site_origin = get("SITE_ORIGIN")
            .map(|origin| match HeaderValue::from_str(&origin) {
                Ok(_) => Ok(origin),
                Err(e) => Err(ConfigError::InvalidValue {
                    key: "SITE_ORIGIN".into(),
                    message: format!("not a valid header value: {e}"),
                }),
            })
            .transpose()?;

        Ok(Self {
            port,
            site_origin,
            channel,
            email_provider,
            business_name: get("BUSINESS_NAME").unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string()),
            resend,
            smtp,
            twilio,
        })
    }
}

fn parse_port(value: Option<String>, key: &str, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("\"{raw}\" is not a valid port"),
        }),
    }
}
