//! Error types for lead-notify.

/// Error raised while dispatching one lead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Lead payload rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Payload is not a JSON object")]
    NotAnObject,

    #[error("Missing or empty required field: {0}")]
    MissingField(&'static str),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {channel} is missing required configuration: {key}")]
    MissingConfiguration { channel: String, key: String },

    #[error("Channel {channel} has an invalid {key}: {reason}")]
    InvalidConfiguration {
        channel: String,
        key: String,
        reason: String,
    },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid response from {name}: {reason}")]
    InvalidResponse { name: String, reason: String },

    #[error("Internal error on channel {name}: {reason}")]
    Internal { name: String, reason: String },
}

/// Result type alias for lead-notify.
pub type Result<T> = std::result::Result<T, Error>;
