//! Channel adapter trait.

use async_trait::async_trait;

use crate::config::ChannelKind;
use crate::error::ChannelError;
use crate::format::RenderedMessage;

/// One outbound delivery transport.
///
/// Implementations make at most one provider call per `send`, with no
/// retries. Missing settings must be reported as
/// [`ChannelError::MissingConfiguration`] before touching the network.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Which rendered message variant this adapter accepts.
    fn kind(&self) -> ChannelKind;

    /// Deliver a rendered message to the configured recipient.
    async fn send(&self, message: &RenderedMessage) -> Result<(), ChannelError>;
}

/// Unwrap an optional setting or report it as missing.
pub(crate) fn require<'a, T: ?Sized>(
    value: Option<&'a T>,
    channel: &str,
    key: &str,
) -> Result<&'a T, ChannelError> {
    value.ok_or_else(|| ChannelError::MissingConfiguration {
        channel: channel.to_string(),
        key: key.to_string(),
    })
}

/// Reject a message rendered for a different channel.
pub(crate) fn wrong_variant(name: &str, message: &RenderedMessage) -> ChannelError {
    ChannelError::Internal {
        name: name.to_string(),
        reason: format!("cannot send a {} message", message.kind()),
    }
}
