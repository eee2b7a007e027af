//! Lead dispatcher: validate → render → send, one attempt per request.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::channels::{self, ChannelAdapter};
use crate::config::AppConfig;
use crate::error::{ChannelError, ConfigError, Error, Result};
use crate::format::MessageFormatter;
use crate::lead::Lead;

/// Why a dispatch was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidPayload,
    MissingConfiguration,
    ChannelFailure,
    InternalError,
}

impl From<&Error> for ErrorKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(_) => ErrorKind::InvalidPayload,
            Error::Channel(
                ChannelError::MissingConfiguration { .. }
                | ChannelError::InvalidConfiguration { .. },
            ) => ErrorKind::MissingConfiguration,
            Error::Channel(ChannelError::SendFailed { .. }) => ErrorKind::ChannelFailure,
            Error::Channel(ChannelError::InvalidResponse { .. } | ChannelError::Internal { .. }) => {
                ErrorKind::InternalError
            }
        }
    }
}

/// Outcome of one dispatch. `error` is set iff `ok` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub ok: bool,
    pub error: Option<ErrorKind>,
}

impl DispatchResult {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn rejected(kind: ErrorKind) -> Self {
        Self {
            ok: false,
            error: Some(kind),
        }
    }
}

/// Stateless orchestrator shared across requests.
pub struct Dispatcher {
    formatter: MessageFormatter,
    adapter: Arc<dyn ChannelAdapter>,
}

impl Dispatcher {
    pub fn new(formatter: MessageFormatter, adapter: Arc<dyn ChannelAdapter>) -> Self {
        Self { formatter, adapter }
    }

    /// Wire the formatter and the configured channel adapter.
    pub fn from_config(config: &AppConfig) -> std::result::Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lead-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::new(
            MessageFormatter::new(config.business_name.clone()),
            channels::build_adapter(config, client),
        ))
    }

    pub fn adapter(&self) -> &dyn ChannelAdapter {
        self.adapter.as_ref()
    }

    /// Run one lead through the pipeline.
    ///
    /// Never fails: every outcome, including a panic inside the pipeline,
    /// is folded into the returned [`DispatchResult`].
    pub async fn dispatch(&self, raw: &Value) -> DispatchResult {
        let span = tracing::info_span!(
            "dispatch",
            dispatch_id = %Uuid::new_v4(),
            channel = %self.adapter.kind(),
            provider = self.adapter.name(),
        );

        async move {
            match AssertUnwindSafe(self.run(raw)).catch_unwind().await {
                Ok(Ok(())) => {
                    tracing::info!("Lead delivered");
                    DispatchResult::accepted()
                }
                Ok(Err(err)) => {
                    let kind = ErrorKind::from(&err);
                    match kind {
                        ErrorKind::InvalidPayload => tracing::warn!(error = %err, "Lead rejected"),
                        _ => tracing::error!(error = %err, kind = ?kind, "Lead dispatch failed"),
                    }
                    DispatchResult::rejected(kind)
                }
                Err(panic) => {
                    tracing::error!(panic = %panic_message(&*panic), "Lead dispatch panicked");
                    DispatchResult::rejected(ErrorKind::InternalError)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, raw: &Value) -> Result<()> {
        let lead = Lead::validate(raw)?;
        let message = self.formatter.render(&lead, self.adapter.kind());
        self.adapter.send(&message).await?;
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
