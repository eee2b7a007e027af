//! HTTP boundary: lead submission routes, CORS and status mapping.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::dispatch::{DispatchResult, Dispatcher, ErrorKind};

/// Build the Axum router for lead submission.
///
/// `/api/send-sms` is kept alongside `/api/lead` so existing site forms keep
/// posting to the same path whichever channel is configured.
pub fn lead_routes(dispatcher: Arc<Dispatcher>, site_origin: Option<&str>) -> Router {
    Router::new()
        .route("/api/lead", lead_method_router())
        .route("/api/send-sms", lead_method_router())
        .route("/health", get(health))
        .layer(cors_layer(site_origin))
        .with_state(dispatcher)
}

fn lead_method_router() -> MethodRouter<Arc<Dispatcher>> {
    // OPTIONS never reaches the router: the CORS layer answers it with 200.
    post(submit_lead).fallback(method_not_allowed)
}

/// CORS policy: one allowed origin (or any), `POST`/`OPTIONS`, `Content-Type`.
///
/// An origin that is not a valid header value allows no cross-origin
/// callers at all.
pub fn cors_layer(site_origin: Option<&str>) -> CorsLayer {
    let origin = match site_origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(origin, error = %e, "Invalid SITE_ORIGIN, refusing cross-origin requests");
                AllowOrigin::list(std::iter::empty::<HeaderValue>())
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .vary([header::ORIGIN])
}

/// HTTP status for a rejected dispatch.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
        ErrorKind::MissingConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::ChannelFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing error text. Carries no internal detail.
pub fn public_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidPayload => "Missing fields",
        ErrorKind::MissingConfiguration => "Missing configuration",
        ErrorKind::ChannelFailure => "Delivery failed",
        ErrorKind::InternalError => "Internal error",
    }
}

fn into_reply(result: DispatchResult) -> (StatusCode, Json<Value>) {
    match result.error {
        None => (StatusCode::OK, Json(json!({"ok": true}))),
        Some(kind) => (
            status_for(kind),
            Json(json!({"ok": false, "error": public_message(kind)})),
        ),
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn submit_lead(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> impl IntoResponse {
    // Empty or malformed bodies become `null`, which the validator rejects.
    let raw = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!(error = %e, "Lead body is not valid JSON");
            Value::Null
        })
    };

    into_reply(dispatcher.dispatch(&raw).await)
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"ok": false, "error": "Method Not Allowed"})),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "lead-notify"
    }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::channels::ChannelAdapter;
    use crate::config::ChannelKind;
    use crate::error::ChannelError;
    use crate::format::{MessageFormatter, RenderedMessage};

    /// Adapter that always ends the same way.
    struct FixedAdapter(Option<ErrorKind>);

    #[async_trait]
    impl ChannelAdapter for FixedAdapter {
        fn name(&self) -> &str {
            "fixed"
        }

        fn kind(&self) -> ChannelKind {
            ChannelKind::Email
        }

        async fn send(&self, _message: &RenderedMessage) -> Result<(), ChannelError> {
            let name = "fixed".to_string();
            match self.0 {
                None => Ok(()),
                Some(ErrorKind::MissingConfiguration) => Err(ChannelError::MissingConfiguration {
                    channel: name,
                    key: "KEY".into(),
                }),
                Some(ErrorKind::ChannelFailure) => Err(ChannelError::SendFailed {
                    name,
                    reason: "provider said no: secret-detail".into(),
                }),
                Some(_) => Err(ChannelError::Internal {
                    name,
                    reason: "secret-detail".into(),
                }),
            }
        }
    }

    fn app(outcome: Option<ErrorKind>, origin: Option<&str>) -> Router {
        let dispatcher = Dispatcher::new(
            MessageFormatter::new("Test Co"),
            Arc::new(FixedAdapter(outcome)),
        );
        lead_routes(Arc::new(dispatcher), origin)
    }

    fn valid_body() -> String {
        json!({"name": "Ana", "email": "a@b.com", "message": "hi"}).to_string()
    }

    async fn call(app: Router, method: Method, uri: &str, body: String) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn accepted_lead_returns_ok() {
        for path in ["/api/lead", "/api/send-sms"] {
            let (status, json) = call(app(None, None), Method::POST, path, valid_body()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({"ok": true}));
        }
    }

    #[tokio::test]
    async fn missing_fields_return_400() {
        let body = json!({"name": "", "email": "a@b.com", "message": "hi"}).to_string();
        let (status, json) = call(app(None, None), Method::POST, "/api/lead", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"ok": false, "error": "Missing fields"}));
    }

    #[tokio::test]
    async fn empty_and_malformed_bodies_return_400() {
        for body in ["", "   ", "{not json", "[1,2]"] {
            let (status, _) = call(app(None, None), Method::POST, "/api/lead", body.into()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        }
    }

    #[tokio::test]
    async fn adapter_failures_map_to_status_codes() {
        let cases = [
            (ErrorKind::MissingConfiguration, StatusCode::INTERNAL_SERVER_ERROR, "Missing configuration"),
            (ErrorKind::ChannelFailure, StatusCode::BAD_GATEWAY, "Delivery failed"),
            (ErrorKind::InternalError, StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        ];
        for (kind, expected_status, expected_error) in cases {
            let (status, json) =
                call(app(Some(kind), None), Method::POST, "/api/lead", valid_body()).await;
            assert_eq!(status, expected_status);
            assert_eq!(json["ok"], false);
            assert_eq!(json["error"], expected_error);
            assert!(!json.to_string().contains("secret-detail"));
        }
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let (status, json) = call(app(None, None), method, "/api/lead", String::new()).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(json, json!({"ok": false, "error": "Method Not Allowed"}));
        }
    }

    #[tokio::test]
    async fn bare_options_returns_200() {
        let (status, json) =
            call(app(None, None), Method::OPTIONS, "/api/send-sms", String::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let resp = app(None, Some("https://jairos.example"))
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/send-sms")
                    .header(header::ORIGIN, "https://jairos.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://jairos.example"
        );
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("OPTIONS"));
    }

    #[tokio::test]
    async fn unusable_origin_allows_no_cross_origin_callers() {
        let resp = app(None, Some("https://jairos\u{1}.example"))
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/lead")
                    .header(header::ORIGIN, "https://anywhere.example")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(valid_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn post_response_carries_wildcard_origin_by_default() {
        let resp = app(None, None)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/lead")
                    .header(header::ORIGIN, "https://anywhere.example")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(valid_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(resp.headers().contains_key(header::VARY));
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (status, json) = call(app(None, None), Method::GET, "/health", String::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["service"], "lead-notify");
    }
}
