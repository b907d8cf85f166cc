// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay service.
//!
//! The handlers only resolve the caller key, decode the body and map a
//! [`SubmissionOutcome`] onto a status code and JSON body; every decision is
//! made by the pipeline.

use crate::config::Config;
use crate::mailer::DispatchOutcome;
use crate::metrics::Metrics;
use crate::pipeline::{ContactPipeline, SubmissionOutcome};
use crate::validator::ContactRequest;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Bucket shared by every caller whose address cannot be determined.
pub const UNKNOWN_CALLER: &str = "unknown";

const DELIVERED_MESSAGE: &str = "Message sent successfully!";
const SIMULATED_MESSAGE: &str = "Message sent successfully! (TEST MODE - Check server logs)";
const THROTTLED_MESSAGE: &str = "Too many requests. Please wait before sending another message.";
const INVALID_BODY_MESSAGE: &str = "Invalid request body";
const INTERNAL_ERROR_MESSAGE: &str = "Failed to send message. Please try again later.";

/// Shared application state.
pub struct AppState {
    pub pipeline: ContactPipeline,
    pub metrics: Metrics,
    pub config: Config,
}

/// Contact endpoint response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ContactResponse {
    fn sent(message: &str, message_id: Option<String>) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            message_id,
            error: None,
            errors: None,
        }
    }

    fn rejected(errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: None,
            message_id: None,
            error: None,
            errors: Some(errors),
        }
    }

    fn throttled() -> Self {
        Self {
            success: false,
            message: None,
            message_id: None,
            error: Some(THROTTLED_MESSAGE.to_string()),
            errors: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// `relay` or `test`
    pub mode: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/api/contact", post(contact))
        .route("/api/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
        mode: if state.pipeline.dispatcher().is_test_mode() {
            "test"
        } else {
            "relay"
        },
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Accept a contact form submission.
///
/// The rate check runs before the body is looked at, so undecodable bodies
/// still count against the caller's window.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let caller_key = resolve_caller_key(&headers, peer);
    debug!(caller = %caller_key, "Processing contact submission");

    let outcome = match state.pipeline.throttle(&caller_key).await {
        Some(retry_after) => SubmissionOutcome::Throttled { retry_after },
        None => match body {
            Ok(Json(request)) => state.pipeline.submit(&request).await,
            Err(rejection) => {
                warn!(caller = %caller_key, error = %rejection, "Undecodable contact body");
                SubmissionOutcome::Invalid(vec![INVALID_BODY_MESSAGE.to_string()])
            }
        },
    };

    state.metrics.record(&outcome);
    submission_response(outcome)
}

/// Map a pipeline outcome to its HTTP response.
pub fn submission_response(outcome: SubmissionOutcome) -> Response {
    match outcome {
        SubmissionOutcome::Throttled { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs(retry_after).to_string())],
            Json(ContactResponse::throttled()),
        )
            .into_response(),
        SubmissionOutcome::Invalid(errors) => {
            (StatusCode::BAD_REQUEST, Json(ContactResponse::rejected(errors))).into_response()
        }
        SubmissionOutcome::Dispatched(DispatchOutcome::Delivered { message_id }) => (
            StatusCode::OK,
            Json(ContactResponse::sent(DELIVERED_MESSAGE, Some(message_id))),
        )
            .into_response(),
        SubmissionOutcome::Dispatched(DispatchOutcome::Simulated) => (
            StatusCode::OK,
            Json(ContactResponse::sent(SIMULATED_MESSAGE, None)),
        )
            .into_response(),
        SubmissionOutcome::Dispatched(DispatchOutcome::Failed(category)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ContactResponse::rejected(vec![category.to_string()])),
        )
            .into_response(),
    }
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Pick the rate limit key for a request: first `X-Forwarded-For` hop,
/// then `X-Real-IP`, then the peer address, then [`UNKNOWN_CALLER`].
pub fn resolve_caller_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(first_hop) = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').map(str::trim).find(|hop| !hop.is_empty()))
    {
        return first_hop.to_string();
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ContactResponse::rejected(vec![INTERNAL_ERROR_MESSAGE.to_string()])),
    )
        .into_response()
}
