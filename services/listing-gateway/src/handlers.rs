// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the listing gateway.
//!
//! The gateway works in two modes:
//!
//! 1. **Forward auth**: a fronting proxy replays the request (method and
//!    path) to the gateway; 200 means proceed, 429 means reject.
//! 2. **External check**: a proxy posts `{ip, method, path}` to `/check` and
//!    reads the decision from the body.

use crate::class::classify;
use crate::client::{client_identifier, UNKNOWN_CLIENT};
use crate::config::Config;
use crate::error::RateLimitExceeded;
use crate::limiter::{Admission, RateLimiter};
use crate::metrics::Metrics;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use listing_wizard::{
    all_steps_complete, first_incomplete_step, step_report, PropertyDraft, StepRoutes, StepStatus,
    WizardStep,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub limiter: RateLimiter,
    pub metrics: Metrics,
    pub routes: StepRoutes,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> prometheus::Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self::with_limiter(config, limiter)
    }

    /// Build state around an existing limiter (custom store or clock).
    pub fn with_limiter(config: Config, limiter: RateLimiter) -> prometheus::Result<Self> {
        Ok(Self {
            limiter,
            metrics: Metrics::new()?,
            routes: StepRoutes::new(config.wizard.route_base.clone()),
            config,
        })
    }

    /// Paths that bypass rate limiting.
    pub fn is_exempt(&self, path: &str) -> bool {
        matches!(path, "/health" | "/healthz" | "/check")
            || (self.config.metrics.enabled && path == self.config.metrics.path)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Rate limit check request (for external validation).
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub ip: String,
    pub method: String,
    pub path: String,
}

/// Rate limit check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
}

/// Forward-auth acknowledgement.
#[derive(Debug, Serialize)]
pub struct AdmittedResponse {
    pub admitted: bool,
    pub class: &'static str,
}

/// Wizard progress for a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub steps: Vec<StepStatus>,
    pub first_incomplete_step: Option<WizardStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_incomplete_route: Option<String>,
    pub all_complete: bool,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "listing-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.set_entries(state.limiter.tracked_entries());
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Check the rate limit on behalf of a fronting proxy.
///
/// Decisions are returned with 200 so the proxy can read the body; only a
/// malformed method is a 400.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> (StatusCode, Json<CheckResponse>) {
    debug!(ip = %req.ip, method = %req.method, path = %req.path, "Processing rate limit check");

    let method = match Method::from_bytes(req.method.as_bytes()) {
        Ok(method) => method,
        Err(_) => {
            warn!(method = %req.method, "Invalid HTTP method");
            return (
                StatusCode::BAD_REQUEST,
                Json(CheckResponse {
                    allowed: false,
                    class: None,
                    reason: Some("Invalid HTTP method".to_string()),
                    retry_after_secs: None,
                    remaining: None,
                }),
            );
        }
    };

    let client = if req.ip.trim().is_empty() {
        UNKNOWN_CLIENT
    } else {
        req.ip.trim()
    };

    match state.limiter.check_request(client, &method, &req.path) {
        Ok(admission) => {
            state.metrics.record_admitted(admission.class);
            (
                StatusCode::OK,
                Json(CheckResponse {
                    allowed: true,
                    class: Some(admission.class.to_string()),
                    reason: None,
                    retry_after_secs: None,
                    remaining: Some(admission.remaining),
                }),
            )
        }
        Err(exceeded) => {
            state.metrics.record_rejected(exceeded.class);
            info!(
                ip = %client,
                class = %exceeded.class,
                retry_after_secs = exceeded.retry_after_secs,
                "Request rate limited"
            );
            (
                StatusCode::OK,
                Json(CheckResponse {
                    allowed: false,
                    class: Some(exceeded.class.to_string()),
                    reason: Some(exceeded.to_string()),
                    retry_after_secs: Some(exceeded.retry_after_secs),
                    remaining: None,
                }),
            )
        }
    }
}

/// Completeness of every wizard step for the posted draft.
pub async fn wizard_progress(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<PropertyDraft>,
) -> Json<ProgressResponse> {
    let first = first_incomplete_step(Some(&draft));
    Json(ProgressResponse {
        steps: step_report(&draft),
        first_incomplete_step: first,
        first_incomplete_route: first.map(|step| state.routes.step_route(draft.id.as_deref(), step)),
        all_complete: all_steps_complete(Some(&draft)),
    })
}

/// Forward-auth fallback: reaching it means the limiter admitted the request.
pub async fn admitted(request: Request) -> Json<AdmittedResponse> {
    let class = classify(request.method(), request.uri().path());
    Json(AdmittedResponse {
        admitted: true,
        class: class.as_str(),
    })
}

/// Rate limiting middleware.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if state.is_exempt(&path) {
        return next.run(request).await;
    }

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identifier(
        request.headers(),
        remote,
        state.config.rate_limit.trust_proxy_headers,
    );

    match state.limiter.check_request(&client, request.method(), &path) {
        Ok(admission) => {
            state.metrics.record_admitted(admission.class);
            let mut response = next.run(request).await;
            apply_rate_limit_headers(&mut response, &admission);
            response
        }
        Err(exceeded) => reject(&state, &client, &path, exceeded),
    }
}

fn reject(state: &AppState, client: &str, path: &str, exceeded: RateLimitExceeded) -> Response {
    state.metrics.record_rejected(exceeded.class);
    info!(
        client = %client,
        path = %path,
        class = %exceeded.class,
        retry_after_secs = exceeded.retry_after_secs,
        "Request rate limited"
    );
    exceeded.into_response()
}

fn apply_rate_limit_headers(response: &mut Response, admission: &Admission) {
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(admission.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(admission.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(admission.reset_in_secs));
}
