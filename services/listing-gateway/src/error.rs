// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the listing gateway.

use crate::class::EndpointClass;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A client used up the budget of an endpoint class.
///
/// Terminal for the current request; the client should retry after
/// `retry_after_secs`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(
    "Too many requests for {class} endpoints: limit is {limit} per {window_minutes} minutes, \
     retry in {retry_after_secs} seconds"
)]
pub struct RateLimitExceeded {
    pub class: EndpointClass,
    pub limit: u32,
    pub window_minutes: u64,
    pub retry_after_secs: u64,
}

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Body of a 429 response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub status_code: u16,
    pub message: String,
    pub retry_after: u64,
}

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        let body = RateLimitBody {
            status_code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            message: self.to_string(),
            retry_after: self.retry_after_secs,
        };
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, self.retry_after_secs.to_string())],
            Json(body),
        )
            .into_response()
    }
}
