// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Endpoint sensitivity classes.
//!
//! Classification is a pure function of method and path, checked in order:
//! lightweight reads first, then mutations and publish actions, then
//! everything else.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path fragments served from cheap, read-only lookups.
const LENIENT_FRAGMENTS: &[&str] = &["/markers", "/validate"];

/// Current-user lookups (`/auth/me`, `/users/me`).
const CURRENT_USER_SUFFIX: &str = "/me";

const PUBLISH_FRAGMENT: &str = "/publish";

/// Coarse sensitivity tag with its own request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
    Strict,
    Moderate,
    Lenient,
}

impl EndpointClass {
    pub const ALL: [EndpointClass; 3] = [
        EndpointClass::Strict,
        EndpointClass::Moderate,
        EndpointClass::Lenient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Lenient => "lenient",
        }
    }

    pub(crate) fn max_requests_field(self) -> &'static str {
        match self {
            Self::Strict => "rate_limit.strict.max_requests",
            Self::Moderate => "rate_limit.moderate.max_requests",
            Self::Lenient => "rate_limit.lenient.max_requests",
        }
    }

    pub(crate) fn window_field(self) -> &'static str {
        match self {
            Self::Strict => "rate_limit.strict.window_ms",
            Self::Moderate => "rate_limit.moderate.window_ms",
            Self::Lenient => "rate_limit.lenient.window_ms",
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request by method and path.
pub fn classify(method: &Method, path: &str) -> EndpointClass {
    let path = path.split('?').next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');

    if LENIENT_FRAGMENTS.iter().any(|f| path.contains(f)) || trimmed.ends_with(CURRENT_USER_SUFFIX)
    {
        return EndpointClass::Lenient;
    }

    let mutating = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method);
    if mutating || path.contains(PUBLISH_FRAGMENT) {
        return EndpointClass::Strict;
    }

    EndpointClass::Moderate
}
