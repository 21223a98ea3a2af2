// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identification.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Identifier used when nothing names the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Derive the rate limit identity of a request.
///
/// Priority: first `X-Forwarded-For` hop, `X-Real-IP`, socket address, then
/// [`UNKNOWN_CLIENT`]. Headers are skipped when `trust_proxy_headers` is off.
pub fn client_identifier(
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        let forwarded = header_str(headers, X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        if let Some(ip) = header_str(headers, X_REAL_IP).map(str::trim).filter(|v| !v.is_empty()) {
            return ip.to_string();
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
