// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for traffic simulation.

use axum::http::Method;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Requests that land in each endpoint class.
pub fn strict_requests() -> Vec<(Method, &'static str)> {
    vec![
        (Method::POST, "/properties"),
        (Method::PATCH, "/properties/12"),
        (Method::DELETE, "/favorites/4"),
        (Method::PUT, "/saved-searches/9"),
        (Method::GET, "/properties/12/publish"),
    ]
}

pub fn moderate_requests() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/properties"),
        (Method::GET, "/properties/12"),
        (Method::GET, "/favorites"),
        (Method::GET, "/saved-searches"),
    ]
}

pub fn lenient_requests() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/properties/markers?north=49&south=48&east=3&west=2"),
        (Method::POST, "/properties/12/validate"),
        (Method::GET, "/auth/me"),
        (Method::GET, "/users/me"),
    ]
}
