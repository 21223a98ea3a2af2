// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Traffic patterns for abuse simulation.

use axum::http::Method;
use std::time::Duration;

/// Traffic pattern configuration.
#[derive(Debug, Clone)]
pub struct TrafficScenario {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Simulated time between consecutive requests
    pub spacing: Duration,
    /// Number of unique clients, used round-robin
    pub unique_clients: usize,
    /// Request method
    pub method: Method,
    /// Request path
    pub path: &'static str,
}

impl Default for TrafficScenario {
    fn default() -> Self {
        Self {
            total_requests: 100,
            spacing: Duration::from_millis(100),
            unique_clients: 1,
            method: Method::POST,
            path: "/properties",
        }
    }
}

/// Predefined traffic patterns.
impl TrafficScenario {
    /// One client hammering a mutating endpoint.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            spacing: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Many clients, each sending a single request and never returning.
    pub fn one_off_churn() -> Self {
        Self {
            total_requests: 1_000,
            spacing: Duration::from_secs(2),
            unique_clients: 1_000,
            method: Method::GET,
            path: "/properties",
        }
    }

    /// Cheap marker lookups from a map view being panned continuously.
    pub fn map_panning() -> Self {
        Self {
            total_requests: 700,
            spacing: Duration::from_millis(250),
            method: Method::GET,
            path: "/properties/markers",
            ..Default::default()
        }
    }

    /// Slow, steady writes that never come close to the budget.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 40,
            spacing: Duration::from_secs(30),
            ..Default::default()
        }
    }
}
