// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for admission decisions.

use crate::class::EndpointClass;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::fmt;

/// Gateway metrics, registered on their own registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    admitted: IntCounterVec,
    rejected: IntCounterVec,
    entries: IntGauge,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("entries", &self.entries.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let admitted = IntCounterVec::new(
            Opts::new(
                "gateway_requests_admitted_total",
                "Requests admitted by the rate limiter",
            ),
            &["class"],
        )?;
        let rejected = IntCounterVec::new(
            Opts::new(
                "gateway_requests_rejected_total",
                "Requests rejected by the rate limiter",
            ),
            &["class"],
        )?;
        let entries = IntGauge::new(
            "gateway_rate_limit_entries",
            "Client/class keys currently tracked",
        )?;

        registry.register(Box::new(admitted.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(entries.clone()))?;

        Ok(Self {
            registry,
            admitted,
            rejected,
            entries,
        })
    }

    pub fn record_admitted(&self, class: EndpointClass) {
        self.admitted.with_label_values(&[class.as_str()]).inc();
    }

    pub fn record_rejected(&self, class: EndpointClass) {
        self.rejected.with_label_values(&[class.as_str()]).inc();
    }

    pub fn set_entries(&self, count: usize) {
        self.entries.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render every metric in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
