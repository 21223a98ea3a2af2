// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the listing gateway.
//!
//! Per-class defaults: strict 50, moderate 300 and lenient 600 requests per
//! 15 minute window.

use crate::class::EndpointClass;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the listing gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Wizard route configuration
    #[serde(default)]
    pub wizard: WizardConfig,
}

/// Budget for one endpoint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLimit {
    /// Requests admitted per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Mutating and publish endpoints (default: 50 per 15 min)
    #[serde(default = "default_strict")]
    pub strict: ClassLimit,

    /// Ordinary reads (default: 300 per 15 min)
    #[serde(default = "default_moderate")]
    pub moderate: ClassLimit,

    /// Lightweight reads such as map markers (default: 600 per 15 min)
    #[serde(default = "default_lenient")]
    pub lenient: ClassLimit,

    /// Chance that a request triggers an expired-entry sweep (default: 0.01)
    #[serde(default = "default_cleanup_probability")]
    pub cleanup_probability: f64,

    /// Interval of the background sweep in seconds, 0 disables it (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Upper bound on tracked entries, 0 means unbounded (default: 0)
    #[serde(default)]
    pub max_entries: usize,

    /// Read X-Forwarded-For / X-Real-IP before the socket address (default: true)
    #[serde(default = "default_true")]
    pub trust_proxy_headers: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Wizard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Base path of the listing wizard pages (default: /listings)
    #[serde(default = "default_wizard_base")]
    pub route_base: String,
}

const FIFTEEN_MINUTES_MS: u64 = 15 * 60 * 1000;

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_strict() -> ClassLimit {
    ClassLimit {
        max_requests: 50,
        window_ms: FIFTEEN_MINUTES_MS,
    }
}

fn default_moderate() -> ClassLimit {
    ClassLimit {
        max_requests: 300,
        window_ms: FIFTEEN_MINUTES_MS,
    }
}

fn default_lenient() -> ClassLimit {
    ClassLimit {
        max_requests: 600,
        window_ms: FIFTEEN_MINUTES_MS,
    }
}

fn default_cleanup_probability() -> f64 {
    0.01
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_wizard_base() -> String {
    "/listings".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            metrics: MetricsConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            moderate: default_moderate(),
            lenient: default_lenient(),
            cleanup_probability: default_cleanup_probability(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_entries: 0,
            trust_proxy_headers: default_true(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            route_base: default_wizard_base(),
        }
    }
}

impl ClassLimit {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Window length rounded up to whole minutes.
    pub fn window_minutes(&self) -> u64 {
        self.window_ms.div_ceil(60_000)
    }
}

impl Config {
    /// Reject values the limiter cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.validate()?;
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "metrics.path",
                reason: format!("must start with '/', got {:?}", self.metrics.path),
            });
        }
        Ok(())
    }
}

impl RateLimitConfig {
    /// Budget for an endpoint class.
    pub fn limit_for(&self, class: EndpointClass) -> ClassLimit {
        match class {
            EndpointClass::Strict => self.strict,
            EndpointClass::Moderate => self.moderate,
            EndpointClass::Lenient => self.lenient,
        }
    }

    /// Set the same window length on every class.
    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.strict.window_ms = window_ms;
        self.moderate.window_ms = window_ms;
        self.lenient.window_ms = window_ms;
        self
    }

    /// Get the background sweep interval, if enabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for class in EndpointClass::ALL {
            let limit = self.limit_for(class);
            if limit.max_requests == 0 {
                return Err(ConfigError::InvalidValue {
                    field: class.max_requests_field(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if limit.window_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: class.window_field(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.cleanup_probability) {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.cleanup_probability",
                reason: format!("must be within [0, 1], got {}", self.cleanup_probability),
            });
        }
        Ok(())
    }
}
