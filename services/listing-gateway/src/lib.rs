// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Listing Gateway
//!
//! Request admission for the listing marketplace API:
//!
//! - Per-client, per-endpoint-class fixed-window budgets
//!   (strict 50, moderate 300, lenient 600 per 15 minutes by default)
//! - Client identity from X-Forwarded-For, X-Real-IP or the socket address
//! - 429 responses carrying a retry hint
//! - Swappable counter store and clock
//! - Wizard progress endpoint backed by `listing-wizard`

pub mod app;
pub mod class;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod store;

pub use class::{classify, EndpointClass};
pub use config::Config;
pub use error::{ConfigError, RateLimitExceeded};
pub use limiter::{Admission, RateLimiter};
pub use store::{InMemoryStore, RateLimitEntry, RateLimitStore};
