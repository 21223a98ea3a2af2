// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for replaying abusive traffic against the limiter.
//!
//! Traffic runs on a manual clock, so scenarios that span whole rate limit
//! windows finish instantly and deterministically.

pub mod generators;
pub mod scenarios;
pub mod tally;
