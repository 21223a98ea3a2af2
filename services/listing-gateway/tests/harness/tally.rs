// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome counting for traffic simulation.

use listing_gateway::EndpointClass;
use std::collections::HashMap;
use std::fmt;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Admitted(EndpointClass),
    Rejected(EndpointClass),
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct Tally {
    outcomes: HashMap<Outcome, usize>,
    requests_per_client: HashMap<String, usize>,
    /// Longest retry hint seen, in seconds
    max_retry_after_secs: u64,
    /// Index of the first rejected request
    first_rejection: Option<usize>,
    total: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admitted(&mut self, class: EndpointClass, client: &str) {
        self.record(Outcome::Admitted(class), client);
    }

    pub fn rejected(&mut self, class: EndpointClass, client: &str, retry_after_secs: u64) {
        if self.first_rejection.is_none() {
            self.first_rejection = Some(self.total);
        }
        self.max_retry_after_secs = self.max_retry_after_secs.max(retry_after_secs);
        self.record(Outcome::Rejected(class), client);
    }

    fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total_admitted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(o, _)| matches!(o, Outcome::Admitted(_)))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.total - self.total_admitted()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    pub fn first_rejection(&self) -> Option<usize> {
        self.first_rejection
    }

    pub fn max_retry_after_secs(&self) -> u64 {
        self.max_retry_after_secs
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Traffic Simulation Report ===")?;
        writeln!(f, "Total requests:   {}", self.total)?;
        writeln!(f, "Unique clients:   {}", self.unique_clients())?;
        writeln!(f, "Admitted:         {}", self.total_admitted())?;
        writeln!(f, "Rejected:         {}", self.total_rejected())?;
        writeln!(f, "First rejection:  {:?}", self.first_rejection)?;
        write!(f, "Max retry after:  {}s", self.max_retry_after_secs)
    }
}
