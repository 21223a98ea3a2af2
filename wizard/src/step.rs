// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Ordered wizard steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One page of the listing wizard, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Location,
    Photos,
    Characteristics,
    Description,
    Contact,
}

/// Slug that does not name a wizard step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown wizard step: {0}")]
pub struct UnknownStep(pub String);

impl WizardStep {
    /// All steps, indices contiguous from 0.
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Location,
        WizardStep::Photos,
        WizardStep::Characteristics,
        WizardStep::Description,
        WizardStep::Contact,
    ];

    pub fn first() -> Self {
        Self::ALL[0]
    }

    pub fn index(self) -> usize {
        match self {
            Self::Location => 0,
            Self::Photos => 1,
            Self::Characteristics => 2,
            Self::Description => 3,
            Self::Contact => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Route segment for the step.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Photos => "photos",
            Self::Characteristics => "characteristics",
            Self::Description => "description",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for WizardStep {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStep(s.to_string()))
    }
}
