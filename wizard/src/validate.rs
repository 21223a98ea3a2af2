// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Step completeness rules.
//!
//! None of these functions fail: a missing or malformed field simply leaves
//! its step incomplete.

use crate::draft::{has_coordinate, is_filled, is_positive, PropertyDraft};
use crate::step::WizardStep;
use serde::Serialize;

/// Minimum number of photos for the photos step.
pub const MIN_PHOTOS: usize = 2;

/// Completeness of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub index: usize,
    pub slug: &'static str,
    pub complete: bool,
}

impl WizardStep {
    /// Whether `draft` satisfies this step.
    pub fn is_complete(self, draft: &PropertyDraft) -> bool {
        match self {
            Self::Location => has_coordinate(draft.latitude) && has_coordinate(draft.longitude),
            Self::Photos => draft.photos.len() >= MIN_PHOTOS,
            Self::Characteristics => {
                if draft.is_land() {
                    is_positive(draft.land_surface) && is_positive(draft.price)
                } else {
                    draft.bedrooms.is_some_and(|n| n > 0)
                        && draft.bathrooms.is_some_and(|n| n > 0)
                        && is_positive(draft.price)
                }
            }
            Self::Description => {
                is_filled(draft.title.as_deref()) && is_filled(draft.description.as_deref())
            }
            Self::Contact => {
                is_filled(draft.first_name.as_deref())
                    && is_filled(draft.last_name.as_deref())
                    && is_filled(draft.phone.as_deref())
            }
        }
    }
}

/// Check the step at `index`. Unknown indices are never complete.
pub fn validate_step(index: usize, draft: &PropertyDraft) -> bool {
    WizardStep::from_index(index).is_some_and(|step| step.is_complete(draft))
}

/// Lowest step the draft does not satisfy, or `None` when everything is filled.
///
/// An unloaded draft lands on the first step.
pub fn first_incomplete_step(draft: Option<&PropertyDraft>) -> Option<WizardStep> {
    let Some(draft) = draft else {
        return Some(WizardStep::first());
    };

    WizardStep::ALL
        .iter()
        .copied()
        .find(|step| !step.is_complete(draft))
}

pub fn all_steps_complete(draft: Option<&PropertyDraft>) -> bool {
    first_incomplete_step(draft).is_none()
}

/// Completeness of every step, in wizard order.
pub fn step_report(draft: &PropertyDraft) -> Vec<StepStatus> {
    WizardStep::ALL
        .iter()
        .map(|step| StepStatus {
            index: step.index(),
            slug: step.slug(),
            complete: step.is_complete(draft),
        })
        .collect()
}
