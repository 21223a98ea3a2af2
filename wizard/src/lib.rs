// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Listing Wizard
//!
//! Completeness rules for the multi-step property listing form:
//!
//! - Location: latitude and longitude present
//! - Photos: at least two photos attached
//! - Characteristics: surface and price for land, rooms and price otherwise
//! - Description: non-blank title and description
//! - Contact: non-blank first name, last name and phone
//!
//! The [`guard::NavigationGuard`] uses these rules to send a user back to the
//! first incomplete step, once per loaded listing.

pub mod draft;
pub mod guard;
pub mod step;
pub mod validate;

pub use draft::{Photo, PropertyDraft, PropertyType};
pub use guard::{GuardState, NavigationGuard, Navigator, RenderContext, StepRoutes, ViewedRoute};
pub use step::{UnknownStep, WizardStep};
pub use validate::{
    all_steps_complete, first_incomplete_step, step_report, validate_step, StepStatus, MIN_PHOTOS,
};
