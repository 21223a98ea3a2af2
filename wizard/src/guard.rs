// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Navigation guard for the listing wizard.
//!
//! A page calls [`NavigationGuard::on_render`] every time it renders. The
//! guard checks a loaded listing once, and if the user is looking at a step
//! past the first incomplete one it asks the router to go back there. It
//! stays quiet afterwards until a different listing is loaded or
//! [`NavigationGuard::reload`] is called.

use crate::draft::PropertyDraft;
use crate::step::WizardStep;
use crate::validate::first_incomplete_step;
use tracing::debug;

/// Route segment used when a draft has not been assigned an id yet.
const UNSAVED_SEGMENT: &str = "new";

/// Router seam used to issue client-side navigation.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

/// Builds wizard routes under a common base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRoutes {
    base: String,
}

impl StepRoutes {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/{listing}/{step}`
    pub fn step_route(&self, listing_id: Option<&str>, step: WizardStep) -> String {
        format!(
            "{}/{}/{}",
            self.base,
            listing_id.unwrap_or(UNSAVED_SEGMENT),
            step.slug()
        )
    }

    /// `{base}/{listing}/confirmation`
    pub fn confirmation_route(&self, listing_id: Option<&str>) -> String {
        format!(
            "{}/{}/confirmation",
            self.base,
            listing_id.unwrap_or(UNSAVED_SEGMENT)
        )
    }
}

impl Default for StepRoutes {
    fn default() -> Self {
        Self::new("/listings")
    }
}

/// Page currently shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewedRoute {
    Step(WizardStep),
    /// Final confirmation page, never redirected.
    Confirmation,
}

/// What the page knows at render time.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub route: ViewedRoute,
    /// Listing, once it has been fetched
    pub draft: Option<&'a PropertyDraft>,
    /// A navigation or save is in flight
    pub busy: bool,
}

/// Guard progress for the current listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Unchecked,
    /// Checked, user was allowed to stay
    Checked,
    /// Checked, redirect issued
    Redirected,
}

/// Once-per-load redirect guard.
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    routes: StepRoutes,
    listing_id: Option<String>,
    state: GuardState,
}

impl NavigationGuard {
    pub fn new(routes: StepRoutes) -> Self {
        Self {
            routes,
            listing_id: None,
            state: GuardState::Unchecked,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Forget the previous check so the next render evaluates again.
    pub fn reload(&mut self) {
        self.state = GuardState::Unchecked;
    }

    /// Evaluate the guard for one render.
    ///
    /// Returns the step the user was sent to, if a redirect was issued.
    pub fn on_render(
        &mut self,
        ctx: RenderContext<'_>,
        navigator: &mut dyn Navigator,
    ) -> Option<WizardStep> {
        let ViewedRoute::Step(current) = ctx.route else {
            return None;
        };
        let draft = ctx.draft?;
        if ctx.busy {
            return None;
        }

        if draft.id != self.listing_id {
            self.listing_id = draft.id.clone();
            self.state = GuardState::Unchecked;
        }

        if self.state != GuardState::Unchecked {
            return None;
        }

        match first_incomplete_step(Some(draft)) {
            Some(target) if current > target => {
                let route = self.routes.step_route(draft.id.as_deref(), target);
                debug!(
                    listing = ?draft.id,
                    from = %current,
                    to = %target,
                    %route,
                    "Redirecting to first incomplete step"
                );
                self.state = GuardState::Redirected;
                navigator.navigate(&route);
                Some(target)
            }
            _ => {
                self.state = GuardState::Checked;
                None
            }
        }
    }
}
