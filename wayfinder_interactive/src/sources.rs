// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction sources for common gestures.
//!
//! - [`ActiveDismissal`] drives the dismissal of a unit with the animation that
//!   unit was shown with, as recorded in an [`AnimationSlot`]. This is the shape
//!   of an interactive "swipe back" on a stack.
//! - [`CoordinatorInteraction`] prepares a coordinator's transition for a route
//!   and drives it with the animation that transition applies.

use core::fmt;
use std::rc::{Rc, Weak};

use wayfinder_navigation::animation::AnimationSlot;
use wayfinder_navigation::coordinator::{Coordinator, RouteHandler};
use wayfinder_navigation::types::{Completion, TransitionOptions, UnitId};

use crate::interaction::{InteractionSource, PendingTransition};

/// Drives a caller-supplied dismissal with the unit's active dismissal animation.
pub struct ActiveDismissal<S> {
    slot: S,
    unit: UnitId,
    dismiss: Rc<dyn Fn(Completion)>,
}

impl<S: AnimationSlot> ActiveDismissal<S> {
    /// Drive `dismiss` with the dismissal animation `slot` holds for `unit`.
    ///
    /// `dismiss` must perform the dismissal animated and without an explicit
    /// animation, so the container picks the active one.
    pub fn new(slot: S, unit: UnitId, dismiss: impl Fn(Completion) + 'static) -> Self {
        Self {
            slot,
            unit,
            dismiss: Rc::new(dismiss),
        }
    }

    /// The unit being dismissed.
    pub fn unit(&self) -> UnitId {
        self.unit
    }
}

impl<S: AnimationSlot> InteractionSource for ActiveDismissal<S> {
    fn begin(&self) -> Option<PendingTransition> {
        let animation = self.slot.active_animation(self.unit)?.dismissal.clone()?;
        let dismiss = self.dismiss.clone();
        Some(PendingTransition::new(animation, move |completion| {
            dismiss(completion);
        }))
    }
}

impl<S: fmt::Debug> fmt::Debug for ActiveDismissal<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveDismissal")
            .field("slot", &self.slot)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

/// Drives a coordinator's transition for a fixed route.
pub struct CoordinatorInteraction<H: RouteHandler> {
    coordinator: Weak<Coordinator<H>>,
    route: H::Route,
}

impl<H> CoordinatorInteraction<H>
where
    H: RouteHandler,
    H::Route: Clone,
{
    /// Drive the transition `coordinator` prepares for `route`.
    pub fn new(coordinator: &Rc<Coordinator<H>>, route: H::Route) -> Self {
        Self {
            coordinator: Rc::downgrade(coordinator),
            route,
        }
    }

    /// The route driven by each gesture.
    pub fn route(&self) -> &H::Route {
        &self.route
    }
}

impl<H> InteractionSource for CoordinatorInteraction<H>
where
    H: RouteHandler,
    H::Route: Clone,
{
    fn begin(&self) -> Option<PendingTransition> {
        let Some(coordinator) = self.coordinator.upgrade() else {
            tracing::debug!("coordinator released; nothing to drive");
            return None;
        };
        let transition = coordinator.prepare_transition(self.route.clone());
        let animation = transition.animation()?.clone();
        Some(PendingTransition::new(animation, move |completion| {
            coordinator.perform_transition(transition, TransitionOptions::ANIMATED, completion);
        }))
    }
}

impl<H: RouteHandler> fmt::Debug for CoordinatorInteraction<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorInteraction")
            .field("route", &self.route)
            .field("alive", &(self.coordinator.strong_count() > 0))
            .finish()
    }
}
