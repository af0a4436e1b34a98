// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation backend boundary.
//!
//! The engine never moves pixels. Containers hand an [`AnimationContext`] to an
//! [`Animation`] and continue once the animation reports that it finished.
//! Animations that can be driven by a gesture additionally expose
//! [`InteractiveAnimation`], whose `start` hook yields an [`InteractionHandle`].

use core::fmt;
use core::time::Duration;
use std::rc::Rc;

use crate::presentable::UnitRef;
use crate::types::UnitId;

/// Context handed to [`Animation::perform`].
pub struct AnimationContext {
    /// Unit being transitioned away from, if any.
    pub from: Option<UnitRef>,
    /// Unit being transitioned to, if any.
    pub to: Option<UnitRef>,
    done: Box<dyn FnOnce(bool)>,
}

impl AnimationContext {
    /// Create a context; `done` receives whether the animation ran to the end.
    pub fn new(
        from: Option<UnitRef>,
        to: Option<UnitRef>,
        done: impl FnOnce(bool) + 'static,
    ) -> Self {
        Self {
            from,
            to,
            done: Box::new(done),
        }
    }

    /// Report the end of the animation.
    ///
    /// `finished` is false when an interactive animation was cancelled; the
    /// container then reverts the operation.
    pub fn complete(self, finished: bool) {
        let Self { from, to, done } = self;
        drop((from, to));
        done(finished);
    }
}

impl fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationContext")
            .field("from", &self.from.as_ref().map(|u| u.id()))
            .field("to", &self.to.as_ref().map(|u| u.id()))
            .finish_non_exhaustive()
    }
}

/// An animation supplied by the backend.
pub trait Animation: 'static {
    /// Nominal duration.
    fn duration(&self) -> Duration;

    /// Run the animation, completing `context` exactly once.
    fn perform(&self, context: AnimationContext);

    /// Interactive hooks, if this animation can be driven by a gesture.
    fn interactive(&self) -> Option<&dyn InteractiveAnimation> {
        None
    }
}

/// Hooks of an animation that a gesture can drive.
pub trait InteractiveAnimation {
    /// Begin interactive driving; returns the percent-driven handle.
    fn start(&self) -> Option<Rc<dyn InteractionHandle>>;

    /// Release interaction state. Runs after every interaction, finished or not.
    fn cleanup(&self);
}

/// Percent-driven controller for an in-flight interactive animation.
pub trait InteractionHandle {
    /// Set completion percentage in `0.0..=1.0`.
    fn update(&self, progress: f64);
    /// Run the remainder of the animation and complete the transition.
    fn finish(&self);
    /// Roll the animation back and revert the transition.
    fn cancel(&self);
}

/// Pair of animations applied to a unit when it is shown and when it is removed.
#[derive(Clone, Default)]
pub struct TransitionAnimation {
    /// Used when the unit is presented or pushed.
    pub presentation: Option<Rc<dyn Animation>>,
    /// Used when the unit is dismissed or popped.
    pub dismissal: Option<Rc<dyn Animation>>,
}

impl TransitionAnimation {
    /// Create an animation pair.
    pub fn new(
        presentation: Option<Rc<dyn Animation>>,
        dismissal: Option<Rc<dyn Animation>>,
    ) -> Self {
        Self {
            presentation,
            dismissal,
        }
    }

    /// Use the same animation in both directions.
    pub fn symmetric(animation: Rc<dyn Animation>) -> Self {
        Self {
            presentation: Some(animation.clone()),
            dismissal: Some(animation),
        }
    }
}

impl fmt::Debug for TransitionAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionAnimation")
            .field("presentation", &self.presentation.is_some())
            .field("dismissal", &self.dismissal.is_some())
            .finish()
    }
}

/// Identity-keyed side table of the animation currently attached to each unit.
///
/// Owned by the backend adapter. Containers overwrite a unit's slot whenever a
/// transition shows it with an explicit animation; interactive transitions
/// read the dismissal half back out.
pub trait AnimationSlot {
    /// The animation currently attached to `unit`.
    fn active_animation(&self, unit: UnitId) -> Option<Rc<TransitionAnimation>>;

    /// Attach (or clear) the animation of `unit`.
    fn set_active_animation(&self, unit: UnitId, animation: Option<Rc<TransitionAnimation>>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Instant;
    impl Animation for Instant {
        fn duration(&self) -> Duration {
            Duration::ZERO
        }
        fn perform(&self, context: AnimationContext) {
            context.complete(true);
        }
    }

    #[test]
    fn context_reports_finished_flag() {
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        Instant.perform(AnimationContext::new(None, None, move |f| s.set(Some(f))));
        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    fn symmetric_uses_both_directions() {
        let pair = TransitionAnimation::symmetric(Rc::new(Instant));
        assert!(pair.presentation.is_some());
        assert!(pair.dismissal.is_some());
        assert!(Instant.interactive().is_none());
    }
}
