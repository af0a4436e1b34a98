// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture-driven interactive transitions.
//!
//! ## Lifecycle
//!
//! [`InteractiveTransition`] keeps a transition in sync with a continuous
//! gesture:
//!
//! 1) `Began`: ask the [`InteractionSource`] for a pending transition. If its
//!    animation is interactive, start the interaction, then perform the
//!    transition; the container hands its animation context to the handle.
//! 2) `Changed`: project the translation onto the configured axis, divide by
//!    the extent and push the progress into the handle.
//! 3) `Ended`: finish when the velocity along the axis or the progress exceeds
//!    its threshold, cancel otherwise. `Cancelled` and `Failed` cancel.
//! 4) The animation's `cleanup` hook runs after every resolution.
//!
//! When the source has nothing to drive, or its animation is not interactive,
//! the whole gesture is forwarded to the fallback handler instead.
//!
//! At most one interaction is in flight: a `Began` while driving cancels the
//! previous interaction first.

use core::fmt;
use std::rc::Rc;

use wayfinder_navigation::animation::{Animation, InteractionHandle};
use wayfinder_navigation::types::Completion;

use crate::types::{Gesture, GestureState, InteractionConfig, InteractionPhase, Resolution};

/// Receiver of gesture updates.
pub trait GestureHandler {
    /// Handle one update.
    fn handle(&mut self, gesture: &Gesture);
}

impl<F: FnMut(&Gesture)> GestureHandler for F {
    fn handle(&mut self, gesture: &Gesture) {
        self(gesture);
    }
}

/// A transition ready to be driven: its animation and the procedure that performs it.
pub struct PendingTransition {
    animation: Rc<dyn Animation>,
    perform: Box<dyn FnOnce(Completion)>,
}

impl PendingTransition {
    /// Pair `animation` with `perform`, which must run the transition animated.
    pub fn new(animation: Rc<dyn Animation>, perform: impl FnOnce(Completion) + 'static) -> Self {
        Self {
            animation,
            perform: Box::new(perform),
        }
    }

    /// The animation the transition will run.
    pub fn animation(&self) -> &Rc<dyn Animation> {
        &self.animation
    }
}

impl fmt::Debug for PendingTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransition")
            .field("duration", &self.animation.duration())
            .field("interactive", &self.animation.interactive().is_some())
            .finish_non_exhaustive()
    }
}

/// Something an interactive gesture can drive.
pub trait InteractionSource {
    /// Prepare the transition to drive, if there is one.
    fn begin(&self) -> Option<PendingTransition>;
}

enum Phase {
    Idle,
    Driving {
        animation: Rc<dyn Animation>,
        handle: Rc<dyn InteractionHandle>,
        progress: f64,
    },
    Forwarding,
}

/// Gesture handler that drives transitions of an [`InteractionSource`].
pub struct InteractiveTransition<S> {
    source: S,
    config: InteractionConfig,
    fallback: Option<Box<dyn GestureHandler>>,
    settled: Option<Rc<dyn Fn()>>,
    phase: Phase,
    last_resolution: Option<Resolution>,
}

impl<S: InteractionSource> InteractiveTransition<S> {
    /// Drive transitions of `source` with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, InteractionConfig::default())
    }

    /// Drive transitions of `source` with `config`.
    pub fn with_config(source: S, config: InteractionConfig) -> Self {
        Self {
            source,
            config,
            fallback: None,
            settled: None,
            phase: Phase::Idle,
            last_resolution: None,
        }
    }

    /// Forward gestures that cannot drive a transition to `handler`.
    ///
    /// Typically the handler previously registered with the recognizer.
    pub fn with_fallback(mut self, handler: impl GestureHandler + 'static) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Run `handler` whenever a driven transition completes.
    ///
    /// The container completes the transition once the interaction finished or
    /// was cancelled and the unit settled; with deferred animations this can be
    /// later than the gesture's end.
    pub fn with_settled(mut self, handler: impl Fn() + 'static) -> Self {
        self.settled = Some(Rc::new(handler));
        self
    }

    /// The interaction source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The configuration in use.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> InteractionPhase {
        match &self.phase {
            Phase::Idle => InteractionPhase::Idle,
            Phase::Driving { progress, .. } => InteractionPhase::Driving {
                progress: *progress,
            },
            Phase::Forwarding => InteractionPhase::Forwarding,
        }
    }

    /// How the most recent gesture ended.
    pub fn last_resolution(&self) -> Option<Resolution> {
        self.last_resolution
    }

    fn begin(&mut self, gesture: &Gesture) {
        if matches!(self.phase, Phase::Driving { .. }) {
            tracing::debug!("gesture began while driving; cancelling previous interaction");
            self.resolve(false);
        }
        let Some(pending) = self.source.begin() else {
            tracing::debug!("nothing to drive; forwarding gesture");
            self.phase = Phase::Forwarding;
            self.forward(gesture);
            return;
        };
        let handle = pending
            .animation
            .interactive()
            .and_then(|interactive| interactive.start());
        let Some(handle) = handle else {
            tracing::debug!("animation is not interactive; forwarding gesture");
            self.phase = Phase::Forwarding;
            self.forward(gesture);
            return;
        };
        tracing::debug!(duration = ?pending.animation.duration(), "interaction started");
        let PendingTransition { animation, perform } = pending;
        self.phase = Phase::Driving {
            animation,
            handle,
            progress: 0.0,
        };
        let settled = self.settled.clone();
        perform(Completion::new(move || {
            tracing::trace!("interactive transition completed");
            if let Some(settled) = settled {
                settled();
            }
        }));
    }

    fn track(&mut self, gesture: &Gesture) -> f64 {
        let progress = self.config.progress(gesture);
        if let Phase::Driving {
            handle,
            progress: current,
            ..
        } = &mut self.phase
        {
            *current = progress;
            handle.update(progress);
        }
        progress
    }

    /// Finish or cancel the interaction in flight and run its cleanup.
    fn resolve(&mut self, finished: bool) {
        let (animation, handle, progress) = match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Driving {
                animation,
                handle,
                progress,
            } => (animation, handle, progress),
            other => {
                self.phase = other;
                return;
            }
        };
        tracing::debug!(finished, progress, "interaction resolved");
        if finished {
            handle.finish();
        } else {
            handle.cancel();
        }
        if let Some(interactive) = animation.interactive() {
            interactive.cleanup();
        }
        self.last_resolution = Some(if finished {
            Resolution::Finished
        } else {
            Resolution::Cancelled
        });
    }

    fn forward(&mut self, gesture: &Gesture) {
        match &mut self.fallback {
            Some(fallback) => fallback.handle(gesture),
            None => tracing::trace!(state = ?gesture.state, "no fallback handler; gesture dropped"),
        }
    }
}

impl<S: InteractionSource> GestureHandler for InteractiveTransition<S> {
    fn handle(&mut self, gesture: &Gesture) {
        match (gesture.state, self.phase()) {
            (GestureState::Began, _) => self.begin(gesture),
            (state, InteractionPhase::Forwarding) => {
                self.forward(gesture);
                if matches!(
                    state,
                    GestureState::Ended | GestureState::Cancelled | GestureState::Failed
                ) {
                    self.phase = Phase::Idle;
                    self.last_resolution = Some(Resolution::Forwarded);
                }
            }
            (GestureState::Changed, InteractionPhase::Driving { .. }) => {
                self.track(gesture);
            }
            (GestureState::Ended, InteractionPhase::Driving { .. }) => {
                let progress = self.track(gesture);
                let finished = self.config.should_finish(progress, gesture.velocity);
                self.resolve(finished);
            }
            (GestureState::Cancelled | GestureState::Failed, InteractionPhase::Driving { .. }) => {
                self.resolve(false);
            }
            (state, _) => tracing::trace!(?state, "gesture update ignored"),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for InteractiveTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match &self.phase {
            Phase::Idle => "idle",
            Phase::Driving { .. } => "driving",
            Phase::Forwarding => "forwarding",
        };
        f.debug_struct("InteractiveTransition")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("phase", &phase)
            .field("has_fallback", &self.fallback.is_some())
            .field("has_settled", &self.settled.is_some())
            .field("last_resolution", &self.last_resolution)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::time::Duration;
    use kurbo::Vec2;
    use wayfinder_navigation::animation::{AnimationContext, InteractiveAnimation};

    /// Interactive animation that records the handle calls it receives.
    #[derive(Default)]
    struct Recorded {
        interactive: bool,
        log: Rc<RefCell<Vec<String>>>,
        cleanups: Cell<usize>,
    }

    impl Animation for Recorded {
        fn duration(&self) -> Duration {
            Duration::from_millis(300)
        }
        fn perform(&self, context: AnimationContext) {
            context.complete(true);
        }
        fn interactive(&self) -> Option<&dyn InteractiveAnimation> {
            self.interactive.then_some(self as &dyn InteractiveAnimation)
        }
    }

    impl InteractiveAnimation for Recorded {
        fn start(&self) -> Option<Rc<dyn InteractionHandle>> {
            self.log.borrow_mut().push("start".into());
            Some(Rc::new(Handle(self.log.clone())) as Rc<dyn InteractionHandle>)
        }
        fn cleanup(&self) {
            self.cleanups.set(self.cleanups.get() + 1);
        }
    }

    struct Handle(Rc<RefCell<Vec<String>>>);

    impl InteractionHandle for Handle {
        fn update(&self, progress: f64) {
            self.0.borrow_mut().push(format!("update {progress:.1}"));
        }
        fn finish(&self) {
            self.0.borrow_mut().push("finish".into());
        }
        fn cancel(&self) {
            self.0.borrow_mut().push("cancel".into());
        }
    }

    struct Source {
        animation: Option<Rc<Recorded>>,
        performed: Rc<Cell<usize>>,
    }

    impl InteractionSource for Source {
        fn begin(&self) -> Option<PendingTransition> {
            let animation = self.animation.clone()?;
            let performed = self.performed.clone();
            Some(PendingTransition::new(animation, move |completion| {
                performed.set(performed.get() + 1);
                completion.complete();
            }))
        }
    }

    fn driven() -> (InteractiveTransition<Source>, Rc<Recorded>, Rc<Cell<usize>>) {
        let animation = Rc::new(Recorded {
            interactive: true,
            ..Recorded::default()
        });
        let performed = Rc::new(Cell::new(0));
        let source = Source {
            animation: Some(animation.clone()),
            performed: performed.clone(),
        };
        (InteractiveTransition::new(source), animation, performed)
    }

    fn at(state: GestureState, x: f64) -> Gesture {
        Gesture::new(state, 100.0).with_translation(Vec2::new(x, 0.0))
    }

    #[test]
    fn release_past_progress_threshold_finishes() {
        let (mut t, animation, performed) = driven();
        t.handle(&at(GestureState::Began, 0.0));
        assert_eq!(performed.get(), 1, "transition performed on began");
        t.handle(&at(GestureState::Changed, 80.0));
        assert_eq!(t.phase(), InteractionPhase::Driving { progress: 0.8 });
        t.handle(&at(GestureState::Ended, 80.0));

        assert_eq!(t.last_resolution(), Some(Resolution::Finished));
        assert_eq!(t.phase(), InteractionPhase::Idle);
        assert_eq!(
            *animation.log.borrow(),
            vec!["start", "update 0.8", "update 0.8", "finish"]
        );
        assert_eq!(animation.cleanups.get(), 1);
    }

    #[test]
    fn release_below_threshold_cancels() {
        let (mut t, animation, _) = driven();
        t.handle(&at(GestureState::Began, 0.0));
        t.handle(&at(GestureState::Changed, 20.0));
        t.handle(&at(GestureState::Ended, 20.0));
        assert_eq!(t.last_resolution(), Some(Resolution::Cancelled));
        assert_eq!(animation.log.borrow().last().map(String::as_str), Some("cancel"));
        assert_eq!(animation.cleanups.get(), 1);
    }

    #[test]
    fn fast_release_finishes_regardless_of_progress() {
        let (mut t, _, _) = driven();
        t.handle(&at(GestureState::Began, 0.0));
        t.handle(&at(GestureState::Changed, 10.0));
        t.handle(&at(GestureState::Ended, 10.0).with_velocity(Vec2::new(2400.0, 0.0)));
        assert_eq!(t.last_resolution(), Some(Resolution::Finished));
    }

    #[test]
    fn interrupted_gesture_cancels() {
        for state in [GestureState::Cancelled, GestureState::Failed] {
            let (mut t, animation, _) = driven();
            t.handle(&at(GestureState::Began, 0.0));
            t.handle(&at(GestureState::Changed, 90.0));
            t.handle(&at(state, 90.0));
            assert_eq!(t.last_resolution(), Some(Resolution::Cancelled));
            assert_eq!(animation.cleanups.get(), 1);
        }
    }

    #[test]
    fn second_began_cancels_interaction_in_flight() {
        let (mut t, animation, performed) = driven();
        t.handle(&at(GestureState::Began, 0.0));
        t.handle(&at(GestureState::Began, 0.0));
        assert_eq!(performed.get(), 2);
        assert_eq!(
            *animation.log.borrow(),
            vec!["start", "cancel", "start"],
            "one handle in flight"
        );
        assert_eq!(animation.cleanups.get(), 1);
    }

    #[test]
    fn missing_animation_forwards_whole_gesture() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let source = Source {
            animation: None,
            performed: Rc::new(Cell::new(0)),
        };
        let mut t = InteractiveTransition::new(source)
            .with_fallback(move |g: &Gesture| s.borrow_mut().push(g.state));

        t.handle(&at(GestureState::Began, 0.0));
        assert_eq!(t.phase(), InteractionPhase::Forwarding);
        t.handle(&at(GestureState::Changed, 70.0));
        t.handle(&at(GestureState::Ended, 70.0));

        assert_eq!(
            *seen.borrow(),
            vec![GestureState::Began, GestureState::Changed, GestureState::Ended]
        );
        assert_eq!(t.last_resolution(), Some(Resolution::Forwarded));
        assert_eq!(t.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn non_interactive_animation_forwards() {
        let animation = Rc::new(Recorded::default());
        let performed = Rc::new(Cell::new(0));
        let source = Source {
            animation: Some(animation.clone()),
            performed: performed.clone(),
        };
        let forwarded = Rc::new(Cell::new(0));
        let f = forwarded.clone();
        let mut t = InteractiveTransition::new(source).with_fallback(move |_: &Gesture| {
            f.set(f.get() + 1);
        });
        t.handle(&at(GestureState::Began, 0.0));
        t.handle(&at(GestureState::Ended, 0.0));
        assert_eq!(forwarded.get(), 2);
        assert_eq!(performed.get(), 0, "nothing is performed without a handle");
    }

    #[test]
    fn updates_without_began_are_ignored() {
        let (mut t, animation, performed) = driven();
        t.handle(&at(GestureState::Changed, 50.0));
        t.handle(&at(GestureState::Ended, 50.0));
        assert_eq!(performed.get(), 0);
        assert!(animation.log.borrow().is_empty());
        assert_eq!(t.last_resolution(), None);
    }
}
