// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=wayfinder_interactive --heading-base-level=0

//! Wayfinder Interactive: drive navigation transitions with continuous gestures.
//!
//! ## Overview
//!
//! A swipe-back or pull-to-dismiss gesture should scrub the same animation a
//! button press would play, and either complete or revert it when released.
//! This crate keeps a transition in sync with a gesture's discrete states
//! (`Began`, `Changed`, `Ended`, `Cancelled`, `Failed`) through the
//! interactive hooks of [`wayfinder_navigation::animation`].
//!
//! It does not recognize gestures. Feed it [`Gesture`](crate::types::Gesture)
//! updates from your toolkit's recognizer; translation and velocity are
//! [`kurbo::Vec2`] values.
//!
//! ## Progress and resolution
//!
//! Progress is the translation projected onto
//! [`InteractionConfig::axis`](crate::types::InteractionConfig::axis), divided
//! by the gesture's extent and clamped to `0..=1`. On release, the transition
//! finishes when the velocity along the axis exceeds the velocity threshold or
//! the progress exceeds the progress threshold; otherwise it is cancelled and
//! the container reverts the operation.
//!
//! ## Sources
//!
//! An [`InteractionSource`](crate::interaction::InteractionSource) supplies the
//! transition to drive. [`ActiveDismissal`](crate::sources::ActiveDismissal)
//! dismisses a unit with the animation it was shown with;
//! [`CoordinatorInteraction`](crate::sources::CoordinatorInteraction) drives a
//! coordinator's route. When a source has nothing interactive to drive, the
//! gesture goes to the fallback handler unchanged.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::Vec2;
//! use wayfinder_interactive::interaction::{GestureHandler, InteractiveTransition};
//! use wayfinder_interactive::sources::ActiveDismissal;
//! use wayfinder_interactive::types::{Gesture, GestureState, Resolution};
//! use wayfinder_navigation::animation::TransitionAnimation;
//! use wayfinder_navigation::container::StackContainer;
//! use wayfinder_navigation::headless::Scene;
//! use wayfinder_navigation::presentable::DisplayUnit;
//! use wayfinder_navigation::types::{Completion, TransitionOptions};
//!
//! let scene = Scene::new();
//! let nav = scene.navigation_stack("nav");
//! let (home, detail) = (scene.view("home"), scene.view("detail"));
//! let swipe = Rc::new(TransitionAnimation::symmetric(scene.driven_animation(300)));
//! nav.push(home.clone(), None, TransitionOptions::IMMEDIATE, Completion::noop());
//! nav.push(detail.clone(), Some(swipe), TransitionOptions::IMMEDIATE, Completion::noop());
//!
//! let stack = nav.clone();
//! let mut back = InteractiveTransition::new(ActiveDismissal::new(
//!     scene.clone(),
//!     detail.id(),
//!     move |done| stack.pop(None, TransitionOptions::ANIMATED, done),
//! ));
//! let at = |state, x| Gesture::new(state, 320.0).with_translation(Vec2::new(x, 0.0));
//! back.handle(&at(GestureState::Began, 0.0));
//! back.handle(&at(GestureState::Changed, 240.0));
//! back.handle(&at(GestureState::Ended, 240.0));
//!
//! assert_eq!(back.last_resolution(), Some(Resolution::Finished));
//! assert_eq!(scene.children_of(nav.id()), vec![home.id()]);
//! ```

pub mod interaction;
pub mod sources;
pub mod types;
