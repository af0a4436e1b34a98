// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend.
//!
//! A [`Scene`] owns a display hierarchy of [`Node`]s and a manual [`RunLoop`].
//! Nodes implement every container trait their kind supports, record each
//! operation as a [`SceneEvent`], and report their [`Attachment`] from the
//! scene's links. Animated operations complete on a later run-loop turn, so
//! tests and demos decide when time passes:
//!
//! ```
//! use wayfinder_navigation::container::StackContainer;
//! use wayfinder_navigation::headless::Scene;
//! use wayfinder_navigation::presentable::DisplayUnit;
//! use wayfinder_navigation::types::{Completion, TransitionOptions};
//!
//! let scene = Scene::new();
//! let nav = scene.navigation_stack("nav");
//! let home = scene.view("home");
//! nav.push(home.clone(), None, TransitionOptions::ANIMATED, Completion::noop());
//! assert_eq!(scene.pending(), 1);
//! scene.run_until_idle();
//! assert_eq!(scene.children_of(nav.id()), vec![home.id()]);
//! ```
//!
//! [`Attachment`]: crate::types::Attachment

mod animation;
mod scene;

pub use animation::{DrivenAnimation, DrivenHandle, RunLoop, TimedAnimation};
pub use scene::{
    DEFAULT_ANIMATION_DURATION, NavigationStack, Node, PageView, Pages, Plain, Scene, SceneEvent,
    Split, SplitView, Stack, TabBar, Tabs, View,
};
