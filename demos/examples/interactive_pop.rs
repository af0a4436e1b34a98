// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive swipe-back on a stack.
//!
//! The detail screen is pushed with a driven animation, which becomes its
//! active animation. Swipes drive the pop through that animation: a short
//! swipe is cancelled and reverted, a long one or a flick finishes it. The
//! feed at the bottom has no active animation, so swipes there go to the
//! fallback handler.
//!
//! Run:
//! - `cargo run -p wayfinder_demos --example interactive_pop`

use std::rc::Rc;

use kurbo::Vec2;
use tracing_subscriber::EnvFilter;
use wayfinder_interactive::interaction::{GestureHandler, InteractiveTransition};
use wayfinder_interactive::sources::ActiveDismissal;
use wayfinder_interactive::types::{Gesture, GestureState, Resolution};
use wayfinder_navigation::animation::TransitionAnimation;
use wayfinder_navigation::container::StackContainer;
use wayfinder_navigation::headless::{NavigationStack, Scene};
use wayfinder_navigation::presentable::DisplayUnit;
use wayfinder_navigation::types::{Completion, TransitionOptions, UnitId};

const WIDTH: f64 = 390.0;

fn swipe(handler: &mut impl GestureHandler, distance: f64, velocity: f64) {
    let at = |state| {
        Gesture::new(state, WIDTH)
            .with_translation(Vec2::new(distance, 0.0))
            .with_velocity(Vec2::new(velocity, 0.0))
    };
    handler.handle(&at(GestureState::Began));
    handler.handle(&at(GestureState::Changed));
    handler.handle(&at(GestureState::Ended));
}

fn swipe_back(
    scene: &Scene,
    nav: &Rc<NavigationStack>,
    unit: UnitId,
) -> InteractiveTransition<ActiveDismissal<Scene>> {
    let nav = nav.clone();
    InteractiveTransition::new(ActiveDismissal::new(scene.clone(), unit, move |done| {
        nav.pop(None, TransitionOptions::ANIMATED, done);
    }))
    .with_fallback(|gesture: &Gesture| {
        println!("  fallback received {:?}", gesture.state);
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scene = Scene::new();
    let nav = scene.navigation_stack("nav");
    let feed = scene.view("feed");
    let detail = scene.view("detail");
    let driven = scene.driven_animation(350);
    nav.push(feed.clone(), None, TransitionOptions::IMMEDIATE, Completion::noop());
    nav.push(
        detail.clone(),
        Some(Rc::new(TransitionAnimation::symmetric(driven.clone()))),
        TransitionOptions::ANIMATED,
        Completion::noop(),
    );
    scene.run_until_idle();

    let mut back = swipe_back(&scene, &nav, detail.id());

    swipe(&mut back, 80.0, 0.0);
    println!(
        "== short swipe ==\n  {:?}, stack {:?}",
        back.last_resolution(),
        scene.children_of(nav.id())
    );
    assert_eq!(back.last_resolution(), Some(Resolution::Cancelled));
    assert!(detail.is_attached());

    swipe(&mut back, 60.0, 1400.0);
    println!(
        "== flick ==\n  {:?}, stack {:?}",
        back.last_resolution(),
        scene.children_of(nav.id())
    );
    assert_eq!(back.last_resolution(), Some(Resolution::Finished));
    assert!(!detail.is_attached());

    println!(
        "  interactions started {}, cleaned up {}",
        driven.starts(),
        driven.cleanups()
    );
    assert!(driven.handle().is_none(), "cleanup releases the handle");

    println!("== swipe on the feed ==");
    let mut at_root = swipe_back(&scene, &nav, feed.id());
    swipe(&mut at_root, 300.0, 0.0);
    assert_eq!(at_root.last_resolution(), Some(Resolution::Forwarded));
}
