// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deep link across coordinators with different route types.
//!
//! The app coordinator presents a settings coordinator, which pushes an
//! account screen; the account screen's coordinator then opens a section.
//! Each hop is routed by whatever the previous hop introduced. A final hop
//! nobody handles shows how a wiring defect is reported.
//!
//! Run:
//! - `cargo run -p wayfinder_demos --example deep_link`
//! - `RUST_LOG=wayfinder_navigation=trace cargo run -p wayfinder_demos --example deep_link`

use std::cell::Cell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use wayfinder_navigation::coordinator::{Coordinator, RouteHandler};
use wayfinder_navigation::deep_link::hop;
use wayfinder_navigation::headless::{NavigationStack, Scene, SceneEvent};
use wayfinder_navigation::presentable::Presentable;
use wayfinder_navigation::transition::Transition;
use wayfinder_navigation::types::{Completion, Route, TransitionOptions};

#[derive(Debug)]
enum AppRoute {
    Start,
    Settings,
}
impl Route for AppRoute {}

#[derive(Debug)]
enum SettingsRoute {
    Account,
}
impl Route for SettingsRoute {}

#[derive(Debug)]
enum AccountRoute {
    Section(&'static str),
}
impl Route for AccountRoute {}

#[derive(Debug)]
enum UnknownRoute {
    Somewhere,
}
impl Route for UnknownRoute {}

struct App {
    scene: Scene,
}

impl RouteHandler for App {
    type Route = AppRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: AppRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            AppRoute::Start => {
                Transition::set(vec![self.scene.view("start") as Rc<dyn Presentable>], None)
            }
            AppRoute::Settings => {
                let settings = Coordinator::new(
                    SettingsFlow {
                        scene: self.scene.clone(),
                    },
                    self.scene.navigation_stack("settings"),
                );
                Transition::present(settings, None)
            }
        }
    }

    fn initial_route(&self) -> Option<AppRoute> {
        Some(AppRoute::Start)
    }
}

struct SettingsFlow {
    scene: Scene,
}

impl RouteHandler for SettingsFlow {
    type Route = SettingsRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: SettingsRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            SettingsRoute::Account => {
                let account = Coordinator::new(
                    AccountFlow {
                        scene: self.scene.clone(),
                    },
                    self.scene.navigation_stack("account"),
                );
                Transition::push(account, None)
            }
        }
    }
}

struct AccountFlow {
    scene: Scene,
}

impl RouteHandler for AccountFlow {
    type Route = AccountRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: AccountRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            AccountRoute::Section(name) => Transition::push(self.scene.view(name), None),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scene = Scene::new();
    let app = Coordinator::new(
        App {
            scene: scene.clone(),
        },
        scene.navigation_stack("app"),
    );
    scene.set_root(&*app);
    scene.clear_journal();

    let done = Rc::new(Cell::new(false));
    let d = done.clone();
    app.trigger_deep_link(
        AppRoute::Settings,
        vec![hop(SettingsRoute::Account), hop(AccountRoute::Section("privacy"))],
        TransitionOptions::ANIMATED,
        Some(Completion::new(move || d.set(true))),
    );
    let turns = scene.run_until_idle();
    println!("== deep link resolved in {turns} run-loop turns ==");
    for event in scene.journal() {
        println!("  {event:?}");
    }
    assert!(done.get());
    assert!(matches!(
        scene.journal()[..],
        [
            SceneEvent::Present { .. },
            SceneEvent::Push { .. },
            SceneEvent::Push { .. }
        ]
    ));

    // No presentable along the way routes `UnknownRoute`; the defect is logged
    // and the deep link still completes.
    let failed = Rc::new(Cell::new(false));
    let f = failed.clone();
    app.trigger_deep_link(
        AppRoute::Start,
        vec![hop(UnknownRoute::Somewhere)],
        TransitionOptions::IMMEDIATE,
        Some(Completion::new(move || f.set(true))),
    );
    scene.run_until_idle();
    println!("== unresolvable deep link completed: {} ==", failed.get());
}
