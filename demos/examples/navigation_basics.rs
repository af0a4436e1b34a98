// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A stack coordinator and a tab coordinator on the headless backend.
//!
//! A tab bar hosts two stack coordinators. Routes push and pop articles,
//! switch tabs, and a modal settings screen is presented and dismissed.
//! Popped and dismissed units are pruned from the coordinators' children.
//!
//! Run:
//! - `cargo run -p wayfinder_demos --example navigation_basics`
//! - `RUST_LOG=wayfinder_navigation=debug cargo run -p wayfinder_demos --example navigation_basics`

use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use wayfinder_navigation::coordinator::{Coordinator, RouteHandler};
use wayfinder_navigation::headless::{NavigationStack, Scene, TabBar};
use wayfinder_navigation::presentable::{DisplayUnit, Presentable};
use wayfinder_navigation::router::Router;
use wayfinder_navigation::transition::Transition;
use wayfinder_navigation::types::{Completion, Route, TransitionOptions};

#[derive(Clone, Debug)]
enum NewsRoute {
    Feed,
    Article(u32),
    Back,
    BackToFeed,
}
impl Route for NewsRoute {}

struct News {
    scene: Scene,
    section: &'static str,
}

impl RouteHandler for News {
    type Route = NewsRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: NewsRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            NewsRoute::Feed => {
                let feed = self.scene.view(&format!("{} feed", self.section));
                Transition::set(vec![feed as Rc<dyn Presentable>], None)
            }
            NewsRoute::Article(id) => {
                Transition::push(self.scene.view(&format!("article {id}")), None)
            }
            NewsRoute::Back => Transition::pop(None),
            NewsRoute::BackToFeed => Transition::pop_to_root(None),
        }
    }

    fn initial_route(&self) -> Option<NewsRoute> {
        Some(NewsRoute::Feed)
    }
}

#[derive(Clone, Debug)]
enum HomeRoute {
    Tab(usize),
    Settings,
    CloseSettings,
}
impl Route for HomeRoute {}

struct Home {
    scene: Scene,
    tabs: Vec<Rc<Coordinator<News>>>,
}

impl RouteHandler for Home {
    type Route = HomeRoute;
    type Container = TabBar;

    fn prepare_transition(
        &self,
        route: HomeRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<TabBar> {
        match route {
            HomeRoute::Tab(index) => Transition::select_index(index),
            HomeRoute::Settings => Transition::present(self.scene.view("settings"), None),
            HomeRoute::CloseSettings => Transition::dismiss(None),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scene = Scene::new();
    let world = Coordinator::new(
        News {
            scene: scene.clone(),
            section: "world",
        },
        scene.navigation_stack("world"),
    );
    let sports = Coordinator::new(
        News {
            scene: scene.clone(),
            section: "sports",
        },
        scene.navigation_stack("sports"),
    );
    let home = Coordinator::new(
        Home {
            scene: scene.clone(),
            tabs: vec![world.clone(), sports.clone()],
        },
        scene.tab_bar("home"),
    );
    // The tabs become children of the home coordinator.
    let tabs = Transition::set_tabs(
        home.handler()
            .tabs
            .iter()
            .map(|tab| tab.clone() as Rc<dyn Presentable>)
            .collect(),
    );
    home.perform_transition(tabs, TransitionOptions::IMMEDIATE, Completion::noop());
    scene.set_root(&*home);

    world.trigger(NewsRoute::Article(1));
    world.trigger(NewsRoute::Article(2));
    scene.run_until_idle();
    println!("== world stack ==\n  {:?}", stack_of(&scene, &world));

    world.trigger(NewsRoute::Back);
    scene.run_until_idle();
    println!("== after back ==\n  {:?}", stack_of(&scene, &world));
    assert_eq!(world.children().len(), 2, "feed and article 1 remain");

    home.trigger(HomeRoute::Tab(1));
    sports.trigger(NewsRoute::Article(7));
    scene.run_until_idle();
    let home_id = home.display_unit().map(|unit| unit.id());
    println!(
        "== sports tab ==\n  selected {:?}, stack {:?}",
        home_id.and_then(|id| scene.selected_index(id)),
        stack_of(&scene, &sports)
    );

    home.trigger(HomeRoute::Settings);
    scene.run_until_idle();
    println!("== settings presented ==\n  children {}", home.children().len());
    home.trigger(HomeRoute::CloseSettings);
    scene.run_until_idle();
    println!("== settings dismissed ==\n  children {}", home.children().len());
    assert_eq!(home.children().len(), 2, "only the tabs remain");

    world.trigger(NewsRoute::BackToFeed);
    scene.run_until_idle();
    assert_eq!(stack_of(&scene, &world).len(), 1);

    println!("== journal ==");
    for event in scene.journal() {
        println!("  {event:?}");
    }
}

fn stack_of(scene: &Scene, coordinator: &Coordinator<News>) -> Vec<String> {
    coordinator
        .root()
        .map(|root| scene.children_of(root.id()))
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}
