// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Vec2;
use wayfinder_interactive::interaction::{GestureHandler, InteractiveTransition};
use wayfinder_interactive::sources::ActiveDismissal;
use wayfinder_interactive::types::{Gesture, GestureState};
use wayfinder_navigation::animation::TransitionAnimation;
use wayfinder_navigation::container::StackContainer;
use wayfinder_navigation::coordinator::{Coordinator, RouteHandler};
use wayfinder_navigation::headless::{NavigationStack, Scene, View};
use wayfinder_navigation::presentable::{DisplayUnit, Presentable};
use wayfinder_navigation::router::Router;
use wayfinder_navigation::transition::Transition;
use wayfinder_navigation::types::{Completion, Route, TransitionOptions};

fn views(scene: &Scene, n: usize) -> Vec<Rc<View>> {
    (0..n).map(|i| scene.view(&format!("v{i}"))).collect()
}

fn bench_multiple(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiple_push");
    for &n in &[8_usize, 64, 256] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("immediate_n{n}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let nav = scene.navigation_stack("nav");
                    let units = views(&scene, n);
                    (scene, nav, units)
                },
                |(scene, nav, units)| {
                    let t = Transition::multiple(
                        units
                            .iter()
                            .map(|u| Transition::push(u.clone() as Rc<dyn Presentable>, None)),
                    );
                    t.perform(&nav, TransitionOptions::IMMEDIATE, Completion::noop());
                    black_box(scene.children_of(nav.id()).len());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("animated_n{n}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let nav = scene.navigation_stack("nav");
                    let units = views(&scene, n);
                    (scene, nav, units)
                },
                |(scene, nav, units)| {
                    let t = Transition::multiple(
                        units
                            .iter()
                            .map(|u| Transition::push(u.clone() as Rc<dyn Presentable>, None)),
                    );
                    t.perform(&nav, TransitionOptions::ANIMATED, Completion::noop());
                    black_box(scene.run_until_idle());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

#[derive(Clone, Debug)]
enum StackRoute {
    Push,
    PopToRoot,
}
impl Route for StackRoute {}

struct Pusher {
    scene: Scene,
}

impl RouteHandler for Pusher {
    type Route = StackRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: StackRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            StackRoute::Push => Transition::push(self.scene.view("screen"), None),
            StackRoute::PopToRoot => Transition::pop_to_root(None),
        }
    }
}

fn bench_pruning(c: &mut Criterion) {
    let mut group = c.benchmark_group("pruning");
    for &n in &[16_usize, 128, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("pop_to_root_n{n}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let coordinator = Coordinator::new(
                        Pusher {
                            scene: scene.clone(),
                        },
                        scene.navigation_stack("root"),
                    );
                    scene.set_root(&*coordinator);
                    for _ in 0..n {
                        coordinator.trigger_route(
                            StackRoute::Push,
                            TransitionOptions::IMMEDIATE,
                            None,
                        );
                    }
                    (scene, coordinator)
                },
                |(scene, coordinator)| {
                    coordinator.trigger_route(
                        StackRoute::PopToRoot,
                        TransitionOptions::IMMEDIATE,
                        None,
                    );
                    black_box(coordinator.children().len());
                    drop(scene);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_interactive(c: &mut Criterion) {
    let mut group = c.benchmark_group("interactive_pop");
    for &steps in &[10_usize, 120] {
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_function(format!("gesture_steps_{steps}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let nav = scene.navigation_stack("nav");
                    let units = views(&scene, 2);
                    let driven = scene.driven_animation(300);
                    nav.push(
                        units[0].clone(),
                        None,
                        TransitionOptions::IMMEDIATE,
                        Completion::noop(),
                    );
                    nav.push(
                        units[1].clone(),
                        Some(Rc::new(TransitionAnimation::symmetric(driven))),
                        TransitionOptions::IMMEDIATE,
                        Completion::noop(),
                    );
                    let stack = nav.clone();
                    let source = ActiveDismissal::new(scene.clone(), units[1].id(), move |done| {
                        stack.pop(None, TransitionOptions::ANIMATED, done);
                    });
                    (scene, nav, units, InteractiveTransition::new(source))
                },
                |(scene, nav, units, mut interaction)| {
                    let at = |state, x: f64| {
                        Gesture::new(state, 400.0).with_translation(Vec2::new(x, 0.0))
                    };
                    interaction.handle(&at(GestureState::Began, 0.0));
                    for step in 1..=steps {
                        let x = 400.0 * step as f64 / steps as f64;
                        interaction.handle(&at(GestureState::Changed, x));
                    }
                    interaction.handle(&at(GestureState::Ended, 400.0));
                    black_box((scene.children_of(nav.id()).len(), units.len()));
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_multiple, bench_pruning, bench_interactive);
criterion_main!(benches);
