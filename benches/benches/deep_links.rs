// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use wayfinder_navigation::coordinator::{Coordinator, RouteHandler};
use wayfinder_navigation::deep_link::{DeepLinkHop, hop};
use wayfinder_navigation::headless::{NavigationStack, Scene};
use wayfinder_navigation::transition::Transition;
use wayfinder_navigation::types::{Completion, Route, TransitionOptions};

#[derive(Debug)]
enum LevelRoute {
    Deeper,
}
impl Route for LevelRoute {}

/// Each level pushes a coordinator for the next level onto its stack.
struct Level {
    scene: Scene,
}

impl RouteHandler for Level {
    type Route = LevelRoute;
    type Container = NavigationStack;

    fn prepare_transition(
        &self,
        route: LevelRoute,
        _coordinator: &Coordinator<Self>,
    ) -> Transition<NavigationStack> {
        match route {
            LevelRoute::Deeper => {
                let next = Coordinator::new(
                    Self {
                        scene: self.scene.clone(),
                    },
                    self.scene.navigation_stack("level"),
                );
                Transition::push(next, None)
            }
        }
    }
}

#[derive(Debug)]
enum Missing {
    Nowhere,
}
impl Route for Missing {}

fn root(scene: &Scene) -> std::rc::Rc<Coordinator<Level>> {
    let root = Coordinator::new(
        Level {
            scene: scene.clone(),
        },
        scene.navigation_stack("root"),
    );
    scene.set_root(&*root);
    root
}

fn hops(n: usize) -> Vec<Box<dyn DeepLinkHop>> {
    (0..n).map(|_| hop(LevelRoute::Deeper)).collect()
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_link");
    for &n in &[4_usize, 16, 64] {
        group.throughput(Throughput::Elements(n as u64 + 1));
        group.bench_function(format!("nested_levels_{n}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let root = root(&scene);
                    (scene, root, hops(n))
                },
                |(scene, root, remainder)| {
                    root.trigger_deep_link(
                        LevelRoute::Deeper,
                        remainder,
                        TransitionOptions::IMMEDIATE,
                        None,
                    );
                    black_box(scene.journal().len());
                },
                BatchSize::SmallInput,
            );
        });
        // Every context is scanned and discarded before the defect is reported.
        group.bench_function(format!("unresolvable_after_{n}"), |b| {
            b.iter_batched(
                || {
                    let scene = Scene::new();
                    let root = root(&scene);
                    let mut remainder = hops(n);
                    remainder.push(hop(Missing::Nowhere));
                    (scene, root, remainder)
                },
                |(scene, root, remainder)| {
                    root.trigger_deep_link(
                        LevelRoute::Deeper,
                        remainder,
                        TransitionOptions::ANIMATED,
                        Some(Completion::noop()),
                    );
                    black_box(scene.run_until_idle());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
