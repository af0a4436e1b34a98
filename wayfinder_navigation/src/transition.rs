// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition composition and execution.
//!
//! ## Overview
//!
//! A [`Transition`] describes a navigational operation as data and executes it
//! once against a container, completing exactly once after every sub-effect
//! (animations included) has settled.
//!
//! ## Components
//!
//! Components are constrained to the container capability they need when they
//! are built, through `impl` blocks bounded on the container traits:
//!
//! - Any [`Container`]: [`none`](Transition::none), [`multiple`](Transition::multiple),
//!   [`run`](Transition::run), [`present`](Transition::present), [`dismiss`](Transition::dismiss),
//!   [`dismiss_to_root`](Transition::dismiss_to_root), [`embed`](Transition::embed),
//!   [`trigger`](Transition::trigger), [`route`](Transition::route).
//! - [`StackContainer`]: `push`, `pop`, `pop_to_root`, `pop_to`, `set`.
//! - [`TabContainer`]: `set_tabs`, `select`, `select_index`.
//! - [`SplitContainer`]: `show`, `show_detail`.
//! - [`PageContainer`]: `set_pages`.
//!
//! A stack transition cannot be built for a tab container, so there is no
//! "unsupported transition" error at runtime.
//!
//! ## Presentables
//!
//! Each transition lists the presentables it introduces, in order. The list is
//! used for bookkeeping (child registration, deep-link context) and does not
//! drive execution order.

use core::fmt;
use std::rc::Rc;

use crate::animation::{Animation, TransitionAnimation};
use crate::container::{
    Container, PageContainer, PageDirection, SplitContainer, StackContainer, TabContainer, unit_of,
};
use crate::coordinator::{Coordinator, RouteHandler};
use crate::defect::{self, WiringDefect};
use crate::presentable::{Presentable, UnitRef};
use crate::router::Router;
use crate::types::{Completion, Route, TransitionOptions};

type PerformFn<C> = dyn Fn(&Rc<C>, TransitionOptions, Completion);

/// A composable navigational operation bound to container type `C`.
pub struct Transition<C> {
    presentables: Vec<Rc<dyn Presentable>>,
    animation: Option<Rc<dyn Animation>>,
    perform: Rc<PerformFn<C>>,
}

impl<C> Clone for Transition<C> {
    fn clone(&self) -> Self {
        Self {
            presentables: self.presentables.clone(),
            animation: self.animation.clone(),
            perform: self.perform.clone(),
        }
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("presentables", &self.presentables.len())
            .field("animation", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Container> Transition<C> {
    /// Build a transition from its parts.
    ///
    /// `perform` must complete the [`Completion`] it is given; if it drops it
    /// instead, the completion still fires (see [`Completion`]).
    pub fn new(
        presentables: Vec<Rc<dyn Presentable>>,
        animation: Option<Rc<dyn Animation>>,
        perform: impl Fn(&Rc<C>, TransitionOptions, Completion) + 'static,
    ) -> Self {
        Self {
            presentables,
            animation,
            perform: Rc::new(perform),
        }
    }

    /// Presentables this transition introduces, in order.
    pub fn presentables(&self) -> &[Rc<dyn Presentable>] {
        &self.presentables
    }

    /// The animation this transition applies, if any.
    pub fn animation(&self) -> Option<&Rc<dyn Animation>> {
        self.animation.as_ref()
    }

    /// Execute against `container`.
    pub fn perform(&self, container: &Rc<C>, options: TransitionOptions, completion: Completion) {
        (self.perform)(container, options, completion);
    }

    /// A transition with no effect.
    pub fn none() -> Self {
        Self::new(Vec::new(), None, |_, _, completion| completion.complete())
    }

    /// Run `transitions` strictly in order, each starting from the previous one's completion.
    ///
    /// Presentables are concatenated; the animation is the last one any step applies.
    pub fn multiple(transitions: impl IntoIterator<Item = Self>) -> Self {
        let steps: Rc<[Self]> = transitions.into_iter().collect();
        let presentables = steps
            .iter()
            .flat_map(|t| t.presentables.iter().cloned())
            .collect();
        let animation = steps.iter().rev().find_map(|t| t.animation.clone());
        Self::new(presentables, animation, move |container, options, completion| {
            perform_steps(steps.clone(), 0, container.clone(), options, completion);
        })
    }

    /// Run a side effect, then complete.
    pub fn run(effect: impl Fn() + 'static) -> Self {
        Self::new(Vec::new(), None, move |_, _, completion| {
            effect();
            completion.complete();
        })
    }

    /// Present `presentable` modally.
    pub fn present(
        presentable: Rc<dyn Presentable>,
        animation: Option<Rc<TransitionAnimation>>,
    ) -> Self {
        let in_use = presentation_of(animation.as_ref());
        Self::show_one("present", presentable, in_use, move |container, unit, options, done| {
            container.present(unit, animation.clone(), options, done);
        })
    }

    /// Dismiss the topmost presented unit.
    pub fn dismiss(animation: Option<Rc<TransitionAnimation>>) -> Self {
        let in_use = dismissal_of(animation.as_ref());
        Self::new(Vec::new(), in_use, move |container, options, completion| {
            container.dismiss(animation.clone(), options, completion);
        })
    }

    /// Dismiss everything presented from the container.
    pub fn dismiss_to_root(animation: Option<Rc<TransitionAnimation>>) -> Self {
        let in_use = dismissal_of(animation.as_ref());
        Self::new(Vec::new(), in_use, move |container, options, completion| {
            container.dismiss_to_root(animation.clone(), options, completion);
        })
    }

    /// Embed `presentable` into the slot `into`.
    pub fn embed(presentable: Rc<dyn Presentable>, into: UnitRef) -> Self {
        Self::show_one("embed", presentable, None, move |container, unit, options, done| {
            container.embed(unit, into.clone(), options, done);
        })
    }

    /// Trigger `route` on a foreign router. Introduces nothing by itself.
    pub fn trigger<R, T>(route: R, router: T) -> Self
    where
        R: Route + Clone,
        T: Router<R>,
    {
        Self::new(Vec::new(), None, move |_, options, completion| {
            router.trigger_route(route.clone(), options, Some(completion));
        })
    }

    /// Route `route` on a foreign coordinator.
    ///
    /// The coordinator's transition is prepared now; its presentables and
    /// animation become this transition's own. Execution delegates to the
    /// coordinator's own [`perform_transition`](Coordinator::perform_transition).
    pub fn route<H: RouteHandler>(route: H::Route, coordinator: &Rc<Coordinator<H>>) -> Self {
        let prepared = coordinator.prepare_transition(route);
        let presentables = prepared.presentables.clone();
        let animation = prepared.animation.clone();
        let coordinator = coordinator.clone();
        Self::new(presentables, animation, move |_, options, completion| {
            coordinator.perform_transition(prepared.clone(), options, completion);
        })
    }

    fn show_one(
        context: &'static str,
        presentable: Rc<dyn Presentable>,
        animation: Option<Rc<dyn Animation>>,
        op: impl Fn(&Rc<C>, UnitRef, TransitionOptions, Completion) + 'static,
    ) -> Self {
        let shown = presentable.clone();
        Self::new(
            vec![presentable],
            animation,
            move |container, options, completion| {
                let Some(unit) = shown.display_unit() else {
                    defect::report(&WiringDefect::MissingDisplayUnit { context });
                    completion.complete();
                    return;
                };
                let done = presented_then(vec![shown.clone()], unit_of(container), completion);
                op(container, unit, options, done);
            },
        )
    }

    fn show_many(
        context: &'static str,
        presentables: Vec<Rc<dyn Presentable>>,
        animation: Option<Rc<dyn Animation>>,
        op: impl Fn(&Rc<C>, Vec<UnitRef>, TransitionOptions, Completion) + 'static,
    ) -> Self {
        let shown = presentables.clone();
        Self::new(
            presentables,
            animation,
            move |container, options, completion| {
                let units = units_of(context, &shown);
                let done = presented_then(shown.clone(), unit_of(container), completion);
                op(container, units, options, done);
            },
        )
    }
}

impl<C: StackContainer> Transition<C> {
    /// Push `presentable` onto the stack.
    pub fn push(
        presentable: Rc<dyn Presentable>,
        animation: Option<Rc<TransitionAnimation>>,
    ) -> Self {
        let in_use = presentation_of(animation.as_ref());
        Self::show_one("push", presentable, in_use, move |container, unit, options, done| {
            container.push(unit, animation.clone(), options, done);
        })
    }

    /// Pop the top unit.
    pub fn pop(animation: Option<Rc<TransitionAnimation>>) -> Self {
        let in_use = dismissal_of(animation.as_ref());
        Self::new(Vec::new(), in_use, move |container, options, completion| {
            container.pop(animation.clone(), options, completion);
        })
    }

    /// Pop down to the bottom unit.
    pub fn pop_to_root(animation: Option<Rc<TransitionAnimation>>) -> Self {
        let in_use = dismissal_of(animation.as_ref());
        Self::new(Vec::new(), in_use, move |container, options, completion| {
            container.pop_to_root(animation.clone(), options, completion);
        })
    }

    /// Pop until `presentable` is on top.
    pub fn pop_to(
        presentable: Rc<dyn Presentable>,
        animation: Option<Rc<TransitionAnimation>>,
    ) -> Self {
        let in_use = dismissal_of(animation.as_ref());
        Self::new(Vec::new(), in_use, move |container, options, completion| {
            let Some(unit) = presentable.display_unit() else {
                defect::report(&WiringDefect::MissingDisplayUnit { context: "pop_to" });
                completion.complete();
                return;
            };
            container.pop_to(unit, animation.clone(), options, completion);
        })
    }

    /// Replace the whole stack.
    pub fn set(
        presentables: Vec<Rc<dyn Presentable>>,
        animation: Option<Rc<TransitionAnimation>>,
    ) -> Self {
        let in_use = presentation_of(animation.as_ref());
        Self::show_many("set", presentables, in_use, move |container, units, options, done| {
            container.set_stack(units, animation.clone(), options, done);
        })
    }
}

impl<C: TabContainer> Transition<C> {
    /// Replace the tabs.
    pub fn set_tabs(presentables: Vec<Rc<dyn Presentable>>) -> Self {
        Self::show_many("set_tabs", presentables, None, |container, units, options, done| {
            container.set_tabs(units, options, done);
        })
    }

    /// Select the tab showing `presentable`.
    pub fn select(presentable: Rc<dyn Presentable>) -> Self {
        Self::show_one("select", presentable, None, |container, unit, options, done| {
            container.select(unit, options, done);
        })
    }

    /// Select the tab at `index`.
    pub fn select_index(index: usize) -> Self {
        Self::new(Vec::new(), None, move |container, options, completion| {
            container.select_index(index, options, completion);
        })
    }
}

impl<C: SplitContainer> Transition<C> {
    /// Show `presentable` in the primary column.
    pub fn show(presentable: Rc<dyn Presentable>) -> Self {
        Self::show_one("show", presentable, None, |container, unit, options, done| {
            container.show(unit, options, done);
        })
    }

    /// Show `presentable` in the detail column.
    pub fn show_detail(presentable: Rc<dyn Presentable>) -> Self {
        Self::show_one("show_detail", presentable, None, |container, unit, options, done| {
            container.show_detail(unit, options, done);
        })
    }
}

impl<C: PageContainer> Transition<C> {
    /// Replace the visible pages.
    pub fn set_pages(presentables: Vec<Rc<dyn Presentable>>, direction: PageDirection) -> Self {
        Self::show_many("set_pages", presentables, None, move |container, units, options, done| {
            container.set_pages(units, direction, options, done);
        })
    }
}

fn perform_steps<C: Container>(
    steps: Rc<[Transition<C>]>,
    index: usize,
    container: Rc<C>,
    options: TransitionOptions,
    completion: Completion,
) {
    let Some(step) = steps.get(index).cloned() else {
        completion.complete();
        return;
    };
    tracing::trace!(step = index, of = steps.len(), "performing step");
    let next = {
        let container = container.clone();
        Completion::new(move || perform_steps(steps, index + 1, container, options, completion))
    };
    step.perform(&container, options, next);
}

fn presentation_of(animation: Option<&Rc<TransitionAnimation>>) -> Option<Rc<dyn Animation>> {
    animation.and_then(|a| a.presentation.clone())
}

fn dismissal_of(animation: Option<&Rc<TransitionAnimation>>) -> Option<Rc<dyn Animation>> {
    animation.and_then(|a| a.dismissal.clone())
}

/// Display units of `presentables`, reporting any that have none.
fn units_of(context: &'static str, presentables: &[Rc<dyn Presentable>]) -> Vec<UnitRef> {
    presentables
        .iter()
        .filter_map(|p| {
            let unit = p.display_unit();
            if unit.is_none() {
                defect::report(&WiringDefect::MissingDisplayUnit { context });
            }
            unit
        })
        .collect()
}

/// Completion that notifies `shown` they were presented from `from`, then runs `completion`.
fn presented_then(
    shown: Vec<Rc<dyn Presentable>>,
    from: UnitRef,
    completion: Completion,
) -> Completion {
    Completion::new(move || {
        for presentable in &shown {
            presentable.presented(Some(&from));
        }
        completion.complete();
    })
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::headless::{NavigationStack, Scene, SceneEvent, TabBar};
    use crate::presentable::DisplayUnit;
    use crate::types::UnitId;
    use std::cell::{Cell, RefCell};

    fn counter() -> (Rc<Cell<usize>>, Completion) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Completion::new(move || c.set(c.get() + 1)))
    }

    fn recording(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> Transition<NavigationStack> {
        let log = log.clone();
        Transition::run(move || log.borrow_mut().push(name))
    }

    #[test]
    fn none_completes_once() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let (count, done) = counter();
        Transition::<NavigationStack>::none().perform(&nav, TransitionOptions::default(), done);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn empty_multiple_completes_immediately() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let (count, done) = counter();
        Transition::<NavigationStack>::multiple(Vec::new()).perform(
            &nav,
            TransitionOptions::default(),
            done,
        );
        assert_eq!(count.get(), 1);
        assert!(scene.journal().is_empty());
    }

    #[test]
    fn multiple_preserves_order_and_completes_last() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = scene.view("a");
        let b = scene.view("b");
        let t = Transition::multiple([
            recording(&log, "first"),
            Transition::push(a.clone(), None),
            recording(&log, "second"),
            Transition::push(b.clone(), None),
            recording(&log, "third"),
        ]);
        assert_eq!(t.presentables().len(), 2);

        let completed = Rc::new(Cell::new(false));
        let c = completed.clone();
        let l = log.clone();
        t.perform(
            &nav,
            TransitionOptions::ANIMATED,
            Completion::new(move || {
                assert_eq!(l.borrow().len(), 3, "completion must follow the last step");
                c.set(true);
            }),
        );
        // The animated pushes suspend the chain between run-loop turns.
        assert_eq!(*log.borrow(), vec!["first"]);
        assert!(!completed.get());

        scene.run_until_idle();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert!(completed.get());
        assert_eq!(
            scene.journal(),
            vec![
                SceneEvent::Push {
                    container: nav.id(),
                    unit: a.id()
                },
                SceneEvent::Push {
                    container: nav.id(),
                    unit: b.id()
                },
            ]
        );
    }

    #[test]
    fn multiple_uses_last_animation() {
        let scene = Scene::new();
        let first = TransitionAnimation::symmetric(scene.timed_animation(1));
        let last = scene.timed_animation(2);
        let t = Transition::<NavigationStack>::multiple([
            Transition::push(scene.view("a"), Some(Rc::new(first))),
            Transition::push(
                scene.view("b"),
                Some(Rc::new(TransitionAnimation::symmetric(last.clone()))),
            ),
            Transition::none(),
        ]);
        let in_use = t.animation().expect("last animation");
        assert!(core::ptr::addr_eq(Rc::as_ptr(in_use), Rc::as_ptr(&last)));
    }

    #[test]
    fn push_notifies_presented_after_completion() {
        struct Witness {
            unit: Rc<crate::headless::View>,
            from: RefCell<Option<UnitId>>,
        }
        impl Presentable for Witness {
            fn display_unit(&self) -> Option<UnitRef> {
                Some(self.unit.clone() as UnitRef)
            }
            fn presented(&self, from: Option<&UnitRef>) {
                *self.from.borrow_mut() = from.map(|u| u.id());
            }
        }

        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let witness = Rc::new(Witness {
            unit: scene.view("witness"),
            from: RefCell::new(None),
        });
        Transition::push(witness.clone(), None).perform(
            &nav,
            TransitionOptions::ANIMATED,
            Completion::noop(),
        );
        assert_eq!(*witness.from.borrow(), None);
        scene.run_until_idle();
        assert_eq!(*witness.from.borrow(), Some(nav.id()));
    }

    #[test]
    fn presentable_without_unit_still_completes() {
        struct Ghost;
        impl Presentable for Ghost {
            fn display_unit(&self) -> Option<UnitRef> {
                None
            }
        }
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let (count, done) = counter();
        Transition::push(Rc::new(Ghost), None).perform(&nav, TransitionOptions::IMMEDIATE, done);
        assert_eq!(count.get(), 1);
        assert!(scene.journal().is_empty());
    }

    #[test]
    fn tab_components_select_by_unit_and_index() {
        let scene = Scene::new();
        let tabs: Rc<TabBar> = scene.tab_bar("tabs");
        let a = scene.view("a");
        let b = scene.view("b");
        Transition::set_tabs(vec![a.clone() as Rc<dyn Presentable>, b.clone()]).perform(
            &tabs,
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        assert_eq!(scene.selected_index(tabs.id()), Some(0));
        Transition::select(b.clone()).perform(
            &tabs,
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        assert_eq!(scene.selected_index(tabs.id()), Some(1));
        Transition::<TabBar>::select_index(0).perform(
            &tabs,
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        assert_eq!(scene.selected_index(tabs.id()), Some(0));
    }
}
