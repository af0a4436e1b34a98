// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router capability and ownership variants.
//!
//! ## Overview
//!
//! A [`Router`] can trigger routes of one type. Code that only needs to
//! navigate depends on `Router<R>` rather than on a concrete coordinator or
//! container.
//!
//! ## Ownership
//!
//! Routers are shared through one of three handles with identical contracts:
//!
//! - [`StrongRouter`] keeps its target alive. Use it for coordinators that are
//!   not yet attached to the display hierarchy.
//! - [`UnownedRouter`] assumes the display hierarchy keeps the target alive.
//!   Using it after the target was released panics.
//! - [`WeakRouter`] tolerates disappearance: triggering through an expired
//!   handle does nothing and still completes.
//!
//! ## Discovery
//!
//! [`router_for`] asks a [`Presentable`] whether it can route a given route
//! type. Deep links use it to find the next router on their context stack.

use core::any::{Any, TypeId, type_name};
use core::fmt;
use std::rc::{Rc, Weak};

use crate::animation::Animation;
use crate::container::Container;
use crate::lifecycle::OwnershipCell;
use crate::presentable::{DisplayUnit, Presentable, UnitRef};
use crate::transition::Transition;
use crate::types::{Completion, Route, TransitionOptions};

/// What a transition introduced, handed to [`Router::context_trigger`] completions.
#[derive(Clone, Default)]
pub struct TransitionContext {
    presentables: Vec<Rc<dyn Presentable>>,
    animation: Option<Rc<dyn Animation>>,
}

impl TransitionContext {
    /// Context describing `transition`.
    pub fn of<C: Container>(transition: &Transition<C>) -> Self {
        Self {
            presentables: transition.presentables().to_vec(),
            animation: transition.animation().cloned(),
        }
    }

    /// Context of a transition that introduced nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Presentables the transition introduced, in order.
    pub fn presentables(&self) -> &[Rc<dyn Presentable>] {
        &self.presentables
    }

    /// Take the introduced presentables.
    pub fn into_presentables(self) -> Vec<Rc<dyn Presentable>> {
        self.presentables
    }

    /// Animation the transition applied.
    pub fn animation(&self) -> Option<&Rc<dyn Animation>> {
        self.animation.as_ref()
    }
}

impl fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionContext")
            .field("presentables", &self.presentables.len())
            .field("animation", &self.animation.is_some())
            .finish()
    }
}

/// Completion receiving the context of the performed transition.
pub type ContextCompletion = Box<dyn FnOnce(TransitionContext)>;

/// Capability to trigger routes of type `R`.
pub trait Router<R: Route>: Presentable {
    /// Trigger `route`; `completion` receives the performed transition's context.
    fn context_trigger(
        &self,
        route: R,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    );

    /// Trigger `route`; `completion` runs after the transition completed.
    fn trigger_route(&self, route: R, options: TransitionOptions, completion: Option<Completion>) {
        let completion = completion
            .map(|c| Box::new(move |_: TransitionContext| c.complete()) as ContextCompletion);
        self.context_trigger(route, options, completion);
    }

    /// Trigger `route` with default options and no completion.
    fn trigger(&self, route: R) {
        self.trigger_route(route, TransitionOptions::default(), None);
    }
}

/// Ask `presentable` for a router able to handle routes of type `R`.
pub fn router_for<R: Route, P: Presentable + ?Sized>(presentable: &P) -> Option<StrongRouter<R>> {
    let erased = presentable.router_any(TypeId::of::<R>())?;
    erased.downcast::<StrongRouter<R>>().ok().map(|router| *router)
}

/// Answer a [`Presentable::router_any`] query for route type `R` with `target`, if the types match.
pub fn answer_router_query<R: Route>(
    route_type: TypeId,
    target: impl FnOnce() -> Option<Rc<dyn Router<R>>>,
) -> Option<Box<dyn Any>> {
    if route_type != TypeId::of::<R>() {
        return None;
    }
    target().map(|router| Box::new(StrongRouter::new(router)) as Box<dyn Any>)
}

/// Router handle that keeps its target alive.
pub struct StrongRouter<R: Route> {
    target: Rc<dyn Router<R>>,
}

impl<R: Route> StrongRouter<R> {
    /// Wrap `target`.
    pub fn new(target: Rc<dyn Router<R>>) -> Self {
        Self { target }
    }

    /// A handle that does not keep the target alive and tolerates its release.
    pub fn weak(&self) -> WeakRouter<R> {
        WeakRouter::new(Rc::downgrade(&self.target))
    }

    /// A handle that does not keep the target alive and panics if used after its release.
    pub fn unowned(&self) -> UnownedRouter<R> {
        UnownedRouter::new(Rc::downgrade(&self.target))
    }

    /// The wrapped router.
    pub fn target(&self) -> &Rc<dyn Router<R>> {
        &self.target
    }
}

impl<R: Route> Clone for StrongRouter<R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<R: Route> fmt::Debug for StrongRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrongRouter")
            .field("route", &type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R: Route> Router<R> for StrongRouter<R> {
    fn context_trigger(
        &self,
        route: R,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    ) {
        self.target.context_trigger(route, options, completion);
    }
}

impl<R: Route> Presentable for StrongRouter<R> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.target.display_unit()
    }
    fn presented(&self, from: Option<&UnitRef>) {
        self.target.presented(from);
    }
    fn register_parent(&self, parent: Weak<dyn Presentable>) {
        self.target.register_parent(parent);
    }
    fn child_transition_completed(&self) {
        self.target.child_transition_completed();
    }
    fn child_presentables(&self) -> Vec<Rc<dyn Presentable>> {
        self.target.child_presentables()
    }
    fn can_be_removed_as_child(&self) -> bool {
        self.target.can_be_removed_as_child()
    }
    fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
        self.target.router_any(route_type)
    }
}

/// Router handle that tolerates the release of its target.
pub struct WeakRouter<R: Route> {
    target: Weak<dyn Router<R>>,
}

impl<R: Route> WeakRouter<R> {
    /// Wrap `target`.
    pub fn new(target: Weak<dyn Router<R>>) -> Self {
        Self { target }
    }

    /// The target, if it is still alive.
    pub fn upgrade(&self) -> Option<StrongRouter<R>> {
        self.target.upgrade().map(StrongRouter::new)
    }
}

impl<R: Route> Clone for WeakRouter<R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<R: Route> fmt::Debug for WeakRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRouter")
            .field("route", &type_name::<R>())
            .field("alive", &(self.target.strong_count() > 0))
            .finish()
    }
}

impl<R: Route> Router<R> for WeakRouter<R> {
    fn context_trigger(
        &self,
        route: R,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    ) {
        match self.target.upgrade() {
            Some(target) => target.context_trigger(route, options, completion),
            None => {
                tracing::debug!(?route, "weak router target released; completing without effect");
                if let Some(completion) = completion {
                    completion(TransitionContext::empty());
                }
            }
        }
    }
}

impl<R: Route> Presentable for WeakRouter<R> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.target.upgrade()?.display_unit()
    }
    fn presented(&self, from: Option<&UnitRef>) {
        if let Some(target) = self.target.upgrade() {
            target.presented(from);
        }
    }
    fn register_parent(&self, parent: Weak<dyn Presentable>) {
        if let Some(target) = self.target.upgrade() {
            target.register_parent(parent);
        }
    }
    fn child_transition_completed(&self) {
        if let Some(target) = self.target.upgrade() {
            target.child_transition_completed();
        }
    }
    fn child_presentables(&self) -> Vec<Rc<dyn Presentable>> {
        self.target
            .upgrade()
            .map(|t| t.child_presentables())
            .unwrap_or_default()
    }
    fn can_be_removed_as_child(&self) -> bool {
        self.target
            .upgrade()
            .is_none_or(|t| t.can_be_removed_as_child())
    }
    fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
        self.target.upgrade()?.router_any(route_type)
    }
}

/// Router handle whose target is kept alive elsewhere.
///
/// Using it after the target was released is a lifetime bug and panics.
pub struct UnownedRouter<R: Route> {
    target: Weak<dyn Router<R>>,
}

impl<R: Route> UnownedRouter<R> {
    /// Wrap `target`.
    pub fn new(target: Weak<dyn Router<R>>) -> Self {
        Self { target }
    }

    /// The target.
    ///
    /// # Panics
    ///
    /// Panics if the target was released.
    pub fn target(&self) -> Rc<dyn Router<R>> {
        self.target.upgrade().unwrap_or_else(|| {
            panic!(
                "unowned router for `{}` used after its target was released",
                type_name::<R>()
            )
        })
    }

    /// A strong handle to the target.
    ///
    /// # Panics
    ///
    /// Panics if the target was released.
    pub fn strong(&self) -> StrongRouter<R> {
        StrongRouter::new(self.target())
    }
}

impl<R: Route> Clone for UnownedRouter<R> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<R: Route> fmt::Debug for UnownedRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnownedRouter")
            .field("route", &type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R: Route> Router<R> for UnownedRouter<R> {
    fn context_trigger(
        &self,
        route: R,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    ) {
        self.target().context_trigger(route, options, completion);
    }
}

impl<R: Route> Presentable for UnownedRouter<R> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.target().display_unit()
    }
    fn presented(&self, from: Option<&UnitRef>) {
        self.target().presented(from);
    }
    fn register_parent(&self, parent: Weak<dyn Presentable>) {
        self.target().register_parent(parent);
    }
    fn child_transition_completed(&self) {
        self.target().child_transition_completed();
    }
    fn child_presentables(&self) -> Vec<Rc<dyn Presentable>> {
        self.target().child_presentables()
    }
    fn can_be_removed_as_child(&self) -> bool {
        self.target().can_be_removed_as_child()
    }
    fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
        self.target().router_any(route_type)
    }
}

/// Router for `R` that owns a display unit and forwards every route, mapped, to a parent router.
///
/// Lets a screen expose its own small route type while its parent coordinator
/// stays in charge of navigation. It answers [`router_for::<R>`](router_for),
/// so it can serve as a deep-link context.
pub struct RedirectionRouter<P: Route, R: Route> {
    this: Weak<Self>,
    parent: UnownedRouter<P>,
    unit: Option<OwnershipCell<dyn DisplayUnit>>,
    map: Box<dyn Fn(R) -> P>,
}

impl<P: Route, R: Route> RedirectionRouter<P, R> {
    /// Create a router forwarding to `parent` through `map`, showing `unit`.
    pub fn new(
        parent: UnownedRouter<P>,
        unit: Option<UnitRef>,
        map: impl Fn(R) -> P + 'static,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            parent,
            unit: unit.map(OwnershipCell::new),
            map: Box::new(map),
        })
    }

    /// The router routes are forwarded to.
    pub fn parent(&self) -> &UnownedRouter<P> {
        &self.parent
    }
}

impl<P: Route, R: Route> fmt::Debug for RedirectionRouter<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectionRouter")
            .field("route", &type_name::<R>())
            .field("parent_route", &type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<P: Route, R: Route> Router<R> for RedirectionRouter<P, R> {
    fn context_trigger(
        &self,
        route: R,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    ) {
        let mapped = (self.map)(route);
        tracing::trace!(route = ?mapped, "redirecting to parent router");
        self.parent.context_trigger(mapped, options, completion);
    }
}

impl<P: Route, R: Route> Presentable for RedirectionRouter<P, R> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.unit.as_ref()?.get()
    }
    fn presented(&self, _from: Option<&UnitRef>) {
        if let Some(unit) = &self.unit {
            unit.release_strong();
        }
    }
    fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
        answer_router_query::<R>(route_type, || {
            self.this.upgrade().map(|this| this as Rc<dyn Router<R>>)
        })
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Debug, PartialEq)]
    enum AppRoute {
        Home,
        Detail(u32),
    }
    impl Route for AppRoute {}

    #[derive(Clone, Debug, PartialEq)]
    enum ItemRoute {
        Open(u32),
    }
    impl Route for ItemRoute {}

    struct Recorder {
        seen: RefCell<Vec<AppRoute>>,
        this: Weak<Self>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new_cyclic(|this| Self {
                seen: RefCell::new(Vec::new()),
                this: this.clone(),
            })
        }
    }

    impl Router<AppRoute> for Recorder {
        fn context_trigger(
            &self,
            route: AppRoute,
            _options: TransitionOptions,
            completion: Option<ContextCompletion>,
        ) {
            self.seen.borrow_mut().push(route);
            if let Some(c) = completion {
                c(TransitionContext::empty());
            }
        }
    }

    impl Presentable for Recorder {
        fn display_unit(&self) -> Option<UnitRef> {
            None
        }
        fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
            answer_router_query::<AppRoute>(route_type, || {
                self.this.upgrade().map(|r| r as Rc<dyn Router<AppRoute>>)
            })
        }
    }

    fn completed_flag() -> (Rc<RefCell<bool>>, Completion) {
        let flag = Rc::new(RefCell::new(false));
        let f = flag.clone();
        (flag, Completion::new(move || *f.borrow_mut() = true))
    }

    #[test]
    fn strong_router_forwards_and_completes() {
        let recorder = Recorder::new();
        let router = StrongRouter::new(recorder.clone());
        let (done, completion) = completed_flag();
        router.trigger_route(AppRoute::Home, TransitionOptions::default(), Some(completion));
        assert_eq!(*recorder.seen.borrow(), vec![AppRoute::Home]);
        assert!(*done.borrow());
    }

    #[test]
    fn weak_router_after_expiry_completes_without_effect() {
        let recorder = Recorder::new();
        let weak = StrongRouter::new(recorder.clone() as Rc<dyn Router<AppRoute>>).weak();
        drop(recorder);
        let (done, completion) = completed_flag();
        weak.trigger_route(AppRoute::Detail(1), TransitionOptions::default(), Some(completion));
        assert!(*done.borrow(), "expired weak router must still complete");
        assert!(weak.upgrade().is_none());
        assert!(weak.can_be_removed_as_child());
    }

    #[test]
    #[should_panic(expected = "used after its target was released")]
    fn unowned_router_after_expiry_panics() {
        let recorder = Recorder::new();
        let unowned = StrongRouter::new(recorder.clone() as Rc<dyn Router<AppRoute>>).unowned();
        drop(recorder);
        unowned.trigger(AppRoute::Home);
    }

    #[test]
    fn router_for_is_type_directed() {
        let recorder = Recorder::new();
        assert!(router_for::<AppRoute, _>(&*recorder).is_some());
        assert!(router_for::<ItemRoute, _>(&*recorder).is_none());
    }

    #[test]
    fn redirection_router_maps_routes_to_parent() {
        let recorder = Recorder::new();
        let parent = StrongRouter::new(recorder.clone() as Rc<dyn Router<AppRoute>>);
        let scene = crate::headless::Scene::new();
        let screen = scene.view("item");
        let unit = Some(screen.clone() as UnitRef);
        let redirect = RedirectionRouter::new(parent.unowned(), unit, |r: ItemRoute| match r {
            ItemRoute::Open(id) => AppRoute::Detail(id),
        });
        let found =
            router_for::<ItemRoute, _>(&*redirect).expect("redirection answers its own route");
        found.trigger(ItemRoute::Open(4));
        assert_eq!(*recorder.seen.borrow(), vec![AppRoute::Detail(4)]);
        assert!(redirect.display_unit().is_some());
        assert!(router_for::<AppRoute, _>(&*redirect).is_none());
    }
}
