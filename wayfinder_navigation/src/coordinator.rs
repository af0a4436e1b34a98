// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinators: routers built from a route handler and a root container.
//!
//! ## Overview
//!
//! A [`RouteHandler`] maps each route to a [`Transition`] on its container type.
//! [`Coordinator`] runs those transitions against its root container, registers
//! every presentable they introduce as a child, and prunes unreachable children
//! once each transition completed.
//!
//! ## Root ownership
//!
//! The coordinator holds its root container strongly from construction until it
//! is first presented. From then on the display hierarchy owns the root and the
//! coordinator only keeps a weak reference, so dismissing the root is what lets
//! the coordinator become removable.

use core::any::{Any, TypeId};
use core::fmt;
use std::rc::{Rc, Weak};

use crate::container::Container;
use crate::deep_link::{self, DeepLinkHop};
use crate::lifecycle::{ChildTracker, OwnershipCell};
use crate::presentable::{DisplayUnit, Presentable, UnitRef};
use crate::router::{
    ContextCompletion, Router, StrongRouter, TransitionContext, UnownedRouter, WeakRouter,
    answer_router_query,
};
use crate::transition::Transition;
use crate::types::{Completion, Route, TransitionOptions};

/// Application hook that maps routes to transitions.
pub trait RouteHandler: Sized + 'static {
    /// Route type handled by the coordinator.
    type Route: Route;
    /// Root container type.
    type Container: Container;

    /// Build the transition for `route`.
    ///
    /// `coordinator` gives access to the root, the children and router handles,
    /// for example to build a [`Transition::route`] on a child coordinator or a
    /// deep link through [`Coordinator::deep_link`].
    fn prepare_transition(
        &self,
        route: Self::Route,
        coordinator: &Coordinator<Self>,
    ) -> Transition<Self::Container>;

    /// Route triggered without animation right after the coordinator is created.
    fn initial_route(&self) -> Option<Self::Route> {
        None
    }
}

/// A router for `H::Route` that owns a root container and tracks children.
pub struct Coordinator<H: RouteHandler> {
    this: Weak<Self>,
    handler: H,
    root: OwnershipCell<H::Container>,
    children: ChildTracker,
}

impl<H: RouteHandler> Coordinator<H> {
    /// Create a coordinator for `handler` driving `root`.
    ///
    /// Triggers [`RouteHandler::initial_route`], if any, without animation.
    pub fn new(handler: H, root: Rc<H::Container>) -> Rc<Self> {
        let coordinator = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            handler,
            root: OwnershipCell::new(root),
            children: ChildTracker::new(),
        });
        if let Some(route) = coordinator.handler.initial_route() {
            tracing::debug!(?route, "triggering initial route");
            coordinator.trigger_route(route, TransitionOptions::IMMEDIATE, None);
        }
        coordinator
    }

    /// The route handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The root container, if still alive.
    pub fn root(&self) -> Option<Rc<H::Container>> {
        self.root.get()
    }

    /// The root container as a display unit, if still alive.
    pub fn root_display_unit(&self) -> Option<UnitRef> {
        self.root.get().map(|root| root as UnitRef)
    }

    /// Tracked children, in insertion order.
    pub fn children(&self) -> Vec<Rc<dyn Presentable>> {
        self.children.children()
    }

    /// Ask the handler for the transition of `route`.
    pub fn prepare_transition(&self, route: H::Route) -> Transition<H::Container> {
        self.handler.prepare_transition(route, self)
    }

    /// Perform `transition` on the root container.
    ///
    /// Introduced presentables become children before execution starts. After
    /// `completion` ran, unreachable children are pruned.
    pub fn perform_transition(
        &self,
        transition: Transition<H::Container>,
        options: TransitionOptions,
        completion: Completion,
    ) {
        for presentable in transition.presentables() {
            self.add_child(presentable.clone());
        }
        let Some(root) = self.root.get() else {
            tracing::debug!("root container released; completing transition without effect");
            completion.complete();
            return;
        };
        tracing::debug!(
            root = %root.id(),
            presentables = transition.presentables().len(),
            animated = options.animated,
            "performing transition"
        );
        let this = self.this.clone();
        transition.perform(
            &root,
            options,
            Completion::new(move || {
                completion.complete();
                if let Some(this) = this.upgrade() {
                    this.remove_children_if_needed();
                }
            }),
        );
    }

    /// Track `child` and register this coordinator as its parent.
    pub fn add_child(&self, child: Rc<dyn Presentable>) {
        let parent: Weak<dyn Presentable> = self.this.clone();
        self.children.add_child(child, parent);
    }

    /// Drop `child` if it is no longer reachable.
    pub fn remove_child(&self, child: &Rc<dyn Presentable>) {
        self.children.remove_child(child);
    }

    /// Drop every child that is no longer reachable and notify parents.
    pub fn remove_children_if_needed(&self) {
        self.children.remove_children_if_needed();
    }

    /// A router handle that keeps the coordinator alive.
    pub fn strong_router(this: &Rc<Self>) -> StrongRouter<H::Route> {
        StrongRouter::new(this.clone())
    }

    /// A router handle that tolerates the coordinator's release.
    pub fn weak_router(&self) -> WeakRouter<H::Route> {
        WeakRouter::new(self.this.clone())
    }

    /// A router handle that assumes the coordinator outlives it.
    pub fn unowned_router(&self) -> UnownedRouter<H::Route> {
        UnownedRouter::new(self.this.clone())
    }

    /// Deep link: trigger `first` on this coordinator, then resolve each hop of `remainder`.
    pub fn deep_link(
        &self,
        first: H::Route,
        remainder: Vec<Box<dyn DeepLinkHop>>,
    ) -> Transition<H::Container> {
        deep_link::deep_link(self.unowned_router(), first, remainder)
    }

    /// Build and perform a deep link.
    pub fn trigger_deep_link(
        &self,
        first: H::Route,
        remainder: Vec<Box<dyn DeepLinkHop>>,
        options: TransitionOptions,
        completion: Option<Completion>,
    ) {
        let transition = self.deep_link(first, remainder);
        self.perform_transition(transition, options, Completion::or_noop(completion));
    }
}

impl<H: RouteHandler> fmt::Debug for Coordinator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("route", &core::any::type_name::<H::Route>())
            .field("root", &self.root)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl<H: RouteHandler> Router<H::Route> for Coordinator<H> {
    fn context_trigger(
        &self,
        route: H::Route,
        options: TransitionOptions,
        completion: Option<ContextCompletion>,
    ) {
        tracing::debug!(?route, "triggering route");
        let transition = self.prepare_transition(route);
        let context = TransitionContext::of(&transition);
        self.perform_transition(
            transition,
            options,
            Completion::new(move || {
                if let Some(completion) = completion {
                    completion(context);
                }
            }),
        );
    }
}

impl<H: RouteHandler> Presentable for Coordinator<H> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.root_display_unit()
    }

    fn presented(&self, _from: Option<&UnitRef>) {
        self.root.release_strong();
    }

    fn register_parent(&self, parent: Weak<dyn Presentable>) {
        self.children.register_parent(parent);
    }

    fn child_transition_completed(&self) {
        self.remove_children_if_needed();
    }

    fn child_presentables(&self) -> Vec<Rc<dyn Presentable>> {
        self.children()
    }

    fn can_be_removed_as_child(&self) -> bool {
        if !self.root.is_released() {
            return false;
        }
        let attached = self.root.get().is_some_and(|root| root.is_attached());
        !attached && self.children.all_removable()
    }

    fn router_any(&self, route_type: TypeId) -> Option<Box<dyn Any>> {
        answer_router_query::<H::Route>(route_type, || {
            self.this
                .upgrade()
                .map(|this| this as Rc<dyn Router<H::Route>>)
        })
    }
}
