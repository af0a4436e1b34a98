// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-hop deep links.
//!
//! ## Overview
//!
//! A deep link triggers a first route on a known router, then routes each
//! remaining hop through whatever the previous hops introduced. Hops have
//! heterogeneous route types and are passed as boxed [`DeepLinkHop`]s, built
//! with [`hop`].
//!
//! ## Resolution
//!
//! The resolver keeps a context stack: the router itself, then every
//! presentable introduced by each resolved hop, most recent on top.
//! For each hop it scans from the top, asking each entry for a router of the
//! hop's route type through [`router_for`]. Entries that cannot route the hop
//! are popped for good; the first entry that can is triggered and, once its
//! transition completed, the presentables it introduced are pushed.
//!
//! Resolution is greedy and never backtracks. If the stack runs empty the
//! chain stops with a [`WiringDefect::NoRouterFound`] report and the deep link
//! completes.
//!
//! Hops run strictly one after another: a hop starts only after the previous
//! hop's transition, animation included, completed.

use core::any::type_name;
use core::fmt;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::container::Container;
use crate::defect::{self, WiringDefect};
use crate::presentable::Presentable;
use crate::router::{ContextCompletion, Router, TransitionContext, router_for};
use crate::transition::Transition;
use crate::types::{Completion, Route, TransitionOptions};

/// A hop bound to the router that will handle it.
pub type BoundHop = Box<dyn FnOnce(TransitionOptions, ContextCompletion)>;

/// One type-erased hop of a deep link.
pub trait DeepLinkHop: fmt::Debug {
    /// Type name of the route, for diagnostics.
    fn route_type(&self) -> &'static str;

    /// Bind to `candidate` if it can route this hop; otherwise hand the hop back.
    fn bind(self: Box<Self>, candidate: &dyn Presentable) -> Result<BoundHop, Box<dyn DeepLinkHop>>;
}

impl<R: Route> DeepLinkHop for R {
    fn route_type(&self) -> &'static str {
        type_name::<R>()
    }

    fn bind(
        self: Box<Self>,
        candidate: &dyn Presentable,
    ) -> Result<BoundHop, Box<dyn DeepLinkHop>> {
        match router_for::<R, _>(candidate) {
            Some(router) => {
                let route = *self;
                Ok(Box::new(move |options: TransitionOptions, completion: ContextCompletion| {
                    router.context_trigger(route, options, Some(completion));
                }))
            }
            None => Err(self as Box<dyn DeepLinkHop>),
        }
    }
}

/// Box `route` as a deep-link hop.
pub fn hop<R: Route>(route: R) -> Box<dyn DeepLinkHop> {
    Box::new(route)
}

/// Build a deep link: trigger `first` on `router`, then resolve each hop of `remainder`.
///
/// The returned transition introduces no presentables of its own; each hop's
/// router registers what its transition introduces. It can be performed once;
/// performing it again completes without effect.
pub fn deep_link<C, R, T>(
    router: T,
    first: R,
    remainder: Vec<Box<dyn DeepLinkHop>>,
) -> Transition<C>
where
    C: Container,
    R: Route,
    T: Router<R>,
{
    let router = Rc::new(router);
    let pending = Once::new((first, remainder));
    Transition::new(Vec::new(), None, move |_, options, completion| {
        let Some((first, remainder)) = pending.take() else {
            tracing::warn!("deep link already performed; completing without effect");
            completion.complete();
            return;
        };
        tracing::debug!(route = ?first, hops = remainder.len(), "starting deep link");
        let origin = router.clone() as Rc<dyn Presentable>;
        let first_type = type_name::<R>();
        router.context_trigger(
            first,
            options,
            Some(Box::new(move |context: TransitionContext| {
                let mut chain = Chain {
                    stack: vec![origin],
                    remainder: remainder.into(),
                    resolved: 1,
                    options,
                    completion,
                };
                chain.push_introduced(first_type, context);
                resolve_next(chain);
            })),
        );
    })
}

/// Value that can be taken once through a shared reference.
struct Once<T>(RefCell<Option<T>>);

impl<T> Once<T> {
    fn new(value: T) -> Self {
        Self(RefCell::new(Some(value)))
    }

    fn take(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }
}

struct Chain {
    stack: Vec<Rc<dyn Presentable>>,
    remainder: VecDeque<Box<dyn DeepLinkHop>>,
    resolved: usize,
    options: TransitionOptions,
    completion: Completion,
}

impl Chain {
    fn push_introduced(&mut self, route_type: &'static str, context: TransitionContext) {
        for presentable in context.into_presentables() {
            if presentable.display_unit().is_none() {
                defect::report(&WiringDefect::MissingDisplayUnit {
                    context: route_type,
                });
            }
            self.stack.push(presentable);
        }
    }
}

fn resolve_next(mut chain: Chain) {
    let Some(mut hop) = chain.remainder.pop_front() else {
        tracing::debug!(resolved = chain.resolved, "deep link resolved");
        chain.completion.complete();
        return;
    };
    let route_type = hop.route_type();
    loop {
        let Some(candidate) = chain.stack.last().cloned() else {
            defect::report(&WiringDefect::NoRouterFound {
                route_type,
                resolved: chain.resolved,
            });
            chain.completion.complete();
            return;
        };
        match hop.bind(&*candidate) {
            Ok(bound) => {
                tracing::trace!(route = route_type, depth = chain.stack.len(), "hop bound");
                let options = chain.options;
                bound(
                    options,
                    Box::new(move |context: TransitionContext| {
                        chain.resolved += 1;
                        chain.push_introduced(route_type, context);
                        resolve_next(chain);
                    }),
                );
                return;
            }
            Err(unbound) => {
                tracing::trace!(route = route_type, "context cannot route hop; discarding it");
                chain.stack.pop();
                hop = unbound;
            }
        }
    }
}
