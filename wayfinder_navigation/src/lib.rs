// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=wayfinder_navigation --heading-base-level=0

//! Wayfinder Navigation: route-driven navigation coordination for tree-structured UIs.
//!
//! ## Overview
//!
//! This crate separates three questions that UI code usually tangles together:
//! what should be shown (a [`Route`](crate::types::Route)), how the display
//! hierarchy changes ([`Transition`](crate::transition::Transition)), and who
//! owns which displayed unit (the parent/child graph kept by
//! [`Coordinator`](crate::coordinator::Coordinator)).
//!
//! It does not render anything. Display backends implement the container traits
//! in [`container`](crate::container) and the animation traits in
//! [`animation`](crate::animation). The [`headless`](crate::headless) backend
//! (feature `headless`, on by default) is an in-memory scene used by tests,
//! demos and benches.
//!
//! ## Transitions
//!
//! A [`Transition`](crate::transition::Transition) is a value: it lists the
//! presentables it introduces, the animation it applies, and a procedure that
//! performs it against a container and completes exactly once. Components are
//! only constructible for containers that support them, so a stack push cannot
//! be built for a tab container.
//! [`Transition::multiple`](crate::transition::Transition::multiple) sequences
//! components, each one starting from the previous one's completion.
//!
//! ## Coordinators and routers
//!
//! Applications implement [`RouteHandler`](crate::coordinator::RouteHandler) to
//! map routes to transitions. A [`Coordinator`](crate::coordinator::Coordinator)
//! wraps the handler and a root container; it is a
//! [`Router`](crate::router::Router) for the handler's route type. Routers are
//! passed around as [`StrongRouter`](crate::router::StrongRouter),
//! [`UnownedRouter`](crate::router::UnownedRouter) or
//! [`WeakRouter`](crate::router::WeakRouter).
//!
//! ## Deep links
//!
//! [`deep_link`](crate::deep_link::deep_link) triggers a chain of heterogeneous
//! routes. After each hop, the presentables it introduced are searched top-down
//! for a router able to handle the next hop.
//!
//! ## Lifecycle
//!
//! Every presentable a coordinator's transition introduces becomes its child.
//! After each transition the coordinator drops children whose display units left
//! the live hierarchy, and notifies its own parents so they re-evaluate too.
//!
//! ## Workflow
//!
//! 1) Build a root container from your backend and a handler, and create the
//!    coordinator with [`Coordinator::new`](crate::coordinator::Coordinator::new).
//! 2) Attach its display unit to a window.
//! 3) Trigger routes through the coordinator or any router handle. Transitions
//!    run, children are tracked and pruned, completions fire once.
//!
//! Misconfigured wiring (a deep link with no router for a hop, a presentable
//! without a display unit) is logged as a
//! [`WiringDefect`](crate::defect::WiringDefect) through `tracing`; enable the
//! `strict_wiring` feature to panic instead.

pub mod animation;
pub mod container;
pub mod coordinator;
pub mod deep_link;
pub mod defect;
#[cfg(feature = "headless")]
pub mod headless;
pub mod lifecycle;
pub mod presentable;
pub mod router;
pub mod transition;
pub mod types;
