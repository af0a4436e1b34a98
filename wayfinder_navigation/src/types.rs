// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: routes, options, unit identity, attachment flags, and completions.
//!
//! ## Overview
//!
//! These types describe the navigation protocol's inputs and outputs.
//! They are referenced by [`transition`](crate::transition), [`router`](crate::router)
//! and [`coordinator`](crate::coordinator), and implemented by display backends.

use core::fmt;

/// An application-defined navigation request.
///
/// Routes carry no required structure. Route types are identified by their
/// [`TypeId`](core::any::TypeId), which is what a [`Presentable`](crate::presentable::Presentable)
/// is asked about when a deep link looks for a router able to handle the next hop.
pub trait Route: fmt::Debug + 'static {}

/// Options applied to a single transition execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransitionOptions {
    /// Whether container operations should animate.
    pub animated: bool,
}

impl TransitionOptions {
    /// Animated options (the default).
    pub const ANIMATED: Self = Self { animated: true };
    /// Non-animated options.
    pub const IMMEDIATE: Self = Self { animated: false };
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self::ANIMATED
    }
}

/// Identifier for a display unit.
///
/// Allocated by the display backend. Stable for the lifetime of the unit and
/// never reused by the [headless](crate::headless) backend.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    /// Wrap a backend-allocated raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

bitflags::bitflags! {
    /// How a display unit is currently linked into the live hierarchy.
    ///
    /// A unit is attached when any flag is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attachment: u8 {
        /// Unit is the root of a window.
        const WINDOW     = 0b0000_0001;
        /// Unit is contained by a container (stack, tabs, split, pages, embed slot).
        const CONTAINED  = 0b0000_0010;
        /// Unit was presented by another unit.
        const PRESENTED  = 0b0000_0100;
        /// Unit currently presents another unit.
        const PRESENTING = 0b0000_1000;
    }
}

impl Attachment {
    /// Returns true if the unit takes part in the live hierarchy at all.
    pub const fn is_attached(self) -> bool {
        !self.is_empty()
    }
}

/// A one-shot completion callback.
///
/// Runs its closure exactly once: either through [`Completion::complete`], or,
/// if it is dropped without being completed, from `Drop` (logged as a warning).
/// Callers waiting on a completion therefore never hang, even when a backend
/// or a hand-written transition loses track of it.
pub struct Completion {
    callback: Option<Box<dyn FnOnce()>>,
}

impl Completion {
    /// Wrap a closure.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Some(Box::new(f)),
        }
    }

    /// A completion that does nothing.
    pub fn noop() -> Self {
        Self { callback: None }
    }

    /// Wrap an optional completion, treating `None` as [`Completion::noop`].
    pub fn or_noop(completion: Option<Self>) -> Self {
        completion.unwrap_or_else(Self::noop)
    }

    /// Run the callback.
    pub fn complete(mut self) {
        if let Some(f) = self.callback.take() {
            f();
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(f) = self.callback.take() {
            tracing::warn!("completion dropped without being completed; running it now");
            f();
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn default_options_are_animated() {
        assert!(TransitionOptions::default().animated);
        assert!(!TransitionOptions::IMMEDIATE.animated);
    }

    #[test]
    fn attachment_empty_is_detached() {
        assert!(!Attachment::empty().is_attached());
        assert!(Attachment::CONTAINED.is_attached());
        assert!((Attachment::PRESENTED | Attachment::PRESENTING).is_attached());
    }

    #[test]
    fn completion_runs_once_when_completed() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let completion = Completion::new(move || c.set(c.get() + 1));
        completion.complete();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn completion_runs_on_drop() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        drop(Completion::new(move || c.set(c.get() + 1)));
        assert_eq!(count.get(), 1, "dropped completion must still fire");
    }

    #[test]
    fn unit_id_display() {
        assert_eq!(UnitId::new(7).to_string(), "unit#7");
        assert_eq!(UnitId::new(7).get(), 7);
    }
}
