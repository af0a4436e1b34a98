// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ownership and child tracking.
//!
//! ## Overview
//!
//! Parents own their children strongly through a [`ChildTracker`]. Children
//! reach their parents only through a notify chain that captures parents weakly,
//! so the graph never forms a reference cycle.
//!
//! Pruning keeps a child while it is reachable: while it has never been shown,
//! while its display unit is attached, or while any nested child is reachable.
//! After pruning, the tracker notifies its parents, which prune in turn.
//!
//! [`OwnershipCell`] covers the window between creating a coordinator and
//! attaching its root unit to the display hierarchy.

use core::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::presentable::{Presentable, children_removable, same_presentable};

/// Holds a value strongly until [`release_strong`](Self::release_strong), weakly afterwards.
pub struct OwnershipCell<T: ?Sized> {
    strong: RefCell<Option<Rc<T>>>,
    weak: Weak<T>,
}

impl<T: ?Sized> OwnershipCell<T> {
    /// Own `value`.
    pub fn new(value: Rc<T>) -> Self {
        Self {
            weak: Rc::downgrade(&value),
            strong: RefCell::new(Some(value)),
        }
    }

    /// The value, if still alive.
    pub fn get(&self) -> Option<Rc<T>> {
        self.weak.upgrade()
    }

    /// Drop the strong half. Idempotent.
    pub fn release_strong(&self) {
        let strong = self.strong.borrow_mut().take();
        drop(strong);
    }

    /// Returns true once the strong half was released.
    pub fn is_released(&self) -> bool {
        self.strong.borrow().is_none()
    }
}

impl<T: ?Sized> fmt::Debug for OwnershipCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipCell")
            .field("released", &self.is_released())
            .field("alive", &(self.weak.strong_count() > 0))
            .finish()
    }
}

type Notify = Rc<dyn Fn()>;

/// Ordered child list plus the upward removal-notify chain.
#[derive(Default)]
pub struct ChildTracker {
    children: RefCell<Vec<Rc<dyn Presentable>>>,
    notify_parents: RefCell<Option<Notify>>,
}

impl ChildTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `child` and register `parent` with it.
    ///
    /// A child that is already tracked is left in place and not registered again.
    pub fn add_child(&self, child: Rc<dyn Presentable>, parent: Weak<dyn Presentable>) {
        {
            let mut children = self.children.borrow_mut();
            if children.iter().any(|c| same_presentable(c, &child)) {
                return;
            }
            children.push(child.clone());
        }
        child.register_parent(parent);
    }

    /// Snapshot of the children, in insertion order.
    pub fn children(&self) -> Vec<Rc<dyn Presentable>> {
        self.children.borrow().clone()
    }

    /// Number of tracked children.
    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    /// Returns true if no children are tracked.
    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Returns true if every child can be removed.
    pub fn all_removable(&self) -> bool {
        children_removable(&self.children())
    }

    /// Drop `child` if it is tracked and no longer reachable, then notify parents.
    pub fn remove_child(&self, child: &Rc<dyn Presentable>) {
        self.prune(|candidate| same_presentable(candidate, child));
    }

    /// Drop every child that is no longer reachable, then notify parents.
    pub fn remove_children_if_needed(&self) {
        self.prune(|_| true);
    }

    /// Chain `parent` onto the removal-notify callback.
    ///
    /// Earlier registrations keep firing, in registration order.
    pub fn register_parent(&self, parent: Weak<dyn Presentable>) {
        let previous = self.notify_parents.borrow_mut().take();
        let notify: Notify = Rc::new(move || {
            if let Some(previous) = &previous {
                previous();
            }
            if let Some(parent) = parent.upgrade() {
                parent.child_transition_completed();
            }
        });
        *self.notify_parents.borrow_mut() = Some(notify);
    }

    /// Run the removal-notify chain.
    pub fn notify_parents(&self) {
        let notify = self.notify_parents.borrow().clone();
        if let Some(notify) = notify {
            notify();
        }
    }

    fn prune(&self, candidate: impl Fn(&Rc<dyn Presentable>) -> bool) {
        let snapshot = self.children();
        let removed: Vec<_> = snapshot
            .into_iter()
            .filter(|child| candidate(child) && child.can_be_removed_as_child())
            .collect();
        if !removed.is_empty() {
            let dropped = {
                let mut children = self.children.borrow_mut();
                let (gone, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut *children)
                    .into_iter()
                    .partition(|c| removed.iter().any(|r| same_presentable(c, r)));
                *children = kept;
                gone
            };
            tracing::debug!(
                removed = dropped.len(),
                remaining = self.len(),
                "pruned unreachable children"
            );
            drop(dropped);
        }
        drop(removed);
        self.notify_parents();
    }
}

impl fmt::Debug for ChildTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildTracker")
            .field("children", &self.len())
            .field("has_parents", &self.notify_parents.borrow().is_some())
            .finish()
    }
}
