// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display units and presentables.
//!
//! A [`DisplayUnit`] is the backend's displayable object: it has an identity and
//! reports how it is attached to the live hierarchy.
//! A [`Presentable`] is anything that can be introduced by a transition and
//! tracked as a child: plain units, coordinators, and routers.

use core::any::{Any, TypeId};
use std::rc::{Rc, Weak};

use crate::types::{Attachment, UnitId};

/// Shared handle to a display unit.
pub type UnitRef = Rc<dyn DisplayUnit>;

/// A displayable unit supplied by a display backend.
pub trait DisplayUnit: 'static {
    /// Stable identity of this unit.
    fn id(&self) -> UnitId;

    /// Current attachment to the live hierarchy.
    fn attachment(&self) -> Attachment;

    /// Returns true if the unit is linked into the live hierarchy.
    fn is_attached(&self) -> bool {
        self.attachment().is_attached()
    }
}

/// A unit of display that takes part in parent/child bookkeeping.
///
/// Only [`display_unit`](Presentable::display_unit) is required. The remaining
/// hooks default to no-ops and are overridden by coordinators and routers.
pub trait Presentable: 'static {
    /// The unit that is shown when this presentable is introduced, if any.
    fn display_unit(&self) -> Option<UnitRef>;

    /// Called once a transition has shown this presentable, with the unit it was shown from.
    fn presented(&self, _from: Option<&UnitRef>) {}

    /// Register `parent` to be notified when this presentable prunes its own children.
    fn register_parent(&self, _parent: Weak<dyn Presentable>) {}

    /// Called when a child of this presentable finished a transition or pruned itself.
    fn child_transition_completed(&self) {}

    /// Nested child presentables consulted by the removal fold.
    fn child_presentables(&self) -> Vec<Rc<dyn Presentable>> {
        Vec::new()
    }

    /// Returns true if this presentable is no longer reachable and may be dropped by its parent.
    ///
    /// Never-shown presentables (no display unit) are never removable. Otherwise
    /// the unit must be detached and every nested child must itself be removable.
    fn can_be_removed_as_child(&self) -> bool {
        match self.display_unit() {
            None => false,
            Some(unit) => !unit.is_attached() && children_removable(&self.child_presentables()),
        }
    }

    /// Type-erased router query backing [`router_for`](crate::router::router_for).
    ///
    /// Implementations that can route `route_type` return a boxed
    /// [`StrongRouter`](crate::router::StrongRouter) for that route type.
    fn router_any(&self, _route_type: TypeId) -> Option<Box<dyn Any>> {
        None
    }
}

/// Bottom-up fold: every child is removable.
pub(crate) fn children_removable(children: &[Rc<dyn Presentable>]) -> bool {
    children.iter().all(|c| c.can_be_removed_as_child())
}

/// Identity comparison for shared presentables.
///
/// Compares data pointers only, so the same object seen through different
/// trait-object vtables still compares equal.
pub fn same_presentable(a: &Rc<dyn Presentable>, b: &Rc<dyn Presentable>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
